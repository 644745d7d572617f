use crate::{
    dtos::sticky_note_dto::{CreateStickyNoteDto, UpdateStickyNoteDto},
    extractors::validation_extractor::ValidationExtractor,
    services::Services,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use database::StickyNote;
use utils::AppResult;

/// 获取客户的所有便签
#[utoipa::path(
    get,
    path = "/api/v0/customers/{customerId}/stickyNotes",
    tag = "stickyNotes",
    params(
        ("customerId" = String, Path, description = "客户ID")
    ),
    responses(
        (status = 200, description = "成功返回便签列表", body = Vec<StickyNote>),
        (status = 404, description = "客户不存在")
    )
)]
pub async fn get_sticky_notes(
    Extension(services): Extension<Services>,
    Path(customer_id): Path<String>,
) -> AppResult<Json<Vec<StickyNote>>> {
    let notes = services.sticky_note.get_sticky_notes(&customer_id).await?;

    Ok(Json(notes))
}

/// 在客户下创建便签
///
/// pos作用域是该客户自己的便签集合
#[utoipa::path(
    post,
    path = "/api/v0/customers/{customerId}/stickyNotes",
    tag = "stickyNotes",
    params(
        ("customerId" = String, Path, description = "客户ID")
    ),
    request_body = CreateStickyNoteDto,
    responses(
        (status = 201, description = "创建成功", body = StickyNote),
        (status = 404, description = "客户不存在"),
        (status = 409, description = "pos已被占用")
    )
)]
pub async fn create_sticky_note(
    Extension(services): Extension<Services>,
    Path(customer_id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<CreateStickyNoteDto>,
) -> AppResult<(StatusCode, Json<StickyNote>)> {
    let note = services.sticky_note.create_sticky_note(&customer_id, req).await?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// 获取单个便签
#[utoipa::path(
    get,
    path = "/api/v0/stickyNotes/{stickyNoteId}",
    tag = "stickyNotes",
    params(
        ("stickyNoteId" = String, Path, description = "便签ID")
    ),
    responses(
        (status = 200, description = "成功返回便签", body = StickyNote),
        (status = 404, description = "便签不存在")
    )
)]
pub async fn get_sticky_note(
    Extension(services): Extension<Services>,
    Path(sticky_note_id): Path<String>,
) -> AppResult<Json<StickyNote>> {
    let note = services.sticky_note.get_sticky_note(&sticky_note_id).await?;

    Ok(Json(note))
}

/// 全量更新便签
#[utoipa::path(
    put,
    path = "/api/v0/stickyNotes/{stickyNoteId}",
    tag = "stickyNotes",
    params(
        ("stickyNoteId" = String, Path, description = "便签ID")
    ),
    request_body = UpdateStickyNoteDto,
    responses(
        (status = 200, description = "更新成功", body = StickyNote),
        (status = 400, description = "body的_id与路径不一致"),
        (status = 404, description = "便签不存在"),
        (status = 409, description = "pos已被兄弟便签占用")
    )
)]
pub async fn update_sticky_note(
    Extension(services): Extension<Services>,
    Path(sticky_note_id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<UpdateStickyNoteDto>,
) -> AppResult<Json<StickyNote>> {
    let note = services.sticky_note.update_sticky_note(&sticky_note_id, req).await?;

    Ok(Json(note))
}

/// 部分更新便签(RFC 7386 merge-patch)
#[utoipa::path(
    patch,
    path = "/api/v0/stickyNotes/{stickyNoteId}",
    tag = "stickyNotes",
    params(
        ("stickyNoteId" = String, Path, description = "便签ID")
    ),
    responses(
        (status = 200, description = "更新成功", body = StickyNote),
        (status = 404, description = "便签不存在"),
        (status = 409, description = "pos已被兄弟便签占用")
    )
)]
pub async fn partial_update_sticky_note(
    Extension(services): Extension<Services>,
    Path(sticky_note_id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> AppResult<Json<StickyNote>> {
    let note = services
        .sticky_note
        .partial_update_sticky_note(&sticky_note_id, patch)
        .await?;

    Ok(Json(note))
}

/// 删除便签
#[utoipa::path(
    delete,
    path = "/api/v0/stickyNotes/{stickyNoteId}",
    tag = "stickyNotes",
    params(
        ("stickyNoteId" = String, Path, description = "便签ID")
    ),
    responses(
        (status = 204, description = "删除成功"),
        (status = 404, description = "便签不存在")
    )
)]
pub async fn delete_sticky_note(
    Extension(services): Extension<Services>,
    Path(sticky_note_id): Path<String>,
) -> AppResult<StatusCode> {
    services.sticky_note.delete_sticky_note(&sticky_note_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub struct StickyNoteController;
impl StickyNoteController {
    pub fn app() -> Router {
        Router::new()
            .route("/customers/:customerId/stickyNotes", get(get_sticky_notes))
            .route("/customers/:customerId/stickyNotes", post(create_sticky_note))
            .route("/stickyNotes/:stickyNoteId", get(get_sticky_note))
            .route("/stickyNotes/:stickyNoteId", put(update_sticky_note))
            .route("/stickyNotes/:stickyNoteId", patch(partial_update_sticky_note))
            .route("/stickyNotes/:stickyNoteId", delete(delete_sticky_note))
    }
}
