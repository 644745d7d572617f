use crate::{
    dtos::checklist_item_dto::{CreateChecklistItemDto, UpdateChecklistItemDto},
    extractors::validation_extractor::ValidationExtractor,
    services::Services,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use database::ChecklistItem;
use utils::AppResult;

/// 获取清单的所有条目
#[utoipa::path(
    get,
    path = "/api/v0/checklists/{checklistId}/items",
    tag = "checklistItems",
    params(
        ("checklistId" = String, Path, description = "清单ID")
    ),
    responses(
        (status = 200, description = "成功返回条目列表", body = Vec<ChecklistItem>),
        (status = 404, description = "清单不存在")
    )
)]
pub async fn get_items(
    Extension(services): Extension<Services>,
    Path(checklist_id): Path<String>,
) -> AppResult<Json<Vec<ChecklistItem>>> {
    let items = services.checklist_item.get_items(&checklist_id).await?;

    Ok(Json(items))
}

/// 在清单下创建条目
///
/// pos作用域是该清单自己的条目集合
#[utoipa::path(
    post,
    path = "/api/v0/checklists/{checklistId}/items",
    tag = "checklistItems",
    params(
        ("checklistId" = String, Path, description = "清单ID")
    ),
    request_body = CreateChecklistItemDto,
    responses(
        (status = 201, description = "创建成功", body = ChecklistItem),
        (status = 404, description = "清单不存在"),
        (status = 409, description = "pos已被占用")
    )
)]
pub async fn create_item(
    Extension(services): Extension<Services>,
    Path(checklist_id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<CreateChecklistItemDto>,
) -> AppResult<(StatusCode, Json<ChecklistItem>)> {
    let item = services.checklist_item.create_item(&checklist_id, req).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// 获取单个条目
#[utoipa::path(
    get,
    path = "/api/v0/checklistItems/{checklistItemId}",
    tag = "checklistItems",
    params(
        ("checklistItemId" = String, Path, description = "条目ID")
    ),
    responses(
        (status = 200, description = "成功返回条目", body = ChecklistItem),
        (status = 404, description = "条目不存在")
    )
)]
pub async fn get_item(
    Extension(services): Extension<Services>,
    Path(checklist_item_id): Path<String>,
) -> AppResult<Json<ChecklistItem>> {
    let item = services.checklist_item.get_item(&checklist_item_id).await?;

    Ok(Json(item))
}

/// 全量更新条目
#[utoipa::path(
    put,
    path = "/api/v0/checklistItems/{checklistItemId}",
    tag = "checklistItems",
    params(
        ("checklistItemId" = String, Path, description = "条目ID")
    ),
    request_body = UpdateChecklistItemDto,
    responses(
        (status = 200, description = "更新成功", body = ChecklistItem),
        (status = 400, description = "body的_id与路径不一致"),
        (status = 404, description = "条目不存在"),
        (status = 409, description = "pos已被兄弟条目占用")
    )
)]
pub async fn update_item(
    Extension(services): Extension<Services>,
    Path(checklist_item_id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<UpdateChecklistItemDto>,
) -> AppResult<Json<ChecklistItem>> {
    let item = services.checklist_item.update_item(&checklist_item_id, req).await?;

    Ok(Json(item))
}

/// 部分更新条目(RFC 7386 merge-patch)
#[utoipa::path(
    patch,
    path = "/api/v0/checklistItems/{checklistItemId}",
    tag = "checklistItems",
    params(
        ("checklistItemId" = String, Path, description = "条目ID")
    ),
    responses(
        (status = 200, description = "更新成功", body = ChecklistItem),
        (status = 404, description = "条目不存在"),
        (status = 409, description = "pos已被兄弟条目占用")
    )
)]
pub async fn partial_update_item(
    Extension(services): Extension<Services>,
    Path(checklist_item_id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> AppResult<Json<ChecklistItem>> {
    let item = services
        .checklist_item
        .partial_update_item(&checklist_item_id, patch)
        .await?;

    Ok(Json(item))
}

/// 删除条目
#[utoipa::path(
    delete,
    path = "/api/v0/checklistItems/{checklistItemId}",
    tag = "checklistItems",
    params(
        ("checklistItemId" = String, Path, description = "条目ID")
    ),
    responses(
        (status = 204, description = "删除成功"),
        (status = 404, description = "条目不存在")
    )
)]
pub async fn delete_item(
    Extension(services): Extension<Services>,
    Path(checklist_item_id): Path<String>,
) -> AppResult<StatusCode> {
    services.checklist_item.delete_item(&checklist_item_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub struct ChecklistItemController;
impl ChecklistItemController {
    pub fn app() -> Router {
        Router::new()
            .route("/checklists/:checklistId/items", get(get_items))
            .route("/checklists/:checklistId/items", post(create_item))
            .route("/checklistItems/:checklistItemId", get(get_item))
            .route("/checklistItems/:checklistItemId", put(update_item))
            .route("/checklistItems/:checklistItemId", patch(partial_update_item))
            .route("/checklistItems/:checklistItemId", delete(delete_item))
    }
}
