use crate::{
    dtos::checklist_dto::{CreateChecklistDto, UpdateChecklistDto},
    extractors::validation_extractor::ValidationExtractor,
    services::Services,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use database::Checklist;
use utils::AppResult;

/// 获取客户的所有检查清单
#[utoipa::path(
    get,
    path = "/api/v0/customers/{customerId}/checklists",
    tag = "checklists",
    params(
        ("customerId" = String, Path, description = "客户ID")
    ),
    responses(
        (status = 200, description = "成功返回清单列表", body = Vec<Checklist>),
        (status = 404, description = "客户不存在")
    )
)]
pub async fn get_checklists(
    Extension(services): Extension<Services>,
    Path(customer_id): Path<String>,
) -> AppResult<Json<Vec<Checklist>>> {
    let checklists = services.checklist.get_checklists(&customer_id).await?;

    Ok(Json(checklists))
}

/// 在客户下创建检查清单
///
/// pos作用域是该客户自己的清单集合
#[utoipa::path(
    post,
    path = "/api/v0/customers/{customerId}/checklists",
    tag = "checklists",
    params(
        ("customerId" = String, Path, description = "客户ID")
    ),
    request_body = CreateChecklistDto,
    responses(
        (status = 201, description = "创建成功", body = Checklist),
        (status = 404, description = "客户不存在"),
        (status = 409, description = "pos已被占用")
    )
)]
pub async fn create_checklist(
    Extension(services): Extension<Services>,
    Path(customer_id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<CreateChecklistDto>,
) -> AppResult<(StatusCode, Json<Checklist>)> {
    let checklist = services.checklist.create_checklist(&customer_id, req).await?;

    Ok((StatusCode::CREATED, Json(checklist)))
}

/// 获取单个检查清单
#[utoipa::path(
    get,
    path = "/api/v0/checklists/{checklistId}",
    tag = "checklists",
    params(
        ("checklistId" = String, Path, description = "清单ID")
    ),
    responses(
        (status = 200, description = "成功返回清单", body = Checklist),
        (status = 404, description = "清单不存在")
    )
)]
pub async fn get_checklist(
    Extension(services): Extension<Services>,
    Path(checklist_id): Path<String>,
) -> AppResult<Json<Checklist>> {
    let checklist = services.checklist.get_checklist(&checklist_id).await?;

    Ok(Json(checklist))
}

/// 全量更新检查清单
#[utoipa::path(
    put,
    path = "/api/v0/checklists/{checklistId}",
    tag = "checklists",
    params(
        ("checklistId" = String, Path, description = "清单ID")
    ),
    request_body = UpdateChecklistDto,
    responses(
        (status = 200, description = "更新成功", body = Checklist),
        (status = 400, description = "body的_id与路径不一致"),
        (status = 404, description = "清单不存在"),
        (status = 409, description = "pos已被兄弟清单占用")
    )
)]
pub async fn update_checklist(
    Extension(services): Extension<Services>,
    Path(checklist_id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<UpdateChecklistDto>,
) -> AppResult<Json<Checklist>> {
    let checklist = services.checklist.update_checklist(&checklist_id, req).await?;

    Ok(Json(checklist))
}

/// 部分更新检查清单(RFC 7386 merge-patch)
#[utoipa::path(
    patch,
    path = "/api/v0/checklists/{checklistId}",
    tag = "checklists",
    params(
        ("checklistId" = String, Path, description = "清单ID")
    ),
    responses(
        (status = 200, description = "更新成功", body = Checklist),
        (status = 404, description = "清单不存在"),
        (status = 409, description = "pos已被兄弟清单占用")
    )
)]
pub async fn partial_update_checklist(
    Extension(services): Extension<Services>,
    Path(checklist_id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> AppResult<Json<Checklist>> {
    let checklist = services.checklist.partial_update_checklist(&checklist_id, patch).await?;

    Ok(Json(checklist))
}

/// 删除检查清单(条目一并删除)
#[utoipa::path(
    delete,
    path = "/api/v0/checklists/{checklistId}",
    tag = "checklists",
    params(
        ("checklistId" = String, Path, description = "清单ID")
    ),
    responses(
        (status = 204, description = "删除成功"),
        (status = 404, description = "清单不存在")
    )
)]
pub async fn delete_checklist(
    Extension(services): Extension<Services>,
    Path(checklist_id): Path<String>,
) -> AppResult<StatusCode> {
    services.checklist.delete_checklist(&checklist_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub struct ChecklistController;
impl ChecklistController {
    pub fn app() -> Router {
        Router::new()
            .route("/customers/:customerId/checklists", get(get_checklists))
            .route("/customers/:customerId/checklists", post(create_checklist))
            .route("/checklists/:checklistId", get(get_checklist))
            .route("/checklists/:checklistId", put(update_checklist))
            .route("/checklists/:checklistId", patch(partial_update_checklist))
            .route("/checklists/:checklistId", delete(delete_checklist))
    }
}
