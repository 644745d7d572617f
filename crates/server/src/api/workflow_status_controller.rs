use crate::{
    dtos::workflow_status_dto::{CreateWorkflowStatusDto, UpdateWorkflowStatusDto},
    extractors::validation_extractor::ValidationExtractor,
    services::Services,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use database::WorkflowStatus;
use utils::AppResult;

/// 获取所有工作流状态
#[utoipa::path(
    get,
    path = "/api/v0/workflowStatuses",
    tag = "workflowStatuses",
    responses(
        (status = 200, description = "成功返回状态列表", body = Vec<WorkflowStatus>)
    )
)]
pub async fn get_statuses(Extension(services): Extension<Services>) -> AppResult<Json<Vec<WorkflowStatus>>> {
    let statuses = services.workflow_status.get_statuses().await?;

    Ok(Json(statuses))
}

/// 创建工作流状态
#[utoipa::path(
    post,
    path = "/api/v0/workflowStatuses",
    tag = "workflowStatuses",
    request_body = CreateWorkflowStatusDto,
    responses(
        (status = 201, description = "创建成功", body = WorkflowStatus),
        (status = 409, description = "pos已被占用")
    )
)]
pub async fn create_status(
    Extension(services): Extension<Services>,
    ValidationExtractor(req): ValidationExtractor<CreateWorkflowStatusDto>,
) -> AppResult<(StatusCode, Json<WorkflowStatus>)> {
    let status = services.workflow_status.create_status(req).await?;

    Ok((StatusCode::CREATED, Json(status)))
}

/// 获取单个工作流状态
#[utoipa::path(
    get,
    path = "/api/v0/workflowStatuses/{workflowStatusId}",
    tag = "workflowStatuses",
    params(
        ("workflowStatusId" = String, Path, description = "工作流状态ID")
    ),
    responses(
        (status = 200, description = "成功返回状态", body = WorkflowStatus),
        (status = 404, description = "状态不存在")
    )
)]
pub async fn get_status(
    Extension(services): Extension<Services>,
    Path(workflow_status_id): Path<String>,
) -> AppResult<Json<WorkflowStatus>> {
    let status = services.workflow_status.get_status(&workflow_status_id).await?;

    Ok(Json(status))
}

/// 全量更新工作流状态
#[utoipa::path(
    put,
    path = "/api/v0/workflowStatuses/{workflowStatusId}",
    tag = "workflowStatuses",
    params(
        ("workflowStatusId" = String, Path, description = "工作流状态ID")
    ),
    request_body = UpdateWorkflowStatusDto,
    responses(
        (status = 200, description = "更新成功", body = WorkflowStatus),
        (status = 400, description = "body的_id与路径不一致"),
        (status = 404, description = "状态不存在"),
        (status = 409, description = "pos已被其他状态占用")
    )
)]
pub async fn update_status(
    Extension(services): Extension<Services>,
    Path(workflow_status_id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<UpdateWorkflowStatusDto>,
) -> AppResult<Json<WorkflowStatus>> {
    let status = services.workflow_status.update_status(&workflow_status_id, req).await?;

    Ok(Json(status))
}

/// 部分更新工作流状态(RFC 7386 merge-patch)
#[utoipa::path(
    patch,
    path = "/api/v0/workflowStatuses/{workflowStatusId}",
    tag = "workflowStatuses",
    params(
        ("workflowStatusId" = String, Path, description = "工作流状态ID")
    ),
    responses(
        (status = 200, description = "更新成功", body = WorkflowStatus),
        (status = 404, description = "状态不存在"),
        (status = 409, description = "pos已被其他状态占用")
    )
)]
pub async fn partial_update_status(
    Extension(services): Extension<Services>,
    Path(workflow_status_id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> AppResult<Json<WorkflowStatus>> {
    let status = services
        .workflow_status
        .partial_update_status(&workflow_status_id, patch)
        .await?;

    Ok(Json(status))
}

/// 删除工作流状态
#[utoipa::path(
    delete,
    path = "/api/v0/workflowStatuses/{workflowStatusId}",
    tag = "workflowStatuses",
    params(
        ("workflowStatusId" = String, Path, description = "工作流状态ID")
    ),
    responses(
        (status = 204, description = "删除成功"),
        (status = 404, description = "状态不存在")
    )
)]
pub async fn delete_status(
    Extension(services): Extension<Services>,
    Path(workflow_status_id): Path<String>,
) -> AppResult<StatusCode> {
    services.workflow_status.delete_status(&workflow_status_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub struct WorkflowStatusController;
impl WorkflowStatusController {
    pub fn app() -> Router {
        Router::new()
            .route("/workflowStatuses", get(get_statuses))
            .route("/workflowStatuses", post(create_status))
            .route("/workflowStatuses/:workflowStatusId", get(get_status))
            .route("/workflowStatuses/:workflowStatusId", put(update_status))
            .route("/workflowStatuses/:workflowStatusId", patch(partial_update_status))
            .route("/workflowStatuses/:workflowStatusId", delete(delete_status))
    }
}
