pub mod checklist_controller;
pub mod checklist_item_controller;
pub mod customer_controller;
pub mod sticky_note_controller;
pub mod workflow_status_controller;

use axum::routing::{get, Router};

/// 系统健康检查
///
/// 返回服务器运行状态
#[utoipa::path(
    get,
    path = "/api/v0/",
    responses(
        (status = 200, description = "服务器运行正常", body = String)
    ),
    tag = "系统状态"
)]
pub async fn health() -> &'static str {
    "Server is running! 🚀"
}

/// 控制器自带完整路径，用merge避免nest造成的路径前缀叠加
pub fn app() -> Router {
    Router::new()
        .route("/", get(health))
        .merge(customer_controller::CustomerController::app())
        .merge(workflow_status_controller::WorkflowStatusController::app())
        .merge(checklist_controller::ChecklistController::app())
        .merge(checklist_item_controller::ChecklistItemController::app())
        .merge(sticky_note_controller::StickyNoteController::app())
}
