use crate::{api, docs::ApiDoc, services::Services};
use axum::{
    error_handling::HandleErrorLayer,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::get,
    BoxError, Extension, Json, Router,
};
use lazy_static::lazy_static;
use serde_json::json;
use std::time::Duration;
use tower::{buffer::BufferLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

lazy_static! {
    static ref HTTP_TIMEOUT: u64 = 30;
}

pub struct AppRouter;

impl AppRouter {
    pub fn new(services: Services) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::DELETE,
                Method::PUT,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT]);

        Router::new()
            .nest("/api/v0", api::app())
            // nest只把内层"/"登记为"/api/v0"，带尾斜杠的文档路径需单独登记
            .route("/api/v0/", get(api::health))
            .layer(cors)
            .layer(
                ServiceBuilder::new()
                    .layer(Extension(services))
                    .layer(TraceLayer::new_for_http())
                    .layer(HandleErrorLayer::new(Self::handle_timeout_error))
                    .timeout(Duration::from_secs(*HTTP_TIMEOUT))
                    .layer(BufferLayer::new(1024)),
            )
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .fallback(Self::handle_404)
    }

    async fn handle_404() -> impl IntoResponse {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "errors": {
                    "message": vec!(String::from("The requested resource does not exist on this server!")),
                }
            })),
        )
    }

    async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
        if err.is::<tower::timeout::error::Elapsed>() {
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(json!({
                    "error": {
                        "code": "TIMEOUT",
                        "message": format!(
                            "Request took longer than the configured {} second timeout",
                            *HTTP_TIMEOUT
                        ),
                    }
                })),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": {
                        "code": "INTERNAL_ERROR",
                        "message": format!("Unhandled internal error: {}", err),
                    }
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{InMemoryCustomerRepository, InMemoryWorkflowStatusRepository};
    use axum_test::TestServer;
    use database::ordering::PosConfig;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn test_server() -> TestServer {
        let services = Services::with_repositories(
            Arc::new(InMemoryCustomerRepository::default()),
            Arc::new(InMemoryWorkflowStatusRepository::default()),
            PosConfig::default(),
        );
        TestServer::new(AppRouter::new(services)).unwrap()
    }

    async fn create_status(server: &TestServer, name: &str) -> Value {
        let response = server
            .post("/api/v0/workflowStatuses")
            .json(&json!({ "name": name }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    #[tokio::test]
    async fn health_check_works() {
        let server = test_server();

        let response = server.get("/api/v0/").await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn unknown_route_returns_404_with_error_body() {
        let server = test_server();

        let response = server.get("/api/v0/nope").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body = response.json::<Value>();
        assert!(body["errors"]["message"].is_array());
    }

    #[tokio::test]
    async fn first_status_gets_pos_zero_and_the_next_increments() {
        let server = test_server();

        let first = create_status(&server, "Open").await;
        let second = create_status(&server, "Closed").await;

        assert_eq!(first["pos"], json!(0));
        assert_eq!(second["pos"], json!(10));
    }

    #[tokio::test]
    async fn duplicate_pos_maps_to_409_found_duplicate() {
        let server = test_server();
        create_status(&server, "Open").await;

        let response = server
            .post("/api/v0/workflowStatuses")
            .json(&json!({ "name": "Also at zero", "pos": 0 }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body = response.json::<Value>();
        assert_eq!(body["errors"]["message"], json!(["Found duplicate"]));
    }

    #[tokio::test]
    async fn malformed_path_id_maps_to_404() {
        let server = test_server();

        let response = server.get("/api/v0/customers/not-an-object-id").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn full_customer_checklist_flow() {
        let server = test_server();
        let status = create_status(&server, "Open").await;
        let status_id = status["_id"]["$oid"].as_str().unwrap();

        // 创建客户
        let response = server
            .post("/api/v0/customers")
            .json(&json!({ "surname": "Smith", "given_name": "John", "status": status_id }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let customer = response.json::<Value>();
        let customer_id = customer["_id"]["$oid"].as_str().unwrap();
        assert_eq!(customer["list_pos"], json!(0));
        assert_eq!(customer["workflow_pos"], json!(0));

        // 客户下建清单
        let response = server
            .post(&format!("/api/v0/customers/{}/checklists", customer_id))
            .json(&json!({ "name": "Visa" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let checklist = response.json::<Value>();
        let checklist_id = checklist["_id"]["$oid"].as_str().unwrap();

        // 清单下建条目
        let response = server
            .post(&format!("/api/v0/checklists/{}/items", checklist_id))
            .json(&json!({ "text": "Passport copy" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let item = response.json::<Value>();
        let item_id = item["_id"]["$oid"].as_str().unwrap();
        assert_eq!(item["checked"], json!(false));

        // merge-patch勾选条目
        let response = server
            .patch(&format!("/api/v0/checklistItems/{}", item_id))
            .json(&json!({ "checked": true }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["checked"], json!(true));

        // 删除清单，204且条目一并消失
        let response = server.delete(&format!("/api/v0/checklists/{}", checklist_id)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = server.get(&format!("/api/v0/checklistItems/{}", item_id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sticky_note_pos_conflict_within_one_customer() {
        let server = test_server();
        let status = create_status(&server, "Open").await;
        let status_id = status["_id"]["$oid"].as_str().unwrap();

        let customer = server
            .post("/api/v0/customers")
            .json(&json!({ "status": status_id }))
            .await
            .json::<Value>();
        let customer_id = customer["_id"]["$oid"].as_str().unwrap();

        let response = server
            .post(&format!("/api/v0/customers/{}/stickyNotes", customer_id))
            .json(&json!({ "text": "First", "pos": 5 }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .post(&format!("/api/v0/customers/{}/stickyNotes", customer_id))
            .json(&json!({ "text": "Second", "pos": 5 }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn put_with_mismatched_body_id_returns_400() {
        let server = test_server();
        let status = create_status(&server, "Open").await;
        let status_id = status["_id"]["$oid"].as_str().unwrap();

        let response = server
            .put(&format!("/api/v0/workflowStatuses/{}", status_id))
            .json(&json!({
                "_id": "64b000000000000000000000",
                "name": "Renamed",
                "pos": 0
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
