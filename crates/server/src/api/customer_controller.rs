use crate::{
    dtos::customer_dto::{CreateCustomerDto, UpdateCustomerDto},
    extractors::validation_extractor::ValidationExtractor,
    services::Services,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use database::Customer;
use utils::AppResult;

/// 获取所有客户
#[utoipa::path(
    get,
    path = "/api/v0/customers",
    tag = "customers",
    responses(
        (status = 200, description = "成功返回客户列表", body = Vec<Customer>)
    )
)]
pub async fn get_customers(Extension(services): Extension<Services>) -> AppResult<Json<Vec<Customer>>> {
    let customers = services.customer.get_customers().await?;

    Ok(Json(customers))
}

/// 创建客户
///
/// list_pos 和 workflow_pos 两个作用域独立分配
#[utoipa::path(
    post,
    path = "/api/v0/customers",
    tag = "customers",
    request_body = CreateCustomerDto,
    responses(
        (status = 201, description = "创建成功", body = Customer),
        (status = 400, description = "工作流状态不存在"),
        (status = 409, description = "pos已被占用")
    )
)]
pub async fn create_customer(
    Extension(services): Extension<Services>,
    ValidationExtractor(req): ValidationExtractor<CreateCustomerDto>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let customer = services.customer.create_customer(req).await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// 获取单个客户
#[utoipa::path(
    get,
    path = "/api/v0/customers/{customerId}",
    tag = "customers",
    params(
        ("customerId" = String, Path, description = "客户ID")
    ),
    responses(
        (status = 200, description = "成功返回客户", body = Customer),
        (status = 404, description = "客户不存在")
    )
)]
pub async fn get_customer(
    Extension(services): Extension<Services>,
    Path(customer_id): Path<String>,
) -> AppResult<Json<Customer>> {
    let customer = services.customer.get_customer(&customer_id).await?;

    Ok(Json(customer))
}

/// 全量更新客户
#[utoipa::path(
    put,
    path = "/api/v0/customers/{customerId}",
    tag = "customers",
    params(
        ("customerId" = String, Path, description = "客户ID")
    ),
    request_body = UpdateCustomerDto,
    responses(
        (status = 200, description = "更新成功", body = Customer),
        (status = 400, description = "body的_id与路径不一致"),
        (status = 404, description = "客户不存在"),
        (status = 409, description = "pos已被其他客户占用")
    )
)]
pub async fn update_customer(
    Extension(services): Extension<Services>,
    Path(customer_id): Path<String>,
    ValidationExtractor(req): ValidationExtractor<UpdateCustomerDto>,
) -> AppResult<Json<Customer>> {
    let customer = services.customer.update_customer(&customer_id, req).await?;

    Ok(Json(customer))
}

/// 部分更新客户(RFC 7386 merge-patch)
#[utoipa::path(
    patch,
    path = "/api/v0/customers/{customerId}",
    tag = "customers",
    params(
        ("customerId" = String, Path, description = "客户ID")
    ),
    responses(
        (status = 200, description = "更新成功", body = Customer),
        (status = 404, description = "客户不存在"),
        (status = 409, description = "pos已被其他客户占用")
    )
)]
pub async fn partial_update_customer(
    Extension(services): Extension<Services>,
    Path(customer_id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> AppResult<Json<Customer>> {
    let customer = services.customer.partial_update_customer(&customer_id, patch).await?;

    Ok(Json(customer))
}

/// 删除客户(内嵌的清单和便签一并删除)
#[utoipa::path(
    delete,
    path = "/api/v0/customers/{customerId}",
    tag = "customers",
    params(
        ("customerId" = String, Path, description = "客户ID")
    ),
    responses(
        (status = 204, description = "删除成功"),
        (status = 404, description = "客户不存在")
    )
)]
pub async fn delete_customer(
    Extension(services): Extension<Services>,
    Path(customer_id): Path<String>,
) -> AppResult<StatusCode> {
    services.customer.delete_customer(&customer_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub struct CustomerController;
impl CustomerController {
    pub fn app() -> Router {
        Router::new()
            .route("/customers", get(get_customers))
            .route("/customers", post(create_customer))
            .route("/customers/:customerId", get(get_customer))
            .route("/customers/:customerId", put(update_customer))
            .route("/customers/:customerId", patch(partial_update_customer))
            .route("/customers/:customerId", delete(delete_customer))
    }
}
