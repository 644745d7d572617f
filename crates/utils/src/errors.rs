use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    ValidationError(#[from] ValidationErrors),
    #[error(transparent)]
    AxumJsonRejection(#[from] JsonRejection),
    #[error(transparent)]
    MongoError(#[from] mongodb::error::Error),
    #[error(transparent)]
    BsonSerError(#[from] mongodb::bson::ser::Error),
    #[error(transparent)]
    BsonDeError(#[from] mongodb::bson::de::Error),
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
    #[error("{0}")]
    InternalServerErrorWithContext(String),
    #[error("unexpected internal server error")]
    InternalServerError,
}

/// MongoDB duplicate key 错误（错误码 11000），唯一索引兜底拒绝
pub fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        ErrorKind::BulkWrite(bulk_error) => bulk_error
            .write_errors
            .as_ref()
            .map(|errors| errors.iter().any(|e| e.code == 11000))
            .unwrap_or(false),
        _ => false,
    }
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                format!("Validation failed: {}", errors).replace('\n', ", "),
            ),
            AppError::AxumJsonRejection(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::MongoError(err) => {
                if is_duplicate_key_error(&err) {
                    (StatusCode::CONFLICT, "Found duplicate".to_string())
                } else {
                    error!("🔴 database error: {:?}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "unexpected database error".to_string(),
                    )
                }
            }
            AppError::BsonSerError(err) => {
                error!("🔴 bson serialize error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "unexpected database error".to_string())
            }
            AppError::BsonDeError(err) => {
                error!("🔴 bson deserialize error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "unexpected database error".to_string())
            }
            AppError::AnyhowError(err) => {
                error!("🔴 internal error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AppError::InternalServerErrorWithContext(context) => (StatusCode::INTERNAL_SERVER_ERROR, context),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "unexpected internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(json!({
            "errors": {
                "message": [message],
            }
        }));

        (status, body).into_response()
    }
}
