use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::media::MediaError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error("unexpected: {0}")]
    Unexpected(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// 错误响应体，`errors` 为单条信息或信息列表
#[derive(Serialize)]
#[serde(untagged)]
enum Errors {
    One(String),
    Many(Vec<String>),
}

#[derive(Serialize)]
struct ErrorResponse {
    errors: Errors,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) | AppError::Upstream(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let errors = match self {
            AppError::Validation(messages) => Errors::Many(messages),
            AppError::Unauthenticated(message)
            | AppError::Conflict(message)
            | AppError::NotFound(message) => Errors::One(message),
            AppError::InvalidCredentials => Errors::One("Invalid credentials".into()),
            AppError::Upstream(detail) => {
                tracing::error!("media host rejected request: {}", detail);
                Errors::One("Error uploading file to media host".into())
            }
            AppError::Unexpected(detail) => {
                // 内部细节只写日志，不返回给客户端
                tracing::error!("unexpected error: {}", detail);
                Errors::One("Internal server error".into())
            }
        };

        (status, Json(ErrorResponse { errors })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Unexpected(e.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::Rejected(message) => AppError::Upstream(message),
            other => AppError::Unexpected(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::validation(e.body_text())
    }
}
