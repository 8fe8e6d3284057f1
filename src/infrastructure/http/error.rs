//! HTTP Error Handling
//!
//! 统一错误响应格式。错误以真实的 HTTP 状态码返回，
//! 416 与 404 区分开，供回放端正确处理 Range 失败。

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const RANGE_NOT_SATISFIABLE: i32 = 416;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// Range 头起点超出资源长度；携带资源总长用于 Content-Range 响应头
    RangeNotSatisfiable {
        total_len: u64,
    },
    Internal(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => {
                tracing::warn!(errno = errno::NOT_FOUND, error = %msg, "Resource not found");
                (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new(errno::NOT_FOUND, msg)),
                )
                    .into_response()
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = errno::BAD_REQUEST, error = %msg, "Bad request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new(errno::BAD_REQUEST, msg)),
                )
                    .into_response()
            }
            ApiError::RangeNotSatisfiable { total_len } => {
                tracing::warn!(errno = errno::RANGE_NOT_SATISFIABLE, total_len, "Range not satisfiable");
                (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(header::CONTENT_RANGE, format!("bytes */{}", total_len))],
                    Json(ErrorResponse::new(
                        errno::RANGE_NOT_SATISFIABLE,
                        "Requested range not satisfiable",
                    )),
                )
                    .into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = errno::INTERNAL_ERROR, error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(errno::INTERNAL_ERROR, msg)),
                )
                    .into_response()
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = errno::SERVICE_UNAVAILABLE, error = %msg, "Service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ErrorResponse::new(errno::SERVICE_UNAVAILABLE, msg)),
                )
                    .into_response()
            }
        }
    }
}

impl From<crate::application::ApplicationError> for ApiError {
    fn from(e: crate::application::ApplicationError) -> Self {
        use crate::application::ApplicationError;

        match e {
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            // 管线错误已含阶段标签，消息原样透出便于运维定位
            ApplicationError::Pipeline { .. } => ApiError::Internal(e.to_string()),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::StorageError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<crate::application::RepositoryError> for ApiError {
    fn from(e: crate::application::RepositoryError) -> Self {
        use crate::application::RepositoryError;

        match e {
            RepositoryError::NotFound(msg) => ApiError::NotFound(msg),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}
