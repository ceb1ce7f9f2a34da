//! 统一错误处理
//!
//! 提供应用级错误类型和响应辅助：
//! - [`AppError`] - 应用错误枚举，实现 `IntoResponse`
//! - [`ok`] - 成功响应辅助函数
//!
//! 错误码表见 `shared::error`。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::error::{self, ApiResponse};
use tracing::error;

use crate::orders::TransitionError;
use crate::store::StoreError;

/// 应用错误枚举
///
/// # 错误分类
///
/// | 分类 | 说明 |
/// |------|------|
/// | 业务逻辑错误 | 资源不存在、验证失败、非法状态转换 |
/// | 系统错误 | 存储错误、内部错误 |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Permission denied: {0}")]
    /// 无权限 (403)
    Forbidden(String),

    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Resource conflict: {0}")]
    /// 资源冲突 (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("Business rule violation: {0}")]
    /// 业务规则违反 (422)
    BusinessRule(String),

    #[error("Storage error: {0}")]
    /// 存储错误 (500)
    Storage(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, error::CODE_FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, error::CODE_NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, error::CODE_CONFLICT, msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, error::CODE_VALIDATION, msg.clone())
            }
            AppError::BusinessRule(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                error::CODE_BUSINESS_RULE,
                msg.clone(),
            ),
            AppError::Storage(msg) => {
                error!(target: "storage", error = %msg, "Storage error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error::CODE_STORAGE,
                    "Storage error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error::CODE_INTERNAL,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ApiResponse::failure(code, message));
        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Backend(msg) => AppError::Storage(msg),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::InvalidStatus(s) => {
                AppError::Validation(format!("unknown status: {}", s))
            }
            TransitionError::NotFound(id) => AppError::NotFound(format!("Order {} not found", id)),
            TransitionError::IllegalTransition { .. }
            | TransitionError::IllegalPaymentTransition { .. }
            | TransitionError::IllegalState(_) => AppError::BusinessRule(e.to_string()),
            TransitionError::Validation(msg) => AppError::Validation(msg),
            TransitionError::Conflict(msg) => AppError::Conflict(msg),
            TransitionError::Storage(store) => store.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
