//! Unified response envelope and error codes
//!
//! Every HTTP response from the backend is wrapped in [`ApiResponse`]:
//!
//! ```json
//! {
//!   "code": "E0000",
//!   "message": "Success",
//!   "data": { ... }
//! }
//! ```
//!
//! # Error code table
//!
//! | Code  | Category |
//! |-------|----------|
//! | E0000 | Success |
//! | E0002 | Validation failed |
//! | E0003 | Resource not found |
//! | E0004 | Resource conflict |
//! | E0005 | Business rule violation |
//! | E2001 | Permission denied |
//! | E9001 | Internal error |
//! | E9002 | Storage error |

use serde::Serialize;

pub const CODE_SUCCESS: &str = "E0000";
pub const CODE_VALIDATION: &str = "E0002";
pub const CODE_NOT_FOUND: &str = "E0003";
pub const CODE_CONFLICT: &str = "E0004";
pub const CODE_BUSINESS_RULE: &str = "E0005";
pub const CODE_FORBIDDEN: &str = "E2001";
pub const CODE_INTERNAL: &str = "E9001";
pub const CODE_STORAGE: &str = "E9002";

/// Unified API response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Error code (E0000 means success)
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: CODE_SUCCESS.to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: CODE_SUCCESS.to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            data: None,
        }
    }
}
