//! `AppError` and the body every failed request returns

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Structured details attached to an error, keyed by field or id name
pub type ErrorDetails = BTreeMap<String, Value>;

/// Application error with structured error code and details
///
/// Handlers and services return this directly; the code picks the HTTP
/// status and `details` carries offending ids or field errors.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<ErrorDetails>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Payload rejected by a rule the `validator` derive cannot express
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// A product rule failed; the client gets the `product_id` to highlight the line
    pub fn for_product(code: ErrorCode, product_id: i64) -> Self {
        Self::new(code).with_detail("product_id", product_id)
    }

    /// Delete refused while `count` dependent rows still point at the target;
    /// `dependents` is the detail key holding the count
    pub fn still_referenced(code: ErrorCode, dependents: &str, count: i64) -> Self {
        Self::with_message(code, format!("{}: {count}", code.message()))
            .with_detail(dependents, count)
    }

    /// Rate limit window exhausted; `retry_after` is in seconds
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::new(ErrorCode::TooManyRequests).with_detail("retry_after", retry_after_secs)
    }
}

/// JSON body of a failed request: `{ "code", "message", "details"? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
        }
        (self.http_status(), axum::Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::TabAlreadyClosed);
        assert_eq!(err.code, ErrorCode::TabAlreadyClosed);
        assert_eq!(err.message, "Tab is already closed");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("branch_id is required")
            .with_detail("field", "branch_id")
            .with_detail("role", "cashier");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details["field"], "branch_id");
        assert_eq!(details["role"], "cashier");
    }

    #[test]
    fn test_for_product_carries_id() {
        let err = AppError::for_product(ErrorCode::ProductInactive, 42);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Product is inactive");
        assert_eq!(err.details.unwrap()["product_id"], 42);
    }

    #[test]
    fn test_still_referenced_counts_dependents() {
        let err = AppError::still_referenced(ErrorCode::BranchHasStaff, "staff", 3);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert_eq!(err.message, "Branch still has staff accounts: 3");
        assert_eq!(err.details.unwrap()["staff"], 3);
    }

    #[test]
    fn test_rate_limited() {
        let err = AppError::rate_limited(60);
        assert_eq!(err.http_status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.details.unwrap()["retry_after"], 60);
    }

    #[test]
    fn test_error_body_serialize() {
        let err = AppError::new(ErrorCode::TableOccupied).with_detail("table_id", 7);
        let json = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": 7002,
                "message": "Table is assigned to another cashier",
                "details": { "table_id": 7 }
            })
        );

        let bare = serde_json::to_string(&ErrorBody::from(&AppError::new(ErrorCode::OrderEmpty))).unwrap();
        assert!(!bare.contains("details"));
    }

    #[test]
    fn test_into_response_status() {
        use axum::response::IntoResponse;

        let response = AppError::new(ErrorCode::TabAlreadyClosed).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = AppError::new(ErrorCode::InternalError).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
