//! Unified error system for the POS platform
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ErrorBody`]: JSON body of every failed request
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::for_product(ErrorCode::ProductOutOfStock, 17);
//! assert_eq!(err.http_status(), http::StatusCode::CONFLICT);
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, ErrorCode::ProductOutOfStock);
//! assert_eq!(body.details.unwrap()["product_id"], 17);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorBody, ErrorDetails};
