//! Shared types for the POS platform
//!
//! Common types used by the server and mirrored by the frontend: error
//! codes and the error body, domain models and request payloads,
//! pagination, and kitchen realtime events.

pub mod error;
pub mod kitchen;
pub mod models;
pub mod pagination;
pub mod util;

// Re-exports
pub use error::{AppError, ErrorBody, ErrorCode};
pub use pagination::{PageQuery, PaginatedResponse};
pub use serde::{Deserialize, Serialize};
