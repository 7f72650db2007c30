//! Data models
//!
//! Row types and request payloads shared between the server and the frontend.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGSERIAL), timestamps are Unix millis.

pub mod audit;
pub mod booking;
pub mod branch;
pub mod customer;
pub mod expense;
pub mod order;
pub mod product;
pub mod role;
pub mod room;
pub mod sale;
pub mod staff;
pub mod table;
pub mod validate;

// Re-exports
pub use audit::*;
pub use booking::*;
pub use branch::*;
pub use customer::*;
pub use expense::*;
pub use order::*;
pub use product::*;
pub use role::*;
pub use room::*;
pub use sale::*;
pub use staff::*;
pub use table::*;
