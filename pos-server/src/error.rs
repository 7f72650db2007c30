//! Unified service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`) so services can use `?` on both.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::BoxError;

/// When set, 500 responses carry the underlying error text in `details.error`.
static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Enable error detail exposure (called once at startup outside production)
pub fn set_expose_details(expose: bool) {
    EXPOSE_DETAILS.store(expose, Ordering::Relaxed);
}

fn expose_details() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

/// Log an infrastructure error and turn it into a 500 `AppError`
pub fn internal(e: impl std::fmt::Display) -> AppError {
    tracing::error!(error = %e, "Service database error");
    let err = AppError::new(ErrorCode::InternalError);
    if expose_details() {
        err.with_detail("error", e.to_string())
    } else {
        err
    }
}

/// Whether a DB error is a unique constraint violation (SQLSTATE 23505)
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

/// Map a write error: unique violations become `code` (409), anything else a 500
pub fn conflict_or_internal(code: ErrorCode) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        if is_unique_violation(&e) {
            AppError::new(code)
        } else {
            internal(e)
        }
    }
}

/// Service-layer error
///
/// - `Db`: Database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: Business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => internal(db_err),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_passes_through() {
        let err: AppError = ServiceError::App(AppError::new(ErrorCode::TabAlreadyClosed)).into();
        assert_eq!(err.code, ErrorCode::TabAlreadyClosed);
    }

    #[test]
    fn test_db_error_maps_to_internal() {
        let boxed: BoxError = "connection reset".into();
        let err: AppError = ServiceError::Db(boxed).into();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_plain_error_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        let err = conflict_or_internal(ErrorCode::TableNameExists)(sqlx::Error::RowNotFound);
        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
