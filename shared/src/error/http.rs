//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::BranchNotFound
            | Self::OrderNotFound
            | Self::OrderItemNotFound
            | Self::SaleNotFound
            | Self::ProductNotFound
            | Self::TableNotFound
            | Self::StaffNotFound
            | Self::CustomerNotFound
            | Self::ExpenseNotFound
            | Self::RoomNotFound
            | Self::BookingNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::BranchNameExists
            | Self::BranchHasStaff
            | Self::OrderAlreadyCompleted
            | Self::OrderAlreadyCancelled
            | Self::TabAlreadyClosed
            | Self::InvalidStatusTransition
            | Self::ProductSkuExists
            | Self::ProductOutOfStock
            | Self::TableOccupied
            | Self::TableHasOpenOrders
            | Self::TableNameExists
            | Self::StaffEmailExists
            | Self::BookingOverlap
            | Self::InvalidBookingStatus
            | Self::RoomNumberExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::CannotModifyOwner
            | Self::BranchAccessDenied
            | Self::NotTabOwner => StatusCode::FORBIDDEN,

            // 429 Too Many Requests
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InvalidDiscount.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::InvalidBookingDates.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::RoomNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::OrderNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::BookingNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            ErrorCode::TabAlreadyClosed.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::TableOccupied.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::BranchHasStaff.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::ProductOutOfStock.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_auth_status() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::TokenExpired.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::NotTabOwner.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::BranchAccessDenied.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_system_status() {
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::TooManyRequests.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
