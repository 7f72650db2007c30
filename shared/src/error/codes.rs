//! Unified error codes for the POS platform
//!
//! This module defines every error code the API can return to clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant and branch errors
//! - 4xxx: Restaurant order errors
//! - 5xxx: Sale and payment errors
//! - 6xxx: Product errors
//! - 7xxx: Table errors
//! - 8xxx: Staff and back-office errors (85xx: hospitality)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Too many requests from this client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Cannot modify an owner account
    CannotModifyOwner = 2004,
    /// Caller is not scoped to the requested branch
    BranchAccessDenied = 2006,

    // ==================== 3xxx: Tenant ====================
    /// Branch not found
    BranchNotFound = 3101,
    /// Branch name already exists
    BranchNameExists = 3102,
    /// Branch still has staff accounts assigned
    BranchHasStaff = 3103,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Order has already been cancelled
    OrderAlreadyCancelled = 4004,
    /// Order item not found
    OrderItemNotFound = 4006,
    /// Order is empty
    OrderEmpty = 4007,
    /// Tab is already closed
    TabAlreadyClosed = 4008,
    /// Status transition not allowed
    InvalidStatusTransition = 4009,
    /// Caller does not own the tab
    NotTabOwner = 4010,

    // ==================== 5xxx: Payment ====================
    /// Sale not found
    SaleNotFound = 5101,
    /// Discount is invalid
    InvalidDiscount = 5102,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product is out of stock
    ProductOutOfStock = 6003,
    /// Product SKU already exists
    ProductSkuExists = 6004,
    /// Product is inactive
    ProductInactive = 6005,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is claimed by another cashier
    TableOccupied = 7002,
    /// Table still has open tabs
    TableHasOpenOrders = 7003,
    /// Table name already exists in the branch
    TableNameExists = 7004,

    // ==================== 8xxx: Staff ====================
    /// Staff member not found
    StaffNotFound = 8001,
    /// Staff email already exists
    StaffEmailExists = 8002,
    /// Customer not found
    CustomerNotFound = 8101,
    /// Expense not found
    ExpenseNotFound = 8201,

    // ==================== 85xx: Hospitality ====================
    /// Room not found
    RoomNotFound = 8501,
    /// Booking not found
    BookingNotFound = 8502,
    /// Booking overlaps an existing booking
    BookingOverlap = 8503,
    /// Booking dates are invalid
    InvalidBookingDates = 8504,
    /// Booking is not in a state that allows this action
    InvalidBookingStatus = 8505,
    /// Room number already exists in the branch
    RoomNumberExists = 8506,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::CannotModifyOwner => "Cannot modify an owner account",
            ErrorCode::BranchAccessDenied => "Access to this branch is denied",

            // Tenant
            ErrorCode::BranchNotFound => "Branch not found",
            ErrorCode::BranchNameExists => "Branch name already exists",
            ErrorCode::BranchHasStaff => "Branch still has staff accounts",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyCompleted => "Order has already been completed",
            ErrorCode::OrderAlreadyCancelled => "Order has already been cancelled",
            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Order has no billable items",
            ErrorCode::TabAlreadyClosed => "Tab is already closed",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",
            ErrorCode::NotTabOwner => "Only the assigned cashier or a manager can modify this tab",

            // Payment
            ErrorCode::SaleNotFound => "Sale not found",
            ErrorCode::InvalidDiscount => "Discount is invalid",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductOutOfStock => "Product is out of stock",
            ErrorCode::ProductSkuExists => "Product SKU already exists",
            ErrorCode::ProductInactive => "Product is inactive",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table is assigned to another cashier",
            ErrorCode::TableHasOpenOrders => "Table has open tabs",
            ErrorCode::TableNameExists => "Table name already exists",

            // Staff
            ErrorCode::StaffNotFound => "Staff member not found",
            ErrorCode::StaffEmailExists => "Email is already registered",
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::ExpenseNotFound => "Expense not found",

            // Hospitality
            ErrorCode::RoomNotFound => "Room not found",
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::BookingOverlap => "Room is already booked for these dates",
            ErrorCode::InvalidBookingDates => "Check-out must be after check-in",
            ErrorCode::InvalidBookingStatus => "Booking status does not allow this action",
            ErrorCode::RoomNumberExists => "Room number already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2004 => Ok(ErrorCode::CannotModifyOwner),
            2006 => Ok(ErrorCode::BranchAccessDenied),

            // Tenant
            3101 => Ok(ErrorCode::BranchNotFound),
            3102 => Ok(ErrorCode::BranchNameExists),
            3103 => Ok(ErrorCode::BranchHasStaff),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4003 => Ok(ErrorCode::OrderAlreadyCompleted),
            4004 => Ok(ErrorCode::OrderAlreadyCancelled),
            4006 => Ok(ErrorCode::OrderItemNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::TabAlreadyClosed),
            4009 => Ok(ErrorCode::InvalidStatusTransition),
            4010 => Ok(ErrorCode::NotTabOwner),

            // Payment
            5101 => Ok(ErrorCode::SaleNotFound),
            5102 => Ok(ErrorCode::InvalidDiscount),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6003 => Ok(ErrorCode::ProductOutOfStock),
            6004 => Ok(ErrorCode::ProductSkuExists),
            6005 => Ok(ErrorCode::ProductInactive),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableOccupied),
            7003 => Ok(ErrorCode::TableHasOpenOrders),
            7004 => Ok(ErrorCode::TableNameExists),

            // Staff
            8001 => Ok(ErrorCode::StaffNotFound),
            8002 => Ok(ErrorCode::StaffEmailExists),
            8101 => Ok(ErrorCode::CustomerNotFound),
            8201 => Ok(ErrorCode::ExpenseNotFound),

            // Hospitality
            8501 => Ok(ErrorCode::RoomNotFound),
            8502 => Ok(ErrorCode::BookingNotFound),
            8503 => Ok(ErrorCode::BookingOverlap),
            8504 => Ok(ErrorCode::InvalidBookingDates),
            8505 => Ok(ErrorCode::InvalidBookingStatus),
            8506 => Ok(ErrorCode::RoomNumberExists),

            // System
            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::TooManyRequests.code(), 9);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::TokenExpired.code(), 1003);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::BranchNotFound.code(), 3101);
        assert_eq!(ErrorCode::TabAlreadyClosed.code(), 4008);
        assert_eq!(ErrorCode::SaleNotFound.code(), 5101);
        assert_eq!(ErrorCode::ProductOutOfStock.code(), 6003);
        assert_eq!(ErrorCode::TableOccupied.code(), 7002);
        assert_eq!(ErrorCode::StaffEmailExists.code(), 8002);
        assert_eq!(ErrorCode::BookingOverlap.code(), 8503);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(2), Ok(ErrorCode::ValidationFailed));
        assert_eq!(ErrorCode::try_from(4008), Ok(ErrorCode::TabAlreadyClosed));
        assert_eq!(ErrorCode::try_from(8506), Ok(ErrorCode::RoomNumberExists));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4005), Err(InvalidErrorCode(4005)));
        assert_eq!(ErrorCode::try_from(9002), Err(InvalidErrorCode(9002)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::TableOccupied).unwrap();
        assert_eq!(json, "7002");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("4010").unwrap();
        assert_eq!(code, ErrorCode::NotTabOwner);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("4242");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::ValidationFailed.to_string(), "E0002");
        assert_eq!(ErrorCode::TabAlreadyClosed.to_string(), "E4008");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::OrderEmpty.message(), "Order has no billable items");
        assert_eq!(ErrorCode::TabAlreadyClosed.message(), "Tab is already closed");
    }

    #[test]
    fn test_roundtrip() {
        let codes = [
            ErrorCode::InvalidFormat,
            ErrorCode::TokenInvalid,
            ErrorCode::BranchAccessDenied,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::InvalidDiscount,
            ErrorCode::ProductInactive,
            ErrorCode::TableHasOpenOrders,
            ErrorCode::ExpenseNotFound,
            ErrorCode::InvalidBookingStatus,
            ErrorCode::InternalError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }
}
