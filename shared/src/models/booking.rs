//! Hospitality booking and folio model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Booking lifecycle: `reserved → checked_in → checked_out`, or `cancelled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "booking_status", rename_all = "snake_case")
)]
pub enum BookingStatus {
    Reserved,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    /// Folio charges are accepted until the guest leaves
    pub const fn accepts_charges(&self) -> bool {
        matches!(self, BookingStatus::Reserved | BookingStatus::CheckedIn)
    }
}

/// Room booking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Booking {
    pub id: i64,
    pub tenant_id: i64,
    pub branch_id: i64,
    pub room_id: i64,
    pub customer_id: Option<i64>,
    pub guest_name: String,
    /// Arrival (Unix millis)
    pub check_in: i64,
    /// Departure (Unix millis)
    pub check_out: i64,
    pub status: BookingStatus,
    /// Rate captured from the room at booking time
    pub nightly_rate: Decimal,
    pub notes: Option<String>,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Extra charge posted to a booking (minibar, room service)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct FolioCharge {
    pub id: i64,
    pub booking_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub created_by: i64,
    pub created_at: i64,
}

/// Booking with folio and running total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub charges: Vec<FolioCharge>,
    pub nights: i64,
    pub room_total: Decimal,
    pub charges_total: Decimal,
    pub folio_total: Decimal,
}

/// Create booking payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookingCreate {
    pub room_id: i64,
    pub customer_id: Option<i64>,
    #[validate(length(min = 1, max = 150), custom(function = "super::validate::not_blank"))]
    pub guest_name: String,
    /// Epoch ms, 2000-01-01 through 2100-01-01
    #[validate(range(min = 946_684_800_000i64, max = 4_102_444_800_000i64))]
    pub check_in: i64,
    #[validate(range(min = 946_684_800_000i64, max = 4_102_444_800_000i64))]
    pub check_out: i64,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Post a folio charge
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FolioChargeCreate {
    #[validate(length(min = 1, max = 255), custom(function = "super::validate::not_blank"))]
    pub description: String,
    #[validate(custom(function = "super::validate::positive_money"))]
    pub amount: Decimal,
}

/// Booking list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub room_id: Option<i64>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub branch_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validate::{MAX_BOOKING_MS, MIN_BOOKING_MS};

    fn payload(check_in: i64, check_out: i64) -> BookingCreate {
        BookingCreate {
            room_id: 1,
            customer_id: None,
            guest_name: "Ada".into(),
            check_in,
            check_out,
            notes: None,
        }
    }

    #[test]
    fn test_dates_inside_window_pass() {
        assert!(payload(MIN_BOOKING_MS, MAX_BOOKING_MS).validate().is_ok());
        assert!(payload(1_767_225_600_000, 1_767_398_400_000).validate().is_ok());
    }

    #[test]
    fn test_extreme_timestamps_rejected() {
        let errors = payload(0, i64::MAX).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("check_in"));
        assert!(fields.contains_key("check_out"));

        assert!(payload(i64::MIN, 1_767_225_600_000).validate().is_err());
        assert!(payload(1_767_225_600_000, MAX_BOOKING_MS + 1).validate().is_err());
    }
}
