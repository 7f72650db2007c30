//! Room bookings and guest folios

use rust_decimal::Decimal;
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{Booking, BookingCreate, BookingDetail, BookingStatus, FolioCharge, FolioChargeCreate};
use shared::util::{now_millis, sanitize_inline_text, sanitize_multiline_text};

use super::Actor;
use super::billing::round_money;
use crate::db;
use crate::db::bookings::NewBooking;
use crate::error::ServiceResult;
use crate::state::AppState;

const DAY_MS: i64 = 86_400_000;

/// Longest stay a single booking may cover
pub const MAX_STAY_NIGHTS: i64 = 365;

/// Billed nights: started days count in full, at least one
pub fn nights(check_in: i64, check_out: i64) -> i64 {
    let span = check_out.saturating_sub(check_in).max(0);
    (span / DAY_MS + i64::from(span % DAY_MS != 0)).max(1)
}

/// Check-out must follow check-in, and the stay must fit [`MAX_STAY_NIGHTS`]
pub fn check_stay(check_in: i64, check_out: i64) -> Result<(), AppError> {
    if check_out <= check_in {
        return Err(AppError::with_message(
            ErrorCode::InvalidBookingDates,
            "Check-out must be after check-in",
        ));
    }
    if nights(check_in, check_out) > MAX_STAY_NIGHTS {
        return Err(AppError::with_message(
            ErrorCode::InvalidBookingDates,
            format!("A booking may cover at most {MAX_STAY_NIGHTS} nights"),
        )
        .with_detail("nights", nights(check_in, check_out)));
    }
    Ok(())
}

pub fn folio(booking: Booking, charges: Vec<FolioCharge>) -> BookingDetail {
    let nights = nights(booking.check_in, booking.check_out);
    let room_total = round_money(booking.nightly_rate * Decimal::from(nights));
    let charges_total = round_money(charges.iter().map(|c| c.amount).sum());
    BookingDetail {
        booking,
        charges,
        nights,
        room_total,
        charges_total,
        folio_total: room_total + charges_total,
    }
}

/// Booking state changes driven by the front desk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    CheckIn,
    CheckOut,
    Cancel,
}

impl BookingAction {
    fn name(self) -> &'static str {
        match self {
            BookingAction::CheckIn => "check_in",
            BookingAction::CheckOut => "check_out",
            BookingAction::Cancel => "cancel",
        }
    }

    /// Target status, if the action is allowed from `from`
    pub fn apply(self, from: BookingStatus) -> Option<BookingStatus> {
        match (self, from) {
            (BookingAction::CheckIn, BookingStatus::Reserved) => Some(BookingStatus::CheckedIn),
            (BookingAction::CheckOut, BookingStatus::CheckedIn) => Some(BookingStatus::CheckedOut),
            (BookingAction::Cancel, BookingStatus::Reserved) => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

fn invalid_status(status: BookingStatus, action: &str) -> AppError {
    AppError::with_message(
        ErrorCode::InvalidBookingStatus,
        format!("Cannot {} a booking that is {:?}", action.replace('_', " "), status).to_lowercase(),
    )
}

/// Booking with folio, scoped to the caller
pub async fn get(state: &AppState, actor: &Actor, booking_id: i64) -> ServiceResult<BookingDetail> {
    let user = &actor.user;
    let booking = db::bookings::find(&state.pool, user.tenant_id, booking_id)
        .await?
        .filter(|b| user.can_access_branch(b.branch_id))
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    let charges = db::bookings::charges(&state.pool, booking.id).await?;
    Ok(folio(booking, charges))
}

/// Reserve a room. The room row is locked so concurrent overlap checks serialize.
pub async fn create(state: &AppState, actor: &Actor, req: &BookingCreate) -> ServiceResult<BookingDetail> {
    let user = &actor.user;
    check_stay(req.check_in, req.check_out)?;

    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let room = db::rooms::find_for_update(&mut tx, user.tenant_id, req.room_id)
        .await?
        .filter(|r| r.is_active && user.can_access_branch(r.branch_id))
        .ok_or_else(|| AppError::new(ErrorCode::RoomNotFound))?;

    if let Some(customer_id) = req.customer_id
        && !db::customers::exists(&mut *tx, user.tenant_id, customer_id).await?
    {
        return Err(AppError::new(ErrorCode::CustomerNotFound).into());
    }

    if db::bookings::has_overlap(&mut tx, room.id, req.check_in, req.check_out).await? {
        return Err(AppError::with_message(
            ErrorCode::BookingOverlap,
            format!("Room {} is already booked for these dates", room.room_number),
        )
        .into());
    }

    let guest_name = sanitize_inline_text(&req.guest_name);
    let notes = req.notes.as_deref().map(sanitize_multiline_text);
    let booking = db::bookings::insert(
        &mut tx,
        &NewBooking {
            tenant_id: user.tenant_id,
            branch_id: room.branch_id,
            room_id: room.id,
            customer_id: req.customer_id,
            guest_name: &guest_name,
            check_in: req.check_in,
            check_out: req.check_out,
            nightly_rate: room.nightly_rate,
            notes: notes.as_deref().filter(|n| !n.is_empty()),
            created_by: user.id,
        },
        now,
    )
    .await?;

    actor
        .audit(
            &mut *tx,
            "booking.create",
            "booking",
            Some(booking.id),
            json!({ "room_id": room.id, "check_in": booking.check_in, "check_out": booking.check_out }),
            now,
        )
        .await?;
    tx.commit().await?;

    tracing::info!(booking_id = booking.id, room_id = room.id, "Booking created");
    Ok(folio(booking, Vec::new()))
}

/// Check in, check out or cancel
pub async fn transition(
    state: &AppState,
    actor: &Actor,
    booking_id: i64,
    action: BookingAction,
) -> ServiceResult<BookingDetail> {
    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut tx, user.tenant_id, booking_id)
        .await?
        .filter(|b| user.can_access_branch(b.branch_id))
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    let next = action
        .apply(booking.status)
        .ok_or_else(|| invalid_status(booking.status, action.name()))?;
    let booking = db::bookings::set_status(&mut tx, booking.id, next, now).await?;
    let charges = db::bookings::charges(&mut *tx, booking.id).await?;
    let detail = folio(booking, charges);

    actor
        .audit(
            &mut *tx,
            &format!("booking.{}", action.name()),
            "booking",
            Some(detail.booking.id),
            json!({ "status": next, "folio_total": detail.folio_total }),
            now,
        )
        .await?;
    tx.commit().await?;

    tracing::info!(booking_id = detail.booking.id, status = ?next, "Booking status changed");
    Ok(detail)
}

/// Post a charge to the guest folio
pub async fn add_charge(
    state: &AppState,
    actor: &Actor,
    booking_id: i64,
    req: &FolioChargeCreate,
) -> ServiceResult<BookingDetail> {
    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_for_update(&mut tx, user.tenant_id, booking_id)
        .await?
        .filter(|b| user.can_access_branch(b.branch_id))
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    if !booking.status.accepts_charges() {
        return Err(invalid_status(booking.status, "charge").into());
    }

    let description = sanitize_inline_text(&req.description);
    let charge = db::bookings::add_charge(
        &mut tx,
        booking.id,
        &description,
        round_money(req.amount),
        user.id,
        now,
    )
    .await?;

    actor
        .audit(
            &mut *tx,
            "booking.charge",
            "booking",
            Some(booking.id),
            json!({ "charge_id": charge.id, "amount": charge.amount }),
            now,
        )
        .await?;
    let charges = db::bookings::charges(&mut *tx, booking.id).await?;
    tx.commit().await?;

    Ok(folio(booking, charges))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(check_in: i64, check_out: i64, rate: &str) -> Booking {
        Booking {
            id: 1,
            tenant_id: 1,
            branch_id: 1,
            room_id: 1,
            customer_id: None,
            guest_name: "Ada".into(),
            check_in,
            check_out,
            status: BookingStatus::CheckedIn,
            nightly_rate: rate.parse().unwrap(),
            notes: None,
            created_by: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn charge(amount: &str) -> FolioCharge {
        FolioCharge {
            id: 1,
            booking_id: 1,
            description: "Minibar".into(),
            amount: amount.parse().unwrap(),
            created_by: 1,
            created_at: 0,
        }
    }

    #[test]
    fn test_nights_rounds_up_partial_days() {
        assert_eq!(nights(0, DAY_MS), 1);
        assert_eq!(nights(0, 2 * DAY_MS), 2);
        assert_eq!(nights(0, 2 * DAY_MS + 1), 3);
        assert_eq!(nights(0, 3_600_000), 1);
        assert_eq!(nights(5, 5), 1);
    }

    #[test]
    fn test_nights_never_overflow() {
        assert_eq!(nights(0, i64::MAX), i64::MAX / DAY_MS + 1);
        assert_eq!(nights(i64::MIN, 1), i64::MAX / DAY_MS + 1);
        assert_eq!(nights(i64::MAX, i64::MIN), 1);
    }

    #[test]
    fn test_check_stay() {
        assert!(check_stay(0, DAY_MS).is_ok());
        assert!(check_stay(0, MAX_STAY_NIGHTS * DAY_MS).is_ok());
        assert_eq!(check_stay(DAY_MS, DAY_MS).unwrap_err().code, ErrorCode::InvalidBookingDates);
        assert_eq!(
            check_stay(0, MAX_STAY_NIGHTS * DAY_MS + 1).unwrap_err().code,
            ErrorCode::InvalidBookingDates
        );
        assert_eq!(check_stay(0, i64::MAX).unwrap_err().code, ErrorCode::InvalidBookingDates);
    }

    #[test]
    fn test_folio_total() {
        let detail = folio(booking(0, 3 * DAY_MS, "80.00"), vec![charge("12.50"), charge("7.25")]);
        assert_eq!(detail.nights, 3);
        assert_eq!(detail.room_total, Decimal::new(24000, 2));
        assert_eq!(detail.charges_total, Decimal::new(1975, 2));
        assert_eq!(detail.folio_total, Decimal::new(25975, 2));
    }

    #[test]
    fn test_booking_actions() {
        use BookingAction::*;
        use BookingStatus::*;
        assert_eq!(CheckIn.apply(Reserved), Some(CheckedIn));
        assert_eq!(CheckOut.apply(CheckedIn), Some(CheckedOut));
        assert_eq!(Cancel.apply(Reserved), Some(Cancelled));
        assert_eq!(CheckOut.apply(Reserved), None);
        assert_eq!(Cancel.apply(CheckedIn), None);
        assert_eq!(CheckIn.apply(Cancelled), None);
    }

    #[test]
    fn test_invalid_status_error() {
        let err = invalid_status(BookingStatus::CheckedOut, "check_in");
        assert_eq!(err.code, ErrorCode::InvalidBookingStatus);
        assert_eq!(err.message, "cannot check in a booking that is checkedout");
    }
}
