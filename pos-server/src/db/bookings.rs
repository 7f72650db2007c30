//! Room bookings and folio charges

use rust_decimal::Decimal;
use shared::models::{Booking, BookingFilter, BookingStatus, FolioCharge};
use sqlx::{PgConnection, PgExecutor, PgPool};

const COLUMNS: &str = "id, tenant_id, branch_id, room_id, customer_id, guest_name, check_in, \
                       check_out, status, nightly_rate, notes, created_by, created_at, updated_at";
const CHARGE_COLUMNS: &str = "id, booking_id, description, amount, created_by, created_at";

pub struct NewBooking<'a> {
    pub tenant_id: i64,
    pub branch_id: i64,
    pub room_id: i64,
    pub customer_id: Option<i64>,
    pub guest_name: &'a str,
    pub check_in: i64,
    pub check_out: i64,
    pub nightly_rate: Decimal,
    pub notes: Option<&'a str>,
    pub created_by: i64,
}

pub async fn list(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: Option<i64>,
    filter: &BookingFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Booking>, i64), sqlx::Error> {
    // from/to select bookings whose stay overlaps the window
    const WHERE: &str = r#"
        WHERE tenant_id = $1
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND ($3::booking_status IS NULL OR status = $3)
          AND ($4::BIGINT IS NULL OR room_id = $4)
          AND ($5::BIGINT IS NULL OR check_out > $5)
          AND ($6::BIGINT IS NULL OR check_in < $6)
    "#;

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM bookings {WHERE}"))
        .bind(tenant_id)
        .bind(branch_id)
        .bind(filter.status)
        .bind(filter.room_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM bookings {WHERE} ORDER BY check_in DESC, id DESC LIMIT $7 OFFSET $8"
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .bind(filter.status)
    .bind(filter.room_id)
    .bind(filter.from)
    .bind(filter.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

pub async fn find<'e>(
    conn: impl PgExecutor<'e>,
    tenant_id: i64,
    id: i64,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE id = $1 AND tenant_id = $2"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

pub async fn find_for_update(
    conn: &mut PgConnection,
    tenant_id: i64,
    id: i64,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE id = $1 AND tenant_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

/// Whether a live booking of the room overlaps `[check_in, check_out)`
pub async fn has_overlap(
    conn: &mut PgConnection,
    room_id: i64,
    check_in: i64,
    check_out: i64,
) -> Result<bool, sqlx::Error> {
    let (overlap,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM bookings
            WHERE room_id = $1
              AND status IN ('reserved', 'checked_in')
              AND check_in < $3 AND check_out > $2
        )
        "#,
    )
    .bind(room_id)
    .bind(check_in)
    .bind(check_out)
    .fetch_one(conn)
    .await?;
    Ok(overlap)
}

pub async fn insert(
    conn: &mut PgConnection,
    data: &NewBooking<'_>,
    now: i64,
) -> Result<Booking, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO bookings (
            tenant_id, branch_id, room_id, customer_id, guest_name, check_in, check_out,
            nightly_rate, notes, created_by, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(data.tenant_id)
    .bind(data.branch_id)
    .bind(data.room_id)
    .bind(data.customer_id)
    .bind(data.guest_name)
    .bind(data.check_in)
    .bind(data.check_out)
    .bind(data.nightly_rate)
    .bind(data.notes)
    .bind(data.created_by)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn set_status(
    conn: &mut PgConnection,
    id: i64,
    status: BookingStatus,
    now: i64,
) -> Result<Booking, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn charges<'e>(
    conn: impl PgExecutor<'e>,
    booking_id: i64,
) -> Result<Vec<FolioCharge>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {CHARGE_COLUMNS} FROM folio_charges WHERE booking_id = $1 ORDER BY created_at, id"
    ))
    .bind(booking_id)
    .fetch_all(conn)
    .await
}

pub async fn add_charge(
    conn: &mut PgConnection,
    booking_id: i64,
    description: &str,
    amount: Decimal,
    created_by: i64,
    now: i64,
) -> Result<FolioCharge, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO folio_charges (booking_id, description, amount, created_by, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {CHARGE_COLUMNS}
        "#
    ))
    .bind(booking_id)
    .bind(description)
    .bind(amount)
    .bind(created_by)
    .bind(now)
    .fetch_one(conn)
    .await
}
