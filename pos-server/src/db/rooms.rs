//! Hospitality rooms

use shared::models::{Room, RoomCreate, RoomUpdate};
use sqlx::{PgConnection, PgExecutor, PgPool};

const COLUMNS: &str = "id, tenant_id, branch_id, room_number, room_type, capacity, nightly_rate, \
                       is_active, created_at, updated_at";

pub async fn list(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: Option<i64>,
) -> Result<Vec<Room>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM rooms
        WHERE tenant_id = $1 AND deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR branch_id = $2)
        ORDER BY branch_id, room_number
        "#
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .fetch_all(pool)
    .await
}

pub async fn find<'e>(
    conn: impl PgExecutor<'e>,
    tenant_id: i64,
    id: i64,
) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM rooms WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

/// Lock the room so overlapping bookings are checked one at a time
pub async fn find_for_update(
    conn: &mut PgConnection,
    tenant_id: i64,
    id: i64,
) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM rooms WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL FOR UPDATE"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

pub async fn create(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: i64,
    data: &RoomCreate,
    now: i64,
) -> Result<Room, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO rooms (tenant_id, branch_id, room_number, room_type, capacity, nightly_rate, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .bind(&data.room_number)
    .bind(&data.room_type)
    .bind(data.capacity.unwrap_or(2))
    .bind(data.nightly_rate)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    tenant_id: i64,
    id: i64,
    data: &RoomUpdate,
    now: i64,
) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE rooms SET
            room_number = COALESCE($3, room_number),
            room_type = COALESCE($4, room_type),
            capacity = COALESCE($5, capacity),
            nightly_rate = COALESCE($6, nightly_rate),
            is_active = COALESCE($7, is_active),
            updated_at = $8
        WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tenant_id)
    .bind(&data.room_number)
    .bind(&data.room_type)
    .bind(data.capacity)
    .bind(data.nightly_rate)
    .bind(data.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn soft_delete(
    pool: &PgPool,
    tenant_id: i64,
    id: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE rooms SET deleted_at = $3, is_active = FALSE, updated_at = $3
         WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
