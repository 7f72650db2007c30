//! Restaurant tables

use shared::models::{RestaurantTable, TableCreate, TableFilter, TableStatus, TableUpdate};
use sqlx::{PgConnection, PgExecutor, PgPool};

const COLUMNS: &str =
    "id, tenant_id, branch_id, name, capacity, status, assigned_cashier_id, created_at, updated_at";

pub async fn list(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: Option<i64>,
    filter: &TableFilter,
) -> Result<Vec<RestaurantTable>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM restaurant_tables
        WHERE tenant_id = $1 AND deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND ($3::table_status IS NULL OR status = $3)
        ORDER BY branch_id, name
        "#
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .bind(filter.status)
    .fetch_all(pool)
    .await
}

pub async fn find<'e>(
    conn: impl PgExecutor<'e>,
    tenant_id: i64,
    id: i64,
) -> Result<Option<RestaurantTable>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM restaurant_tables WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

/// Row lock held until the surrounding transaction ends
pub async fn find_for_update(
    conn: &mut PgConnection,
    tenant_id: i64,
    id: i64,
) -> Result<Option<RestaurantTable>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM restaurant_tables
         WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
         FOR UPDATE"
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
    data: &TableCreate,
    now: i64,
) -> Result<RestaurantTable, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO restaurant_tables (tenant_id, branch_id, name, capacity, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .bind(&data.name)
    .bind(data.capacity.unwrap_or(4))
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update(
    conn: &mut PgConnection,
    tenant_id: i64,
    id: i64,
    data: &TableUpdate,
    now: i64,
) -> Result<Option<RestaurantTable>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE restaurant_tables SET
            name = COALESCE($3, name),
            capacity = COALESCE($4, capacity),
            status = COALESCE($5, status),
            updated_at = $6
        WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tenant_id)
    .bind(&data.name)
    .bind(data.capacity)
    .bind(data.status)
    .bind(now)
    .fetch_optional(conn)
    .await
}

pub async fn soft_delete(
    conn: &mut PgConnection,
    tenant_id: i64,
    id: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE restaurant_tables SET deleted_at = $3, updated_at = $3
         WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark the table occupied by `cashier_id`
pub async fn claim(
    conn: &mut PgConnection,
    id: i64,
    cashier_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE restaurant_tables SET status = 'occupied', assigned_cashier_id = $2, updated_at = $3
         WHERE id = $1",
    )
    .bind(id)
    .bind(cashier_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Back to `available` with the claim cleared
pub async fn free(conn: &mut PgConnection, id: i64, now: i64) -> Result<RestaurantTable, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE restaurant_tables SET status = $2, assigned_cashier_id = NULL, updated_at = $3
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(TableStatus::Available)
    .bind(now)
    .fetch_one(conn)
    .await
}
