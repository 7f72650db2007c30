//! Branch operations

use shared::models::{Branch, BranchCreate, BranchUpdate};
use sqlx::{PgExecutor, PgPool};

const COLUMNS: &str = "id, tenant_id, name, address, phone, is_active, created_at, updated_at";

pub async fn list(pool: &PgPool, tenant_id: i64) -> Result<Vec<Branch>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM branches WHERE tenant_id = $1 AND deleted_at IS NULL ORDER BY name"
    ))
    .bind(tenant_id)
    .fetch_all(pool)
    .await
}

pub async fn find<'e>(
    conn: impl PgExecutor<'e>,
    tenant_id: i64,
    id: i64,
) -> Result<Option<Branch>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM branches WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

pub async fn create<'e>(
    conn: impl PgExecutor<'e>,
    tenant_id: i64,
    data: &BranchCreate,
    now: i64,
) -> Result<Branch, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO branches (tenant_id, name, address, phone, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(tenant_id)
    .bind(&data.name)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn update(
    pool: &PgPool,
    tenant_id: i64,
    id: i64,
    data: &BranchUpdate,
    now: i64,
) -> Result<Option<Branch>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE branches SET
            name = COALESCE($3, name),
            address = COALESCE($4, address),
            phone = COALESCE($5, phone),
            is_active = COALESCE($6, is_active),
            updated_at = $7
        WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tenant_id)
    .bind(&data.name)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(data.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Soft delete; returns whether a live row was hit
pub async fn soft_delete(
    pool: &PgPool,
    tenant_id: i64,
    id: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE branches SET deleted_at = $3, is_active = FALSE, updated_at = $3
         WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Live staff still assigned to the branch
pub async fn count_staff(pool: &PgPool, tenant_id: i64, id: i64) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM users WHERE tenant_id = $1 AND branch_id = $2 AND deleted_at IS NULL",
    )
    .bind(tenant_id)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(n)
}
