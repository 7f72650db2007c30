//! Customer operations

use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use sqlx::{PgExecutor, PgPool};

const COLUMNS: &str = "id, tenant_id, name, email, phone, notes, created_at, updated_at";

pub async fn list(
    pool: &PgPool,
    tenant_id: i64,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Customer>, i64), sqlx::Error> {
    const WHERE: &str = r#"
        WHERE tenant_id = $1 AND deleted_at IS NULL
          AND ($2::TEXT IS NULL OR name ILIKE $2 OR email ILIKE $2 OR phone ILIKE $2)
    "#;

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM customers {WHERE}"))
        .bind(tenant_id)
        .bind(search)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM customers {WHERE} ORDER BY name, id LIMIT $3 OFFSET $4"
    ))
    .bind(tenant_id)
    .bind(search)
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
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM customers WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

/// Whether a live customer with this id belongs to the tenant
pub async fn exists<'e>(
    conn: impl PgExecutor<'e>,
    tenant_id: i64,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let (found,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM customers WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL)",
    )
    .bind(id)
    .bind(tenant_id)
    .fetch_one(conn)
    .await?;
    Ok(found)
}

pub async fn create(
    pool: &PgPool,
    tenant_id: i64,
    data: &CustomerCreate,
    now: i64,
) -> Result<Customer, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO customers (tenant_id, name, email, phone, notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(tenant_id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.notes)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    tenant_id: i64,
    id: i64,
    data: &CustomerUpdate,
    now: i64,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE customers SET
            name = COALESCE($3, name),
            email = COALESCE($4, email),
            phone = COALESCE($5, phone),
            notes = COALESCE($6, notes),
            updated_at = $7
        WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tenant_id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.notes)
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
        "UPDATE customers SET deleted_at = $3, updated_at = $3
         WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
