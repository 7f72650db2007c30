//! Expense operations

use rust_decimal::Decimal;
use shared::models::{Expense, ExpenseFilter, ExpenseUpdate};
use sqlx::PgPool;

const COLUMNS: &str = "id, tenant_id, branch_id, category, description, amount, incurred_at, \
                       recorded_by, created_at, updated_at";

pub async fn list(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: Option<i64>,
    filter: &ExpenseFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Expense>, i64), sqlx::Error> {
    const WHERE: &str = r#"
        WHERE tenant_id = $1 AND deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND ($3::TEXT IS NULL OR category = $3)
          AND ($4::BIGINT IS NULL OR incurred_at >= $4)
          AND ($5::BIGINT IS NULL OR incurred_at <= $5)
    "#;

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM expenses {WHERE}"))
        .bind(tenant_id)
        .bind(branch_id)
        .bind(filter.category.as_deref())
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM expenses {WHERE} ORDER BY incurred_at DESC, id DESC LIMIT $6 OFFSET $7"
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .bind(filter.category.as_deref())
    .bind(filter.from)
    .bind(filter.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

pub async fn find(pool: &PgPool, tenant_id: i64, id: i64) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM expenses WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(pool)
    .await
}

/// Sanitised expense fields
pub struct NewExpense<'a> {
    pub tenant_id: i64,
    pub branch_id: i64,
    pub category: &'a str,
    pub description: Option<&'a str>,
    pub amount: Decimal,
    pub incurred_at: i64,
    pub recorded_by: i64,
}

pub async fn create(pool: &PgPool, data: &NewExpense<'_>, now: i64) -> Result<Expense, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO expenses (tenant_id, branch_id, category, description, amount, incurred_at, recorded_by, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(data.tenant_id)
    .bind(data.branch_id)
    .bind(data.category)
    .bind(data.description)
    .bind(data.amount)
    .bind(data.incurred_at)
    .bind(data.recorded_by)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    tenant_id: i64,
    id: i64,
    data: &ExpenseUpdate,
    now: i64,
) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE expenses SET
            category = COALESCE($3, category),
            description = COALESCE($4, description),
            amount = COALESCE($5, amount),
            incurred_at = COALESCE($6, incurred_at),
            updated_at = $7
        WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tenant_id)
    .bind(&data.category)
    .bind(&data.description)
    .bind(data.amount)
    .bind(data.incurred_at)
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
        "UPDATE expenses SET deleted_at = $3, updated_at = $3
         WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
