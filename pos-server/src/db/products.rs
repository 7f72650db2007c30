//! Product catalog and stock

use shared::models::{Product, ProductCreate, ProductFilter, ProductUpdate};
use sqlx::{PgConnection, PgExecutor, PgPool};

const COLUMNS: &str = "id, tenant_id, branch_id, name, sku, category, product_type, price, cost, \
                       stock_quantity, low_stock_threshold, is_active, created_at, updated_at";

/// Products visible from `branch_id`: its own rows plus tenant-wide ones
pub async fn list(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: Option<i64>,
    filter: &ProductFilter,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Product>, i64), sqlx::Error> {
    const WHERE: &str = r#"
        WHERE tenant_id = $1 AND deleted_at IS NULL
          AND ($2::BIGINT IS NULL OR branch_id IS NULL OR branch_id = $2)
          AND ($3::TEXT IS NULL OR name ILIKE $3 OR sku ILIKE $3)
          AND ($4::TEXT IS NULL OR category = $4)
          AND ($5::product_type IS NULL OR product_type = $5)
          AND ($6::BOOLEAN IS NULL OR is_active = $6)
          AND (NOT $7 OR (product_type = 'PRODUCT' AND stock_quantity <= low_stock_threshold))
    "#;
    let low_stock = filter.low_stock.unwrap_or(false);

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM products {WHERE}"))
        .bind(tenant_id)
        .bind(branch_id)
        .bind(search)
        .bind(filter.category.as_deref())
        .bind(filter.product_type)
        .bind(filter.is_active)
        .bind(low_stock)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM products {WHERE} ORDER BY name, id LIMIT $8 OFFSET $9"
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .bind(search)
    .bind(filter.category.as_deref())
    .bind(filter.product_type)
    .bind(filter.is_active)
    .bind(low_stock)
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
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM products WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

pub async fn find_many<'e>(
    conn: impl PgExecutor<'e>,
    tenant_id: i64,
    ids: &[i64],
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM products WHERE tenant_id = $1 AND id = ANY($2) AND deleted_at IS NULL"
    ))
    .bind(tenant_id)
    .bind(ids)
    .fetch_all(conn)
    .await
}

/// Load several products and lock them for the rest of the transaction
pub async fn find_many_for_update(
    conn: &mut PgConnection,
    tenant_id: i64,
    ids: &[i64],
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM products
         WHERE tenant_id = $1 AND id = ANY($2) AND deleted_at IS NULL
         ORDER BY id
         FOR UPDATE"
    ))
    .bind(tenant_id)
    .bind(ids)
    .fetch_all(conn)
    .await
}

pub async fn create(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: Option<i64>,
    data: &ProductCreate,
    now: i64,
) -> Result<Product, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO products (
            tenant_id, branch_id, name, sku, category, product_type, price, cost,
            stock_quantity, low_stock_threshold, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .bind(&data.name)
    .bind(&data.sku)
    .bind(&data.category)
    .bind(data.product_type)
    .bind(data.price)
    .bind(data.cost)
    .bind(data.stock_quantity.unwrap_or(0))
    .bind(data.low_stock_threshold.unwrap_or(0))
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    tenant_id: i64,
    id: i64,
    data: &ProductUpdate,
    now: i64,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE products SET
            name = COALESCE($3, name),
            sku = COALESCE($4, sku),
            category = COALESCE($5, category),
            product_type = COALESCE($6, product_type),
            price = COALESCE($7, price),
            cost = COALESCE($8, cost),
            low_stock_threshold = COALESCE($9, low_stock_threshold),
            is_active = COALESCE($10, is_active),
            updated_at = $11
        WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tenant_id)
    .bind(&data.name)
    .bind(&data.sku)
    .bind(&data.category)
    .bind(data.product_type)
    .bind(data.price)
    .bind(data.cost)
    .bind(data.low_stock_threshold)
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
        "UPDATE products SET deleted_at = $3, is_active = FALSE, updated_at = $3
         WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Apply a signed stock change. Returns the updated row, or `None` when the
/// product is missing or the change would take stock below zero.
pub async fn adjust_stock(
    conn: &mut PgConnection,
    tenant_id: i64,
    id: i64,
    delta: i32,
    now: i64,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE products SET stock_quantity = stock_quantity + $3, updated_at = $4
        WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
          AND stock_quantity + $3 >= 0
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(tenant_id)
    .bind(delta)
    .bind(now)
    .fetch_optional(conn)
    .await
}

/// Unconditional decrement used when a sale is written. Only `PRODUCT` rows move.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    tenant_id: i64,
    id: i64,
    quantity: i32,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE products SET stock_quantity = stock_quantity - $3, updated_at = $4
        WHERE id = $1 AND tenant_id = $2 AND product_type = 'PRODUCT'
        "#,
    )
    .bind(id)
    .bind(tenant_id)
    .bind(quantity)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}
