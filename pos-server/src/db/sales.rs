//! Sales and sale lines

use rust_decimal::Decimal;
use shared::models::{PaymentMethod, ProductType, Sale, SaleFilter, SaleItem, SaleSource};
use sqlx::{PgConnection, PgExecutor, PgPool};

const COLUMNS: &str = "id, tenant_id, branch_id, sale_number, customer_id, cashier_id, source, \
                       subtotal, discount_amount, tax_amount, final_amount, payment_method, created_at";
const ITEM_COLUMNS: &str = "id, sale_id, product_id, name, item_type, quantity, unit_price, subtotal";

/// Sale header about to be written; the sale number comes from a sequence
pub struct NewSale {
    pub tenant_id: i64,
    pub branch_id: i64,
    pub customer_id: Option<i64>,
    pub cashier_id: i64,
    pub source: SaleSource,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub final_amount: Decimal,
    pub payment_method: PaymentMethod,
}

/// One sale line about to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewSaleItem {
    pub product_id: i64,
    pub name: String,
    pub item_type: ProductType,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

pub async fn insert(conn: &mut PgConnection, sale: &NewSale, now: i64) -> Result<Sale, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO sales (
            tenant_id, branch_id, sale_number, customer_id, cashier_id, source,
            subtotal, discount_amount, tax_amount, final_amount, payment_method, created_at
        )
        VALUES (
            $1, $2, 'S-' || lpad(nextval('sale_number_seq')::TEXT, 8, '0'), $3, $4, $5,
            $6, $7, $8, $9, $10, $11
        )
        RETURNING {COLUMNS}
        "#
    ))
    .bind(sale.tenant_id)
    .bind(sale.branch_id)
    .bind(sale.customer_id)
    .bind(sale.cashier_id)
    .bind(sale.source)
    .bind(sale.subtotal)
    .bind(sale.discount_amount)
    .bind(sale.tax_amount)
    .bind(sale.final_amount)
    .bind(sale.payment_method)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn insert_items(
    conn: &mut PgConnection,
    sale_id: i64,
    items: &[NewSaleItem],
) -> Result<Vec<SaleItem>, sqlx::Error> {
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let row: SaleItem = sqlx::query_as(&format!(
            r#"
            INSERT INTO sale_items (sale_id, product_id, name, item_type, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(sale_id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.item_type)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.subtotal)
        .fetch_one(&mut *conn)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

pub async fn list(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: Option<i64>,
    filter: &SaleFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Sale>, i64), sqlx::Error> {
    const WHERE: &str = r#"
        WHERE tenant_id = $1
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND ($3::BIGINT IS NULL OR created_at >= $3)
          AND ($4::BIGINT IS NULL OR created_at <= $4)
          AND ($5::sale_source IS NULL OR source = $5)
          AND ($6::BIGINT IS NULL OR cashier_id = $6)
    "#;

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM sales {WHERE}"))
        .bind(tenant_id)
        .bind(branch_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.source)
        .bind(filter.cashier_id)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM sales {WHERE} ORDER BY created_at DESC, id DESC LIMIT $7 OFFSET $8"
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.source)
    .bind(filter.cashier_id)
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
) -> Result<Option<Sale>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM sales WHERE id = $1 AND tenant_id = $2"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

pub async fn items<'e>(conn: impl PgExecutor<'e>, sale_id: i64) -> Result<Vec<SaleItem>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = $1 ORDER BY id"
    ))
    .bind(sale_id)
    .fetch_all(conn)
    .await
}
