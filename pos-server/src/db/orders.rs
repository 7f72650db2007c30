//! Restaurant orders (tabs) and their lines

use rust_decimal::Decimal;
use shared::models::{
    ItemStatus, Modifier, OrderFilter, OrderItem, OrderStatus, ProductType, RestaurantOrder,
};
use sqlx::types::Json;
use sqlx::{PgConnection, PgExecutor, PgPool};

const COLUMNS: &str = "id, tenant_id, branch_id, order_number, table_id, customer_id, created_by, \
                       status, is_tab_open, notes, sale_id, created_at, updated_at, closed_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, name, item_type, unit_price, quantity, \
                            modifiers, status, notes, created_at, updated_at";

pub struct NewOrder<'a> {
    pub tenant_id: i64,
    pub branch_id: i64,
    pub table_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub created_by: i64,
    pub notes: Option<&'a str>,
}

/// Priced line ready to insert (name, type and price snapshotted from the product)
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub name: String,
    pub item_type: ProductType,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub modifiers: Vec<Modifier>,
    pub notes: Option<String>,
}

pub async fn insert(
    conn: &mut PgConnection,
    order: &NewOrder<'_>,
    now: i64,
) -> Result<RestaurantOrder, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        INSERT INTO restaurant_orders (
            tenant_id, branch_id, order_number, table_id, customer_id, created_by,
            notes, created_at, updated_at
        )
        VALUES (
            $1, $2, 'O-' || lpad(nextval('order_number_seq')::TEXT, 8, '0'), $3, $4, $5,
            $6, $7, $7
        )
        RETURNING {COLUMNS}
        "#
    ))
    .bind(order.tenant_id)
    .bind(order.branch_id)
    .bind(order.table_id)
    .bind(order.customer_id)
    .bind(order.created_by)
    .bind(order.notes)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn insert_items(
    conn: &mut PgConnection,
    order_id: i64,
    items: &[NewOrderItem],
    now: i64,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let row: OrderItem = sqlx::query_as(&format!(
            r#"
            INSERT INTO order_items (
                order_id, product_id, name, item_type, unit_price, quantity, modifiers, notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.item_type)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(Json(&item.modifiers))
        .bind(&item.notes)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        rows.push(row);
    }
    Ok(rows)
}

pub async fn find<'e>(
    conn: impl PgExecutor<'e>,
    tenant_id: i64,
    id: i64,
) -> Result<Option<RestaurantOrder>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM restaurant_orders WHERE id = $1 AND tenant_id = $2"
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
) -> Result<Option<RestaurantOrder>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM restaurant_orders WHERE id = $1 AND tenant_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(tenant_id)
    .fetch_optional(conn)
    .await
}

/// Lock every open tab on a table
pub async fn open_on_table_for_update(
    conn: &mut PgConnection,
    tenant_id: i64,
    table_id: i64,
) -> Result<Vec<RestaurantOrder>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM restaurant_orders
         WHERE tenant_id = $1 AND table_id = $2 AND is_tab_open
         ORDER BY id
         FOR UPDATE"
    ))
    .bind(tenant_id)
    .bind(table_id)
    .fetch_all(conn)
    .await
}

/// Open tabs on a table
pub async fn count_open_on_table<'e>(
    conn: impl PgExecutor<'e>,
    table_id: i64,
) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM restaurant_orders WHERE table_id = $1 AND is_tab_open",
    )
    .bind(table_id)
    .fetch_one(conn)
    .await?;
    Ok(n)
}

/// Orders on a table that still need attention: open tabs, or closed tabs
/// whose food is not all served yet
pub async fn count_unfinished_on_table<'e>(
    conn: impl PgExecutor<'e>,
    table_id: i64,
) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM restaurant_orders
         WHERE table_id = $1 AND (is_tab_open OR status NOT IN ('completed', 'cancelled'))",
    )
    .bind(table_id)
    .fetch_one(conn)
    .await?;
    Ok(n)
}

pub async fn items<'e>(conn: impl PgExecutor<'e>, order_id: i64) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
    ))
    .bind(order_id)
    .fetch_all(conn)
    .await
}

/// Lines of several orders, ordered by order then line
pub async fn items_for_orders<'e>(
    conn: impl PgExecutor<'e>,
    order_ids: &[i64],
) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, id"
    ))
    .bind(order_ids)
    .fetch_all(conn)
    .await
}

pub async fn find_item_for_update(
    conn: &mut PgConnection,
    order_id: i64,
    item_id: i64,
) -> Result<Option<OrderItem>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE id = $1 AND order_id = $2 FOR UPDATE"
    ))
    .bind(item_id)
    .bind(order_id)
    .fetch_optional(conn)
    .await
}

pub async fn set_item_status(
    conn: &mut PgConnection,
    item_id: i64,
    status: ItemStatus,
    now: i64,
) -> Result<OrderItem, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE order_items SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {ITEM_COLUMNS}"
    ))
    .bind(item_id)
    .bind(status)
    .bind(now)
    .fetch_one(conn)
    .await
}

/// Cancel every line that has not reached a terminal status
pub async fn cancel_open_items(
    conn: &mut PgConnection,
    order_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE order_items SET status = 'cancelled', updated_at = $2
         WHERE order_id = $1 AND status NOT IN ('served', 'cancelled')",
    )
    .bind(order_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_status(
    conn: &mut PgConnection,
    id: i64,
    status: OrderStatus,
    now: i64,
) -> Result<RestaurantOrder, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE restaurant_orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .bind(now)
    .fetch_one(conn)
    .await
}

/// Close the tab against a sale; `completed` also finishes the order
pub async fn close_tab(
    conn: &mut PgConnection,
    id: i64,
    sale_id: i64,
    completed: bool,
    now: i64,
) -> Result<RestaurantOrder, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE restaurant_orders SET
            is_tab_open = FALSE,
            sale_id = $2,
            closed_at = $4,
            status = CASE WHEN $3 THEN 'completed'::order_status ELSE status END,
            updated_at = $4
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(sale_id)
    .bind(completed)
    .bind(now)
    .fetch_one(conn)
    .await
}

/// Cancel and close the tab without a sale
pub async fn cancel(conn: &mut PgConnection, id: i64, now: i64) -> Result<RestaurantOrder, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE restaurant_orders SET
            status = 'cancelled', is_tab_open = FALSE, closed_at = $2, updated_at = $2
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn list(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: Option<i64>,
    filter: &OrderFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<RestaurantOrder>, i64), sqlx::Error> {
    const WHERE: &str = r#"
        WHERE tenant_id = $1
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND ($3::order_status IS NULL OR status = $3)
          AND ($4::BIGINT IS NULL OR table_id = $4)
          AND ($5::BOOLEAN IS NULL OR is_tab_open = $5)
          AND ($6::BIGINT IS NULL OR created_at >= $6)
          AND ($7::BIGINT IS NULL OR created_at <= $7)
    "#;

    let (total,): (i64,) =
        sqlx::query_as(&format!("SELECT COUNT(*) FROM restaurant_orders {WHERE}"))
            .bind(tenant_id)
            .bind(branch_id)
            .bind(filter.status)
            .bind(filter.table_id)
            .bind(filter.is_tab_open)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM restaurant_orders {WHERE} ORDER BY created_at DESC, id DESC LIMIT $8 OFFSET $9"
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .bind(filter.status)
    .bind(filter.table_id)
    .bind(filter.is_tab_open)
    .bind(filter.from)
    .bind(filter.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

/// Non-terminal orders of a branch, oldest first
pub async fn kitchen_queue(
    pool: &PgPool,
    tenant_id: i64,
    branch_id: Option<i64>,
) -> Result<Vec<RestaurantOrder>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM restaurant_orders
        WHERE tenant_id = $1
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND status NOT IN ('completed', 'cancelled')
        ORDER BY created_at, id
        "#
    ))
    .bind(tenant_id)
    .bind(branch_id)
    .fetch_all(pool)
    .await
}
