//! Business workflows that span several tables
//!
//! Each operation runs in one database transaction, writes its audit row in
//! that transaction, and pushes kitchen events only after commit.

pub mod billing;
pub mod bookings;
pub mod orders;
pub mod ownership;
pub mod retail;
pub mod tab;

use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::{OrderDetail, RestaurantOrder, RestaurantTable};
use sqlx::{PgConnection, PgExecutor};

use crate::auth::CurrentUser;
use crate::db;
use crate::db::audit::AuditRecord;
use crate::error::ServiceResult;

/// Authenticated caller plus client address, the subject of audit rows
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: CurrentUser,
    pub ip: String,
}

impl Actor {
    pub fn record<'a>(
        &'a self,
        action: &'a str,
        entity: &'a str,
        entity_id: Option<i64>,
        detail: Value,
    ) -> AuditRecord<'a> {
        AuditRecord {
            tenant_id: self.user.tenant_id,
            user_id: Some(self.user.id),
            action,
            entity,
            entity_id,
            detail: Some(detail),
            ip_address: Some(&self.ip),
        }
    }

    /// Write an audit row (inside a transaction when given one)
    pub async fn audit<'e>(
        &self,
        conn: impl PgExecutor<'e>,
        action: &str,
        entity: &str,
        entity_id: Option<i64>,
        detail: Value,
        now: i64,
    ) -> Result<(), sqlx::Error> {
        db::audit::log(conn, &self.record(action, entity, entity_id, detail), now).await
    }
}

/// Lock an order for update, taking its table's row lock first.
///
/// Table-then-order is the lock order for every tab workflow. Orders outside
/// the caller's branch are reported as not found.
pub(crate) async fn lock_order(
    conn: &mut PgConnection,
    user: &CurrentUser,
    order_id: i64,
) -> ServiceResult<(RestaurantOrder, Option<RestaurantTable>)> {
    let peek = db::orders::find(&mut *conn, user.tenant_id, order_id)
        .await?
        .filter(|o| user.can_access_branch(o.branch_id))
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    let table = match peek.table_id {
        Some(table_id) => db::tables::find_for_update(&mut *conn, user.tenant_id, table_id).await?,
        None => None,
    };

    let order = db::orders::find_for_update(&mut *conn, user.tenant_id, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok((order, table))
}

/// Load an order with its lines
pub(crate) async fn order_detail<'e>(
    conn: impl PgExecutor<'e>,
    order: RestaurantOrder,
) -> Result<OrderDetail, sqlx::Error> {
    let items = db::orders::items(conn, order.id).await?;
    Ok(OrderDetail { order, items })
}

/// Attach lines to already loaded orders
pub(crate) async fn order_details<'e>(
    conn: impl PgExecutor<'e>,
    orders: Vec<RestaurantOrder>,
) -> Result<Vec<OrderDetail>, sqlx::Error> {
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut items = db::orders::items_for_orders(conn, &ids).await?;
    Ok(orders
        .into_iter()
        .map(|order| {
            let (mine, rest): (Vec<_>, Vec<_>) =
                items.drain(..).partition(|i| i.order_id == order.id);
            items = rest;
            OrderDetail { order, items: mine }
        })
        .collect())
}

/// Free the table when nothing on it is still open or waiting on the kitchen
pub(crate) async fn release_table_if_idle(
    conn: &mut PgConnection,
    table: Option<&RestaurantTable>,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let Some(table) = table else {
        return Ok(false);
    };
    if db::orders::count_unfinished_on_table(&mut *conn, table.id).await? > 0 {
        return Ok(false);
    }
    db::tables::free(conn, table.id, now).await?;
    Ok(true)
}
