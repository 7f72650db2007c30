//! Closing tabs into a sale
//!
//! One transaction locks the table and its open orders, prices every billable
//! line, writes the sale, takes stock, closes the orders and frees the table
//! once nothing on it is waiting on the kitchen.

use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::kitchen::KitchenEvent;
use shared::models::{
    CloseTabRequest, CloseTabResult, OrderDetail, RestaurantOrder, RestaurantTable, SaleDetail,
    SaleSource,
};
use shared::util::now_millis;
use sqlx::PgConnection;

use super::billing::plan_close;
use super::{Actor, lock_order, order_details, ownership, release_table_if_idle};
use crate::cache;
use crate::db;
use crate::db::sales::NewSale;
use crate::error::ServiceResult;
use crate::state::AppState;

/// What is being closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTarget {
    /// A single order
    Order(i64),
    /// Every open order on a table
    Table(i64),
}

/// A close needs at least one open tab, and an order already closed never bills again
fn ensure_closable(orders: &[RestaurantOrder], table: Option<&RestaurantTable>) -> Result<(), AppError> {
    if let Some(closed) = orders.iter().find(|o| !o.is_tab_open) {
        return Err(AppError::with_message(
            ErrorCode::TabAlreadyClosed,
            format!("Order {} is already closed", closed.order_number),
        )
        .with_detail("order_id", closed.id));
    }
    if orders.is_empty() {
        let message = match table {
            Some(t) => format!("Table {} has no open tab", t.name),
            None => "Nothing open to close".to_string(),
        };
        return Err(AppError::with_message(ErrorCode::TabAlreadyClosed, message));
    }
    Ok(())
}

/// Lock the open orders of `target`, table row first
async fn lock_target(
    conn: &mut PgConnection,
    actor: &Actor,
    target: CloseTarget,
) -> ServiceResult<(Vec<RestaurantOrder>, Option<RestaurantTable>)> {
    let user = &actor.user;
    match target {
        CloseTarget::Order(order_id) => {
            let (order, table) = lock_order(conn, user, order_id).await?;
            ensure_closable(std::slice::from_ref(&order), table.as_ref())?;
            Ok((vec![order], table))
        }
        CloseTarget::Table(table_id) => {
            let table = db::tables::find_for_update(&mut *conn, user.tenant_id, table_id)
                .await?
                .filter(|t| user.can_access_branch(t.branch_id))
                .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
            let orders = db::orders::open_on_table_for_update(conn, user.tenant_id, table.id).await?;
            ensure_closable(&orders, Some(&table))?;
            Ok((orders, Some(table)))
        }
    }
}

/// Close one order or a whole table into a restaurant sale
pub async fn close(
    state: &AppState,
    actor: &Actor,
    target: CloseTarget,
    req: &CloseTabRequest,
) -> ServiceResult<CloseTabResult> {
    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let (orders, table) = lock_target(&mut tx, actor, target).await?;
    for order in &orders {
        ownership::ensure_can_operate(user, order, table.as_ref())?;
    }

    let customer_id = req
        .customer_id
        .or_else(|| orders.iter().find_map(|o| o.customer_id));
    if let Some(customer_id) = req.customer_id
        && !db::customers::exists(&mut *tx, user.tenant_id, customer_id).await?
    {
        return Err(AppError::new(ErrorCode::CustomerNotFound).into());
    }

    let branch_id = orders[0].branch_id;
    let details = order_details(&mut *tx, orders).await?;
    let plan = plan_close(&details, req.discount.as_ref(), req.tax_rate)?;

    let sale = db::sales::insert(
        &mut tx,
        &NewSale {
            tenant_id: user.tenant_id,
            branch_id,
            customer_id,
            cashier_id: user.id,
            source: SaleSource::Restaurant,
            subtotal: plan.totals.subtotal,
            discount_amount: plan.totals.discount_amount,
            tax_amount: plan.totals.tax_amount,
            final_amount: plan.totals.final_amount,
            payment_method: req.payment_method,
        },
        now,
    )
    .await?;
    let sale_items = db::sales::insert_items(&mut tx, sale.id, &plan.lines).await?;

    for (&product_id, &quantity) in &plan.stock {
        db::products::decrement_stock(&mut tx, user.tenant_id, product_id, quantity, now).await?;
    }

    let mut closed = Vec::with_capacity(details.len());
    for detail in details {
        let completed = plan.completed_order_ids.contains(&detail.order.id);
        let order = db::orders::close_tab(&mut tx, detail.order.id, sale.id, completed, now).await?;
        closed.push(OrderDetail {
            order,
            items: detail.items,
        });
    }

    let table_freed = if plan.all_served {
        release_table_if_idle(&mut tx, table.as_ref(), now).await?
    } else {
        false
    };

    let closed_order_ids: Vec<i64> = closed.iter().map(|d| d.order.id).collect();
    actor
        .audit(
            &mut *tx,
            "tab.close",
            "sale",
            Some(sale.id),
            json!({
                "sale_number": sale.sale_number,
                "order_ids": closed_order_ids,
                "table_id": table.as_ref().map(|t| t.id),
                "final_amount": sale.final_amount,
                "table_freed": table_freed,
            }),
            now,
        )
        .await?;
    tx.commit().await?;

    tracing::info!(
        sale_id = sale.id,
        sale_number = %sale.sale_number,
        orders = closed_order_ids.len(),
        table_freed,
        "Tab closed"
    );

    let events = closed
        .into_iter()
        .map(|detail| {
            if plan.completed_order_ids.contains(&detail.order.id) {
                KitchenEvent::OrderCompleted(detail)
            } else {
                KitchenEvent::OrderUpdated(detail)
            }
        })
        .collect();
    state.kitchen.broadcast_all(events).await;
    if !plan.stock.is_empty() {
        state.cache.invalidate_prefix(&cache::product_prefix(user.tenant_id)).await;
    }

    Ok(CloseTabResult {
        sale: SaleDetail {
            sale,
            items: sale_items,
        },
        closed_order_ids,
        completed_order_ids: plan.completed_order_ids,
        table_freed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderStatus, TableStatus};

    fn order(id: i64, is_tab_open: bool) -> RestaurantOrder {
        RestaurantOrder {
            id,
            tenant_id: 1,
            branch_id: 1,
            order_number: format!("O-{id:08}"),
            table_id: Some(3),
            customer_id: None,
            created_by: 1,
            status: if is_tab_open { OrderStatus::Served } else { OrderStatus::Completed },
            is_tab_open,
            notes: None,
            sale_id: if is_tab_open { None } else { Some(77) },
            created_at: 0,
            updated_at: 0,
            closed_at: if is_tab_open { None } else { Some(1) },
        }
    }

    fn table() -> RestaurantTable {
        RestaurantTable {
            id: 3,
            tenant_id: 1,
            branch_id: 1,
            name: "Patio 3".into(),
            capacity: 4,
            status: TableStatus::Available,
            assigned_cashier_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_open_tab_is_closable() {
        assert!(ensure_closable(&[order(1, true)], Some(&table())).is_ok());
        assert!(ensure_closable(&[order(1, true), order(2, true)], Some(&table())).is_ok());
    }

    #[test]
    fn test_reclosing_an_order_is_refused() {
        let err = ensure_closable(&[order(1, false)], None).unwrap_err();
        assert_eq!(err.code, ErrorCode::TabAlreadyClosed);
        assert_eq!(err.http_status(), http::StatusCode::CONFLICT);
        assert_eq!(err.message, "Order O-00000001 is already closed");
    }

    #[test]
    fn test_reclosing_an_emptied_table_is_refused() {
        let err = ensure_closable(&[], Some(&table())).unwrap_err();
        assert_eq!(err.code, ErrorCode::TabAlreadyClosed);
        assert_eq!(err.message, "Table Patio 3 has no open tab");
    }
}
