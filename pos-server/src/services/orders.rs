//! Restaurant order flow: open, add lines, kitchen progress, cancel

use std::collections::HashMap;

use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::kitchen::KitchenEvent;
use shared::models::{
    AddItemsRequest, ItemStatus, Modifier, OrderCreate, OrderDetail, OrderItem, OrderItemInput,
    OrderStatus, RestaurantOrder,
};
use shared::util::{now_millis, sanitize_inline_text, sanitize_multiline_text, sanitize_optional};
use sqlx::PgConnection;

use super::ownership::{self, TableClaim};
use super::{Actor, lock_order, order_detail, release_table_if_idle};
use crate::db;
use crate::db::orders::{NewOrder, NewOrderItem};
use crate::error::ServiceResult;
use crate::state::AppState;

/// Snapshot product name, type and price onto new order lines
async fn price_items(
    conn: &mut PgConnection,
    tenant_id: i64,
    branch_id: i64,
    inputs: &[OrderItemInput],
) -> ServiceResult<Vec<NewOrderItem>> {
    let ids: Vec<i64> = inputs.iter().map(|i| i.product_id).collect();
    let products: HashMap<i64, _> = db::products::find_many(&mut *conn, tenant_id, &ids)
        .await?
        .into_iter()
        .filter(|p| p.branch_id.is_none_or(|b| b == branch_id))
        .map(|p| (p.id, p))
        .collect();

    inputs
        .iter()
        .map(|input| -> ServiceResult<NewOrderItem> {
            let product = products
                .get(&input.product_id)
                .ok_or_else(|| AppError::for_product(ErrorCode::ProductNotFound, input.product_id))?;
            if !product.is_active {
                return Err(AppError::for_product(ErrorCode::ProductInactive, product.id).into());
            }
            Ok(NewOrderItem {
                product_id: product.id,
                name: product.name.clone(),
                item_type: product.product_type,
                unit_price: product.price,
                quantity: input.quantity,
                modifiers: input
                    .modifiers
                    .iter()
                    .map(|m| Modifier {
                        name: sanitize_inline_text(&m.name),
                        price: m.price,
                    })
                    .collect(),
                notes: sanitize_optional(input.notes.as_deref()),
            })
        })
        .collect()
}

/// Open a new tab, claiming the table for the caller when it is free
pub async fn open(state: &AppState, actor: &Actor, req: &OrderCreate) -> ServiceResult<OrderDetail> {
    let user = &actor.user;
    let branch_id = user.target_branch(req.branch_id)?;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    if let Some(table_id) = req.table_id {
        let table = db::tables::find_for_update(&mut tx, user.tenant_id, table_id)
            .await?
            .filter(|t| t.branch_id == branch_id)
            .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
        if ownership::claim_for_new_order(user, &table)? == TableClaim::Claim {
            db::tables::claim(&mut tx, table.id, user.id, now).await?;
            tracing::info!(table_id = table.id, cashier_id = user.id, "Table claimed");
        }
    }

    if let Some(customer_id) = req.customer_id
        && !db::customers::exists(&mut *tx, user.tenant_id, customer_id).await?
    {
        return Err(AppError::new(ErrorCode::CustomerNotFound).into());
    }

    let notes = req.notes.as_deref().map(sanitize_multiline_text);
    let order = db::orders::insert(
        &mut tx,
        &NewOrder {
            tenant_id: user.tenant_id,
            branch_id,
            table_id: req.table_id,
            customer_id: req.customer_id,
            created_by: user.id,
            notes: notes.as_deref().filter(|n| !n.is_empty()),
        },
        now,
    )
    .await?;

    let lines = price_items(&mut tx, user.tenant_id, branch_id, &req.items).await?;
    let items = db::orders::insert_items(&mut tx, order.id, &lines, now).await?;

    actor
        .audit(
            &mut *tx,
            "order.create",
            "restaurant_order",
            Some(order.id),
            json!({ "order_number": order.order_number, "table_id": order.table_id, "items": items.len() }),
            now,
        )
        .await?;
    tx.commit().await?;

    let detail = OrderDetail { order, items };
    tracing::info!(order_id = detail.order.id, order_number = %detail.order.order_number, "Order opened");
    state.kitchen.broadcast(KitchenEvent::OrderCreated(detail.clone())).await;
    Ok(detail)
}

/// Add lines to an open tab
pub async fn add_items(
    state: &AppState,
    actor: &Actor,
    order_id: i64,
    req: &AddItemsRequest,
) -> ServiceResult<OrderDetail> {
    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let (order, table) = lock_order(&mut tx, user, order_id).await?;
    ensure_open(&order)?;
    ownership::ensure_can_operate(user, &order, table.as_ref())?;

    let lines = price_items(&mut tx, user.tenant_id, order.branch_id, &req.items).await?;
    let added = db::orders::insert_items(&mut tx, order.id, &lines, now).await?;
    let order = db::orders::set_status(&mut tx, order.id, order.status, now).await?;

    actor
        .audit(
            &mut *tx,
            "order.add_items",
            "restaurant_order",
            Some(order.id),
            json!({ "item_ids": added.iter().map(|i| i.id).collect::<Vec<_>>() }),
            now,
        )
        .await?;
    let detail = order_detail(&mut *tx, order).await?;
    tx.commit().await?;

    state.kitchen.broadcast(KitchenEvent::OrderUpdated(detail.clone())).await;
    Ok(detail)
}

fn ensure_open(order: &RestaurantOrder) -> Result<(), AppError> {
    match order.status {
        OrderStatus::Cancelled => Err(AppError::new(ErrorCode::OrderAlreadyCancelled)),
        OrderStatus::Completed => Err(AppError::new(ErrorCode::OrderAlreadyCompleted)),
        _ if !order.is_tab_open => Err(AppError::new(ErrorCode::TabAlreadyClosed)),
        _ => Ok(()),
    }
}

fn transition_error(from: OrderStatus, to: OrderStatus) -> AppError {
    match from {
        OrderStatus::Cancelled => AppError::new(ErrorCode::OrderAlreadyCancelled),
        OrderStatus::Completed => AppError::new(ErrorCode::OrderAlreadyCompleted),
        _ => AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot move order from {from:?} to {to:?}").to_lowercase(),
        ),
    }
}

/// Every billable line has been served (an order of only cancelled lines counts)
pub fn all_billable_served(items: &[OrderItem]) -> bool {
    items
        .iter()
        .filter(|i| i.status.is_billable())
        .all(|i| i.status == ItemStatus::Served)
}

/// What a line status change does to its order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFollowUp {
    None,
    /// Open tab with all food out: order moves to `served`
    MarkServed,
    /// Closed tab with all food out: order is `completed`
    Complete,
}

pub fn follow_up(order: &RestaurantOrder, items: &[OrderItem]) -> OrderFollowUp {
    if order.status.is_terminal() || !all_billable_served(items) {
        return OrderFollowUp::None;
    }
    if !order.is_tab_open {
        OrderFollowUp::Complete
    } else if order.status.can_transition_to(OrderStatus::Served) {
        OrderFollowUp::MarkServed
    } else {
        OrderFollowUp::None
    }
}

/// Kitchen progress on one line
pub async fn update_item_status(
    state: &AppState,
    actor: &Actor,
    order_id: i64,
    item_id: i64,
    status: ItemStatus,
) -> ServiceResult<OrderDetail> {
    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let (order, table) = lock_order(&mut tx, user, order_id).await?;
    if order.status.is_terminal() {
        return Err(transition_error(order.status, order.status).into());
    }
    let item = db::orders::find_item_for_update(&mut tx, order.id, item_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderItemNotFound))?;
    if !item.status.can_transition_to(status) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot move item from {:?} to {:?}", item.status, status).to_lowercase(),
        )
        .into());
    }
    let item = db::orders::set_item_status(&mut tx, item.id, status, now).await?;

    let mut events = vec![KitchenEvent::ItemUpdated {
        tenant_id: order.tenant_id,
        branch_id: order.branch_id,
        order_id: order.id,
        item: item.clone(),
    }];

    let items = db::orders::items(&mut *tx, order.id).await?;
    let order = match follow_up(&order, &items) {
        OrderFollowUp::None => order,
        OrderFollowUp::MarkServed => {
            let order = db::orders::set_status(&mut tx, order.id, OrderStatus::Served, now).await?;
            events.push(KitchenEvent::OrderUpdated(OrderDetail {
                order: order.clone(),
                items: items.clone(),
            }));
            order
        }
        OrderFollowUp::Complete => {
            let order = db::orders::set_status(&mut tx, order.id, OrderStatus::Completed, now).await?;
            let freed = release_table_if_idle(&mut tx, table.as_ref(), now).await?;
            tracing::info!(order_id = order.id, table_freed = freed, "Order completed by kitchen");
            events.push(KitchenEvent::OrderCompleted(OrderDetail {
                order: order.clone(),
                items: items.clone(),
            }));
            order
        }
    };

    actor
        .audit(
            &mut *tx,
            "order.item_status",
            "order_item",
            Some(item.id),
            json!({ "order_id": order.id, "status": status }),
            now,
        )
        .await?;
    tx.commit().await?;

    state.kitchen.broadcast_all(events).await;
    Ok(OrderDetail { order, items })
}

/// Manual order status change (forward only, never `completed`)
pub async fn update_status(
    state: &AppState,
    actor: &Actor,
    order_id: i64,
    status: OrderStatus,
) -> ServiceResult<OrderDetail> {
    if status == OrderStatus::Cancelled {
        return cancel(state, actor, order_id).await;
    }

    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let (order, _table) = lock_order(&mut tx, user, order_id).await?;
    if !order.status.can_transition_to(status) {
        return Err(transition_error(order.status, status).into());
    }
    let order = db::orders::set_status(&mut tx, order.id, status, now).await?;

    actor
        .audit(
            &mut *tx,
            "order.status",
            "restaurant_order",
            Some(order.id),
            json!({ "status": status }),
            now,
        )
        .await?;
    let detail = order_detail(&mut *tx, order).await?;
    tx.commit().await?;

    state.kitchen.broadcast(KitchenEvent::OrderUpdated(detail.clone())).await;
    Ok(detail)
}

/// Cancel an open tab without a sale, freeing the table when nothing else is on it
pub async fn cancel(state: &AppState, actor: &Actor, order_id: i64) -> ServiceResult<OrderDetail> {
    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let (order, table) = lock_order(&mut tx, user, order_id).await?;
    ensure_open(&order)?;
    ownership::ensure_can_operate(user, &order, table.as_ref())?;

    db::orders::cancel_open_items(&mut tx, order.id, now).await?;
    let order = db::orders::cancel(&mut tx, order.id, now).await?;
    let table_freed = release_table_if_idle(&mut tx, table.as_ref(), now).await?;

    actor
        .audit(
            &mut *tx,
            "order.cancel",
            "restaurant_order",
            Some(order.id),
            json!({ "order_number": order.order_number, "table_freed": table_freed }),
            now,
        )
        .await?;
    let detail = order_detail(&mut *tx, order).await?;
    tx.commit().await?;

    tracing::info!(order_id = detail.order.id, table_freed, "Order cancelled");
    state.kitchen.broadcast(KitchenEvent::OrderCancelled(detail.clone())).await;
    Ok(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::ProductType;

    fn order(status: OrderStatus, is_tab_open: bool) -> RestaurantOrder {
        RestaurantOrder {
            id: 1,
            tenant_id: 1,
            branch_id: 1,
            order_number: "O-00000001".into(),
            table_id: Some(1),
            customer_id: None,
            created_by: 1,
            status,
            is_tab_open,
            notes: None,
            sale_id: None,
            created_at: 0,
            updated_at: 0,
            closed_at: None,
        }
    }

    fn line(status: ItemStatus) -> OrderItem {
        OrderItem {
            id: 1,
            order_id: 1,
            product_id: 1,
            name: "Soup".into(),
            item_type: ProductType::MenuItem,
            unit_price: Decimal::new(600, 2),
            quantity: 1,
            modifiers: vec![],
            status,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_all_billable_served_ignores_cancelled() {
        assert!(all_billable_served(&[line(ItemStatus::Served), line(ItemStatus::Cancelled)]));
        assert!(!all_billable_served(&[line(ItemStatus::Served), line(ItemStatus::Ready)]));
    }

    #[test]
    fn test_follow_up_on_closed_tab_completes() {
        let items = [line(ItemStatus::Served)];
        assert_eq!(follow_up(&order(OrderStatus::Ready, false), &items), OrderFollowUp::Complete);
        assert_eq!(
            follow_up(&order(OrderStatus::Ready, false), &[line(ItemStatus::Ready)]),
            OrderFollowUp::None
        );
    }

    #[test]
    fn test_follow_up_on_open_tab_marks_served() {
        let items = [line(ItemStatus::Served)];
        assert_eq!(follow_up(&order(OrderStatus::Preparing, true), &items), OrderFollowUp::MarkServed);
        assert_eq!(follow_up(&order(OrderStatus::Served, true), &items), OrderFollowUp::None);
        assert_eq!(follow_up(&order(OrderStatus::Completed, false), &items), OrderFollowUp::None);
    }

    #[test]
    fn test_ensure_open() {
        assert!(ensure_open(&order(OrderStatus::Pending, true)).is_ok());
        assert_eq!(
            ensure_open(&order(OrderStatus::Served, false)).unwrap_err().code,
            ErrorCode::TabAlreadyClosed
        );
        assert_eq!(
            ensure_open(&order(OrderStatus::Cancelled, false)).unwrap_err().code,
            ErrorCode::OrderAlreadyCancelled
        );
    }

    #[test]
    fn test_transition_errors() {
        assert_eq!(
            transition_error(OrderStatus::Ready, OrderStatus::Pending).code,
            ErrorCode::InvalidStatusTransition
        );
        assert_eq!(
            transition_error(OrderStatus::Completed, OrderStatus::Served).code,
            ErrorCode::OrderAlreadyCompleted
        );
    }
}
