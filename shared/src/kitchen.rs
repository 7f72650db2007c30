//! Kitchen realtime channel: event names, rooms and payloads
//!
//! Clients join rooms after connecting; the server broadcasts order changes
//! to the tenant, branch and kitchen rooms of the order's branch.

use serde::{Deserialize, Serialize};

use crate::models::order::{OrderDetail, OrderItem};

// ── Client → server ──

pub const JOIN_TENANT: &str = "join-tenant";
pub const JOIN_BRANCH: &str = "join-branch";
pub const JOIN_KITCHEN: &str = "join-kitchen";

// ── Server → client ──

pub const ORDER_CREATED: &str = "order:created";
pub const ORDER_UPDATED: &str = "order:updated";
pub const ORDER_ITEM_UPDATED: &str = "order:item-updated";
pub const ORDER_COMPLETED: &str = "order:completed";
pub const ORDER_CANCELLED: &str = "order:cancelled";
/// Sent back to the joining socket with the room name
pub const JOINED: &str = "joined";

pub fn tenant_room(tenant_id: i64) -> String {
    format!("tenant:{tenant_id}")
}

pub fn branch_room(branch_id: i64) -> String {
    format!("branch:{branch_id}")
}

pub fn kitchen_room(branch_id: i64) -> String {
    format!("kitchen:{branch_id}")
}

/// Order change pushed to connected displays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KitchenEvent {
    OrderCreated(OrderDetail),
    OrderUpdated(OrderDetail),
    ItemUpdated {
        tenant_id: i64,
        branch_id: i64,
        order_id: i64,
        item: OrderItem,
    },
    OrderCompleted(OrderDetail),
    OrderCancelled(OrderDetail),
}

impl KitchenEvent {
    /// Wire event name
    pub fn name(&self) -> &'static str {
        match self {
            KitchenEvent::OrderCreated(_) => ORDER_CREATED,
            KitchenEvent::OrderUpdated(_) => ORDER_UPDATED,
            KitchenEvent::ItemUpdated { .. } => ORDER_ITEM_UPDATED,
            KitchenEvent::OrderCompleted(_) => ORDER_COMPLETED,
            KitchenEvent::OrderCancelled(_) => ORDER_CANCELLED,
        }
    }

    fn scope(&self) -> (i64, i64) {
        match self {
            KitchenEvent::OrderCreated(d)
            | KitchenEvent::OrderUpdated(d)
            | KitchenEvent::OrderCompleted(d)
            | KitchenEvent::OrderCancelled(d) => (d.order.tenant_id, d.order.branch_id),
            KitchenEvent::ItemUpdated {
                tenant_id,
                branch_id,
                ..
            } => (*tenant_id, *branch_id),
        }
    }

    /// Rooms that receive this event
    pub fn rooms(&self) -> Vec<String> {
        let (tenant_id, branch_id) = self.scope();
        vec![
            tenant_room(tenant_id),
            branch_room(branch_id),
            kitchen_room(branch_id),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{ItemStatus, OrderStatus, RestaurantOrder};
    use crate::models::product::ProductType;
    use rust_decimal::Decimal;

    fn detail(status: OrderStatus) -> OrderDetail {
        OrderDetail {
            order: RestaurantOrder {
                id: 10,
                tenant_id: 1,
                branch_id: 5,
                order_number: "O-00000010".into(),
                table_id: None,
                customer_id: None,
                created_by: 2,
                status,
                is_tab_open: true,
                notes: None,
                sale_id: None,
                created_at: 0,
                updated_at: 0,
                closed_at: None,
            },
            items: vec![],
        }
    }

    #[test]
    fn test_room_names() {
        assert_eq!(tenant_room(1), "tenant:1");
        assert_eq!(branch_room(5), "branch:5");
        assert_eq!(kitchen_room(5), "kitchen:5");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(
            KitchenEvent::OrderCreated(detail(OrderStatus::Pending)).name(),
            "order:created"
        );
        assert_eq!(
            KitchenEvent::OrderCancelled(detail(OrderStatus::Cancelled)).name(),
            "order:cancelled"
        );
    }

    #[test]
    fn test_event_rooms_follow_order_scope() {
        let event = KitchenEvent::OrderUpdated(detail(OrderStatus::Ready));
        assert_eq!(event.rooms(), vec!["tenant:1", "branch:5", "kitchen:5"]);
    }

    #[test]
    fn test_item_event_payload() {
        let event = KitchenEvent::ItemUpdated {
            tenant_id: 1,
            branch_id: 5,
            order_id: 10,
            item: OrderItem {
                id: 3,
                order_id: 10,
                product_id: 7,
                name: "Burger".into(),
                item_type: ProductType::MenuItem,
                unit_price: Decimal::new(950, 2),
                quantity: 1,
                modifiers: vec![],
                status: ItemStatus::Ready,
                notes: None,
                created_at: 0,
                updated_at: 0,
            },
        };
        assert_eq!(event.name(), "order:item-updated");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["order_id"], 10);
        assert_eq!(json["item"]["status"], "ready");
        assert_eq!(event.rooms()[2], "kitchen:5");
    }
}
