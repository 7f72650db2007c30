//! Restaurant order (tab) model
//!
//! An order is a tab opened against a table (or as takeaway). Items move
//! through the kitchen independently of the order status; closing the tab
//! turns it into a [`Sale`](super::sale::Sale).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::product::ProductType;
use super::sale::{Discount, PaymentMethod, SaleDetail};

/// Order lifecycle
///
/// `pending → confirmed → preparing → ready → served → completed`, with
/// `cancelled` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    const fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::Ready => 3,
            OrderStatus::Served => 4,
            OrderStatus::Completed => 5,
            OrderStatus::Cancelled => 6,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether a manual status update from `self` to `next` is allowed.
    ///
    /// Forward moves may skip steps. `completed` is never set by hand; it is
    /// reached by closing the tab.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            OrderStatus::Cancelled => true,
            OrderStatus::Completed => false,
            _ => next.rank() > self.rank(),
        }
    }
}

/// Kitchen status of a single order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "order_item_status", rename_all = "snake_case")
)]
pub enum ItemStatus {
    Pending,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl ItemStatus {
    const fn rank(&self) -> u8 {
        match self {
            ItemStatus::Pending => 0,
            ItemStatus::Preparing => 1,
            ItemStatus::Ready => 2,
            ItemStatus::Served => 3,
            ItemStatus::Cancelled => 4,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Served | ItemStatus::Cancelled)
    }

    /// Cancelled lines are never charged
    pub const fn is_billable(&self) -> bool {
        !matches!(self, ItemStatus::Cancelled)
    }

    pub const fn can_transition_to(&self, next: ItemStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            ItemStatus::Cancelled => true,
            _ => next.rank() > self.rank(),
        }
    }
}

/// Priced add-on chosen for an item (extra cheese, large size)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Modifier {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(custom(function = "super::validate::money"))]
    pub price: Decimal,
}

/// Restaurant order header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RestaurantOrder {
    pub id: i64,
    pub tenant_id: i64,
    pub branch_id: i64,
    pub order_number: String,
    pub table_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub created_by: i64,
    pub status: OrderStatus,
    pub is_tab_open: bool,
    pub notes: Option<String>,
    /// Sale produced when the tab was closed
    pub sale_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub closed_at: Option<i64>,
}

/// Order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub name: String,
    pub item_type: ProductType,
    pub unit_price: Decimal,
    pub quantity: i32,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub modifiers: Vec<Modifier>,
    pub status: ItemStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: RestaurantOrder,
    pub items: Vec<OrderItem>,
}

/// Line to add to an order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemInput {
    pub product_id: i64,
    #[validate(range(min = 1, max = 9999))]
    pub quantity: i32,
    #[serde(default)]
    #[validate(length(max = 20), nested)]
    pub modifiers: Vec<Modifier>,
    #[validate(length(max = 255))]
    pub notes: Option<String>,
}

/// Open a new tab
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    pub table_id: Option<i64>,
    pub customer_id: Option<i64>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100), nested)]
    pub items: Vec<OrderItemInput>,
    /// Owners must name the branch; everyone else orders in their own
    pub branch_id: Option<i64>,
}

/// Add lines to an open tab
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddItemsRequest {
    #[validate(length(min = 1, max = 100), nested)]
    pub items: Vec<OrderItemInput>,
}

/// Manual order status change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Kitchen status change for one line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct ItemStatusUpdate {
    pub status: ItemStatus,
}

/// Close-tab payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CloseTabRequest {
    #[validate(nested)]
    pub discount: Option<Discount>,
    /// Percentage applied to `subtotal - discount`
    #[validate(custom(function = "super::validate::percentage"))]
    pub tax_rate: Option<Decimal>,
    pub payment_method: PaymentMethod,
    /// Overrides the customer recorded on the orders
    pub customer_id: Option<i64>,
}

/// Outcome of closing a tab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseTabResult {
    pub sale: SaleDetail,
    pub closed_order_ids: Vec<i64>,
    /// Orders whose every item was served and are now `completed`
    pub completed_order_ids: Vec<i64>,
    /// Whether the table went back to `available`
    pub table_freed: bool,
}

/// Order list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
    pub is_tab_open: Option<bool>,
    pub branch_id: Option<i64>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_forward_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Served));
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Preparing));
        assert!(!OrderStatus::Served.can_transition_to(OrderStatus::Served));
    }

    #[test]
    fn test_order_completed_only_via_close() {
        assert!(!OrderStatus::Served.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_order_cancel_and_terminal() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Served.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_item_transitions() {
        assert!(ItemStatus::Pending.can_transition_to(ItemStatus::Preparing));
        assert!(ItemStatus::Pending.can_transition_to(ItemStatus::Served));
        assert!(ItemStatus::Ready.can_transition_to(ItemStatus::Cancelled));
        assert!(!ItemStatus::Served.can_transition_to(ItemStatus::Cancelled));
        assert!(!ItemStatus::Ready.can_transition_to(ItemStatus::Pending));
        assert!(!ItemStatus::Cancelled.is_billable());
        assert!(ItemStatus::Pending.is_billable());
    }

    #[test]
    fn test_order_detail_flattens() {
        let detail = OrderDetail {
            order: RestaurantOrder {
                id: 1,
                tenant_id: 1,
                branch_id: 2,
                order_number: "O-00000001".into(),
                table_id: Some(3),
                customer_id: None,
                created_by: 9,
                status: OrderStatus::Pending,
                is_tab_open: true,
                notes: None,
                sale_id: None,
                created_at: 0,
                updated_at: 0,
                closed_at: None,
            },
            items: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["order_number"], "O-00000001");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["is_tab_open"], true);
        assert!(json["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_item_input_defaults_modifiers() {
        let input: OrderItemInput =
            serde_json::from_str(r#"{"product_id": 4, "quantity": 2}"#).unwrap();
        assert!(input.modifiers.is_empty());
        assert!(input.validate().is_ok());

        let input: OrderItemInput =
            serde_json::from_str(r#"{"product_id": 4, "quantity": 0}"#).unwrap();
        assert!(input.validate().is_err());
    }
}
