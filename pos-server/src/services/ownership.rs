//! Who may work a tab
//!
//! A tab belongs to the cashier who claimed its table and to the staff member
//! who opened it. Owners and managers may act on any tab of their scope.

use shared::error::{AppError, ErrorCode};
use shared::models::{RestaurantOrder, RestaurantTable};

use crate::auth::CurrentUser;

/// Whether `user` may add items to or close `order`
pub fn can_operate(user: &CurrentUser, order: &RestaurantOrder, table: Option<&RestaurantTable>) -> bool {
    user.is_manager()
        || order.created_by == user.id
        || table.and_then(|t| t.assigned_cashier_id) == Some(user.id)
}

pub fn ensure_can_operate(
    user: &CurrentUser,
    order: &RestaurantOrder,
    table: Option<&RestaurantTable>,
) -> Result<(), AppError> {
    if can_operate(user, order, table) {
        Ok(())
    } else {
        Err(AppError::with_message(
            ErrorCode::NotTabOwner,
            format!("Order {} belongs to another cashier", order.order_number),
        ))
    }
}

/// What opening a new tab on `table` means for its claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClaim {
    /// Unclaimed: the caller becomes the assigned cashier
    Claim,
    /// Already the caller's (or the caller is a manager)
    Keep,
}

pub fn claim_for_new_order(user: &CurrentUser, table: &RestaurantTable) -> Result<TableClaim, AppError> {
    match table.assigned_cashier_id {
        None => Ok(TableClaim::Claim),
        Some(id) if id == user.id || user.is_manager() => Ok(TableClaim::Keep),
        Some(_) => Err(AppError::with_message(
            ErrorCode::TableOccupied,
            format!("Table {} is served by another cashier", table.name),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderStatus, Role, TableStatus};

    fn user(id: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            tenant_id: 1,
            branch_id: Some(1),
            role,
            email: format!("u{id}@example.com"),
        }
    }

    fn order(created_by: i64) -> RestaurantOrder {
        RestaurantOrder {
            id: 1,
            tenant_id: 1,
            branch_id: 1,
            order_number: "O-00000001".into(),
            table_id: Some(1),
            customer_id: None,
            created_by,
            status: OrderStatus::Pending,
            is_tab_open: true,
            notes: None,
            sale_id: None,
            created_at: 0,
            updated_at: 0,
            closed_at: None,
        }
    }

    fn table(assigned: Option<i64>) -> RestaurantTable {
        RestaurantTable {
            id: 1,
            tenant_id: 1,
            branch_id: 1,
            name: "T1".into(),
            capacity: 4,
            status: if assigned.is_some() { TableStatus::Occupied } else { TableStatus::Available },
            assigned_cashier_id: assigned,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_assigned_cashier_and_creator_operate() {
        let t = table(Some(5));
        assert!(can_operate(&user(5, Role::Cashier), &order(9), Some(&t)));
        assert!(can_operate(&user(9, Role::Waiter), &order(9), Some(&t)));
        assert!(!can_operate(&user(7, Role::Cashier), &order(9), Some(&t)));
        assert!(!can_operate(&user(7, Role::Cashier), &order(9), None));
    }

    #[test]
    fn test_managers_operate_any_tab() {
        assert!(can_operate(&user(7, Role::Manager), &order(9), Some(&table(Some(5)))));
        assert!(can_operate(&user(7, Role::Owner), &order(9), None));
    }

    #[test]
    fn test_not_tab_owner_error() {
        let err = ensure_can_operate(&user(7, Role::Cashier), &order(9), Some(&table(Some(5)))).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotTabOwner);
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_table_claim() {
        assert_eq!(claim_for_new_order(&user(5, Role::Cashier), &table(None)).unwrap(), TableClaim::Claim);
        assert_eq!(claim_for_new_order(&user(5, Role::Cashier), &table(Some(5))).unwrap(), TableClaim::Keep);
        assert_eq!(claim_for_new_order(&user(6, Role::Manager), &table(Some(5))).unwrap(), TableClaim::Keep);
        assert_eq!(
            claim_for_new_order(&user(6, Role::Cashier), &table(Some(5))).unwrap_err().code,
            ErrorCode::TableOccupied
        );
    }
}
