//! Sale arithmetic and the close-tab plan
//!
//! Pure functions: everything here is computed from rows already loaded
//! inside the closing transaction, so the rules are unit-testable without a
//! database.
//!
//! - line subtotal = (unit price + Σ modifier prices) × quantity
//! - discount = flat amount (capped at the subtotal) or % of the subtotal
//! - tax = tax rate % of (subtotal − discount)
//! - final = subtotal − discount + tax
//!
//! Every amount is rounded to 2 dp, half away from zero.

use std::collections::BTreeMap;

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};
use shared::models::{Discount, DiscountKind, Modifier, OrderDetail, ProductType};

use crate::db::sales::NewSaleItem;

const DECIMAL_PLACES: u32 = 2;

/// Round to cents, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Unit price including every chosen modifier
pub fn unit_price_with_modifiers(unit_price: Decimal, modifiers: &[Modifier]) -> Decimal {
    unit_price + modifiers.iter().map(|m| m.price).sum::<Decimal>()
}

pub fn line_subtotal(unit_price: Decimal, modifiers: &[Modifier], quantity: i32) -> Decimal {
    round_money(unit_price_with_modifiers(unit_price, modifiers) * Decimal::from(quantity))
}

/// Sale header amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub final_amount: Decimal,
}

pub fn discount_amount(subtotal: Decimal, discount: Option<&Discount>) -> Decimal {
    let Some(discount) = discount else {
        return Decimal::ZERO;
    };
    let raw = match discount.kind {
        DiscountKind::Flat => discount.value,
        DiscountKind::Percentage => subtotal * discount.value / Decimal::ONE_HUNDRED,
    };
    round_money(raw.clamp(Decimal::ZERO, subtotal))
}

pub fn compute_totals(
    subtotal: Decimal,
    discount: Option<&Discount>,
    tax_rate: Option<Decimal>,
) -> Totals {
    let subtotal = round_money(subtotal);
    let discount_amount = discount_amount(subtotal, discount);
    let taxable = subtotal - discount_amount;
    let tax_amount = round_money(taxable * tax_rate.unwrap_or_default() / Decimal::ONE_HUNDRED);
    Totals {
        subtotal,
        discount_amount,
        tax_amount,
        final_amount: taxable + tax_amount,
    }
}

/// Reject a percentage above 100 that slipped past payload validation
pub fn check_discount(discount: Option<&Discount>) -> Result<(), AppError> {
    match discount {
        Some(d) if d.value.is_sign_negative() && !d.value.is_zero() => {
            Err(AppError::new(ErrorCode::InvalidDiscount))
        }
        Some(Discount {
            kind: DiscountKind::Percentage,
            value,
        }) if *value > Decimal::ONE_HUNDRED => Err(AppError::new(ErrorCode::InvalidDiscount)),
        _ => Ok(()),
    }
}

/// Everything the closing transaction has to write
#[derive(Debug, Clone, PartialEq)]
pub struct ClosePlan {
    pub lines: Vec<NewSaleItem>,
    /// product id → quantity to take out of stock (`PRODUCT` lines only)
    pub stock: BTreeMap<i64, i32>,
    pub totals: Totals,
    /// Orders whose every billable line is served
    pub completed_order_ids: Vec<i64>,
    /// Every billable line across all closed orders is served
    pub all_served: bool,
}

/// Price the open tabs being closed.
///
/// Cancelled lines are not billed. A tab with nothing billable is refused.
pub fn plan_close(
    orders: &[OrderDetail],
    discount: Option<&Discount>,
    tax_rate: Option<Decimal>,
) -> Result<ClosePlan, AppError> {
    check_discount(discount)?;

    let mut lines = Vec::new();
    let mut stock: BTreeMap<i64, i32> = BTreeMap::new();
    let mut completed_order_ids = Vec::new();
    let mut all_served = true;

    for detail in orders {
        let mut order_served = true;
        for item in detail.items.iter().filter(|i| i.status.is_billable()) {
            let unit_price = round_money(unit_price_with_modifiers(item.unit_price, &item.modifiers));
            lines.push(NewSaleItem {
                product_id: item.product_id,
                name: item.name.clone(),
                item_type: item.item_type,
                quantity: item.quantity,
                unit_price,
                subtotal: line_subtotal(item.unit_price, &item.modifiers, item.quantity),
            });
            if item.item_type == ProductType::Product {
                *stock.entry(item.product_id).or_insert(0) += item.quantity;
            }
            if item.status != shared::models::ItemStatus::Served {
                order_served = false;
            }
        }
        if order_served {
            completed_order_ids.push(detail.order.id);
        } else {
            all_served = false;
        }
    }

    if lines.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::OrderEmpty,
            "Nothing to bill on this tab",
        ));
    }

    let subtotal = lines.iter().map(|l| l.subtotal).sum();
    Ok(ClosePlan {
        totals: compute_totals(subtotal, discount, tax_rate),
        lines,
        stock,
        completed_order_ids,
        all_served,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{ItemStatus, OrderItem, OrderStatus, RestaurantOrder};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(id: i64, product_id: i64, kind: ProductType, price: &str, qty: i32, status: ItemStatus) -> OrderItem {
        OrderItem {
            id,
            order_id: 0,
            product_id,
            name: format!("item-{id}"),
            item_type: kind,
            unit_price: d(price),
            quantity: qty,
            modifiers: vec![],
            status,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn order(id: i64, items: Vec<OrderItem>) -> OrderDetail {
        OrderDetail {
            order: RestaurantOrder {
                id,
                tenant_id: 1,
                branch_id: 1,
                order_number: format!("O-{id:08}"),
                table_id: Some(1),
                customer_id: None,
                created_by: 1,
                status: OrderStatus::Served,
                is_tab_open: true,
                notes: None,
                sale_id: None,
                created_at: 0,
                updated_at: 0,
                closed_at: None,
            },
            items: items
                .into_iter()
                .map(|mut i| {
                    i.order_id = id;
                    i
                })
                .collect(),
        }
    }

    #[test]
    fn test_line_subtotal_includes_modifiers() {
        let mods = vec![
            Modifier { name: "cheese".into(), price: d("1.50") },
            Modifier { name: "bacon".into(), price: d("2.00") },
        ];
        assert_eq!(line_subtotal(d("8.00"), &mods, 3), d("34.50"));
        assert_eq!(line_subtotal(d("8.00"), &[], 0), d("0.00"));
    }

    #[test]
    fn test_totals_flat_discount_and_tax() {
        let t = compute_totals(
            d("100.00"),
            Some(&Discount { kind: DiscountKind::Flat, value: d("10") }),
            Some(d("8")),
        );
        assert_eq!(t.discount_amount, d("10.00"));
        assert_eq!(t.tax_amount, d("7.20"));
        assert_eq!(t.final_amount, d("97.20"));
        assert_eq!(t.final_amount, t.subtotal - t.discount_amount + t.tax_amount);
    }

    #[test]
    fn test_totals_percentage_discount_rounds_half_away() {
        let t = compute_totals(
            d("33.35"),
            Some(&Discount { kind: DiscountKind::Percentage, value: d("10") }),
            None,
        );
        // 3.335 → 3.34
        assert_eq!(t.discount_amount, d("3.34"));
        assert_eq!(t.final_amount, d("30.01"));
    }

    #[test]
    fn test_flat_discount_capped_at_subtotal() {
        let t = compute_totals(
            d("5.00"),
            Some(&Discount { kind: DiscountKind::Flat, value: d("20") }),
            Some(d("10")),
        );
        assert_eq!(t.discount_amount, d("5.00"));
        assert_eq!(t.tax_amount, d("0.00"));
        assert_eq!(t.final_amount, d("0.00"));
    }

    #[test]
    fn test_invalid_percentage_discount() {
        let bad = Discount { kind: DiscountKind::Percentage, value: d("150") };
        assert_eq!(check_discount(Some(&bad)).unwrap_err().code, ErrorCode::InvalidDiscount);
        let flat = Discount { kind: DiscountKind::Flat, value: d("150") };
        assert!(check_discount(Some(&flat)).is_ok());
    }

    #[test]
    fn test_final_amount_equals_items_minus_discount_plus_tax() {
        let orders = vec![
            order(1, vec![
                item(1, 10, ProductType::Product, "4.99", 3, ItemStatus::Served),
                item(2, 11, ProductType::MenuItem, "12.50", 1, ItemStatus::Served),
            ]),
            order(2, vec![item(3, 12, ProductType::Service, "7.25", 2, ItemStatus::Served)]),
        ];
        let discount = Discount { kind: DiscountKind::Percentage, value: d("15") };
        let plan = plan_close(&orders, Some(&discount), Some(d("7.5"))).unwrap();

        let items_sum: Decimal = plan.lines.iter().map(|l| l.subtotal).sum();
        assert_eq!(items_sum, d("41.97"));
        assert_eq!(plan.totals.subtotal, items_sum);
        assert_eq!(
            plan.totals.final_amount,
            items_sum - plan.totals.discount_amount + plan.totals.tax_amount
        );
    }

    #[test]
    fn test_stock_only_for_physical_products() {
        let orders = vec![
            order(1, vec![
                item(1, 10, ProductType::Product, "2.00", 2, ItemStatus::Served),
                item(2, 11, ProductType::MenuItem, "9.00", 1, ItemStatus::Served),
                item(3, 12, ProductType::Service, "5.00", 1, ItemStatus::Served),
            ]),
            order(2, vec![item(4, 10, ProductType::Product, "2.00", 3, ItemStatus::Ready)]),
        ];
        let plan = plan_close(&orders, None, None).unwrap();
        assert_eq!(plan.stock.len(), 1);
        assert_eq!(plan.stock.get(&10), Some(&5));
    }

    #[test]
    fn test_table_freed_only_when_everything_served() {
        let served = vec![order(1, vec![item(1, 10, ProductType::MenuItem, "9.00", 1, ItemStatus::Served)])];
        let plan = plan_close(&served, None, None).unwrap();
        assert!(plan.all_served);
        assert_eq!(plan.completed_order_ids, vec![1]);

        let mixed = vec![
            order(1, vec![item(1, 10, ProductType::MenuItem, "9.00", 1, ItemStatus::Served)]),
            order(2, vec![
                item(2, 10, ProductType::MenuItem, "9.00", 1, ItemStatus::Served),
                item(3, 11, ProductType::MenuItem, "4.00", 1, ItemStatus::Preparing),
            ]),
        ];
        let plan = plan_close(&mixed, None, None).unwrap();
        assert!(!plan.all_served);
        assert_eq!(plan.completed_order_ids, vec![1]);
    }

    #[test]
    fn test_cancelled_lines_not_billed() {
        let orders = vec![order(1, vec![
            item(1, 10, ProductType::Product, "3.00", 1, ItemStatus::Served),
            item(2, 10, ProductType::Product, "3.00", 4, ItemStatus::Cancelled),
        ])];
        let plan = plan_close(&orders, None, None).unwrap();
        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.totals.subtotal, d("3.00"));
        assert_eq!(plan.stock.get(&10), Some(&1));
        // a cancelled line does not hold the table
        assert!(plan.all_served);
    }

    #[test]
    fn test_nothing_billable_is_refused() {
        let orders = vec![order(1, vec![item(1, 10, ProductType::MenuItem, "3.00", 1, ItemStatus::Cancelled)])];
        assert_eq!(plan_close(&orders, None, None).unwrap_err().code, ErrorCode::OrderEmpty);
        assert_eq!(plan_close(&[], None, None).unwrap_err().code, ErrorCode::OrderEmpty);
    }
}
