//! Counter sales and manual stock movements

use std::collections::{BTreeMap, HashMap};

use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Product, RetailSaleCreate, RetailSaleLine, SaleDetail, SaleSource, StockAdjustment,
};
use shared::util::{now_millis, sanitize_inline_text};

use super::Actor;
use super::billing::{check_discount, compute_totals, line_subtotal, round_money};
use crate::cache;
use crate::db;
use crate::db::sales::{NewSale, NewSaleItem};
use crate::error::ServiceResult;
use crate::state::AppState;

/// Sale lines plus per-product stock needs
#[derive(Debug, Clone, PartialEq)]
pub struct RetailPlan {
    pub lines: Vec<NewSaleItem>,
    pub stock: BTreeMap<i64, i32>,
}

/// Price retail lines against locked product rows.
///
/// Products must be active and visible from `branch_id`. Stock-tracked
/// products need enough on hand for the summed quantity of all their lines.
pub fn plan_retail(
    products: &HashMap<i64, Product>,
    branch_id: i64,
    lines: &[RetailSaleLine],
) -> Result<RetailPlan, AppError> {
    let mut planned = Vec::with_capacity(lines.len());
    let mut stock: BTreeMap<i64, i32> = BTreeMap::new();

    for line in lines {
        let product = products
            .get(&line.product_id)
            .filter(|p| p.branch_id.is_none_or(|b| b == branch_id))
            .ok_or_else(|| AppError::for_product(ErrorCode::ProductNotFound, line.product_id))?;
        if !product.is_active {
            return Err(AppError::for_product(ErrorCode::ProductInactive, product.id));
        }
        planned.push(NewSaleItem {
            product_id: product.id,
            name: product.name.clone(),
            item_type: product.product_type,
            quantity: line.quantity,
            unit_price: round_money(product.price),
            subtotal: line_subtotal(product.price, &[], line.quantity),
        });
        if product.product_type.tracks_stock() {
            *stock.entry(product.id).or_insert(0) += line.quantity;
        }
    }

    for (&product_id, &needed) in &stock {
        let on_hand = products.get(&product_id).map_or(0, |p| p.stock_quantity);
        if needed > on_hand {
            return Err(AppError::with_message(
                ErrorCode::ProductOutOfStock,
                format!("Only {on_hand} left in stock"),
            )
            .with_detail("product_id", product_id)
            .with_detail("requested", needed));
        }
    }

    Ok(RetailPlan {
        lines: planned,
        stock,
    })
}

/// Ring up a counter sale
pub async fn create_sale(
    state: &AppState,
    actor: &Actor,
    req: &RetailSaleCreate,
) -> ServiceResult<SaleDetail> {
    let user = &actor.user;
    let branch_id = user.target_branch(req.branch_id)?;
    check_discount(req.discount.as_ref())?;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    if let Some(customer_id) = req.customer_id
        && !db::customers::exists(&mut *tx, user.tenant_id, customer_id).await?
    {
        return Err(AppError::new(ErrorCode::CustomerNotFound).into());
    }

    let ids: Vec<i64> = req.items.iter().map(|l| l.product_id).collect();
    let products: HashMap<i64, Product> = db::products::find_many_for_update(&mut tx, user.tenant_id, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let plan = plan_retail(&products, branch_id, &req.items)?;

    let subtotal = plan.lines.iter().map(|l| l.subtotal).sum();
    let totals = compute_totals(subtotal, req.discount.as_ref(), req.tax_rate);
    let sale = db::sales::insert(
        &mut tx,
        &NewSale {
            tenant_id: user.tenant_id,
            branch_id,
            customer_id: req.customer_id,
            cashier_id: user.id,
            source: SaleSource::Retail,
            subtotal: totals.subtotal,
            discount_amount: totals.discount_amount,
            tax_amount: totals.tax_amount,
            final_amount: totals.final_amount,
            payment_method: req.payment_method,
        },
        now,
    )
    .await?;
    let items = db::sales::insert_items(&mut tx, sale.id, &plan.lines).await?;
    for (&product_id, &quantity) in &plan.stock {
        db::products::decrement_stock(&mut tx, user.tenant_id, product_id, quantity, now).await?;
    }

    actor
        .audit(
            &mut *tx,
            "sale.create",
            "sale",
            Some(sale.id),
            json!({ "sale_number": sale.sale_number, "final_amount": sale.final_amount, "lines": items.len() }),
            now,
        )
        .await?;
    tx.commit().await?;

    tracing::info!(sale_id = sale.id, sale_number = %sale.sale_number, "Retail sale recorded");
    if !plan.stock.is_empty() {
        state.cache.invalidate_prefix(&cache::product_prefix(user.tenant_id)).await;
    }
    Ok(SaleDetail { sale, items })
}

/// Manual stock correction (delivery, breakage, count)
pub async fn adjust_stock(
    state: &AppState,
    actor: &Actor,
    product_id: i64,
    req: &StockAdjustment,
) -> ServiceResult<Product> {
    let user = &actor.user;
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let product = db::products::find(&mut *tx, user.tenant_id, product_id)
        .await?
        .filter(|p| p.branch_id.is_none_or(|b| user.can_access_branch(b)))
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    if !product.product_type.tracks_stock() {
        return Err(AppError::with_message(
            ErrorCode::ValidationFailed,
            "Only PRODUCT items carry stock",
        )
        .into());
    }

    let updated = db::products::adjust_stock(&mut tx, user.tenant_id, product.id, req.delta, now)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductOutOfStock, "Stock cannot go below zero")
                .with_detail("product_id", product.id)
        })?;

    actor
        .audit(
            &mut *tx,
            "product.stock",
            "product",
            Some(updated.id),
            json!({
                "delta": req.delta,
                "reason": sanitize_inline_text(&req.reason),
                "stock_quantity": updated.stock_quantity,
            }),
            now,
        )
        .await?;
    tx.commit().await?;

    state.cache.invalidate_prefix(&cache::product_prefix(user.tenant_id)).await;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::ProductType;

    fn product(id: i64, kind: ProductType, price: &str, stock: i32) -> Product {
        Product {
            id,
            tenant_id: 1,
            branch_id: None,
            name: format!("p{id}"),
            sku: None,
            category: None,
            product_type: kind,
            price: price.parse().unwrap(),
            cost: None,
            stock_quantity: stock,
            low_stock_threshold: 0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<i64, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    fn line(product_id: i64, quantity: i32) -> RetailSaleLine {
        RetailSaleLine { product_id, quantity }
    }

    #[test]
    fn test_plan_prices_lines_and_tracks_products_only() {
        let products = catalog(vec![
            product(1, ProductType::Product, "2.50", 10),
            product(2, ProductType::Service, "15.00", 0),
        ]);
        let plan = plan_retail(&products, 1, &[line(1, 3), line(2, 1)]).unwrap();
        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].subtotal, Decimal::new(750, 2));
        assert_eq!(plan.lines[1].subtotal, Decimal::new(1500, 2));
        assert_eq!(plan.stock.get(&1), Some(&3));
        assert!(!plan.stock.contains_key(&2));
    }

    #[test]
    fn test_plan_sums_repeated_lines_against_stock() {
        let products = catalog(vec![product(1, ProductType::Product, "1.00", 4)]);
        assert!(plan_retail(&products, 1, &[line(1, 2), line(1, 2)]).is_ok());

        let err = plan_retail(&products, 1, &[line(1, 3), line(1, 2)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductOutOfStock);
    }

    #[test]
    fn test_plan_rejects_unknown_inactive_and_foreign_products() {
        let mut inactive = product(2, ProductType::Product, "1.00", 5);
        inactive.is_active = false;
        let mut foreign = product(3, ProductType::Product, "1.00", 5);
        foreign.branch_id = Some(99);
        let products = catalog(vec![inactive, foreign]);

        assert_eq!(plan_retail(&products, 1, &[line(1, 1)]).unwrap_err().code, ErrorCode::ProductNotFound);
        assert_eq!(plan_retail(&products, 1, &[line(2, 1)]).unwrap_err().code, ErrorCode::ProductInactive);
        assert_eq!(plan_retail(&products, 1, &[line(3, 1)]).unwrap_err().code, ErrorCode::ProductNotFound);
    }
}
