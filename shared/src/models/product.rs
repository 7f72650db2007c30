//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// What kind of thing a product line is.
///
/// Only `Product` carries physical stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "product_type", rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum ProductType {
    /// Physical item with tracked stock
    Product,
    /// Labour or service, no stock
    Service,
    /// Prepared dish, no stock
    MenuItem,
}

impl ProductType {
    pub const fn tracks_stock(&self) -> bool {
        matches!(self, ProductType::Product)
    }
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub tenant_id: i64,
    /// `None` means the product is offered in every branch
    pub branch_id: Option<i64>,
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub product_type: ProductType,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 150), custom(function = "super::validate::not_blank"))]
    pub name: String,
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    pub product_type: ProductType,
    #[validate(custom(function = "super::validate::money"))]
    pub price: Decimal,
    #[validate(custom(function = "super::validate::money"))]
    pub cost: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub low_stock_threshold: Option<i32>,
    pub branch_id: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 150), custom(function = "super::validate::not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    pub product_type: Option<ProductType>,
    #[validate(custom(function = "super::validate::money"))]
    pub price: Option<Decimal>,
    #[validate(custom(function = "super::validate::money"))]
    pub cost: Option<Decimal>,
    #[validate(range(min = 0))]
    pub low_stock_threshold: Option<i32>,
    pub is_active: Option<bool>,
}

/// Manual stock correction
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockAdjustment {
    /// Signed change applied to `stock_quantity`
    #[validate(range(min = -100000, max = 100000))]
    pub delta: i32,
    #[validate(length(min = 1, max = 255))]
    pub reason: String,
}

/// Product list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub product_type: Option<ProductType>,
    pub is_active: Option<bool>,
    /// Only rows at or below their low-stock threshold
    pub low_stock: Option<bool>,
    pub branch_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_type_serde() {
        assert_eq!(
            serde_json::to_string(&ProductType::MenuItem).unwrap(),
            "\"MENU_ITEM\""
        );
        let t: ProductType = serde_json::from_str("\"PRODUCT\"").unwrap();
        assert_eq!(t, ProductType::Product);
    }

    #[test]
    fn test_only_products_track_stock() {
        assert!(ProductType::Product.tracks_stock());
        assert!(!ProductType::Service.tracks_stock());
        assert!(!ProductType::MenuItem.tracks_stock());
    }

    #[test]
    fn test_create_validation() {
        let mut payload = ProductCreate {
            name: "Cola".into(),
            sku: None,
            category: Some("Drinks".into()),
            product_type: ProductType::Product,
            price: Decimal::new(250, 2),
            cost: None,
            stock_quantity: Some(10),
            low_stock_threshold: None,
            branch_id: None,
        };
        assert!(payload.validate().is_ok());

        payload.price = Decimal::new(-1, 0);
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));

        payload.price = Decimal::ONE;
        payload.name = "   ".into();
        assert!(payload.validate().is_err());
    }
}
