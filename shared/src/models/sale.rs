//! Sale Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::product::ProductType;

/// How a sale was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
    Other,
}

/// Which workflow produced the sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "sale_source", rename_all = "snake_case")
)]
pub enum SaleSource {
    Retail,
    Restaurant,
}

/// Flat amount or percentage of the subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Flat,
    Percentage,
}

/// Discount applied to a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Discount {
    pub kind: DiscountKind,
    #[validate(custom(function = "super::validate::money"))]
    pub value: Decimal,
}

/// Sale header
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub tenant_id: i64,
    pub branch_id: i64,
    pub sale_number: String,
    pub customer_id: Option<i64>,
    pub cashier_id: i64,
    pub source: SaleSource,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub final_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: i64,
}

/// Sale line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub name: String,
    pub item_type: ProductType,
    pub quantity: i32,
    /// Unit price including modifier prices
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Sale with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// One product line of a retail sale
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetailSaleLine {
    pub product_id: i64,
    #[validate(range(min = 1, max = 9999))]
    pub quantity: i32,
}

/// Counter sale payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetailSaleCreate {
    #[validate(length(min = 1, max = 200), nested)]
    pub items: Vec<RetailSaleLine>,
    pub customer_id: Option<i64>,
    #[validate(nested)]
    pub discount: Option<Discount>,
    #[validate(custom(function = "super::validate::percentage"))]
    pub tax_rate: Option<Decimal>,
    pub payment_method: PaymentMethod,
    /// Owners must name the branch; everyone else sells in their own
    pub branch_id: Option<i64>,
}

/// Sale list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleFilter {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub source: Option<SaleSource>,
    pub cashier_id: Option<i64>,
    pub branch_id: Option<i64>,
}
