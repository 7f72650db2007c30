//! Expense Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Branch expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub tenant_id: i64,
    pub branch_id: i64,
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    /// Day the expense was incurred (Unix millis)
    pub incurred_at: i64,
    pub recorded_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create expense payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExpenseCreate {
    #[validate(length(min = 1, max = 64), custom(function = "super::validate::not_blank"))]
    pub category: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "super::validate::positive_money"))]
    pub amount: Decimal,
    pub incurred_at: Option<i64>,
    /// Owners pick the branch; everyone else books against their own
    pub branch_id: Option<i64>,
}

/// Update expense payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExpenseUpdate {
    #[validate(length(min = 1, max = 64), custom(function = "super::validate::not_blank"))]
    pub category: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "super::validate::positive_money"))]
    pub amount: Option<Decimal>,
    pub incurred_at: Option<i64>,
}

/// Expense list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub branch_id: Option<i64>,
}
