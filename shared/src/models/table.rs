//! Restaurant Table Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Table occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(
    feature = "db",
    sqlx(type_name = "table_status", rename_all = "lowercase")
)]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
}

/// Restaurant table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RestaurantTable {
    pub id: i64,
    pub tenant_id: i64,
    pub branch_id: i64,
    pub name: String,
    pub capacity: i32,
    pub status: TableStatus,
    /// Cashier who claimed the table with the first open tab
    pub assigned_cashier_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create table payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TableCreate {
    #[validate(length(min = 1, max = 50), custom(function = "super::validate::not_blank"))]
    pub name: String,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    pub branch_id: Option<i64>,
}

/// Update table payload
///
/// `status` may only move between `available` and `reserved`; occupancy is
/// driven by tabs.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TableUpdate {
    #[validate(length(min = 1, max = 50), custom(function = "super::validate::not_blank"))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    pub status: Option<TableStatus>,
}

/// Table list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableFilter {
    pub status: Option<TableStatus>,
    pub branch_id: Option<i64>,
}
