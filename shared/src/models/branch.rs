//! Branch Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Physical location of a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Branch {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create branch payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BranchCreate {
    #[validate(length(min = 1, max = 100), custom(function = "super::validate::not_blank"))]
    pub name: String,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Update branch payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BranchUpdate {
    #[validate(length(min = 1, max = 100), custom(function = "super::validate::not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}
