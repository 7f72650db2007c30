//! Customer Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomerCreate {
    #[validate(length(min = 1, max = 150), custom(function = "super::validate::not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Update customer payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomerUpdate {
    #[validate(length(min = 1, max = 150), custom(function = "super::validate::not_blank"))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}
