//! Staff account and login payloads

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::role::Role;

/// Staff account as returned by the API (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: i64,
    pub tenant_id: i64,
    pub branch_id: Option<i64>,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create staff payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StaffCreate {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100), custom(function = "super::validate::not_blank"))]
    pub full_name: String,
    pub role: Role,
    /// Required for every role except owner
    pub branch_id: Option<i64>,
}

/// Update staff payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StaffUpdate {
    #[validate(length(min = 1, max = 100), custom(function = "super::validate::not_blank"))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub branch_id: Option<i64>,
    pub is_active: Option<bool>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

/// Staff list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffFilter {
    pub role: Option<Role>,
    pub branch_id: Option<i64>,
    pub search: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Public sign-up: a new tenant with its first branch and owner
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150), custom(function = "super::validate::not_blank"))]
    pub business_name: String,
    #[validate(length(min = 1, max = 100), custom(function = "super::validate::not_blank"))]
    pub branch_name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "super::validate::not_blank"))]
    pub full_name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: Staff,
}
