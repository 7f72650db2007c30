//! Hospitality room model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Bookable room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Room {
    pub id: i64,
    pub tenant_id: i64,
    pub branch_id: i64,
    pub room_number: String,
    pub room_type: Option<String>,
    pub capacity: i32,
    pub nightly_rate: Decimal,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create room payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoomCreate {
    #[validate(length(min = 1, max = 20), custom(function = "super::validate::not_blank"))]
    pub room_number: String,
    #[validate(length(max = 50))]
    pub room_type: Option<String>,
    #[validate(range(min = 1, max = 20))]
    pub capacity: Option<i32>,
    #[validate(custom(function = "super::validate::money"))]
    pub nightly_rate: Decimal,
    pub branch_id: Option<i64>,
}

/// Update room payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoomUpdate {
    #[validate(length(min = 1, max = 20), custom(function = "super::validate::not_blank"))]
    pub room_number: Option<String>,
    #[validate(length(max = 50))]
    pub room_type: Option<String>,
    #[validate(range(min = 1, max = 20))]
    pub capacity: Option<i32>,
    #[validate(custom(function = "super::validate::money"))]
    pub nightly_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}
