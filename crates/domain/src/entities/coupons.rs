use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::coupons;

#[derive(Debug, Clone, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = coupons)]
pub struct CouponEntity {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_amount: Decimal,
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub user_limit: i32,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coupons)]
pub struct InsertCouponEntity {
    pub code: String,
    pub description: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_amount: Decimal,
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub user_limit: i32,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_by: Uuid,
}

/// Editable coupon terms. The code itself is immutable once issued so that
/// existing pricing snapshots keep pointing at the code users redeemed.
#[derive(Debug, Clone)]
pub struct UpdateCouponEntity {
    pub description: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_amount: Decimal,
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub user_limit: i32,
    pub is_active: bool,
    pub valid_until: Option<DateTime<Utc>>,
}
