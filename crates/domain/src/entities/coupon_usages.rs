use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::schema::coupon_usages;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = coupon_usages)]
pub struct CouponUsageEntity {
    pub id: Uuid,
    pub coupon_id: Uuid,
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub discount_amount: Decimal,
    pub used_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = coupon_usages)]
pub struct InsertCouponUsageEntity {
    pub coupon_id: Uuid,
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub discount_amount: Decimal,
}
