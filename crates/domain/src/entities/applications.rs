use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::applications;

#[derive(Debug, Clone, Serialize, Identifiable, Selectable, Queryable)]
#[diesel(table_name = applications)]
pub struct ApplicationEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub coupon_id: Option<Uuid>,
    pub original_price: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = applications)]
pub struct InsertApplicationEntity {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub payment_status: String,
    pub original_price: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
}
