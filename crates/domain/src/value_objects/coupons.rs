use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Outcome of a successful coupon evaluation. Carries the full pricing
/// breakdown so callers can preview it or snapshot it onto an application.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DiscountResult {
    pub coupon_id: Uuid,
    pub code: String,
    pub description: String,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub original_price: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
}
