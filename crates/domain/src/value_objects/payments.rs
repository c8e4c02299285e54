use rust_decimal::Decimal;
use uuid::Uuid;

/// Pricing copied onto an application when payment is initialized. Later
/// edits to the course price or coupon terms never change these figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingSnapshot {
    pub original_price: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
    pub coupon_id: Option<Uuid>,
}

/// Result of the atomic completion commit. `newly_completed` is false when
/// the application had already reached `completed` before this call, in
/// which case no coupon mutation happened either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentCommit {
    pub newly_completed: bool,
    pub coupon_redeemed: bool,
}
