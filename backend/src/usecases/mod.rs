pub mod accounts;
pub mod admin_coupons;
pub mod admin_dashboard;
pub mod admin_messages;
pub mod admin_users;
pub mod applications;
pub mod contact;
pub mod coupon_engine;
pub mod courses;
pub mod payment_reconciler;
