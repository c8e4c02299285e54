pub mod application_statuses;
pub mod discount_types;
pub mod payment_statuses;
pub mod user_roles;
