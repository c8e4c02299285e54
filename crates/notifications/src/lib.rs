pub mod events;
pub mod notifier;
pub mod smtp;
