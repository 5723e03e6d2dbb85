pub mod admin;
pub mod ai;
pub mod ai_settings;
pub mod audit_logs;
pub mod billing;
pub mod dev_logs;
pub mod stripe_webhook;
pub mod users;
