pub mod admin;
pub mod ai_proxy;
pub mod ai_settings;
pub mod audit_logs;
pub mod billing;
pub mod dev_logs;
pub mod rate_limits;
pub mod stripe_webhook;
pub mod usage_limits;
pub mod users;
