pub mod admin;
pub mod ai;
pub mod ai_prompts;
pub mod audit_logs;
pub mod dev_logs;
pub mod enums;
pub mod model_costs;
pub mod rate_limits;
pub mod subscriptions;
pub mod usage_limits;
pub mod user_profiles;
