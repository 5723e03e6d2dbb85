pub mod ai_logs;
pub mod ai_prompts;
pub mod audit_logs;
pub mod dev_logs;
pub mod model_costs;
pub mod rate_limits;
pub mod subscriptions;
pub mod user_profiles;
