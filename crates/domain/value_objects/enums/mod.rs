pub mod ai_call_statuses;
pub mod audit_categories;
pub mod dev_log_levels;
pub mod plans;
pub mod user_roles;
