use serde::Deserialize;

use super::enums::dev_log_levels::DevLogLevel;

pub const DEFAULT_COMPONENT: &str = "system";

#[derive(Debug, Clone, Deserialize)]
pub struct DevLogModel {
    pub level: DevLogLevel,
    pub message: String,
    /// Arbitrary JSON, stored serialized.
    pub context: Option<serde_json::Value>,
    pub component: Option<String>,
}
