use serde::Deserialize;

use super::enums::audit_categories::AuditCategory;

/// Client-reported audit event, e.g. a sign-in or a settings change.
#[derive(Debug, Clone, Deserialize)]
pub struct LogAuditModel {
    pub action: String,
    pub category: AuditCategory,
    pub target_id: Option<String>,
    /// Free text or serialized JSON, stored as given.
    #[serde(default)]
    pub details: String,
}
