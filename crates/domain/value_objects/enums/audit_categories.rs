use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AuditCategory {
    Auth,
    Admin,
    System,
    Billing,
}

impl Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let category = match self {
            AuditCategory::Auth => "auth",
            AuditCategory::Admin => "admin",
            AuditCategory::System => "system",
            AuditCategory::Billing => "billing",
        };
        write!(f, "{}", category)
    }
}

impl AuditCategory {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "auth" => Some(AuditCategory::Auth),
            "admin" => Some(AuditCategory::Admin),
            "system" => Some(AuditCategory::System),
            "billing" => Some(AuditCategory::Billing),
            _ => None,
        }
    }
}
