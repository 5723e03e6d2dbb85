use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::audit_categories::AuditCategory,
    infra::db::postgres::schema::audit_logs,
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = audit_logs)]
pub struct AuditLogEntity {
    pub id: Uuid,
    pub action: String,
    pub category: String,
    pub user_id: Option<Uuid>,
    pub target_id: Option<String>,
    pub details: String,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Append-only; rows are never updated.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = audit_logs)]
pub struct InsertAuditLogEntity {
    pub action: String,
    pub category: String,
    pub user_id: Option<Uuid>,
    pub target_id: Option<String>,
    pub details: String,
    pub ip_address: Option<String>,
}

impl InsertAuditLogEntity {
    pub fn system(
        action: &str,
        category: AuditCategory,
        user_id: Option<Uuid>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            action: action.to_string(),
            category: category.to_string(),
            user_id,
            target_id: None,
            details: details.to_string(),
            ip_address: None,
        }
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }
}
