use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::audit_logs::{AuditLogEntity, InsertAuditLogEntity};
use crate::domain::value_objects::enums::audit_categories::AuditCategory;

#[async_trait]
#[automock]
pub trait AuditLogRepository {
    async fn insert(&self, entry: InsertAuditLogEntity) -> Result<Uuid>;

    /// Newest first.
    async fn list(
        &self,
        category: Option<AuditCategory>,
        limit: i64,
    ) -> Result<Vec<AuditLogEntity>>;

    async fn count_by_category_since(&self, since: DateTime<Utc>) -> Result<Vec<(String, i64)>>;
}
