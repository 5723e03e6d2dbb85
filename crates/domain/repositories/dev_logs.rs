use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::dev_logs::{DevLogEntity, InsertDevLogEntity};
use crate::domain::value_objects::enums::dev_log_levels::DevLogLevel;

#[async_trait]
#[automock]
pub trait DevLogRepository {
    async fn insert(&self, entry: InsertDevLogEntity) -> Result<Uuid>;

    /// Newest first.
    async fn list(
        &self,
        level: Option<DevLogLevel>,
        component: Option<String>,
        limit: i64,
    ) -> Result<Vec<DevLogEntity>>;

    /// Deletes up to `batch_size` non-error rows created before `cutoff`.
    async fn delete_non_error_older_than(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<usize>;
}
