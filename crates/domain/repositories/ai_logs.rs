use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::ai_logs::{AiLogEntity, InsertAiLogEntity};

#[async_trait]
#[automock]
pub trait AiLogRepository {
    async fn insert(&self, log: InsertAiLogEntity) -> Result<Uuid>;

    async fn list_recent(&self, limit: i64) -> Result<Vec<AiLogEntity>>;
}
