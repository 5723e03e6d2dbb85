use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::model_costs::{ModelCostEntity, UpsertModelCostEntity};

#[async_trait]
#[automock]
pub trait ModelCostRepository {
    async fn list(&self) -> Result<Vec<ModelCostEntity>>;

    async fn find_by_model(&self, model: &str) -> Result<Option<ModelCostEntity>>;

    /// Keyed on `model`; returns the row id.
    async fn upsert(&self, cost: UpsertModelCostEntity) -> Result<Uuid>;
}
