use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::ai_prompts::{AiPromptEntity, InsertAiPromptEntity};
use crate::domain::value_objects::ai_prompts::PromptSeedOutcome;

#[async_trait]
#[automock]
pub trait AiPromptRepository {
    async fn list(&self) -> Result<Vec<AiPromptEntity>>;

    async fn find_by_prompt_id(&self, prompt_id: &str) -> Result<Option<AiPromptEntity>>;

    /// Returns false when no prompt has `id`.
    async fn update_content(&self, id: Uuid, content: &str) -> Result<bool>;

    /// Inserts the prompts whose `prompt_id` is missing. With `overwrite`,
    /// existing rows are replaced by the given values as well.
    async fn seed(
        &self,
        prompts: Vec<InsertAiPromptEntity>,
        overwrite: bool,
    ) -> Result<PromptSeedOutcome>;
}
