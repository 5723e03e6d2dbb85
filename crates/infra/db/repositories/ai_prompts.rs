use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::ai_prompts},
};
use domain::{
    entities::ai_prompts::{AiPromptEntity, InsertAiPromptEntity},
    repositories::ai_prompts::AiPromptRepository,
    value_objects::ai_prompts::PromptSeedOutcome,
};

pub struct AiPromptPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AiPromptPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AiPromptRepository for AiPromptPostgres {
    async fn list(&self) -> Result<Vec<AiPromptEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = ai_prompts::table
            .order(ai_prompts::prompt_id.asc())
            .select(AiPromptEntity::as_select())
            .load::<AiPromptEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_by_prompt_id(&self, prompt_id: &str) -> Result<Option<AiPromptEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = ai_prompts::table
            .filter(ai_prompts::prompt_id.eq(prompt_id))
            .select(AiPromptEntity::as_select())
            .first::<AiPromptEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn update_content(&self, id: Uuid, content: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(ai_prompts::table.find(id))
            .set((
                ai_prompts::content.eq(content),
                ai_prompts::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected > 0)
    }

    async fn seed(
        &self,
        prompts: Vec<InsertAiPromptEntity>,
        overwrite: bool,
    ) -> Result<PromptSeedOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let mut outcome = PromptSeedOutcome::default();

            for prompt in &prompts {
                let replaced = if overwrite {
                    update(ai_prompts::table)
                        .filter(ai_prompts::prompt_id.eq(&prompt.prompt_id))
                        .set(prompt)
                        .execute(conn)?
                } else {
                    0
                };

                if replaced > 0 {
                    outcome.updated += 1;
                    continue;
                }

                let inserted = insert_into(ai_prompts::table)
                    .values(prompt)
                    .on_conflict(ai_prompts::prompt_id)
                    .do_nothing()
                    .execute(conn)?;
                outcome.added += inserted;
            }

            Ok(outcome)
        })
    }
}
