use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::ai_prompts;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = ai_prompts)]
pub struct AiPromptEntity {
    pub id: Uuid,
    pub prompt_id: String,
    pub name: String,
    pub content: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

/// Also the changeset used when a seed overwrites an existing prompt.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = ai_prompts)]
pub struct InsertAiPromptEntity {
    pub prompt_id: String,
    pub name: String,
    pub content: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}
