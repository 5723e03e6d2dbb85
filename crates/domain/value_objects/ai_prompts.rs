use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::ai_prompts::InsertAiPromptEntity;

pub const MAIN_SYSTEM_PROMPT: &str = "main_system";
pub const MAIN_USER_PROMPT: &str = "main_user";

const APP_NAME_PLACEHOLDER: &str = "{{APP_NAME}}";

const DEFAULT_PROMPTS: [(&str, &str, &str, &str); 2] = [
    (
        MAIN_SYSTEM_PROMPT,
        "Main System Prompt",
        "You are a helpful AI assistant for {{APP_NAME}}.\n\
         Respond clearly, concisely, and accurately.\n\
         \n\
         CRITICAL: Respond with ONLY a raw JSON object. No markdown, no code fences.\n\
         Your entire response must start with { and end with }.",
        "The primary system prompt for AI interactions.",
    ),
    (
        MAIN_USER_PROMPT,
        "Main User Prompt",
        "User input: \"{{input}}\"\n\
         \n\
         Process this input and respond in the expected JSON format.",
        "The user prompt template for primary AI calls.",
    ),
];

/// Built-in prompts with the app name filled in. `{{input}}` is left for
/// the caller to substitute per request.
pub fn default_prompts(app_name: &str, now: DateTime<Utc>) -> Vec<InsertAiPromptEntity> {
    DEFAULT_PROMPTS
        .iter()
        .map(|(prompt_id, name, content, description)| InsertAiPromptEntity {
            prompt_id: prompt_id.to_string(),
            name: name.to_string(),
            content: content.replace(APP_NAME_PLACEHOLDER, app_name),
            description: description.to_string(),
            updated_at: now,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PromptSeedOutcome {
    pub added: usize,
    pub updated: usize,
}

impl PromptSeedOutcome {
    pub fn message(&self, overwrite: bool) -> String {
        if overwrite {
            format!("Reseeded: {} updated, {} added.", self.updated, self.added)
        } else {
            format!("Seeded {} missing prompts.", self.added)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptSeedResultDto {
    pub added: usize,
    pub updated: usize,
    pub message: String,
}

impl PromptSeedResultDto {
    pub fn new(outcome: PromptSeedOutcome, overwrite: bool) -> Self {
        Self {
            added: outcome.added,
            updated: outcome.updated,
            message: outcome.message(overwrite),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePromptModel {
    pub content: String,
}
