use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::infra::db::postgres::schema::ai_logs;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Serialize)]
#[diesel(table_name = ai_logs)]
pub struct AiLogEntity {
    pub id: Uuid,
    pub request_id: String,
    pub model: String,
    pub caller: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub system_prompt: String,
    pub user_prompt_text: String,
    pub has_image: bool,
    pub image_size_bytes: Option<i64>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i32>,
    pub request_body_size: i64,
    pub status: String,
    pub http_status: i32,
    pub response_content: String,
    pub response_size: i64,
    pub finish_reason: Option<String>,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
    pub error_message: Option<String>,
}

/// One record per outbound inference call. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = ai_logs)]
pub struct InsertAiLogEntity {
    pub request_id: String,
    pub model: String,
    pub caller: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub system_prompt: String,
    pub user_prompt_text: String,
    pub has_image: bool,
    pub image_size_bytes: Option<i64>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i32>,
    pub request_body_size: i64,
    pub status: String,
    pub http_status: i32,
    pub response_content: String,
    pub response_size: i64,
    pub finish_reason: Option<String>,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
    pub error_message: Option<String>,
}
