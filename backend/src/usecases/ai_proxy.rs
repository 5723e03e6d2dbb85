use std::{sync::Arc, time::Instant};

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use crates::{
    domain::{
        entities::ai_logs::InsertAiLogEntity, repositories::ai_logs::AiLogRepository,
        value_objects::enums::ai_call_statuses::AiCallStatus,
    },
    inference::{
        errors::AiCallError,
        retry::{RetryPolicy, classify_chat_response, run_with_retry},
        transport::InferenceTransport,
        types::{
            ChatCompletion, ChatRequest, ImageGenerationBody, ImageGenerationResponse,
            PromptSummary, extract_prompt_text, truncate_chars,
        },
    },
};
use tracing::{error, info, warn};
use uuid::Uuid;

const PROMPT_LOG_MAX_CHARS: usize = 2000;
const RESPONSE_LOG_MAX_CHARS: usize = 8000;
const ERROR_LOG_MAX_CHARS: usize = 2000;
const API_KEY_ENV: &str = "INFERENCE_API_KEY";

/// HTTP status for an AI call failure as seen by API clients.
pub fn ai_call_status(err: &AiCallError) -> StatusCode {
    match err {
        AiCallError::Configuration(_) | AiCallError::Transient { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AiCallError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        AiCallError::Upstream { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// `req-<unix millis>-<6 random chars>`
pub fn new_request_id(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();
    format!("req-{}-{}", now.timestamp_millis(), suffix)
}

pub struct AiProxyUseCase<T, L>
where
    T: InferenceTransport + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    transport: Option<Arc<T>>,
    ai_log_repo: Arc<L>,
    retry_policy: RetryPolicy,
}

impl<T, L> AiProxyUseCase<T, L>
where
    T: InferenceTransport + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    /// `transport` is `None` when no API key is configured.
    pub fn new(transport: Option<Arc<T>>, ai_log_repo: Arc<L>) -> Self {
        Self {
            transport,
            ai_log_repo,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn transport(&self) -> Result<&Arc<T>, AiCallError> {
        self.transport.as_ref().ok_or_else(|| {
            warn!("ai_proxy: {} is not configured", API_KEY_ENV);
            AiCallError::Configuration(API_KEY_ENV)
        })
    }

    /// Fails with the configuration error when no API key is set, so callers
    /// can refuse before charging quota.
    pub fn ensure_configured(&self) -> Result<(), AiCallError> {
        self.transport().map(|_| ())
    }

    /// Sends a chat completion with retries and records exactly one call log.
    pub async fn chat(&self, request: ChatRequest) -> Result<String, AiCallError> {
        let transport = self.transport()?;

        let body = serde_json::to_string(&request.body())
            .map_err(|err| AiCallError::InvalidRequest(err.to_string()))?;
        let prompt = extract_prompt_text(&request.messages);

        let started_at = Utc::now();
        let request_id = new_request_id(started_at);
        let timer = Instant::now();

        info!(
            %request_id,
            model = %request.model,
            caller = %request.caller,
            "ai_proxy: calling model"
        );

        let outcome = run_with_retry(&self.retry_policy, &request_id, |_| {
            let transport = Arc::clone(transport);
            let body = body.clone();
            async move { classify_chat_response(transport.post_chat(body).await) }
        })
        .await;

        let duration_ms = timer.elapsed().as_millis() as i64;

        let (result, completion) = match outcome.result {
            Ok(completion) => {
                let content = completion.content().to_string();
                if content.is_empty() {
                    let message = format!(
                        "Empty content. Finish: {}, Tokens: {}",
                        completion.finish_reason().unwrap_or("none"),
                        completion
                            .usage
                            .and_then(|usage| usage.completion_tokens)
                            .map(|tokens| tokens.to_string())
                            .unwrap_or_else(|| "none".to_string()),
                    );
                    let status = outcome.last_http_status.unwrap_or_default();
                    (Err(AiCallError::Upstream { status, message }), Some(completion))
                } else {
                    (Ok(content), Some(completion))
                }
            }
            Err(failure) => (Err(AiCallError::from(failure)), None),
        };

        match &result {
            Ok(_) => info!(
                %request_id,
                attempts = outcome.attempts,
                duration_ms,
                "ai_proxy: call succeeded"
            ),
            Err(err) => warn!(
                %request_id,
                attempts = outcome.attempts,
                duration_ms,
                error = %err,
                "ai_proxy: call failed"
            ),
        }

        let log = CallLog {
            request_id: &request_id,
            request: &request,
            prompt: &prompt,
            started_at,
            duration_ms,
            request_body_size: body.len() as i64,
            http_status: outcome.last_http_status,
            completion: completion.as_ref(),
            result: &result,
        }
        .into_entity();

        // The call outcome never depends on whether the log could be written.
        if let Err(err) = self.ai_log_repo.insert(log).await {
            error!(%request_id, db_error = ?err, "ai_proxy: failed to save call log");
        }

        result
    }

    /// Single image generation call; not retried and not logged.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, AiCallError> {
        let transport = self.transport()?;

        let body = serde_json::to_string(&ImageGenerationBody::new(prompt))
            .map_err(|err| AiCallError::InvalidRequest(err.to_string()))?;

        let response = transport.post_image(body).await.map_err(|err| {
            warn!(error = ?err, "ai_proxy: image request failed before a response");
            AiCallError::Transient {
                status: None,
                message: format!("network error: {err}"),
            }
        })?;

        if !response.is_success() {
            warn!(status = response.status, "ai_proxy: image API returned an error");
            return Err(AiCallError::Upstream {
                status: response.status,
                message: response.body,
            });
        }

        let parsed: ImageGenerationResponse = serde_json::from_str(&response.body).map_err(|err| {
            AiCallError::Upstream {
                status: response.status,
                message: format!("invalid image response: {err}"),
            }
        })?;

        parsed
            .first_image()
            .map(str::to_string)
            .ok_or_else(|| AiCallError::Upstream {
                status: response.status,
                message: "image API did not return b64_json".to_string(),
            })
    }
}

struct CallLog<'a> {
    request_id: &'a str,
    request: &'a ChatRequest,
    prompt: &'a PromptSummary,
    started_at: DateTime<Utc>,
    duration_ms: i64,
    request_body_size: i64,
    http_status: Option<u16>,
    completion: Option<&'a ChatCompletion>,
    result: &'a Result<String, AiCallError>,
}

impl CallLog<'_> {
    fn into_entity(self) -> InsertAiLogEntity {
        let response_content = self.completion.map(|c| c.content()).unwrap_or_default();
        let usage = self.completion.and_then(|c| c.usage);

        let (status, error_message) = match self.result {
            Ok(_) => (AiCallStatus::Success, None),
            Err(err) => (
                AiCallStatus::Error,
                Some(truncate_chars(&err.to_string(), ERROR_LOG_MAX_CHARS)),
            ),
        };

        InsertAiLogEntity {
            request_id: self.request_id.to_string(),
            model: self.request.model.clone(),
            caller: self.request.caller.clone(),
            started_at: self.started_at,
            duration_ms: self.duration_ms,
            system_prompt: truncate_chars(&self.prompt.system_prompt, PROMPT_LOG_MAX_CHARS),
            user_prompt_text: truncate_chars(&self.prompt.user_prompt_text, PROMPT_LOG_MAX_CHARS),
            has_image: self.prompt.has_image,
            image_size_bytes: Some(self.prompt.image_size_bytes).filter(|size| *size > 0),
            temperature: Some(self.request.temperature),
            max_tokens: Some(self.request.max_tokens),
            request_body_size: self.request_body_size,
            status: status.to_string(),
            http_status: self.http_status.map(i32::from).unwrap_or_default(),
            response_content: truncate_chars(response_content, RESPONSE_LOG_MAX_CHARS),
            response_size: response_content.len() as i64,
            finish_reason: self.completion.and_then(|c| c.finish_reason()).map(str::to_string),
            prompt_tokens: usage.and_then(|u| u.prompt_tokens),
            completion_tokens: usage.and_then(|u| u.completion_tokens),
            total_tokens: usage.and_then(|u| u.total_tokens),
            error_message,
        }
    }
}
