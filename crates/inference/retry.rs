use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use super::{
    errors::AiCallError,
    transport::TransportResponse,
    types::ChatCompletion,
};

pub const RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after a failed `attempt` (1-based): base * 2^(attempt-1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(2u32.pow(exponent))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptFailure {
    Retryable { status: Option<u16>, message: String },
    Fatal { status: u16, message: String },
}

impl From<AttemptFailure> for AiCallError {
    fn from(value: AttemptFailure) -> Self {
        match value {
            AttemptFailure::Retryable { status, message } => AiCallError::Transient { status, message },
            AttemptFailure::Fatal { status, message } => AiCallError::Upstream { status, message },
        }
    }
}

/// What a single attempt produced. `http_status` is `None` when the request
/// never got a response.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome<T> {
    pub http_status: Option<u16>,
    pub result: Result<T, AttemptFailure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutcome<T> {
    pub result: Result<T, AttemptFailure>,
    pub attempts: u32,
    pub last_http_status: Option<u16>,
}

/// Runs `attempt` until it succeeds, fails fatally, or the policy runs out,
/// sleeping between retryable failures.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, request_id: &str, mut attempt: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut number = 1;

    loop {
        let outcome = attempt(number).await;

        match outcome.result {
            Err(AttemptFailure::Retryable { status, message }) if number < max_attempts => {
                let delay = policy.delay_for(number);
                warn!(
                    %request_id,
                    attempt = number,
                    max_attempts,
                    status = ?status,
                    delay_ms = delay.as_millis() as u64,
                    error = %message,
                    "inference: attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                number += 1;
            }
            result => {
                if result.is_ok() && number > 1 {
                    info!(%request_id, attempt = number, max_attempts, "inference: succeeded after retry");
                }
                return RetryOutcome {
                    result,
                    attempts: number,
                    last_http_status: outcome.http_status,
                };
            }
        }
    }
}

/// Turns a chat transport result into an attempt outcome. Empty content is
/// left for the caller so it can still log usage from the completion.
pub fn classify_chat_response(response: anyhow::Result<TransportResponse>) -> AttemptOutcome<ChatCompletion> {
    let response = match response {
        Ok(response) => response,
        Err(err) => {
            return AttemptOutcome {
                http_status: None,
                result: Err(AttemptFailure::Retryable {
                    status: None,
                    message: format!("network error: {err}"),
                }),
            };
        }
    };

    let status = response.status;
    let result = if response.is_success() {
        serde_json::from_str::<ChatCompletion>(&response.body).map_err(|err| AttemptFailure::Fatal {
            status,
            message: format!("invalid completion body: {err}"),
        })
    } else if RETRYABLE_STATUS_CODES.contains(&status) {
        Err(AttemptFailure::Retryable {
            status: Some(status),
            message: response.body,
        })
    } else {
        Err(AttemptFailure::Fatal {
            status,
            message: response.body,
        })
    };

    AttemptOutcome {
        http_status: Some(status),
        result,
    }
}
