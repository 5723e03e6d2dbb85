use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::rate_limits::RateLimitRepository,
    value_objects::rate_limits::{BucketDecision, RateLimitTable},
};
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Rate limit exceeded for {action}. Please wait a moment before trying again.")]
    Exhausted { action: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RateLimitError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RateLimitError::Exhausted { .. } => StatusCode::TOO_MANY_REQUESTS,
            RateLimitError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct RateLimitUseCase<R>
where
    R: RateLimitRepository + Send + Sync + 'static,
{
    rate_limit_repo: Arc<R>,
    table: Arc<RateLimitTable>,
}

impl<R> RateLimitUseCase<R>
where
    R: RateLimitRepository + Send + Sync + 'static,
{
    pub fn new(rate_limit_repo: Arc<R>, table: Arc<RateLimitTable>) -> Self {
        Self {
            rate_limit_repo,
            table,
        }
    }

    /// Takes one token from the caller's bucket for `action`. Actions without
    /// a policy are never limited.
    pub async fn check(&self, user_id: Uuid, action: &str, now: DateTime<Utc>) -> Result<(), RateLimitError> {
        let Some(policy) = self.table.policy_for(action) else {
            debug!(%user_id, %action, "rate_limits: no policy configured, skipping");
            return Ok(());
        };

        let key = RateLimitTable::bucket_key(user_id, action);
        let decision = self
            .rate_limit_repo
            .take_token(&key, policy, now)
            .await
            .map_err(|err| {
                error!(%user_id, %action, db_error = ?err, "rate_limits: failed to update bucket");
                RateLimitError::Internal(err)
            })?;

        match decision {
            BucketDecision::Allowed(state) => {
                debug!(%user_id, %action, tokens_left = state.tokens, "rate_limits: token taken");
                Ok(())
            }
            BucketDecision::Limited { available } => {
                warn!(%user_id, %action, available, "rate_limits: bucket exhausted");
                Err(RateLimitError::Exhausted {
                    action: action.to_string(),
                })
            }
        }
    }
}
