use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{enums::plans::Plan, usage_limits::UsageDecision},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UsageLimitError {
    #[error("User profile not found")]
    ProfileNotFound,
    #[error("You've reached your monthly limit of {limit} uses on the {plan} plan. Upgrade to continue!")]
    QuotaExceeded { plan: Plan, limit: i32 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UsageLimitError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UsageLimitError::ProfileNotFound => StatusCode::NOT_FOUND,
            UsageLimitError::QuotaExceeded { .. } => StatusCode::PAYMENT_REQUIRED,
            UsageLimitError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct UsageLimitUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> UsageLimitUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    /// Counts one use against the caller's monthly allowance.
    pub async fn check_and_increment(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<i32, UsageLimitError> {
        let decision = self
            .subscription_repo
            .record_usage(user_id, now)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "usage_limits: failed to record usage");
                UsageLimitError::Internal(err)
            })?;

        match decision {
            None => {
                warn!(%user_id, "usage_limits: no profile for user");
                Err(UsageLimitError::ProfileNotFound)
            }
            Some(UsageDecision::Exceeded { plan, limit }) => {
                info!(%user_id, plan = %plan, limit, "usage_limits: monthly limit reached");
                Err(UsageLimitError::QuotaExceeded { plan, limit })
            }
            Some(UsageDecision::Allowed {
                monthly_usage_count,
                ..
            }) => Ok(monthly_usage_count),
        }
    }
}
