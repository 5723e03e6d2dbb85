use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::value_objects::rate_limits::{BucketDecision, RateLimitPolicy};

#[async_trait]
#[automock]
pub trait RateLimitRepository {
    /// Read-modify-write of one bucket inside a single transaction.
    async fn take_token(
        &self,
        key: &str,
        policy: RateLimitPolicy,
        now: DateTime<Utc>,
    ) -> Result<BucketDecision>;
}
