use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::user_profiles::UserProfileEntity;
use crate::domain::value_objects::{enums::plans::Plan, usage_limits::UsageDecision};

/// Plan and Stripe-customer state per user.
///
/// Plan writes (`activate_subscription`, `downgrade_by_customer_id`) are
/// reserved for the Stripe webhook path.
#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserProfileEntity>>;

    async fn find_by_stripe_customer_id(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Option<UserProfileEntity>>;

    /// Upserts the profile so a checkout that lands before the customer id
    /// was linked still activates the plan.
    async fn activate_subscription(
        &self,
        user_id: Uuid,
        stripe_customer_id: &str,
        plan: Plan,
    ) -> Result<UserProfileEntity>;

    /// Returns false when no profile owns the customer id.
    async fn downgrade_by_customer_id(&self, stripe_customer_id: &str) -> Result<bool>;

    async fn set_stripe_customer_id(&self, user_id: Uuid, stripe_customer_id: &str) -> Result<()>;

    /// Applies one unit of monthly usage atomically. `None` when the user has no profile.
    async fn record_usage(&self, user_id: Uuid, now: DateTime<Utc>)
    -> Result<Option<UsageDecision>>;
}
