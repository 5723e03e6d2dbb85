use std::sync::Arc;

use axum::http::StatusCode;
use crates::{
    domain::{
        entities::audit_logs::InsertAuditLogEntity,
        repositories::{audit_logs::AuditLogRepository, subscriptions::SubscriptionRepository},
        value_objects::enums::{audit_categories::AuditCategory, plans::Plan},
    },
    payments::{
        stripe_events::{
            CheckoutSession, StripeEventDecodeError, StripeWebhookEvent, SubscriptionObject,
            decode_stripe_event,
        },
        webhook_signature::verify_stripe_signature,
    },
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const SUBSCRIPTION_ACTIVATED: &str = "billing.subscription_activated";
pub const SUBSCRIPTION_STATUS_CHANGED: &str = "billing.subscription_status_changed";
pub const SUBSCRIPTION_CANCELLED: &str = "billing.subscription_cancelled";

/// Subscription statuses that end paid access.
const TERMINAL_STATUSES: [&str; 2] = ["canceled", "unpaid"];

#[derive(Debug, Error)]
pub enum StripeWebhookError {
    #[error("Missing stripe-signature header")]
    MissingSignature,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Webhook error")]
    InvalidPayload(#[from] StripeEventDecodeError),
    #[error("Webhook error")]
    Internal(#[from] anyhow::Error),
}

impl StripeWebhookError {
    /// Stripe only stops redelivering on 2xx, so every failure is a 400.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

pub type UseCaseResult<T> = std::result::Result<T, StripeWebhookError>;

/// What a delivery did to local state.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookDisposition {
    Activated { user_id: Uuid, plan: Plan },
    Downgraded { stripe_customer_id: String },
    Acknowledged,
}

pub struct StripeWebhookUseCase<S, A>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    audit_log_repo: Arc<A>,
    webhook_secret: Option<String>,
}

impl<S, A> StripeWebhookUseCase<S, A>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, audit_log_repo: Arc<A>, webhook_secret: Option<String>) -> Self {
        if webhook_secret.is_none() {
            warn!("stripe_webhook: STRIPE_WEBHOOK_SECRET is not set, signature verification is disabled");
        }
        Self {
            subscription_repo,
            audit_log_repo,
            webhook_secret,
        }
    }

    /// Verifies, decodes and applies one delivery. `now` is unix seconds.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
        now: i64,
    ) -> UseCaseResult<WebhookDisposition> {
        if let Some(secret) = self.webhook_secret.as_deref() {
            let header = signature_header.ok_or_else(|| {
                warn!("stripe_webhook: missing stripe-signature header");
                StripeWebhookError::MissingSignature
            })?;

            if !verify_stripe_signature(payload, header, secret, now) {
                warn!(payload_size = payload.len(), "stripe_webhook: signature verification failed");
                return Err(StripeWebhookError::InvalidSignature);
            }
        }

        let decoded = decode_stripe_event(payload).map_err(|err| {
            error!(error = ?err, "stripe_webhook: failed to decode event");
            StripeWebhookError::from(err)
        })?;

        info!(
            event_id = ?decoded.id,
            event_type = %decoded.event.event_type(),
            "stripe_webhook: event received"
        );

        match decoded.event {
            StripeWebhookEvent::CheckoutSessionCompleted(session) => {
                self.handle_checkout_completed(session).await
            }
            StripeWebhookEvent::SubscriptionUpdated(subscription) => {
                self.handle_subscription_updated(subscription).await
            }
            StripeWebhookEvent::SubscriptionDeleted(subscription) => {
                self.handle_subscription_deleted(subscription).await
            }
            StripeWebhookEvent::Unhandled { event_type } => {
                info!(%event_type, "stripe_webhook: event type ignored");
                Ok(WebhookDisposition::Acknowledged)
            }
        }
    }

    async fn handle_checkout_completed(&self, session: CheckoutSession) -> UseCaseResult<WebhookDisposition> {
        let session_id = session.id.clone();

        // Acknowledged with 200 so Stripe stops retrying; a missing userId
        // usually means the session was created outside this app.
        let Some(raw_user_id) = session.metadata_value("userId") else {
            warn!(session_id = ?session_id, "stripe_webhook: missing userId in session metadata");
            return Ok(WebhookDisposition::Acknowledged);
        };

        let Ok(user_id) = Uuid::parse_str(raw_user_id) else {
            warn!(
                session_id = ?session_id,
                user_id = %raw_user_id,
                "stripe_webhook: userId in session metadata is not a valid id"
            );
            return Ok(WebhookDisposition::Acknowledged);
        };

        let raw_plan = session.metadata_value("plan").unwrap_or("pro");
        let plan = match Plan::from_str(raw_plan) {
            Some(plan) if plan.is_paid() => plan,
            _ => {
                warn!(
                    %user_id,
                    session_id = ?session_id,
                    plan = %raw_plan,
                    "stripe_webhook: checkout plan is not a paid plan"
                );
                return Ok(WebhookDisposition::Acknowledged);
            }
        };

        let Some(customer_id) = session.customer.as_deref() else {
            warn!(%user_id, session_id = ?session_id, "stripe_webhook: checkout session has no customer");
            return Ok(WebhookDisposition::Acknowledged);
        };

        self.subscription_repo
            .activate_subscription(user_id, customer_id, plan)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    %customer_id,
                    plan = %plan,
                    db_error = ?err,
                    "stripe_webhook: failed to activate subscription"
                );
                StripeWebhookError::Internal(err)
            })?;

        self.record_audit(InsertAuditLogEntity::system(
            SUBSCRIPTION_ACTIVATED,
            AuditCategory::Billing,
            Some(user_id),
            json!({ "plan": plan, "customerId": customer_id, "sessionId": session_id }),
        ))
        .await?;

        info!(%user_id, %customer_id, plan = %plan, "stripe_webhook: subscription activated");
        Ok(WebhookDisposition::Activated { user_id, plan })
    }

    async fn handle_subscription_updated(
        &self,
        subscription: SubscriptionObject,
    ) -> UseCaseResult<WebhookDisposition> {
        let status = subscription.status.as_deref().unwrap_or_default();
        if !TERMINAL_STATUSES.contains(&status) {
            info!(
                customer_id = %subscription.customer,
                %status,
                "stripe_webhook: subscription update does not change plan"
            );
            return Ok(WebhookDisposition::Acknowledged);
        }

        self.downgrade(
            &subscription,
            SUBSCRIPTION_STATUS_CHANGED,
            json!({
                "customerId": subscription.customer,
                "subscriptionId": subscription.id,
                "status": status,
            }),
        )
        .await
    }

    async fn handle_subscription_deleted(
        &self,
        subscription: SubscriptionObject,
    ) -> UseCaseResult<WebhookDisposition> {
        self.downgrade(
            &subscription,
            SUBSCRIPTION_CANCELLED,
            json!({
                "customerId": subscription.customer,
                "subscriptionId": subscription.id,
            }),
        )
        .await
    }

    async fn downgrade(
        &self,
        subscription: &SubscriptionObject,
        action: &str,
        details: serde_json::Value,
    ) -> UseCaseResult<WebhookDisposition> {
        let customer_id = subscription.customer.as_str();

        let owner = self
            .subscription_repo
            .find_by_stripe_customer_id(customer_id)
            .await
            .map_err(|err| {
                error!(%customer_id, db_error = ?err, "stripe_webhook: failed to load profile by customer");
                StripeWebhookError::Internal(err)
            })?;

        let updated = self
            .subscription_repo
            .downgrade_by_customer_id(customer_id)
            .await
            .map_err(|err| {
                error!(%customer_id, db_error = ?err, "stripe_webhook: failed to downgrade subscription");
                StripeWebhookError::Internal(err)
            })?;

        if !updated {
            warn!(%customer_id, "stripe_webhook: no profile linked to customer, nothing downgraded");
        }

        self.record_audit(InsertAuditLogEntity::system(
            action,
            AuditCategory::Billing,
            owner.map(|profile| profile.user_id),
            details,
        ))
        .await?;

        info!(%customer_id, %action, "stripe_webhook: subscription moved to free plan");
        Ok(WebhookDisposition::Downgraded {
            stripe_customer_id: customer_id.to_string(),
        })
    }

    async fn record_audit(&self, entry: InsertAuditLogEntity) -> UseCaseResult<()> {
        let action = entry.action.clone();
        self.audit_log_repo.insert(entry).await.map_err(|err| {
            error!(%action, db_error = ?err, "stripe_webhook: failed to write audit entry");
            StripeWebhookError::Internal(err)
        })?;
        Ok(())
    }
}
