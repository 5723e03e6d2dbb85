use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use crates::{
    domain::repositories::{audit_logs::AuditLogRepository, subscriptions::SubscriptionRepository},
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{audit_logs::AuditLogPostgres, subscriptions::SubscriptionPostgres},
    },
};
use tracing::warn;

use crate::{config::config_model::DotEnvyConfig, usecases::stripe_webhook::StripeWebhookUseCase};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let audit_log_repository = AuditLogPostgres::new(Arc::clone(&db_pool));
    let usecase = StripeWebhookUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(audit_log_repository),
        config.stripe.webhook_secret.clone(),
    );

    router(Arc::new(usecase))
}

pub fn router<S, A>(usecase: Arc<StripeWebhookUseCase<S, A>>) -> Router
where
    S: SubscriptionRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/webhook", post(stripe_webhook::<S, A>))
        .with_state(usecase)
}

/// Stripe redelivers anything that is not 2xx, so failures are plain-text 400s.
pub async fn stripe_webhook<S, A>(
    State(usecase): State<Arc<StripeWebhookUseCase<S, A>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match usecase
        .handle_webhook(&body, signature, Utc::now().timestamp())
        .await
    {
        Ok(_) => (StatusCode::OK, "OK").into_response(),
        Err(err) => {
            warn!(error = %err, "stripe webhook router: delivery rejected");
            (err.status_code(), err.to_string()).into_response()
        }
    }
}
