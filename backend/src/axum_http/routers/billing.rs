use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::subscriptions::CheckoutRequestModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::subscriptions::SubscriptionPostgres,
    },
    payments::stripe_client::StripeClient,
};

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::billing::{BillingSettings, BillingUseCase, StripeGateway},
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let stripe_client = config
        .stripe
        .secret_key
        .clone()
        .map(|secret_key| Arc::new(StripeClient::new(secret_key)));

    let settings = BillingSettings {
        price_pro: config.stripe.price_pro.clone(),
        price_enterprise: config.stripe.price_enterprise.clone(),
        site_url: config.site.url.clone(),
        app_slug: config.site.app_slug.clone(),
    };

    let billing_usecase = BillingUseCase::new(Arc::new(subscription_repository), stripe_client, settings);

    Router::new()
        .route("/subscription", get(current_subscription::<SubscriptionPostgres, StripeClient>))
        .route("/checkout", post(create_checkout_session::<SubscriptionPostgres, StripeClient>))
        .route("/portal", post(create_portal_session::<SubscriptionPostgres, StripeClient>))
        .with_state(Arc::new(billing_usecase))
}

pub async fn current_subscription<S, G>(
    State(billing_usecase): State<Arc<BillingUseCase<S, G>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: StripeGateway + 'static,
{
    let subscription = billing_usecase
        .get_subscription(auth.user_id)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(subscription))
}

pub async fn create_checkout_session<S, G>(
    State(billing_usecase): State<Arc<BillingUseCase<S, G>>>,
    auth: AuthUser,
    Json(checkout_request): Json<CheckoutRequestModel>,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: StripeGateway + 'static,
{
    let redirect = billing_usecase
        .create_checkout_session(auth.user_id, auth.email, checkout_request.plan)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(redirect))
}

pub async fn create_portal_session<S, G>(
    State(billing_usecase): State<Arc<BillingUseCase<S, G>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: StripeGateway + 'static,
{
    let redirect = billing_usecase
        .create_portal_session(auth.user_id)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(redirect))
}
