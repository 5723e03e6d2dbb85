use std::{collections::HashMap, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use axum::http::StatusCode;
use crates::{
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::{
            enums::plans::Plan,
            subscriptions::{CurrentSubscriptionDto, RedirectUrlDto},
        },
    },
    payments::stripe_client::{CheckoutSessionParams, StripeClient},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StripeGateway: Send + Sync {
    async fn create_customer(
        &self,
        app_slug: &str,
        user_id: &str,
        email: Option<String>,
    ) -> AnyResult<String>;

    async fn create_checkout_session(&self, params: CheckoutSessionParams) -> AnyResult<String>;

    async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> AnyResult<String>;
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_customer(
        &self,
        app_slug: &str,
        user_id: &str,
        email: Option<String>,
    ) -> AnyResult<String> {
        self.create_customer(app_slug, user_id, email.as_deref()).await
    }

    async fn create_checkout_session(&self, params: CheckoutSessionParams) -> AnyResult<String> {
        self.create_checkout_session(params).await
    }

    async fn create_portal_session(&self, customer_id: &str, return_url: &str) -> AnyResult<String> {
        self.create_portal_session(customer_id, return_url).await
    }
}

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("{0} not configured")]
    Configuration(&'static str),
    #[error("the {0} plan cannot be purchased")]
    InvalidPlan(Plan),
    #[error("No Stripe customer found. Subscribe first.")]
    NoCustomer,
    #[error("Stripe request failed")]
    Stripe(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BillingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BillingError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            BillingError::InvalidPlan(_) | BillingError::NoCustomer => StatusCode::BAD_REQUEST,
            BillingError::Stripe(_) => StatusCode::BAD_GATEWAY,
            BillingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BillingError>;

#[derive(Debug, Clone, Default)]
pub struct BillingSettings {
    pub price_pro: Option<String>,
    pub price_enterprise: Option<String>,
    pub site_url: String,
    pub app_slug: String,
}

impl BillingSettings {
    fn price_for(&self, plan: Plan) -> UseCaseResult<&str> {
        let (env_name, price) = match plan {
            Plan::Pro => ("STRIPE_PRICE_PRO", self.price_pro.as_deref()),
            Plan::Enterprise => ("STRIPE_PRICE_ENTERPRISE", self.price_enterprise.as_deref()),
            Plan::Free => return Err(BillingError::InvalidPlan(plan)),
        };
        price.ok_or(BillingError::Configuration(env_name))
    }
}

pub struct BillingUseCase<S, G>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: StripeGateway + 'static,
{
    subscription_repo: Arc<S>,
    stripe: Option<Arc<G>>,
    settings: BillingSettings,
}

impl<S, G> BillingUseCase<S, G>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    G: StripeGateway + 'static,
{
    /// `stripe` is `None` when `STRIPE_SECRET_KEY` is not set.
    pub fn new(subscription_repo: Arc<S>, stripe: Option<Arc<G>>, settings: BillingSettings) -> Self {
        Self {
            subscription_repo,
            stripe,
            settings,
        }
    }

    fn stripe(&self) -> UseCaseResult<&Arc<G>> {
        self.stripe.as_ref().ok_or_else(|| {
            warn!("billing: STRIPE_SECRET_KEY is not configured");
            BillingError::Configuration("STRIPE_SECRET_KEY")
        })
    }

    pub async fn get_subscription(&self, user_id: Uuid) -> UseCaseResult<Option<CurrentSubscriptionDto>> {
        let profile = self
            .subscription_repo
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "billing: failed to load profile");
                BillingError::Internal(err)
            })?;

        Ok(profile.map(|profile| CurrentSubscriptionDto {
            plan: profile.plan(),
            stripe_customer_id: profile.stripe_customer_id,
        }))
    }

    /// Starts a subscription-mode Checkout session, creating the Stripe
    /// customer on first purchase.
    pub async fn create_checkout_session(
        &self,
        user_id: Uuid,
        email: Option<String>,
        plan: Plan,
    ) -> UseCaseResult<RedirectUrlDto> {
        info!(%user_id, plan = %plan, "billing: checkout requested");

        let stripe = self.stripe()?;
        let price_id = self.settings.price_for(plan)?.to_string();

        let profile = self
            .subscription_repo
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "billing: failed to load profile for checkout");
                BillingError::Internal(err)
            })?;

        let customer_id = match profile.and_then(|profile| profile.stripe_customer_id) {
            Some(existing) => existing,
            None => {
                let created = stripe
                    .create_customer(&self.settings.app_slug, &user_id.to_string(), email)
                    .await
                    .map_err(|err| {
                        error!(%user_id, error = ?err, "billing: failed to create stripe customer");
                        BillingError::Stripe(err)
                    })?;

                self.subscription_repo
                    .set_stripe_customer_id(user_id, &created)
                    .await
                    .map_err(|err| {
                        error!(%user_id, db_error = ?err, "billing: failed to store stripe customer id");
                        BillingError::Internal(err)
                    })?;

                info!(%user_id, customer_id = %created, "billing: stripe customer created");
                created
            }
        };

        let params = CheckoutSessionParams {
            customer_id,
            price_id,
            success_url: format!("{}/pricing?success=true", self.settings.site_url),
            cancel_url: format!("{}/pricing?canceled=true", self.settings.site_url),
            metadata: HashMap::from([
                ("app".to_string(), self.settings.app_slug.clone()),
                ("userId".to_string(), user_id.to_string()),
                ("plan".to_string(), plan.to_string()),
            ]),
        };

        let url = stripe.create_checkout_session(params).await.map_err(|err| {
            error!(%user_id, error = ?err, "billing: failed to create checkout session");
            BillingError::Stripe(err)
        })?;

        Ok(RedirectUrlDto { url })
    }

    pub async fn create_portal_session(&self, user_id: Uuid) -> UseCaseResult<RedirectUrlDto> {
        let stripe = self.stripe()?;

        let customer_id = self
            .subscription_repo
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "billing: failed to load profile for portal");
                BillingError::Internal(err)
            })?
            .and_then(|profile| profile.stripe_customer_id)
            .ok_or(BillingError::NoCustomer)?;

        let return_url = format!("{}/billing", self.settings.site_url);
        let url = stripe
            .create_portal_session(&customer_id, &return_url)
            .await
            .map_err(|err| {
                error!(%user_id, %customer_id, error = ?err, "billing: failed to create portal session");
                BillingError::Stripe(err)
            })?;

        Ok(RedirectUrlDto { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        entities::user_profiles::UserProfileEntity,
        repositories::subscriptions::MockSubscriptionRepository,
    };
    use mockall::predicate::eq;

    fn settings() -> BillingSettings {
        BillingSettings {
            price_pro: Some("price_pro_1".to_string()),
            price_enterprise: None,
            site_url: "https://app.example.com".to_string(),
            app_slug: "acme".to_string(),
        }
    }

    fn profile(user_id: Uuid, customer: Option<&str>) -> UserProfileEntity {
        UserProfileEntity {
            id: Uuid::new_v4(),
            user_id,
            name: "Grace".to_string(),
            role: "user".to_string(),
            stripe_customer_id: customer.map(str::to_string),
            plan: "pro".to_string(),
            monthly_usage_count: 0,
            usage_reset_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn checkout_creates_and_links_customer_on_first_purchase() {
        let user_id = Uuid::new_v4();

        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |id| {
                let entity = profile(id, None);
                Box::pin(async move { Ok(Some(entity)) })
            });
        repo.expect_set_stripe_customer_id()
            .withf(move |id, customer| *id == user_id && customer.to_string() == "cus_new")
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_create_customer()
            .withf(move |app, uid, _| app.to_string() == "acme" && uid.to_string() == user_id.to_string())
            .times(1)
            .returning(|_, _, _| Ok("cus_new".to_string()));
        stripe
            .expect_create_checkout_session()
            .withf(move |params| {
                params.customer_id == "cus_new"
                    && params.price_id == "price_pro_1"
                    && params.success_url == "https://app.example.com/pricing?success=true"
                    && params.metadata.get("plan").map(String::as_str) == Some("pro")
                    && params.metadata.get("userId") == Some(&user_id.to_string())
            })
            .times(1)
            .returning(|_| Ok("https://checkout.stripe.com/c/pay/cs_1".to_string()));

        let usecase = BillingUseCase::new(Arc::new(repo), Some(Arc::new(stripe)), settings());
        let redirect = usecase
            .create_checkout_session(user_id, None, Plan::Pro)
            .await
            .unwrap();

        assert_eq!(redirect.url, "https://checkout.stripe.com/c/pay/cs_1");
    }

    #[tokio::test]
    async fn checkout_reuses_linked_customer() {
        let user_id = Uuid::new_v4();
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_user_id().returning(move |id| {
            let entity = profile(id, Some("cus_existing"));
            Box::pin(async move { Ok(Some(entity)) })
        });
        repo.expect_set_stripe_customer_id().never();

        let mut stripe = MockStripeGateway::new();
        stripe.expect_create_customer().never();
        stripe
            .expect_create_checkout_session()
            .withf(|params| params.customer_id == "cus_existing")
            .returning(|_| Ok("https://checkout.example/cs".to_string()));

        let usecase = BillingUseCase::new(Arc::new(repo), Some(Arc::new(stripe)), settings());
        assert!(
            usecase
                .create_checkout_session(user_id, None, Plan::Pro)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn missing_price_is_a_configuration_error() {
        let usecase = BillingUseCase::new(
            Arc::new(MockSubscriptionRepository::new()),
            Some(Arc::new(MockStripeGateway::new())),
            settings(),
        );

        let err = usecase
            .create_checkout_session(Uuid::new_v4(), None, Plan::Enterprise)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "STRIPE_PRICE_ENTERPRISE not configured");
    }

    #[tokio::test]
    async fn missing_secret_key_is_a_configuration_error() {
        let usecase: BillingUseCase<MockSubscriptionRepository, MockStripeGateway> =
            BillingUseCase::new(Arc::new(MockSubscriptionRepository::new()), None, settings());

        let err = usecase.create_portal_session(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), "STRIPE_SECRET_KEY not configured");
    }

    #[tokio::test]
    async fn free_plan_cannot_be_purchased() {
        let usecase = BillingUseCase::new(
            Arc::new(MockSubscriptionRepository::new()),
            Some(Arc::new(MockStripeGateway::new())),
            settings(),
        );

        let err = usecase
            .create_checkout_session(Uuid::new_v4(), None, Plan::Free)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::InvalidPlan(Plan::Free)));
    }

    #[tokio::test]
    async fn portal_requires_linked_customer() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_user_id().returning(|id| {
            let entity = profile(id, None);
            Box::pin(async move { Ok(Some(entity)) })
        });

        let usecase = BillingUseCase::new(Arc::new(repo), Some(Arc::new(MockStripeGateway::new())), settings());

        let err = usecase.create_portal_session(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No Stripe customer found. Subscribe first.");
    }

    #[tokio::test]
    async fn portal_returns_to_billing_page() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_user_id().returning(|id| {
            let entity = profile(id, Some("cus_9"));
            Box::pin(async move { Ok(Some(entity)) })
        });
        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_create_portal_session()
            .withf(|customer, return_url| {
                customer.to_string() == "cus_9"
                    && return_url.to_string() == "https://app.example.com/billing"
            })
            .returning(|_, _| Ok("https://billing.stripe.com/p/session".to_string()));

        let usecase = BillingUseCase::new(Arc::new(repo), Some(Arc::new(stripe)), settings());
        let redirect = usecase.create_portal_session(Uuid::new_v4()).await.unwrap();
        assert_eq!(redirect.url, "https://billing.stripe.com/p/session");
    }

    #[tokio::test]
    async fn subscription_lookup_maps_profile() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_user_id().returning(|id| {
            let entity = profile(id, Some("cus_1"));
            Box::pin(async move { Ok(Some(entity)) })
        });

        let usecase: BillingUseCase<MockSubscriptionRepository, MockStripeGateway> =
            BillingUseCase::new(Arc::new(repo), None, settings());

        let dto = usecase.get_subscription(Uuid::new_v4()).await.unwrap().unwrap();
        assert_eq!(dto.plan, Plan::Pro);
        assert_eq!(dto.stripe_customer_id.as_deref(), Some("cus_1"));
    }
}
