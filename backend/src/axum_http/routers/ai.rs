use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use chrono::Utc;
use crates::{
    domain::{
        repositories::{
            ai_logs::AiLogRepository, rate_limits::RateLimitRepository,
            subscriptions::SubscriptionRepository,
        },
        value_objects::{
            ai::{ChatResponseDto, ImageRequestModel, ImageResponseDto},
            rate_limits::{AI_CALL_ACTION, GENERATE_ACTION},
        },
    },
    inference::{
        errors::AiCallError,
        transport::{InferenceTransport, ReqwestInferenceTransport},
        types::ChatRequest,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            ai_logs::AiLogPostgres, rate_limits::RateLimitPostgres,
            subscriptions::SubscriptionPostgres,
        },
    },
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::{
        ai_proxy::{AiProxyUseCase, ai_call_status},
        rate_limits::RateLimitUseCase,
        usage_limits::UsageLimitUseCase,
    },
};

pub struct AiRouteState<R, S, T, L>
where
    R: RateLimitRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    T: InferenceTransport + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    rate_limits: Arc<RateLimitUseCase<R>>,
    usage_limits: Arc<UsageLimitUseCase<S>>,
    ai_proxy: Arc<AiProxyUseCase<T, L>>,
}

impl<R, S, T, L> Clone for AiRouteState<R, S, T, L>
where
    R: RateLimitRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    T: InferenceTransport + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            rate_limits: Arc::clone(&self.rate_limits),
            usage_limits: Arc::clone(&self.usage_limits),
            ai_proxy: Arc::clone(&self.ai_proxy),
        }
    }
}

impl<R, S, T, L> AiRouteState<R, S, T, L>
where
    R: RateLimitRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    T: InferenceTransport + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    /// Monthly quota is charged only after the proxy is known to be
    /// configured and the rate limiter let the request through.
    async fn admit(&self, user_id: Uuid, action: &str) -> Result<(), AppError> {
        self.ai_proxy.ensure_configured().map_err(ai_error)?;

        let now = Utc::now();

        self.rate_limits
            .check(user_id, action, now)
            .await
            .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

        let used = self
            .usage_limits
            .check_and_increment(user_id, now)
            .await
            .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

        info!(%user_id, %action, monthly_usage = used, "ai router: request admitted");
        Ok(())
    }
}

type PostgresAiRouteState =
    AiRouteState<RateLimitPostgres, SubscriptionPostgres, ReqwestInferenceTransport, AiLogPostgres>;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let rate_limit_repository = RateLimitPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let ai_log_repository = AiLogPostgres::new(Arc::clone(&db_pool));

    let transport = config.inference.api_key.clone().map(|api_key| {
        Arc::new(ReqwestInferenceTransport::new(
            config.inference.base_url.clone(),
            api_key,
        ))
    });

    let state: PostgresAiRouteState = AiRouteState {
        rate_limits: Arc::new(RateLimitUseCase::new(
            Arc::new(rate_limit_repository),
            Arc::new(config.rate_limits.clone()),
        )),
        usage_limits: Arc::new(UsageLimitUseCase::new(Arc::new(subscription_repository))),
        ai_proxy: Arc::new(AiProxyUseCase::new(transport, Arc::new(ai_log_repository))),
    };

    router(state)
}

pub fn router<R, S, T, L>(state: AiRouteState<R, S, T, L>) -> Router
where
    R: RateLimitRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    T: InferenceTransport + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/chat", post(chat::<R, S, T, L>))
        .route("/images", post(generate_image::<R, S, T, L>))
        .with_state(state)
}

fn ai_error(err: AiCallError) -> AppError {
    AppError::from_usecase(ai_call_status(&err), err)
}

pub async fn chat<R, S, T, L>(
    State(state): State<AiRouteState<R, S, T, L>>,
    auth: AuthUser,
    Json(chat_request): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError>
where
    R: RateLimitRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    T: InferenceTransport + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    state.admit(auth.user_id, AI_CALL_ACTION).await?;

    let content = state.ai_proxy.chat(chat_request).await.map_err(ai_error)?;

    Ok(Json(ChatResponseDto { content }))
}

pub async fn generate_image<R, S, T, L>(
    State(state): State<AiRouteState<R, S, T, L>>,
    auth: AuthUser,
    Json(image_request): Json<ImageRequestModel>,
) -> Result<impl IntoResponse, AppError>
where
    R: RateLimitRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    T: InferenceTransport + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    if image_request.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt must not be empty".to_string()));
    }

    state.admit(auth.user_id, GENERATE_ACTION).await?;

    let image_base64 = state
        .ai_proxy
        .generate_image(&image_request.prompt)
        .await
        .map_err(ai_error)?;

    Ok(Json(ImageResponseDto { image_base64 }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::AUTHORIZATION},
        response::Response,
    };
    use crates::{
        domain::{
            repositories::{
                ai_logs::MockAiLogRepository, rate_limits::MockRateLimitRepository,
                subscriptions::MockSubscriptionRepository,
            },
            value_objects::{
                enums::plans::Plan,
                rate_limits::{BucketDecision, BucketState, RateLimitTable},
                usage_limits::UsageDecision,
            },
        },
        inference::transport::{MockInferenceTransport, TransportResponse},
    };
    use mockall::Sequence;
    use tower::ServiceExt;

    use crate::auth::test_bearer;

    const CHAT_BODY: &str =
        r#"{"model":"meta/llama","messages":[{"role":"user","content":"hello"}],"caller":"tests"}"#;
    const COMPLETION: &str = r#"{"choices":[{"message":{"content":"hi there"},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#;

    type MockRouteState = AiRouteState<
        MockRateLimitRepository,
        MockSubscriptionRepository,
        MockInferenceTransport,
        MockAiLogRepository,
    >;

    fn state(
        rate_limits: MockRateLimitRepository,
        subscriptions: MockSubscriptionRepository,
        transport: Option<MockInferenceTransport>,
        ai_logs: MockAiLogRepository,
    ) -> MockRouteState {
        AiRouteState {
            rate_limits: Arc::new(RateLimitUseCase::new(
                Arc::new(rate_limits),
                Arc::new(RateLimitTable::default()),
            )),
            usage_limits: Arc::new(UsageLimitUseCase::new(Arc::new(subscriptions))),
            ai_proxy: Arc::new(AiProxyUseCase::new(
                transport.map(Arc::new),
                Arc::new(ai_logs),
            )),
        }
    }

    fn app(state: MockRouteState) -> Router {
        Router::new().nest("/api/v1/ai", router(state))
    }

    fn post_json(uri: &str, auth: Option<String>, body: &'static str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn allowed_bucket() -> BucketDecision {
        BucketDecision::Allowed(BucketState {
            tokens: 9.0,
            last_refill: Utc::now(),
        })
    }

    fn allowed_usage() -> Option<UsageDecision> {
        Some(UsageDecision::Allowed {
            monthly_usage_count: 1,
            usage_reset_at: None,
        })
    }

    fn silent_transport() -> MockInferenceTransport {
        let mut transport = MockInferenceTransport::new();
        transport.expect_post_chat().never();
        transport.expect_post_image().never();
        transport
    }

    #[tokio::test]
    async fn chat_runs_rate_limit_then_quota_then_proxy() {
        let mut seq = Sequence::new();

        let mut rate_limits = MockRateLimitRepository::new();
        rate_limits
            .expect_take_token()
            .withf(|key, _, _| key.ends_with(":aiCall"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Box::pin(async { Ok(allowed_bucket()) }));

        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_record_usage()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Box::pin(async { Ok(allowed_usage()) }));

        let mut transport = MockInferenceTransport::new();
        transport
            .expect_post_chat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Box::pin(async {
                    Ok(TransportResponse {
                        status: 200,
                        body: COMPLETION.to_string(),
                    })
                })
            });

        let mut ai_logs = MockAiLogRepository::new();
        ai_logs
            .expect_insert()
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let response = app(state(rate_limits, subscriptions, Some(transport), ai_logs))
            .oneshot(post_json(
                "/api/v1/ai/chat",
                Some(test_bearer(Uuid::new_v4())),
                CHAT_BODY,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["content"], "hi there");
    }

    #[tokio::test]
    async fn rate_limited_chat_is_429_and_charges_no_quota() {
        let mut rate_limits = MockRateLimitRepository::new();
        rate_limits
            .expect_take_token()
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(BucketDecision::Limited { available: 0.2 }) }));

        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_record_usage().never();

        let response = app(state(
            rate_limits,
            subscriptions,
            Some(silent_transport()),
            MockAiLogRepository::new(),
        ))
        .oneshot(post_json(
            "/api/v1/ai/chat",
            Some(test_bearer(Uuid::new_v4())),
            CHAT_BODY,
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("aiCall"));
    }

    #[tokio::test]
    async fn over_quota_chat_is_402_and_never_reaches_the_model() {
        let mut rate_limits = MockRateLimitRepository::new();
        rate_limits
            .expect_take_token()
            .returning(|_, _, _| Box::pin(async { Ok(allowed_bucket()) }));

        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_record_usage().times(1).returning(|_, _| {
            Box::pin(async {
                Ok(Some(UsageDecision::Exceeded {
                    plan: Plan::Free,
                    limit: 10,
                }))
            })
        });

        let mut ai_logs = MockAiLogRepository::new();
        ai_logs.expect_insert().never();

        let response = app(state(
            rate_limits,
            subscriptions,
            Some(silent_transport()),
            ai_logs,
        ))
        .oneshot(post_json(
            "/api/v1/ai/chat",
            Some(test_bearer(Uuid::new_v4())),
            CHAT_BODY,
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[tokio::test]
    async fn unauthenticated_chat_is_401() {
        let mut rate_limits = MockRateLimitRepository::new();
        rate_limits.expect_take_token().never();
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_record_usage().never();

        let response = app(state(
            rate_limits,
            subscriptions,
            Some(silent_transport()),
            MockAiLogRepository::new(),
        ))
        .oneshot(post_json("/api/v1/ai/chat", None, CHAT_BODY))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_api_key_is_503_before_any_quota_is_used() {
        let mut rate_limits = MockRateLimitRepository::new();
        rate_limits.expect_take_token().never();
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_record_usage().never();

        let app = app(state(rate_limits, subscriptions, None, MockAiLogRepository::new()));

        let chat = app
            .clone()
            .oneshot(post_json(
                "/api/v1/ai/chat",
                Some(test_bearer(Uuid::new_v4())),
                CHAT_BODY,
            ))
            .await
            .unwrap();
        assert_eq!(chat.status(), StatusCode::SERVICE_UNAVAILABLE);

        let image = app
            .oneshot(post_json(
                "/api/v1/ai/images",
                Some(test_bearer(Uuid::new_v4())),
                r#"{"prompt":"a lighthouse"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(image.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn blank_image_prompt_is_400_without_admission() {
        let mut rate_limits = MockRateLimitRepository::new();
        rate_limits.expect_take_token().never();
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions.expect_record_usage().never();

        let response = app(state(
            rate_limits,
            subscriptions,
            Some(silent_transport()),
            MockAiLogRepository::new(),
        ))
        .oneshot(post_json(
            "/api/v1/ai/images",
            Some(test_bearer(Uuid::new_v4())),
            r#"{"prompt":"   "}"#,
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
