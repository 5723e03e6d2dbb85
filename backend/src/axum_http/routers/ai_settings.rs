use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;
use crates::{
    domain::{
        repositories::{
            ai_prompts::AiPromptRepository, model_costs::ModelCostRepository,
            user_profiles::UserProfileRepository,
        },
        value_objects::{ai_prompts::UpdatePromptModel, model_costs::UpsertModelCostModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            ai_prompts::AiPromptPostgres, model_costs::ModelCostPostgres,
            user_profiles::UserProfilePostgres,
        },
    },
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, config::config_model::DotEnvyConfig,
    usecases::ai_settings::AiSettingsUseCase,
};

// Mounted under /api/v1/admin next to the admin router.
pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let usecase = AiSettingsUseCase::new(
        Arc::new(UserProfilePostgres::new(Arc::clone(&db_pool))),
        Arc::new(AiPromptPostgres::new(Arc::clone(&db_pool))),
        Arc::new(ModelCostPostgres::new(Arc::clone(&db_pool))),
        config.site.app_slug.clone(),
    );

    router(Arc::new(usecase))
}

pub fn router<P, R, C>(usecase: Arc<AiSettingsUseCase<P, R, C>>) -> Router
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/prompts", get(list_prompts::<P, R, C>))
        .route("/prompts/seed", post(seed_prompts::<P, R, C>))
        .route("/prompts/reseed", post(reseed_prompts::<P, R, C>))
        .route("/prompts/content/:prompt_id", get(get_prompt::<P, R, C>))
        .route("/prompts/:id", put(update_prompt::<P, R, C>))
        .route(
            "/model-costs",
            get(list_model_costs::<P, R, C>).put(upsert_model_cost::<P, R, C>),
        )
        // Model names contain slashes, e.g. `meta/llama-3.2-90b-vision-instruct`.
        .route("/model-costs/*model", get(get_model_cost::<P, R, C>))
        .with_state(usecase)
}

pub async fn list_prompts<P, R, C>(
    State(usecase): State<Arc<AiSettingsUseCase<P, R, C>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    let prompts = usecase
        .list_prompts(auth.user_id)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(prompts))
}

pub async fn get_prompt<P, R, C>(
    State(usecase): State<Arc<AiSettingsUseCase<P, R, C>>>,
    auth: AuthUser,
    Path(prompt_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    let prompt = usecase
        .get_prompt(auth.user_id, &prompt_id)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(prompt))
}

pub async fn update_prompt<P, R, C>(
    State(usecase): State<Arc<AiSettingsUseCase<P, R, C>>>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(update_prompt_model): Json<UpdatePromptModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    usecase
        .update_prompt(auth.user_id, id, &update_prompt_model.content)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn seed_prompts<P, R, C>(
    State(usecase): State<Arc<AiSettingsUseCase<P, R, C>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    let result = usecase
        .seed_prompts(auth.user_id, false, Utc::now())
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(result))
}

pub async fn reseed_prompts<P, R, C>(
    State(usecase): State<Arc<AiSettingsUseCase<P, R, C>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    let result = usecase
        .seed_prompts(auth.user_id, true, Utc::now())
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(result))
}

pub async fn list_model_costs<P, R, C>(
    State(usecase): State<Arc<AiSettingsUseCase<P, R, C>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    let costs = usecase
        .list_model_costs(auth.user_id)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(costs))
}

pub async fn get_model_cost<P, R, C>(
    State(usecase): State<Arc<AiSettingsUseCase<P, R, C>>>,
    auth: AuthUser,
    Path(model): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    let cost = usecase
        .get_model_cost(auth.user_id, model.trim_start_matches('/'))
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(cost))
}

pub async fn upsert_model_cost<P, R, C>(
    State(usecase): State<Arc<AiSettingsUseCase<P, R, C>>>,
    auth: AuthUser,
    Json(upsert_model_cost_model): Json<UpsertModelCostModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    let id = usecase
        .upsert_model_cost(auth.user_id, upsert_model_cost_model, Utc::now())
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(json!({ "id": id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, header::AUTHORIZATION},
        response::Response,
    };
    use crates::domain::{
        entities::{model_costs::ModelCostEntity, user_profiles::UserProfileEntity},
        repositories::{
            ai_prompts::MockAiPromptRepository, model_costs::MockModelCostRepository,
            user_profiles::MockUserProfileRepository,
        },
    };
    use tower::ServiceExt;

    use crate::auth::test_bearer;

    fn profiles_with_role(role: &'static str) -> MockUserProfileRepository {
        let mut profiles = MockUserProfileRepository::new();
        profiles.expect_find_by_user_id().returning(move |user_id| {
            let entity = UserProfileEntity {
                id: Uuid::new_v4(),
                user_id,
                name: String::new(),
                role: role.to_string(),
                stripe_customer_id: None,
                plan: "free".to_string(),
                monthly_usage_count: 0,
                usage_reset_at: None,
                created_at: Utc::now(),
            };
            Box::pin(async move { Ok(Some(entity)) })
        });
        profiles
    }

    fn app(
        profiles: MockUserProfileRepository,
        prompts: MockAiPromptRepository,
        costs: MockModelCostRepository,
    ) -> Router {
        let usecase = AiSettingsUseCase::new(
            Arc::new(profiles),
            Arc::new(prompts),
            Arc::new(costs),
            "app".to_string(),
        );
        Router::new().nest("/api/v1/admin", router(Arc::new(usecase)))
    }

    fn request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header(AUTHORIZATION, test_bearer(Uuid::new_v4()))
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn model_cost_lookup_accepts_names_with_slashes() {
        let mut costs = MockModelCostRepository::new();
        costs
            .expect_find_by_model()
            .withf(|model| model.to_string() == "meta/llama-3.2-90b")
            .times(1)
            .returning(|model| {
                let entity = ModelCostEntity {
                    id: Uuid::new_v4(),
                    model: model.to_string(),
                    display_name: None,
                    input_cost_per_1k: 0.001,
                    output_cost_per_1k: 0.002,
                    updated_at: Utc::now(),
                };
                Box::pin(async move { Ok(Some(entity)) })
            });

        let response = app(profiles_with_role("admin"), MockAiPromptRepository::new(), costs)
            .oneshot(request("GET", "/api/v1/admin/model-costs/meta/llama-3.2-90b", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["output_cost_per_1k"], 0.002);
    }

    #[tokio::test]
    async fn non_admin_sees_no_prompts_and_cannot_reseed() {
        let mut prompts = MockAiPromptRepository::new();
        prompts.expect_list().never();
        prompts.expect_seed().never();

        let app = app(profiles_with_role("user"), prompts, MockModelCostRepository::new());

        let list = app
            .clone()
            .oneshot(request("GET", "/api/v1/admin/prompts", ""))
            .await
            .unwrap();
        assert_eq!(list.status(), StatusCode::OK);
        assert_eq!(body_json(list).await, json!([]));

        let reseed = app
            .oneshot(request("POST", "/api/v1/admin/prompts/reseed", ""))
            .await
            .unwrap();
        assert_eq!(reseed.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn negative_model_cost_is_a_bad_request() {
        let mut costs = MockModelCostRepository::new();
        costs.expect_upsert().never();

        let response = app(profiles_with_role("admin"), MockAiPromptRepository::new(), costs)
            .oneshot(request(
                "PUT",
                "/api/v1/admin/model-costs",
                r#"{"model":"m","input_cost_per_1k":-1,"output_cost_per_1k":0}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
