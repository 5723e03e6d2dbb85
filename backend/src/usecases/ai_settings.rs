use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use crates::domain::{
    entities::{ai_prompts::AiPromptEntity, model_costs::ModelCostEntity},
    repositories::{
        ai_prompts::AiPromptRepository, model_costs::ModelCostRepository,
        user_profiles::UserProfileRepository,
    },
    value_objects::{
        ai_prompts::{PromptSeedResultDto, default_prompts},
        model_costs::UpsertModelCostModel,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AiSettingsError {
    #[error("Not authorized")]
    Forbidden,
    #[error("prompt not found")]
    PromptNotFound,
    #[error("{0}")]
    InvalidModelCost(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AiSettingsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AiSettingsError::Forbidden => StatusCode::FORBIDDEN,
            AiSettingsError::PromptNotFound => StatusCode::NOT_FOUND,
            AiSettingsError::InvalidModelCost(_) => StatusCode::BAD_REQUEST,
            AiSettingsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AiSettingsError>;

/// Managed prompts and the model price table. Same access rule as the rest
/// of the admin tooling: reads by non-admins come back empty, writes are
/// refused.
pub struct AiSettingsUseCase<P, R, C>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    profile_repo: Arc<P>,
    prompt_repo: Arc<R>,
    model_cost_repo: Arc<C>,
    app_name: String,
}

impl<P, R, C> AiSettingsUseCase<P, R, C>
where
    P: UserProfileRepository + Send + Sync + 'static,
    R: AiPromptRepository + Send + Sync + 'static,
    C: ModelCostRepository + Send + Sync + 'static,
{
    pub fn new(
        profile_repo: Arc<P>,
        prompt_repo: Arc<R>,
        model_cost_repo: Arc<C>,
        app_name: String,
    ) -> Self {
        Self {
            profile_repo,
            prompt_repo,
            model_cost_repo,
            app_name,
        }
    }

    async fn is_admin(&self, user_id: Uuid) -> UseCaseResult<bool> {
        let profile = self.profile_repo.find_by_user_id(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "ai_settings: failed to load caller profile");
            AiSettingsError::Internal(err)
        })?;

        Ok(profile.is_some_and(|profile| profile.is_admin()))
    }

    async fn require_admin(&self, caller: Uuid, action: &str) -> UseCaseResult<()> {
        if self.is_admin(caller).await? {
            Ok(())
        } else {
            warn!(%caller, %action, "ai_settings: refused for non-admin");
            Err(AiSettingsError::Forbidden)
        }
    }

    pub async fn list_prompts(&self, caller: Uuid) -> UseCaseResult<Vec<AiPromptEntity>> {
        if !self.is_admin(caller).await? {
            return Ok(Vec::new());
        }

        Ok(self.prompt_repo.list().await?)
    }

    pub async fn get_prompt(&self, caller: Uuid, prompt_id: &str) -> UseCaseResult<AiPromptEntity> {
        if !self.is_admin(caller).await? {
            return Err(AiSettingsError::PromptNotFound);
        }

        self.prompt_repo
            .find_by_prompt_id(prompt_id)
            .await?
            .ok_or(AiSettingsError::PromptNotFound)
    }

    pub async fn update_prompt(&self, caller: Uuid, id: Uuid, content: &str) -> UseCaseResult<()> {
        self.require_admin(caller, "update_prompt").await?;

        if !self.prompt_repo.update_content(id, content).await? {
            return Err(AiSettingsError::PromptNotFound);
        }

        info!(%caller, prompt = %id, "ai_settings: prompt updated");
        Ok(())
    }

    /// Inserts missing built-in prompts. With `overwrite` the built-ins also
    /// replace edited copies.
    pub async fn seed_prompts(
        &self,
        caller: Uuid,
        overwrite: bool,
        now: DateTime<Utc>,
    ) -> UseCaseResult<PromptSeedResultDto> {
        self.require_admin(caller, "seed_prompts").await?;

        let outcome = self
            .prompt_repo
            .seed(default_prompts(&self.app_name, now), overwrite)
            .await
            .map_err(|err| {
                error!(%caller, db_error = ?err, "ai_settings: failed to seed prompts");
                AiSettingsError::Internal(err)
            })?;

        info!(
            %caller,
            overwrite,
            added = outcome.added,
            updated = outcome.updated,
            "ai_settings: prompts seeded"
        );
        Ok(PromptSeedResultDto::new(outcome, overwrite))
    }

    pub async fn list_model_costs(&self, caller: Uuid) -> UseCaseResult<Vec<ModelCostEntity>> {
        if !self.is_admin(caller).await? {
            return Ok(Vec::new());
        }

        Ok(self.model_cost_repo.list().await?)
    }

    /// `None` when the model has no price or the caller is not an admin.
    pub async fn get_model_cost(
        &self,
        caller: Uuid,
        model: &str,
    ) -> UseCaseResult<Option<ModelCostEntity>> {
        if !self.is_admin(caller).await? {
            return Ok(None);
        }

        Ok(self.model_cost_repo.find_by_model(model).await?)
    }

    pub async fn upsert_model_cost(
        &self,
        caller: Uuid,
        model: UpsertModelCostModel,
        now: DateTime<Utc>,
    ) -> UseCaseResult<Uuid> {
        self.require_admin(caller, "upsert_model_cost").await?;

        let cost = model
            .into_entity(now)
            .map_err(AiSettingsError::InvalidModelCost)?;
        let model_name = cost.model.clone();

        let id = self.model_cost_repo.upsert(cost).await.map_err(|err| {
            error!(%caller, model = %model_name, db_error = ?err, "ai_settings: failed to upsert model cost");
            AiSettingsError::Internal(err)
        })?;

        info!(%caller, model = %model_name, "ai_settings: model cost saved");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        entities::user_profiles::UserProfileEntity,
        repositories::{
            ai_prompts::MockAiPromptRepository, model_costs::MockModelCostRepository,
            user_profiles::MockUserProfileRepository,
        },
        value_objects::ai_prompts::{MAIN_SYSTEM_PROMPT, PromptSeedOutcome},
    };

    type TestUseCase =
        AiSettingsUseCase<MockUserProfileRepository, MockAiPromptRepository, MockModelCostRepository>;

    fn caller_with_role(role: &'static str) -> MockUserProfileRepository {
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

    fn build(
        profiles: MockUserProfileRepository,
        prompts: MockAiPromptRepository,
        costs: MockModelCostRepository,
    ) -> TestUseCase {
        AiSettingsUseCase::new(
            Arc::new(profiles),
            Arc::new(prompts),
            Arc::new(costs),
            "Acme Notes".to_string(),
        )
    }

    #[tokio::test]
    async fn non_admin_reads_are_empty_and_writes_forbidden() {
        let mut prompts = MockAiPromptRepository::new();
        prompts.expect_list().never();
        prompts.expect_update_content().never();
        prompts.expect_seed().never();

        let mut costs = MockModelCostRepository::new();
        costs.expect_list().never();
        costs.expect_upsert().never();

        let usecase = build(caller_with_role("user"), prompts, costs);
        let caller = Uuid::new_v4();

        assert!(usecase.list_prompts(caller).await.unwrap().is_empty());
        assert!(usecase.list_model_costs(caller).await.unwrap().is_empty());
        assert!(usecase.get_model_cost(caller, "m").await.unwrap().is_none());

        let err = usecase
            .update_prompt(caller, Uuid::new_v4(), "new")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = usecase.seed_prompts(caller, true, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AiSettingsError::Forbidden));
    }

    #[tokio::test]
    async fn reseed_passes_built_ins_with_app_name() {
        let mut prompts = MockAiPromptRepository::new();
        prompts
            .expect_seed()
            .withf(|prompts, overwrite| {
                *overwrite
                    && prompts.len() == 2
                    && prompts[0].prompt_id == MAIN_SYSTEM_PROMPT
                    && prompts[0].content.contains("Acme Notes")
            })
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(PromptSeedOutcome { added: 1, updated: 1 }) }));

        let usecase = build(caller_with_role("admin"), prompts, MockModelCostRepository::new());
        let result = usecase
            .seed_prompts(Uuid::new_v4(), true, Utc::now())
            .await
            .unwrap();

        assert_eq!(result.message, "Reseeded: 1 updated, 1 added.");
    }

    #[tokio::test]
    async fn updating_unknown_prompt_is_not_found() {
        let mut prompts = MockAiPromptRepository::new();
        prompts
            .expect_update_content()
            .returning(|_, _| Box::pin(async { Ok(false) }));

        let usecase = build(caller_with_role("admin"), prompts, MockModelCostRepository::new());
        let err = usecase
            .update_prompt(Uuid::new_v4(), Uuid::new_v4(), "new content")
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn model_cost_is_validated_before_upsert() {
        let mut costs = MockModelCostRepository::new();
        costs
            .expect_upsert()
            .withf(|cost| cost.model == "meta/llama-3.2-90b" && cost.output_cost_per_1k == 0.002)
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = build(caller_with_role("admin"), MockAiPromptRepository::new(), costs);
        let caller = Uuid::new_v4();

        usecase
            .upsert_model_cost(
                caller,
                UpsertModelCostModel {
                    model: "meta/llama-3.2-90b".to_string(),
                    display_name: Some("Llama 3.2 90B".to_string()),
                    input_cost_per_1k: 0.001,
                    output_cost_per_1k: 0.002,
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let err = usecase
            .upsert_model_cost(
                caller,
                UpsertModelCostModel {
                    model: "other".to_string(),
                    display_name: None,
                    input_cost_per_1k: -1.0,
                    output_cost_per_1k: 0.0,
                },
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
