use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    entities::{
        ai_logs::AiLogEntity, audit_logs::AuditLogEntity, audit_logs::InsertAuditLogEntity,
        dev_logs::DevLogEntity,
    },
    repositories::{
        ai_logs::AiLogRepository, audit_logs::AuditLogRepository, dev_logs::DevLogRepository,
        user_profiles::UserProfileRepository,
    },
    value_objects::{
        admin::{AuditLogQuery, AuditStatsDto, DevLogQuery, LimitQuery, clamp_limit},
        enums::{audit_categories::AuditCategory, user_roles::UserRole},
        user_profiles::UserProfileDto,
    },
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const ROLE_CHANGE: &str = "admin.role_change";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Not authorized")]
    Forbidden,
    #[error("profile not found")]
    ProfileNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdminError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Forbidden => StatusCode::FORBIDDEN,
            AdminError::ProfileNotFound => StatusCode::NOT_FOUND,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AdminError>;

/// Admin tooling. Reads by non-admins come back empty, writes are refused.
pub struct AdminUseCase<P, A, D, L>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
    D: DevLogRepository + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    profile_repo: Arc<P>,
    audit_repo: Arc<A>,
    dev_log_repo: Arc<D>,
    ai_log_repo: Arc<L>,
}

impl<P, A, D, L> AdminUseCase<P, A, D, L>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
    D: DevLogRepository + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    pub fn new(
        profile_repo: Arc<P>,
        audit_repo: Arc<A>,
        dev_log_repo: Arc<D>,
        ai_log_repo: Arc<L>,
    ) -> Self {
        Self {
            profile_repo,
            audit_repo,
            dev_log_repo,
            ai_log_repo,
        }
    }

    async fn is_admin(&self, user_id: Uuid) -> UseCaseResult<bool> {
        let profile = self.profile_repo.find_by_user_id(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "admin: failed to load caller profile");
            AdminError::Internal(err)
        })?;

        Ok(profile.is_some_and(|profile| profile.is_admin()))
    }

    pub async fn list_users(&self, caller: Uuid) -> UseCaseResult<Vec<UserProfileDto>> {
        if !self.is_admin(caller).await? {
            return Ok(Vec::new());
        }

        let profiles = self.profile_repo.list_profiles().await?;
        Ok(profiles
            .into_iter()
            .map(|profile| UserProfileDto::from_entity(profile, None))
            .collect())
    }

    pub async fn set_role(&self, caller: Uuid, profile_id: Uuid, role: UserRole) -> UseCaseResult<()> {
        if !self.is_admin(caller).await? {
            warn!(%caller, %profile_id, "admin: role change refused for non-admin");
            return Err(AdminError::Forbidden);
        }

        let target = self.profile_repo.find_by_id(profile_id).await?;
        let old_role = target
            .as_ref()
            .map(|profile| profile.role().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        if !self.profile_repo.set_role(profile_id, role).await? {
            return Err(AdminError::ProfileNotFound);
        }

        let entry = InsertAuditLogEntity::system(
            ROLE_CHANGE,
            AuditCategory::Admin,
            Some(caller),
            json!({
                "message": format!("Changed role from {old_role} to {role}"),
                "oldRole": old_role,
                "newRole": role.to_string(),
                "targetUserId": target.map(|profile| profile.user_id),
            }),
        )
        .with_target(profile_id.to_string());

        self.audit_repo.insert(entry).await.map_err(|err| {
            error!(%caller, %profile_id, db_error = ?err, "admin: failed to write role change audit");
            AdminError::Internal(err)
        })?;

        info!(%caller, %profile_id, %role, "admin: role changed");
        Ok(())
    }

    pub async fn list_audit_logs(
        &self,
        caller: Uuid,
        query: AuditLogQuery,
    ) -> UseCaseResult<Vec<AuditLogEntity>> {
        if !self.is_admin(caller).await? {
            return Ok(Vec::new());
        }

        Ok(self
            .audit_repo
            .list(query.category, clamp_limit(query.limit))
            .await?)
    }

    /// Audit activity over the 24 hours before `now`; `None` for non-admins.
    pub async fn audit_stats(
        &self,
        caller: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<Option<AuditStatsDto>> {
        if !self.is_admin(caller).await? {
            return Ok(None);
        }

        let counts = self
            .audit_repo
            .count_by_category_since(now - Duration::hours(24))
            .await?;

        Ok(Some(AuditStatsDto::from_counts(counts)))
    }

    pub async fn list_dev_logs(
        &self,
        caller: Uuid,
        query: DevLogQuery,
    ) -> UseCaseResult<Vec<DevLogEntity>> {
        if !self.is_admin(caller).await? {
            return Ok(Vec::new());
        }

        Ok(self
            .dev_log_repo
            .list(query.level, query.component, clamp_limit(query.limit))
            .await?)
    }

    pub async fn list_ai_logs(&self, caller: Uuid, query: LimitQuery) -> UseCaseResult<Vec<AiLogEntity>> {
        if !self.is_admin(caller).await? {
            return Ok(Vec::new());
        }

        Ok(self.ai_log_repo.list_recent(clamp_limit(query.limit)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        entities::user_profiles::UserProfileEntity,
        repositories::{
            ai_logs::MockAiLogRepository, audit_logs::MockAuditLogRepository,
            dev_logs::MockDevLogRepository, user_profiles::MockUserProfileRepository,
        },
        value_objects::enums::dev_log_levels::DevLogLevel,
    };

    type TestUseCase = AdminUseCase<
        MockUserProfileRepository,
        MockAuditLogRepository,
        MockDevLogRepository,
        MockAiLogRepository,
    >;

    fn profile(user_id: Uuid, role: &str) -> UserProfileEntity {
        UserProfileEntity {
            id: Uuid::new_v4(),
            user_id,
            name: String::new(),
            role: role.to_string(),
            stripe_customer_id: None,
            plan: "free".to_string(),
            monthly_usage_count: 0,
            usage_reset_at: None,
            created_at: Utc::now(),
        }
    }

    fn caller_with_role(profiles: &mut MockUserProfileRepository, role: &'static str) {
        profiles.expect_find_by_user_id().returning(move |id| {
            let entity = profile(id, role);
            Box::pin(async move { Ok(Some(entity)) })
        });
    }

    fn build(
        profiles: MockUserProfileRepository,
        audit: MockAuditLogRepository,
        dev_logs: MockDevLogRepository,
    ) -> TestUseCase {
        AdminUseCase::new(
            Arc::new(profiles),
            Arc::new(audit),
            Arc::new(dev_logs),
            Arc::new(MockAiLogRepository::new()),
        )
    }

    #[tokio::test]
    async fn non_admin_reads_are_empty() {
        let mut profiles = MockUserProfileRepository::new();
        caller_with_role(&mut profiles, "user");
        profiles.expect_list_profiles().never();

        let mut audit = MockAuditLogRepository::new();
        audit.expect_list().never();
        audit.expect_count_by_category_since().never();

        let usecase = build(profiles, audit, MockDevLogRepository::new());
        let caller = Uuid::new_v4();

        assert!(usecase.list_users(caller).await.unwrap().is_empty());
        assert!(
            usecase
                .list_audit_logs(caller, AuditLogQuery::default())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(usecase.audit_stats(caller, Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn caller_without_profile_is_not_admin() {
        let mut profiles = MockUserProfileRepository::new();
        profiles
            .expect_find_by_user_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = build(profiles, MockAuditLogRepository::new(), MockDevLogRepository::new());
        let err = usecase
            .set_role(Uuid::new_v4(), Uuid::new_v4(), UserRole::Admin)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn non_admin_cannot_change_roles() {
        let mut profiles = MockUserProfileRepository::new();
        caller_with_role(&mut profiles, "user");
        profiles.expect_set_role().never();

        let usecase = build(profiles, MockAuditLogRepository::new(), MockDevLogRepository::new());
        let err = usecase
            .set_role(Uuid::new_v4(), Uuid::new_v4(), UserRole::Admin)
            .await
            .unwrap_err();

        assert!(matches!(err, AdminError::Forbidden));
    }

    #[tokio::test]
    async fn role_change_is_audited_with_old_and_new_role() {
        let caller = Uuid::new_v4();
        let target_profile = Uuid::new_v4();
        let target_user = Uuid::new_v4();

        let mut profiles = MockUserProfileRepository::new();
        caller_with_role(&mut profiles, "admin");
        profiles.expect_find_by_id().returning(move |id| {
            let mut entity = profile(target_user, "user");
            entity.id = id;
            Box::pin(async move { Ok(Some(entity)) })
        });
        profiles
            .expect_set_role()
            .withf(move |id, role| *id == target_profile && *role == UserRole::Admin)
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(true) }));

        let mut audit = MockAuditLogRepository::new();
        audit
            .expect_insert()
            .withf(move |entry| {
                let details: serde_json::Value =
                    serde_json::from_str(&entry.details).unwrap_or_default();
                entry.action == ROLE_CHANGE
                    && entry.category == "admin"
                    && entry.user_id == Some(caller)
                    && entry.target_id == Some(target_profile.to_string())
                    && details["oldRole"] == "user"
                    && details["newRole"] == "admin"
                    && details["targetUserId"] == target_user.to_string()
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = build(profiles, audit, MockDevLogRepository::new());
        usecase
            .set_role(caller, target_profile, UserRole::Admin)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn role_change_on_missing_profile_is_not_found() {
        let mut profiles = MockUserProfileRepository::new();
        caller_with_role(&mut profiles, "admin");
        profiles
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        profiles
            .expect_set_role()
            .returning(|_, _| Box::pin(async { Ok(false) }));

        let mut audit = MockAuditLogRepository::new();
        audit.expect_insert().never();

        let usecase = build(profiles, audit, MockDevLogRepository::new());
        let err = usecase
            .set_role(Uuid::new_v4(), Uuid::new_v4(), UserRole::User)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stats_cover_the_last_day() {
        let now = Utc::now();

        let mut profiles = MockUserProfileRepository::new();
        caller_with_role(&mut profiles, "admin");

        let mut audit = MockAuditLogRepository::new();
        audit
            .expect_count_by_category_since()
            .withf(move |since| *since == now - Duration::hours(24))
            .returning(|_| {
                Box::pin(async {
                    Ok(vec![("billing".to_string(), 2), ("auth".to_string(), 1)])
                })
            });

        let usecase = build(profiles, audit, MockDevLogRepository::new());
        let stats = usecase.audit_stats(Uuid::new_v4(), now).await.unwrap().unwrap();

        assert_eq!(stats.total_24h, 3);
        assert_eq!(stats.by_category.get("auth"), Some(&1));
    }

    #[tokio::test]
    async fn dev_log_filters_are_forwarded() {
        let mut profiles = MockUserProfileRepository::new();
        caller_with_role(&mut profiles, "admin");

        let mut dev_logs = MockDevLogRepository::new();
        dev_logs
            .expect_list()
            .withf(|level, component, limit| {
                *level == Some(DevLogLevel::Error)
                    && component.as_deref() == Some("checkout")
                    && *limit == 100
            })
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(Vec::new()) }));

        let usecase = build(profiles, MockAuditLogRepository::new(), dev_logs);
        let query = DevLogQuery {
            level: Some(DevLogLevel::Error),
            component: Some("checkout".to_string()),
            limit: None,
        };

        assert!(usecase.list_dev_logs(Uuid::new_v4(), query).await.unwrap().is_empty());
    }
}
