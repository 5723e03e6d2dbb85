use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    entities::audit_logs::InsertAuditLogEntity,
    repositories::{audit_logs::AuditLogRepository, user_profiles::UserProfileRepository},
    value_objects::{enums::audit_categories::AuditCategory, user_profiles::UserProfileDto},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

pub const ACCOUNT_DELETED: &str = "user.account_deleted";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UserError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UserError::EmptyName => StatusCode::BAD_REQUEST,
            UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UserError>;

pub struct UserUseCase<P, A>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    profile_repo: Arc<P>,
    audit_repo: Arc<A>,
}

impl<P, A> UserUseCase<P, A>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    pub fn new(profile_repo: Arc<P>, audit_repo: Arc<A>) -> Self {
        Self {
            profile_repo,
            audit_repo,
        }
    }

    pub async fn get_me(&self, user_id: Uuid, email: Option<String>) -> UseCaseResult<UserProfileDto> {
        let profile = self.profile_repo.find_by_user_id(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "users: failed to load profile");
            UserError::Internal(err)
        })?;

        Ok(match profile {
            Some(profile) => UserProfileDto::from_entity(profile, email),
            None => UserProfileDto::placeholder(user_id, email),
        })
    }

    /// Creates the free `user` profile on first sign-in, named after the
    /// identity provider's display name. Existing profiles are returned
    /// untouched.
    pub async fn ensure_profile(
        &self,
        user_id: Uuid,
        email: Option<String>,
        name: Option<String>,
    ) -> UseCaseResult<UserProfileDto> {
        let name = name.as_deref().map(str::trim).unwrap_or_default();
        let profile = self
            .profile_repo
            .ensure_profile(user_id, name)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "users: failed to ensure profile");
                UserError::Internal(err)
            })?;

        Ok(UserProfileDto::from_entity(profile, email))
    }

    pub async fn update_name(&self, user_id: Uuid, name: &str) -> UseCaseResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }

        let updated = self.profile_repo.update_name(user_id, name).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "users: failed to update name");
            UserError::Internal(err)
        })?;

        if !updated {
            info!(%user_id, "users: no profile to rename");
        }

        Ok(())
    }

    pub async fn delete_account(&self, user_id: Uuid) -> UseCaseResult<()> {
        let deleted = self
            .profile_repo
            .delete_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "users: failed to delete profile");
                UserError::Internal(err)
            })?;

        let entry = InsertAuditLogEntity::system(
            ACCOUNT_DELETED,
            AuditCategory::Auth,
            Some(user_id),
            json!({ "message": "User deleted their account" }),
        );

        self.audit_repo.insert(entry).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "users: failed to write account deletion audit");
            UserError::Internal(err)
        })?;

        info!(%user_id, profile_deleted = deleted, "users: account deleted");
        Ok(())
    }
}
