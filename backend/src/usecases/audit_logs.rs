use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    entities::audit_logs::InsertAuditLogEntity, repositories::audit_logs::AuditLogRepository,
    value_objects::audit_logs::LogAuditModel,
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuditLogError {
    #[error("action must not be empty")]
    EmptyAction,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuditLogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuditLogError::EmptyAction => StatusCode::BAD_REQUEST,
            AuditLogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct AuditLogUseCase<A>
where
    A: AuditLogRepository + Send + Sync + 'static,
{
    audit_repo: Arc<A>,
}

impl<A> AuditLogUseCase<A>
where
    A: AuditLogRepository + Send + Sync + 'static,
{
    pub fn new(audit_repo: Arc<A>) -> Self {
        Self { audit_repo }
    }

    /// Appends a client-reported event, attributed to `user_id` when the
    /// request was signed in.
    pub async fn log(
        &self,
        model: LogAuditModel,
        user_id: Option<Uuid>,
        ip_address: Option<String>,
    ) -> Result<Uuid, AuditLogError> {
        let action = model.action.trim();
        if action.is_empty() {
            return Err(AuditLogError::EmptyAction);
        }

        let entry = InsertAuditLogEntity {
            action: action.to_string(),
            category: model.category.to_string(),
            user_id,
            target_id: model.target_id.filter(|target| !target.is_empty()),
            details: model.details,
            ip_address,
        };

        let id = self.audit_repo.insert(entry).await.map_err(|err| {
            error!(action, db_error = ?err, "audit_logs: failed to store audit entry");
            AuditLogError::Internal(err)
        })?;

        info!(action, category = %model.category, "audit_logs: entry recorded");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        repositories::audit_logs::MockAuditLogRepository,
        value_objects::enums::audit_categories::AuditCategory,
    };

    fn model(action: &str) -> LogAuditModel {
        LogAuditModel {
            action: action.to_string(),
            category: AuditCategory::Auth,
            target_id: Some(String::new()),
            details: "Signed in".to_string(),
        }
    }

    #[tokio::test]
    async fn entry_keeps_user_and_ip() {
        let user_id = Uuid::new_v4();

        let mut repo = MockAuditLogRepository::new();
        repo.expect_insert()
            .withf(move |entry| {
                entry.action == "user.sign_in"
                    && entry.category == "auth"
                    && entry.user_id == Some(user_id)
                    && entry.target_id.is_none()
                    && entry.details == "Signed in"
                    && entry.ip_address.as_deref() == Some("203.0.113.7")
            })
            .times(1)
            .returning(|_| Box::pin(async { Ok(Uuid::new_v4()) }));

        let usecase = AuditLogUseCase::new(Arc::new(repo));
        usecase
            .log(
                model(" user.sign_in "),
                Some(user_id),
                Some("203.0.113.7".to_string()),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn blank_action_is_rejected() {
        let mut repo = MockAuditLogRepository::new();
        repo.expect_insert().never();

        let usecase = AuditLogUseCase::new(Arc::new(repo));
        let err = usecase.log(model("  "), None, None).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
