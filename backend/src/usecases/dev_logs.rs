use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    entities::dev_logs::InsertDevLogEntity,
    repositories::dev_logs::DevLogRepository,
    value_objects::dev_logs::{DEFAULT_COMPONENT, DevLogModel},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DevLogError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DevLogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DevLogError::EmptyMessage => StatusCode::BAD_REQUEST,
            DevLogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct DevLogUseCase<D>
where
    D: DevLogRepository + Send + Sync + 'static,
{
    dev_log_repo: Arc<D>,
}

impl<D> DevLogUseCase<D>
where
    D: DevLogRepository + Send + Sync + 'static,
{
    pub fn new(dev_log_repo: Arc<D>) -> Self {
        Self { dev_log_repo }
    }

    /// Stores a client-side log line. `user_id` is set when the request
    /// carried a valid token.
    pub async fn ingest(&self, model: DevLogModel, user_id: Option<Uuid>) -> Result<Uuid, DevLogError> {
        if model.message.trim().is_empty() {
            return Err(DevLogError::EmptyMessage);
        }

        let component = model
            .component
            .filter(|component| !component.is_empty())
            .unwrap_or_else(|| DEFAULT_COMPONENT.to_string());

        let entry = InsertDevLogEntity {
            level: model.level.to_string(),
            message: model.message,
            context: model.context.map(|context| context.to_string()),
            component,
            user_id,
        };

        self.dev_log_repo.insert(entry).await.map_err(|err| {
            error!(db_error = ?err, "dev_logs: failed to store dev log");
            DevLogError::Internal(err)
        })
    }
}
