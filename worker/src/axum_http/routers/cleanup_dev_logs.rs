use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use crates::domain::repositories::dev_logs::DevLogRepository;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    config::config_model::Cleanup,
    usecases::cleanup_dev_logs::{CleanupDevLogsParams, CleanupDevLogsUseCase, retention_cutoff},
};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/cleanup/dev-logs" \
//     -H "Authorization: Bearer $INTERNAL_CLEANUP_TOKEN" \
//     -H "Content-Type: application/json" \
//     -d '{"older_than_days":7}'

pub struct CleanupRouteState<D>
where
    D: DevLogRepository + Send + Sync + 'static,
{
    cleanup: Arc<Cleanup>,
    usecase: Arc<CleanupDevLogsUseCase<D>>,
}

impl<D> Clone for CleanupRouteState<D>
where
    D: DevLogRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cleanup: Arc::clone(&self.cleanup),
            usecase: Arc::clone(&self.usecase),
        }
    }
}

pub fn routes<D>(cleanup: Arc<Cleanup>, usecase: Arc<CleanupDevLogsUseCase<D>>) -> Router
where
    D: DevLogRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/dev-logs", post(cleanup_dev_logs::<D>))
        .with_state(CleanupRouteState { cleanup, usecase })
}

#[derive(Debug, Default, Deserialize)]
pub struct CleanupDevLogsRequest {
    pub older_than_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CleanupDevLogsResponse {
    pub older_than_days: i64,
    pub cutoff: DateTime<Utc>,
    pub deleted: usize,
}

pub async fn cleanup_dev_logs<D>(
    State(state): State<CleanupRouteState<D>>,
    headers: HeaderMap,
    payload: Option<Json<CleanupDevLogsRequest>>,
) -> Response
where
    D: DevLogRepository + Send + Sync + 'static,
{
    let expected_token = match state.cleanup.internal_token.as_deref() {
        Some(token) => token,
        None => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "cleanup token is not configured",
            )
                .into_response();
        }
    };

    if let Err(status) = authorize_bearer(&headers, expected_token) {
        warn!("cleanup_dev_logs: rejected request with bad bearer token");
        return (status, "unauthorized").into_response();
    }

    let Json(payload) = payload.unwrap_or_default();
    let older_than_days = payload
        .older_than_days
        .filter(|days| *days >= 0)
        .unwrap_or(state.cleanup.dev_log_retention_days);

    let now = Utc::now();
    if retention_cutoff(now, older_than_days).is_none() {
        warn!(older_than_days, "cleanup_dev_logs: retention window out of range");
        return (StatusCode::BAD_REQUEST, "older_than_days is out of range").into_response();
    }

    let params = CleanupDevLogsParams {
        older_than_days,
        now,
    };

    match state.usecase.run(params).await {
        Ok(result) => Json(CleanupDevLogsResponse {
            older_than_days,
            cutoff: result.cutoff,
            deleted: result.deleted,
        })
        .into_response(),
        Err(err) => {
            error!(error = ?err, "cleanup_dev_logs: usecase failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "cleanup failed").into_response()
        }
    }
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
