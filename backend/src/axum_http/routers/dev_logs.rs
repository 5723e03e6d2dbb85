use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use crates::{
    domain::{repositories::dev_logs::DevLogRepository, value_objects::dev_logs::DevLogModel},
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::dev_logs::DevLogPostgres},
};
use serde_json::json;

use crate::{auth::MaybeAuthUser, axum_http::error_responses::AppError, usecases::dev_logs::DevLogUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let dev_log_repository = DevLogPostgres::new(Arc::clone(&db_pool));
    let dev_log_usecase = DevLogUseCase::new(Arc::new(dev_log_repository));

    Router::new()
        .route("/api/v1/dev-logs", post(ingest::<DevLogPostgres>))
        .with_state(Arc::new(dev_log_usecase))
}

/// Accepts logs from signed-out clients too; a valid token only attributes
/// the entry to its user.
pub async fn ingest<D>(
    State(dev_log_usecase): State<Arc<DevLogUseCase<D>>>,
    MaybeAuthUser(auth): MaybeAuthUser,
    Json(dev_log_model): Json<DevLogModel>,
) -> Result<impl IntoResponse, AppError>
where
    D: DevLogRepository + Send + Sync + 'static,
{
    let id = dev_log_usecase
        .ingest(dev_log_model, auth.map(|auth| auth.user_id))
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}
