use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::{
        repositories::audit_logs::AuditLogRepository, value_objects::audit_logs::LogAuditModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::audit_logs::AuditLogPostgres,
    },
};
use serde_json::json;

use crate::{
    auth::MaybeAuthUser, axum_http::error_responses::AppError,
    usecases::audit_logs::AuditLogUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let audit_log_repository = AuditLogPostgres::new(Arc::clone(&db_pool));

    router(Arc::new(AuditLogUseCase::new(Arc::new(audit_log_repository))))
}

pub fn router<A>(usecase: Arc<AuditLogUseCase<A>>) -> Router
where
    A: AuditLogRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/api/v1/audit-logs", post(log::<A>))
        .with_state(usecase)
}

/// First hop of `X-Forwarded-For`, else `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
    };

    forwarded
        .or_else(real_ip)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

pub async fn log<A>(
    State(usecase): State<Arc<AuditLogUseCase<A>>>,
    MaybeAuthUser(auth): MaybeAuthUser,
    headers: HeaderMap,
    Json(log_audit_model): Json<LogAuditModel>,
) -> Result<impl IntoResponse, AppError>
where
    A: AuditLogRepository + Send + Sync + 'static,
{
    let id = usecase
        .log(
            log_audit_model,
            auth.map(|auth| auth.user_id),
            client_ip(&headers),
        )
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}
