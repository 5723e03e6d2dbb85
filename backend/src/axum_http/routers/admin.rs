use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::Utc;
use crates::{
    domain::{
        repositories::{
            ai_logs::AiLogRepository, audit_logs::AuditLogRepository, dev_logs::DevLogRepository,
            user_profiles::UserProfileRepository,
        },
        value_objects::{
            admin::{AuditLogQuery, DevLogQuery, LimitQuery},
            user_profiles::SetRoleModel,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            ai_logs::AiLogPostgres, audit_logs::AuditLogPostgres, dev_logs::DevLogPostgres,
            user_profiles::UserProfilePostgres,
        },
    },
};
use uuid::Uuid;

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::admin::AdminUseCase};

type PostgresAdminUseCase =
    AdminUseCase<UserProfilePostgres, AuditLogPostgres, DevLogPostgres, AiLogPostgres>;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let admin_usecase: PostgresAdminUseCase = AdminUseCase::new(
        Arc::new(UserProfilePostgres::new(Arc::clone(&db_pool))),
        Arc::new(AuditLogPostgres::new(Arc::clone(&db_pool))),
        Arc::new(DevLogPostgres::new(Arc::clone(&db_pool))),
        Arc::new(AiLogPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route(
            "/users",
            get(list_users::<UserProfilePostgres, AuditLogPostgres, DevLogPostgres, AiLogPostgres>),
        )
        .route(
            "/users/:profile_id/role",
            put(set_role::<UserProfilePostgres, AuditLogPostgres, DevLogPostgres, AiLogPostgres>),
        )
        .route(
            "/audit-logs",
            get(list_audit_logs::<UserProfilePostgres, AuditLogPostgres, DevLogPostgres, AiLogPostgres>),
        )
        .route(
            "/audit-logs/stats",
            get(audit_stats::<UserProfilePostgres, AuditLogPostgres, DevLogPostgres, AiLogPostgres>),
        )
        .route(
            "/dev-logs",
            get(list_dev_logs::<UserProfilePostgres, AuditLogPostgres, DevLogPostgres, AiLogPostgres>),
        )
        .route(
            "/ai-logs",
            get(list_ai_logs::<UserProfilePostgres, AuditLogPostgres, DevLogPostgres, AiLogPostgres>),
        )
        .with_state(Arc::new(admin_usecase))
}

pub async fn list_users<P, A, D, L>(
    State(admin_usecase): State<Arc<AdminUseCase<P, A, D, L>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
    D: DevLogRepository + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    let users = admin_usecase
        .list_users(auth.user_id)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(users))
}

pub async fn set_role<P, A, D, L>(
    State(admin_usecase): State<Arc<AdminUseCase<P, A, D, L>>>,
    auth: AuthUser,
    Path(profile_id): Path<Uuid>,
    Json(set_role_model): Json<SetRoleModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
    D: DevLogRepository + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    admin_usecase
        .set_role(auth.user_id, profile_id, set_role_model.role)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_audit_logs<P, A, D, L>(
    State(admin_usecase): State<Arc<AdminUseCase<P, A, D, L>>>,
    auth: AuthUser,
    Query(query): Query<AuditLogQuery>,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
    D: DevLogRepository + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    let logs = admin_usecase
        .list_audit_logs(auth.user_id, query)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(logs))
}

pub async fn audit_stats<P, A, D, L>(
    State(admin_usecase): State<Arc<AdminUseCase<P, A, D, L>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
    D: DevLogRepository + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    let stats = admin_usecase
        .audit_stats(auth.user_id, Utc::now())
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(stats))
}

pub async fn list_dev_logs<P, A, D, L>(
    State(admin_usecase): State<Arc<AdminUseCase<P, A, D, L>>>,
    auth: AuthUser,
    Query(query): Query<DevLogQuery>,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
    D: DevLogRepository + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    let logs = admin_usecase
        .list_dev_logs(auth.user_id, query)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(logs))
}

pub async fn list_ai_logs<P, A, D, L>(
    State(admin_usecase): State<Arc<AdminUseCase<P, A, D, L>>>,
    auth: AuthUser,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
    D: DevLogRepository + Send + Sync + 'static,
    L: AiLogRepository + Send + Sync + 'static,
{
    let logs = admin_usecase
        .list_ai_logs(auth.user_id, query)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(logs))
}
