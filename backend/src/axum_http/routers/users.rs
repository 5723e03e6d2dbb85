use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::{
        repositories::{audit_logs::AuditLogRepository, user_profiles::UserProfileRepository},
        value_objects::user_profiles::UpdateProfileModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{audit_logs::AuditLogPostgres, user_profiles::UserProfilePostgres},
    },
};

use crate::{auth::AuthUser, axum_http::error_responses::AppError, usecases::users::UserUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_profile_repository = UserProfilePostgres::new(Arc::clone(&db_pool));
    let audit_log_repository = AuditLogPostgres::new(Arc::clone(&db_pool));
    let user_usecase = UserUseCase::new(Arc::new(user_profile_repository), Arc::new(audit_log_repository));

    Router::new()
        .route(
            "/me",
            get(get_me::<UserProfilePostgres, AuditLogPostgres>)
                .post(ensure_profile::<UserProfilePostgres, AuditLogPostgres>)
                .patch(update_profile::<UserProfilePostgres, AuditLogPostgres>)
                .delete(delete_account::<UserProfilePostgres, AuditLogPostgres>),
        )
        .with_state(Arc::new(user_usecase))
}

pub async fn get_me<P, A>(
    State(user_usecase): State<Arc<UserUseCase<P, A>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    let me = user_usecase
        .get_me(auth.user_id, auth.email)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(me))
}

pub async fn ensure_profile<P, A>(
    State(user_usecase): State<Arc<UserUseCase<P, A>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    let profile = user_usecase
        .ensure_profile(auth.user_id, auth.email, auth.name)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(Json(profile))
}

pub async fn update_profile<P, A>(
    State(user_usecase): State<Arc<UserUseCase<P, A>>>,
    auth: AuthUser,
    Json(update_profile_model): Json<UpdateProfileModel>,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    user_usecase
        .update_name(auth.user_id, &update_profile_model.name)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_account<P, A>(
    State(user_usecase): State<Arc<UserUseCase<P, A>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    P: UserProfileRepository + Send + Sync + 'static,
    A: AuditLogRepository + Send + Sync + 'static,
{
    user_usecase
        .delete_account(auth.user_id)
        .await
        .map_err(|err| AppError::from_usecase(err.status_code(), err))?;

    Ok(StatusCode::NO_CONTENT)
}
