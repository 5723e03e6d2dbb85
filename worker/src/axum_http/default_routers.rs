use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "NOT_FOUND").into_response()
}

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "component": "worker" })),
    )
        .into_response()
}
