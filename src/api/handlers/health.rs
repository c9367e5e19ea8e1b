use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub repository: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Plain text acknowledgement", body = String)
    ),
    tag = "system"
)]
pub async fn root() -> &'static str {
    "Manga uploader is running"
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        repository: state.config.repository(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
