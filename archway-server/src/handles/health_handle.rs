use std::sync::Arc;

use archway_api::restful::{ApiResponse, HealthResponse};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use time::OffsetDateTime;

use crate::services::SessionService;

#[derive(Clone)]
pub struct HealthState {
    pub session_service: Arc<SessionService>,
}

pub fn health_router(health_state: HealthState) -> Router {
    Router::new()
        .route("/api/health", get(get_health))
        .with_state(health_state)
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<HealthState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: String::from("healthy"),
        version: env!("CARGO_PKG_VERSION").to_string(),
        scanning: state.session_service.is_scanning().await,
        timestamp: OffsetDateTime::now_utc(),
    }))
}
