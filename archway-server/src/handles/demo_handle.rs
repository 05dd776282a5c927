use std::sync::Arc;

use archway_api::restful::{ApiResponse, DemoPopulateResponse};
use archway_mock::SimulatedCapture;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use time::OffsetDateTime;

use crate::errors::ApiError;
use crate::services::{EventBus, RegistryService, ScanEvent};

#[derive(Clone)]
pub struct DemoState {
    pub registry_service: Arc<RegistryService>,
    pub event_bus: Arc<EventBus>,
    pub sample: Arc<SimulatedCapture>,
}

pub fn demo_router(demo_state: DemoState) -> Router {
    Router::new()
        .route("/api/demo/populate", post(populate_demo))
        .with_state(demo_state)
}

#[utoipa::path(
    post,
    path = "/api/demo/populate",
    tag = "demo",
    responses(
        (status = 200, description = "Registry replaced with the sample environment", body = DemoPopulateResponse)
    )
)]
pub async fn populate_demo(
    State(state): State<DemoState>,
) -> Result<Json<ApiResponse<DemoPopulateResponse>>, ApiError> {
    let (networks, clients) = state.sample.history(OffsetDateTime::now_utc());

    state.registry_service.clear().await;

    // Networks first so that client associations resolve.
    for observation in networks {
        state.registry_service.upsert_network(observation).await;
    }
    for observation in clients {
        state.registry_service.upsert_client(observation).await;
    }

    let (networks, clients) = state.registry_service.counts().await;
    tracing::info!("Demo data loaded ({networks} networks, {clients} clients)");
    state
        .event_bus
        .publish(ScanEvent::RegistryPopulated { networks, clients });

    Ok(Json(ApiResponse::ok(DemoPopulateResponse {
        networks,
        clients,
        message: format!("Loaded {networks} networks and {clients} clients"),
    })))
}
