use std::sync::Arc;

use archway_api::restful::{ApiResponse, InterfaceListResponse, InterfaceResponse};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::errors::{ApiError, RegistryError};
use crate::services::InterfaceInventory;

#[derive(Clone)]
pub struct InterfaceState {
    pub inventory: Arc<dyn InterfaceInventory>,
}

pub fn interface_router(interface_state: InterfaceState) -> Router {
    Router::new()
        .route("/api/interfaces", get(get_interfaces))
        .route("/api/interfaces/:name", get(get_interface))
        .with_state(interface_state)
}

#[utoipa::path(
    get,
    path = "/api/interfaces",
    tag = "interface",
    responses(
        (status = 200, description = "Wireless interfaces found on this host", body = InterfaceListResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_interfaces(
    State(state): State<InterfaceState>,
) -> Result<Json<ApiResponse<InterfaceListResponse>>, ApiError> {
    let interfaces = state.inventory.list().await?;

    Ok(Json(ApiResponse::ok(InterfaceListResponse { interfaces })))
}

#[utoipa::path(
    get,
    path = "/api/interfaces/{name}",
    tag = "interface",
    params(
        ("name" = String, Path, description = "Interface name")
    ),
    responses(
        (status = 200, description = "Interface details", body = InterfaceResponse),
        (status = 404, description = "Interface not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_interface(
    State(state): State<InterfaceState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<InterfaceResponse>>, ApiError> {
    let interface = state
        .inventory
        .get(&name)
        .await?
        .ok_or_else(|| RegistryError::InterfaceNotFound(name.clone()))?;

    Ok(Json(ApiResponse::ok(InterfaceResponse { interface })))
}
