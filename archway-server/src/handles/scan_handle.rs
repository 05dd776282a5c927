use std::sync::Arc;

use archway_api::models::{Page, ScanSession, SessionStatus};
use archway_api::restful::*;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::configs::Api;
use crate::errors::{ApiError, QueryError};
use crate::handles::{PageQuery, page_request};
use crate::repositories::ScanSessionRepository;
use crate::services::{RegistryService, SessionService};

#[derive(Clone)]
pub struct ScanState {
    pub session_service: Arc<SessionService>,
    pub registry_service: Arc<RegistryService>,
    pub session_repository: Arc<ScanSessionRepository>,
    pub api: Api,
}

pub fn scan_router(scan_state: ScanState) -> Router {
    Router::new()
        .route("/api/scan/start", post(start_scan))
        .route("/api/scan/stop", post(stop_scan))
        .route("/api/scan/status", get(get_scan_status))
        .route("/api/scan/sessions", get(get_scan_sessions))
        .with_state(scan_state)
}

#[utoipa::path(
    post,
    path = "/api/scan/start",
    tag = "scan",
    request_body = StartScanRequest,
    responses(
        (status = 200, description = "Scan session started", body = StartScanResponse),
        (status = 400, description = "Invalid interface, mode or duration", body = ErrorResponse),
        (status = 409, description = "A session is already running", body = ErrorResponse),
        (status = 503, description = "Capture adapter could not be opened", body = ErrorResponse)
    )
)]
pub async fn start_scan(
    State(state): State<ScanState>,
    body: Result<Json<StartScanRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<StartScanResponse>>, ApiError> {
    let Json(body) = body.map_err(|e| QueryError::InvalidBody(e.body_text()))?;

    let session = state
        .session_service
        .start(&body.interface, body.mode, body.duration)
        .await?;

    Ok(Json(ApiResponse::ok(StartScanResponse {
        session_id: session.id,
        session,
        message: String::from("Scan started"),
    })))
}

#[utoipa::path(
    post,
    path = "/api/scan/stop",
    tag = "scan",
    responses(
        (status = 200, description = "Session stopped, or nothing to stop", body = StopScanResponse),
        (status = 504, description = "Capture adapter did not shut down in time", body = ErrorResponse)
    )
)]
pub async fn stop_scan(
    State(state): State<ScanState>,
) -> Result<Json<ApiResponse<StopScanResponse>>, ApiError> {
    let outcome = state.session_service.stop().await?;

    let status = outcome
        .session
        .as_ref()
        .map(|session| session.status)
        .unwrap_or(SessionStatus::Idle);

    Ok(Json(ApiResponse::ok(StopScanResponse {
        stopped: outcome.stopped,
        status,
        session: outcome.session,
    })))
}

#[utoipa::path(
    get,
    path = "/api/scan/status",
    tag = "scan",
    responses(
        (status = 200, description = "Current session and registry counts", body = ScanStatusResponse)
    )
)]
pub async fn get_scan_status(
    State(state): State<ScanState>,
) -> Result<Json<ApiResponse<ScanStatusResponse>>, ApiError> {
    let session = state.session_service.current().await;
    let (networks_count, clients_count) = state.registry_service.counts().await;

    Ok(Json(ApiResponse::ok(ScanStatusResponse {
        scanning: session.as_ref().is_some_and(|s| s.status.is_active()),
        session_id: session.as_ref().map(|s| s.id),
        networks_count,
        clients_count,
        session,
    })))
}

#[utoipa::path(
    get,
    path = "/api/scan/sessions",
    tag = "scan",
    params(
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("per_page" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Persisted sessions, newest first", body = SessionListResponse),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_scan_sessions(
    State(state): State<ScanState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<SessionListResponse>>, ApiError> {
    let request = page_request(&query, &state.api)?;

    let total = state.session_repository.count().await?;
    let sessions = state
        .session_repository
        .find_page(request.page, request.per_page)
        .await?
        .into_iter()
        .map(ScanSession::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let page = Page {
        items: sessions,
        page: request.page,
        per_page: request.per_page,
        total,
    };

    Ok(Json(ApiResponse::ok(SessionListResponse {
        pagination: Pagination::from(&page),
        sessions: page.items,
    })))
}
