use std::sync::Arc;

use archway_api::models::{
    AnalyticsSummary, ChannelAnalysis, ComprehensiveReport, SecurityPosture, SignalAnalysis,
    ThreatReport,
};
use archway_api::restful::ApiResponse;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::errors::ApiError;
use crate::services::AnalyticsService;

#[derive(Clone)]
pub struct AnalyticsState {
    pub analytics_service: Arc<AnalyticsService>,
}

pub fn analytics_router(analytics_state: AnalyticsState) -> Router {
    Router::new()
        .route("/api/analytics/summary", get(get_summary))
        .route("/api/analytics/security", get(get_security_posture))
        .route("/api/analytics/channels", get(get_channel_analysis))
        .route("/api/analytics/signal", get(get_signal_analysis))
        .route("/api/analytics/threats", get(get_threat_report))
        .route("/api/analytics/advanced", get(get_comprehensive_report))
        .with_state(analytics_state)
}

#[utoipa::path(
    get,
    path = "/api/analytics/summary",
    tag = "analytics",
    responses(
        (status = 200, description = "Registry totals and distributions", body = AnalyticsSummary)
    )
)]
pub async fn get_summary(
    State(state): State<AnalyticsState>,
) -> Result<Json<ApiResponse<AnalyticsSummary>>, ApiError> {
    let summary = state.analytics_service.summary().await;

    Ok(Json(ApiResponse::ok(summary.as_ref().clone())))
}

#[utoipa::path(
    get,
    path = "/api/analytics/security",
    tag = "analytics",
    responses(
        (status = 200, description = "Encryption posture of the environment", body = SecurityPosture)
    )
)]
pub async fn get_security_posture(
    State(state): State<AnalyticsState>,
) -> Result<Json<ApiResponse<SecurityPosture>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.analytics_service.security_posture().await,
    )))
}

#[utoipa::path(
    get,
    path = "/api/analytics/channels",
    tag = "analytics",
    responses(
        (status = 200, description = "Channel usage and recommendations", body = ChannelAnalysis)
    )
)]
pub async fn get_channel_analysis(
    State(state): State<AnalyticsState>,
) -> Result<Json<ApiResponse<ChannelAnalysis>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.analytics_service.channel_analysis().await,
    )))
}

#[utoipa::path(
    get,
    path = "/api/analytics/signal",
    tag = "analytics",
    responses(
        (status = 200, description = "Signal strength statistics", body = SignalAnalysis)
    )
)]
pub async fn get_signal_analysis(
    State(state): State<AnalyticsState>,
) -> Result<Json<ApiResponse<SignalAnalysis>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.analytics_service.signal_analysis().await,
    )))
}

#[utoipa::path(
    get,
    path = "/api/analytics/threats",
    tag = "analytics",
    responses(
        (status = 200, description = "Evil twin and rogue access point candidates", body = ThreatReport)
    )
)]
pub async fn get_threat_report(
    State(state): State<AnalyticsState>,
) -> Result<Json<ApiResponse<ThreatReport>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.analytics_service.threat_report().await,
    )))
}

#[utoipa::path(
    get,
    path = "/api/analytics/advanced",
    tag = "analytics",
    responses(
        (status = 200, description = "All analyses with combined recommendations", body = ComprehensiveReport)
    )
)]
pub async fn get_comprehensive_report(
    State(state): State<AnalyticsState>,
) -> Result<Json<ApiResponse<ComprehensiveReport>>, ApiError> {
    Ok(Json(ApiResponse::ok(
        state.analytics_service.comprehensive_report().await,
    )))
}
