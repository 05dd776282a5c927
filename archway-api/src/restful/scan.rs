use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ScanMode, ScanSession, SessionStatus};
use crate::restful::Pagination;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartScanRequest {
    /// Interface to capture on.
    pub interface: String,
    /// Scan mode, `basic` when omitted.
    #[serde(default)]
    pub mode: ScanMode,
    /// Optional duration in seconds.
    #[serde(default)]
    pub duration: Option<u64>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartScanResponse {
    /// Identifier of the new session.
    pub session_id: Uuid,
    /// Session state right after start.
    pub session: ScanSession,
    pub message: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopScanResponse {
    /// False when no session was active.
    pub stopped: bool,
    /// Status of the manager after the call.
    pub status: SessionStatus,
    /// Final state of the stopped session.
    pub session: Option<ScanSession>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStatusResponse {
    /// True while a session is running or stopping.
    pub scanning: bool,
    pub session_id: Option<Uuid>,
    /// Networks currently in the registry.
    pub networks_count: u64,
    /// Clients currently in the registry.
    pub clients_count: u64,
    /// Latest session, if any.
    pub session: Option<ScanSession>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    /// Past sessions, newest first.
    pub sessions: Vec<ScanSession>,
    pub pagination: Pagination,
}
