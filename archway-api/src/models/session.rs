use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Basic,
    Monitor,
    Passive,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScanMode::Basic => write!(f, "basic"),
            ScanMode::Monitor => write!(f, "monitor"),
            ScanMode::Passive => write!(f, "passive"),
        }
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ScanMode::Basic),
            "monitor" => Ok(ScanMode::Monitor),
            "passive" => Ok(ScanMode::Passive),
            _ => Err(format!("unknown scan mode '{s}'")),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Stopping,
    Stopped,
    Failed,
}

impl SessionStatus {
    /// Running or Stopping: the session still owns the capture handle.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::Stopping)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Stopped | SessionStatus::Failed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Running => write!(f, "running"),
            SessionStatus::Stopping => write!(f, "stopping"),
            SessionStatus::Stopped => write!(f, "stopped"),
            SessionStatus::Failed => write!(f, "failed"),
        }
    }
}

impl From<String> for SessionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "running" => SessionStatus::Running,
            "stopping" => SessionStatus::Stopping,
            "stopped" => SessionStatus::Stopped,
            "failed" => SessionStatus::Failed,
            _ => SessionStatus::Idle,
        }
    }
}

/// Why a session ended in `Failed`.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    /// The adapter did not release within the shutdown deadline.
    Timeout,
    Capture { message: String },
    Internal { message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FailureReason::Timeout => write!(f, "capture adapter did not shut down in time"),
            FailureReason::Capture { message } => write!(f, "capture error: {message}"),
            FailureReason::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSession {
    /// Session identifier
    pub id: Uuid,
    /// Interface the session captures on
    pub interface: String,
    pub mode: ScanMode,
    pub status: SessionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    /// Requested duration, unbounded when absent
    pub duration_secs: Option<u64>,
    /// Distinct networks observed during this session
    pub networks_seen: u64,
    /// Distinct clients observed during this session
    pub clients_seen: u64,
    /// Capture events ingested
    pub packets_captured: u64,
    pub failure: Option<FailureReason>,
}

impl ScanSession {
    pub fn new(interface: impl Into<String>, mode: ScanMode, duration_secs: Option<u64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            interface: interface.into(),
            mode,
            status: SessionStatus::Running,
            started_at: OffsetDateTime::now_utc(),
            ended_at: None,
            duration_secs,
            networks_seen: 0,
            clients_seen: 0,
            packets_captured: 0,
            failure: None,
        }
    }
}
