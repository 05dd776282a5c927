use axum::http::StatusCode;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Scan session {0} is already running")]
    AlreadyRunning(Uuid),

    #[error("Capture adapter unavailable: {0}")]
    AdapterUnavailable(String),

    #[error("Capture adapter did not shut down in time")]
    Timeout,

    #[error("Scan engine failure: {0}")]
    Internal(String),
}

impl ScanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ScanError::AlreadyRunning(_) => StatusCode::CONFLICT,
            ScanError::AdapterUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScanError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ScanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::InvalidArgument(_) => "invalid_argument",
            ScanError::AlreadyRunning(_) => "already_running",
            ScanError::AdapterUnavailable(_) => "adapter_unavailable",
            ScanError::Timeout => "timeout",
            ScanError::Internal(_) => "internal",
        }
    }
}
