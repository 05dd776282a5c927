use async_trait::async_trait;

use crate::models::{ClientObservation, NetworkObservation, ScanMode};

/// A raw discovery event decoded by a capture backend.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    Beacon(NetworkObservation),
    ProbeResponse(NetworkObservation),
    ProbeRequest(ClientObservation),
    Data(ClientObservation),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("capture adapter unavailable for '{0}'")]
    AdapterUnavailable(String),
    #[error("insufficient privileges to capture on '{0}'")]
    PermissionDenied(String),
    #[error("interface '{0}' disappeared")]
    InterfaceGone(String),
    #[error("capture I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => CaptureError::PermissionDenied(err.to_string()),
            std::io::ErrorKind::NotFound => CaptureError::InterfaceGone(err.to_string()),
            _ => CaptureError::Io(err.to_string()),
        }
    }
}

/// Opens capture streams. Implemented by real radio backends and by simulators.
#[async_trait]
pub trait CaptureAdapter: Send + Sync {
    async fn open(
        &self,
        interface: &str,
        mode: ScanMode,
    ) -> Result<Box<dyn CaptureHandle>, CaptureError>;
}

/// A live, lazily produced sequence of capture events on one interface.
#[async_trait]
pub trait CaptureHandle: Send {
    /// Waits for the next event. `None` means the stream ended cleanly.
    async fn next_event(&mut self) -> Option<Result<CaptureEvent, CaptureError>>;

    /// Releases the underlying device. Dropping the handle must also release it.
    async fn close(&mut self) -> Result<(), CaptureError>;
}
