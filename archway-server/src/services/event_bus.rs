use archway_api::models::{MacAddress, ScanSession};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::broadcast;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    SessionStarted {
        session: ScanSession,
    },
    SessionStopping {
        session: ScanSession,
    },
    SessionFinished {
        session: ScanSession,
    },
    NetworkDiscovered {
        bssid: MacAddress,
        ssid: String,
        channel: u16,
        signal_strength: i32,
    },
    RegistryCleared {
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
    },
    RegistryPopulated {
        networks: u64,
        clients: u64,
    },
}

impl ScanEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ScanEvent::SessionStarted { .. } => "session_started",
            ScanEvent::SessionStopping { .. } => "session_stopping",
            ScanEvent::SessionFinished { .. } => "session_finished",
            ScanEvent::NetworkDiscovered { .. } => "network_discovered",
            ScanEvent::RegistryCleared { .. } => "registry_cleared",
            ScanEvent::RegistryPopulated { .. } => "registry_populated",
        }
    }
}

/// Fan-out of engine events to the SSE stream and the persistence listener.
pub struct EventBus {
    sender: broadcast::Sender<ScanEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of receivers; zero is not an error.
    pub fn publish(&self, event: ScanEvent) -> usize {
        tracing::trace!("publish {}", event.name());
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.sender.subscribe()
    }

    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
