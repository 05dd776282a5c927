use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use archway_api::capture::{CaptureAdapter, CaptureError, CaptureEvent, CaptureHandle};
use archway_api::models::{FailureReason, MacAddress, ScanMode, ScanSession, SessionStatus};
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock, mpsc, watch};

use crate::configs::Scan;
use crate::errors::ScanError;
use crate::services::{EventBus, InterfaceInventory, RegistryService, ScanEvent};

/// Why the capture pump stopped producing events.
#[derive(Debug)]
enum PumpExit {
    /// Stop signal observed or the ingest side went away.
    Stopped,
    /// The adapter ended its stream on its own.
    Ended,
    Failed(CaptureError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    StopRequested,
    DurationElapsed,
    PumpExited,
}

/// Result of a stop request.
#[derive(Debug, Clone)]
pub struct StopOutcome {
    /// False when there was nothing to stop.
    pub stopped: bool,
    pub session: Option<ScanSession>,
}

/// Shared state of one scan session. The supervising task owns the only
/// writer; everything else reads snapshots.
pub struct SessionRuntime {
    session: RwLock<ScanSession>,
    stop_tx: watch::Sender<bool>,
    done_tx: watch::Sender<bool>,
}

impl SessionRuntime {
    fn new(session: ScanSession) -> Self {
        let (stop_tx, _) = watch::channel(false);
        let (done_tx, _) = watch::channel(false);

        Self {
            session: RwLock::new(session),
            stop_tx,
            done_tx,
        }
    }

    pub async fn snapshot(&self) -> ScanSession {
        self.session.read().await.clone()
    }

    fn request_stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Waits until the session reached a terminal state.
    pub async fn finished(&self) {
        let mut done = self.done_tx.subscribe();
        let _ = done.wait_for(|finished| *finished).await;
    }

    /// The single place a session changes status. Returns `None` and leaves
    /// the session untouched when the move is not allowed.
    async fn transition(
        &self,
        to: SessionStatus,
        failure: Option<FailureReason>,
    ) -> Option<ScanSession> {
        let mut session = self.session.write().await;
        let from = session.status;

        let allowed = matches!(
            (from, to),
            (SessionStatus::Running, SessionStatus::Stopping)
                | (SessionStatus::Running, SessionStatus::Stopped)
                | (SessionStatus::Running, SessionStatus::Failed)
                | (SessionStatus::Stopping, SessionStatus::Stopped)
                | (SessionStatus::Stopping, SessionStatus::Failed)
        );
        if !allowed {
            tracing::warn!("Session {} refused transition {from} -> {to}", session.id);
            return None;
        }

        session.status = to;
        if to.is_terminal() {
            let now = OffsetDateTime::now_utc();
            session.ended_at = Some(now);
            session.failure = failure;
        }

        match &session.failure {
            Some(reason) => tracing::warn!("Session {} {from} -> {to}: {reason}", session.id),
            None => tracing::info!("Session {} {from} -> {to}", session.id),
        }

        Some(session.clone())
    }
}

/// Owns the single active scan session slot.
pub struct SessionService {
    adapter: Arc<dyn CaptureAdapter>,
    inventory: Arc<dyn InterfaceInventory>,
    registry: Arc<RegistryService>,
    bus: Arc<EventBus>,
    settings: Scan,
    active: Mutex<Option<Arc<SessionRuntime>>>,
    /// Serialises starts without blocking readers of `active`.
    starting: Mutex<()>,
}

impl SessionService {
    pub fn new(
        adapter: Arc<dyn CaptureAdapter>,
        inventory: Arc<dyn InterfaceInventory>,
        registry: Arc<RegistryService>,
        bus: Arc<EventBus>,
        settings: Scan,
    ) -> Self {
        Self {
            adapter,
            inventory,
            registry,
            bus,
            settings,
            active: Mutex::new(None),
            starting: Mutex::new(()),
        }
    }

    fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.shutdown_timeout_ms)
    }

    pub async fn start(
        &self,
        interface: &str,
        mode: ScanMode,
        duration_secs: Option<u64>,
    ) -> Result<ScanSession, ScanError> {
        match duration_secs {
            Some(0) => {
                return Err(ScanError::InvalidArgument(String::from(
                    "duration must be at least one second",
                )));
            }
            Some(secs) if secs > self.settings.max_duration_secs => {
                return Err(ScanError::InvalidArgument(format!(
                    "duration must not exceed {} seconds",
                    self.settings.max_duration_secs
                )));
            }
            _ => {}
        }

        let device = self
            .inventory
            .get(interface)
            .await
            .map_err(|e| ScanError::Internal(format!("interface inventory: {e}")))?
            .ok_or_else(|| ScanError::InvalidArgument(format!("unknown interface '{interface}'")))?;

        if mode == ScanMode::Monitor && !device.monitor_capable {
            return Err(ScanError::InvalidArgument(format!(
                "interface '{interface}' does not support monitor mode"
            )));
        }

        let _starting = self.starting.lock().await;

        if let Some(session) = self.current().await {
            if session.status.is_active() {
                return Err(ScanError::AlreadyRunning(session.id));
            }
        }

        let open_timeout = Duration::from_millis(self.settings.open_timeout_ms);
        let handle = match tokio::time::timeout(open_timeout, self.adapter.open(interface, mode)).await {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => return Err(ScanError::AdapterUnavailable(e.to_string())),
            Err(_) => {
                tracing::warn!("Capture adapter on {interface} did not open within {open_timeout:?}");
                return Err(ScanError::AdapterUnavailable(format!(
                    "'{interface}' did not open within {} ms",
                    self.settings.open_timeout_ms
                )));
            }
        };

        let session = ScanSession::new(interface, mode, duration_secs);
        let runtime = Arc::new(SessionRuntime::new(session.clone()));
        *self.active.lock().await = Some(Arc::clone(&runtime));

        tracing::info!(
            "Session {} started on {interface} in {mode} mode",
            session.id
        );
        self.bus.publish(ScanEvent::SessionStarted {
            session: session.clone(),
        });

        let supervisor = Supervisor {
            runtime,
            registry: Arc::clone(&self.registry),
            bus: Arc::clone(&self.bus),
            event_buffer: self.settings.event_buffer.max(1),
            shutdown_timeout: self.shutdown_timeout(),
            seen_networks: HashSet::new(),
            seen_clients: HashSet::new(),
        };
        tokio::spawn(supervisor.run(handle));

        Ok(session)
    }

    /// Stopping an idle or finished manager succeeds without doing anything.
    pub async fn stop(&self) -> Result<StopOutcome, ScanError> {
        let runtime = self.active.lock().await.clone();

        let Some(runtime) = runtime else {
            return Ok(StopOutcome {
                stopped: false,
                session: None,
            });
        };

        let current = runtime.snapshot().await;
        if !current.status.is_active() {
            return Ok(StopOutcome {
                stopped: false,
                session: Some(current),
            });
        }

        runtime.request_stop();

        // The supervisor enforces the shutdown budget itself; this bound only
        // protects the caller if the supervisor task was lost.
        let wait = self.shutdown_timeout() * 2 + Duration::from_secs(1);
        if tokio::time::timeout(wait, runtime.finished()).await.is_err() {
            tracing::error!("Session {} did not report completion", current.id);
            return Err(ScanError::Timeout);
        }

        let session = runtime.snapshot().await;
        if session.failure == Some(FailureReason::Timeout) {
            return Err(ScanError::Timeout);
        }

        Ok(StopOutcome {
            stopped: true,
            session: Some(session),
        })
    }

    /// The running session, or the most recent one.
    pub async fn current(&self) -> Option<ScanSession> {
        let runtime = self.active.lock().await.clone();
        match runtime {
            Some(runtime) => Some(runtime.snapshot().await),
            None => None,
        }
    }

    pub async fn is_scanning(&self) -> bool {
        self.current()
            .await
            .is_some_and(|session| session.status.is_active())
    }

    /// Resolves once the current session, if any, has finished.
    pub async fn wait_finished(&self) -> Option<ScanSession> {
        let runtime = self.active.lock().await.clone()?;
        runtime.finished().await;
        Some(runtime.snapshot().await)
    }
}

struct Supervisor {
    runtime: Arc<SessionRuntime>,
    registry: Arc<RegistryService>,
    bus: Arc<EventBus>,
    event_buffer: usize,
    shutdown_timeout: Duration,
    seen_networks: HashSet<MacAddress>,
    seen_clients: HashSet<MacAddress>,
}

impl Supervisor {
    async fn run(mut self, handle: Box<dyn CaptureHandle>) {
        let (tx, mut rx) = mpsc::channel(self.event_buffer);
        let mut stop_rx = self.runtime.stop_tx.subscribe();
        let mut pump = tokio::spawn(pump(handle, tx, self.runtime.stop_tx.subscribe()));

        let session = self.runtime.snapshot().await;
        let deadline = async {
            match session.duration_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let ending = loop {
            tokio::select! {
                biased;
                _ = stop_signalled(&mut stop_rx) => break Ending::StopRequested,
                _ = &mut deadline => break Ending::DurationElapsed,
                event = rx.recv() => match event {
                    Some(event) => self.ingest(event).await,
                    None => break Ending::PumpExited,
                },
            }
        };

        if ending != Ending::PumpExited {
            if ending == Ending::DurationElapsed {
                tracing::info!("Session {} reached its duration", session.id);
                self.runtime.request_stop();
            }
            if let Some(stopping) = self.runtime.transition(SessionStatus::Stopping, None).await {
                self.bus.publish(ScanEvent::SessionStopping { session: stopping });
            }
        }

        let drained = tokio::time::timeout(self.shutdown_timeout, async {
            while let Some(event) = rx.recv().await {
                self.ingest(event).await;
            }
            (&mut pump).await
        })
        .await;

        let (status, failure) = match drained {
            Ok(Ok(PumpExit::Failed(error))) => (
                SessionStatus::Failed,
                Some(FailureReason::Capture {
                    message: error.to_string(),
                }),
            ),
            Ok(Ok(PumpExit::Stopped | PumpExit::Ended)) => (SessionStatus::Stopped, None),
            Ok(Err(join_error)) => (
                SessionStatus::Failed,
                Some(FailureReason::Internal {
                    message: join_error.to_string(),
                }),
            ),
            Err(_) => {
                pump.abort();
                (SessionStatus::Failed, Some(FailureReason::Timeout))
            }
        };

        if let Some(finished) = self.runtime.transition(status, failure).await {
            self.bus.publish(ScanEvent::SessionFinished { session: finished });
        }
        self.runtime.done_tx.send_replace(true);
    }

    async fn ingest(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Beacon(observation) | CaptureEvent::ProbeResponse(observation) => {
                let upserted = self.registry.upsert_network(observation).await;
                let network = upserted.record;
                if upserted.created {
                    self.bus.publish(ScanEvent::NetworkDiscovered {
                        bssid: network.bssid,
                        ssid: network.ssid.clone(),
                        channel: network.channel,
                        signal_strength: network.signal_strength,
                    });
                }
                self.seen_networks.insert(network.bssid);
            }
            CaptureEvent::ProbeRequest(observation) | CaptureEvent::Data(observation) => {
                let upserted = self.registry.upsert_client(observation).await;
                self.seen_clients.insert(upserted.record.mac);
            }
        }

        let mut session = self.runtime.session.write().await;
        session.packets_captured += 1;
        session.networks_seen = self.seen_networks.len() as u64;
        session.clients_seen = self.seen_clients.len() as u64;
    }
}

async fn stop_signalled(stop: &mut watch::Receiver<bool>) {
    // A closed channel means the runtime is gone, which is a stop too.
    let _ = stop.wait_for(|stopped| *stopped).await;
}

/// Moves events from the adapter into the bounded ingest channel until told
/// to stop, then releases the adapter.
async fn pump(
    mut handle: Box<dyn CaptureHandle>,
    tx: mpsc::Sender<CaptureEvent>,
    mut stop: watch::Receiver<bool>,
) -> PumpExit {
    let exit = loop {
        tokio::select! {
            biased;
            _ = stop_signalled(&mut stop) => break PumpExit::Stopped,
            next = handle.next_event() => match next {
                // An event taken from the adapter is always forwarded; the
                // supervisor keeps draining while it shuts down.
                Some(Ok(event)) => {
                    if tx.send(event).await.is_err() {
                        break PumpExit::Stopped;
                    }
                }
                Some(Err(error)) => break PumpExit::Failed(error),
                None => break PumpExit::Ended,
            },
        }
    };

    drop(tx);

    if let Err(e) = handle.close().await {
        tracing::warn!("Failed to close capture handle: {}", e);
    }

    exit
}
