use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use archway_api::capture::{CaptureAdapter, CaptureError, CaptureEvent, CaptureHandle};
use archway_api::models::{ClientObservation, NetworkObservation, ScanMode};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::OffsetDateTime;

use crate::environment::SampleEnvironment;
use crate::settings::SimulationSettings;

/// Capture backend that replays a generated radio environment.
pub struct SimulatedCapture {
    environment: Arc<SampleEnvironment>,
    settings: SimulationSettings,
    seed: u64,
    draws: AtomicU64,
}

impl SimulatedCapture {
    pub fn new(settings: SimulationSettings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let environment = SampleEnvironment::generate(&mut rng, settings.networks, settings.clients);

        Self::with_environment(Arc::new(environment), settings, seed)
    }

    pub fn with_environment(
        environment: Arc<SampleEnvironment>,
        settings: SimulationSettings,
        seed: u64,
    ) -> Self {
        Self {
            environment,
            settings,
            seed,
            draws: AtomicU64::new(0),
        }
    }

    /// A burst of observations covering every simulated entity, ending at `now`.
    pub fn history(&self, now: OffsetDateTime) -> (Vec<NetworkObservation>, Vec<ClientObservation>) {
        let draw = self.draws.fetch_add(1, Ordering::Relaxed);
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(draw));
        self.environment.history(&mut rng, now)
    }
}

#[async_trait]
impl CaptureAdapter for SimulatedCapture {
    async fn open(
        &self,
        interface: &str,
        mode: ScanMode,
    ) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        if self.environment.networks.is_empty() {
            return Err(CaptureError::AdapterUnavailable(interface.to_string()));
        }

        let generation = self.draws.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Opening simulated capture on {interface} in {mode} mode");

        Ok(Box::new(SimulatedHandle {
            environment: Arc::clone(&self.environment),
            mode,
            rng: StdRng::seed_from_u64(self.seed.wrapping_add(generation)),
            queue: VecDeque::new(),
            frame_interval: Duration::from_millis(self.settings.frame_interval_ms),
            sweep_interval: sweep_interval(mode, self.settings.sweep_interval_ms),
            sweeps: 0,
            closed: false,
        }))
    }
}

fn sweep_interval(mode: ScanMode, base_ms: u64) -> Duration {
    match mode {
        ScanMode::Passive => Duration::from_millis(base_ms.saturating_mul(2)),
        ScanMode::Basic | ScanMode::Monitor => Duration::from_millis(base_ms),
    }
}

struct SimulatedHandle {
    environment: Arc<SampleEnvironment>,
    mode: ScanMode,
    rng: StdRng,
    queue: VecDeque<CaptureEvent>,
    frame_interval: Duration,
    sweep_interval: Duration,
    sweeps: u64,
    closed: bool,
}

impl SimulatedHandle {
    fn refill(&mut self) {
        let now = OffsetDateTime::now_utc();
        let environment = Arc::clone(&self.environment);

        match self.mode {
            // An active scan answers with a probe response from every AP in range.
            ScanMode::Basic => {
                for network in &environment.networks {
                    let observation = network.observe(&mut self.rng, now);
                    self.queue.push_back(CaptureEvent::ProbeResponse(observation));
                }
            }
            ScanMode::Passive => {
                for network in &environment.networks {
                    if self.rng.random_bool(0.7) {
                        let observation = network.observe(&mut self.rng, now);
                        self.queue.push_back(CaptureEvent::Beacon(observation));
                    }
                }
            }
            ScanMode::Monitor => {
                for network in &environment.networks {
                    let observation = network.observe(&mut self.rng, now);
                    self.queue.push_back(CaptureEvent::Beacon(observation));
                }
                for client in &environment.clients {
                    if !client.probes.is_empty() && self.rng.random_bool(0.5) {
                        let probe = environment.probe_request(&mut self.rng, client, now);
                        self.queue.push_back(CaptureEvent::ProbeRequest(probe));
                    }
                    if client.associated.is_some() {
                        let data = environment.data_frame(&mut self.rng, client, now);
                        self.queue.push_back(CaptureEvent::Data(data));
                    }
                }
            }
        }

        self.sweeps += 1;
    }
}

#[async_trait]
impl CaptureHandle for SimulatedHandle {
    async fn next_event(&mut self) -> Option<Result<CaptureEvent, CaptureError>> {
        if self.closed {
            return None;
        }

        if self.queue.is_empty() {
            if self.sweeps > 0 {
                tokio::time::sleep(self.sweep_interval).await;
            }
            self.refill();
        } else if !self.frame_interval.is_zero() {
            tokio::time::sleep(self.frame_interval).await;
        }

        self.queue.pop_front().map(Ok)
    }

    async fn close(&mut self) -> Result<(), CaptureError> {
        self.closed = true;
        self.queue.clear();
        tracing::debug!("Simulated capture closed after {} sweeps", self.sweeps);
        Ok(())
    }
}
