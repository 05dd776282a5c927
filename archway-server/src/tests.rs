//! Fixtures shared by the integration tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use archway_api::capture::{CaptureAdapter, CaptureError, CaptureEvent, CaptureHandle};
use archway_api::models::{
    ClientObservation, EncryptionKind, MacAddress, NetworkMode, NetworkObservation, ScanMode,
};
use async_trait::async_trait;
use time::OffsetDateTime;

/// Capture adapter that replays a fixed script of events.
///
/// Once the script is exhausted the handle waits until it is stopped,
/// unless `ends_after_script` is set.
#[derive(Default)]
pub struct ScriptedCapture {
    script: Vec<Result<CaptureEvent, CaptureError>>,
    fail_on_open: Option<CaptureError>,
    hang_on_open: bool,
    hang_on_close: bool,
    ends_after_script: bool,
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
    delivered: Arc<AtomicUsize>,
}

impl ScriptedCapture {
    pub fn new(events: Vec<CaptureEvent>) -> Self {
        Self {
            script: events.into_iter().map(Ok).collect(),
            ..Default::default()
        }
    }

    pub fn then_fail(mut self, error: CaptureError) -> Self {
        self.script.push(Err(error));
        self
    }

    pub fn fail_on_open(mut self, error: CaptureError) -> Self {
        self.fail_on_open = Some(error);
        self
    }

    pub fn hang_on_open(mut self) -> Self {
        self.hang_on_open = true;
        self
    }

    pub fn hang_on_close(mut self) -> Self {
        self.hang_on_close = true;
        self
    }

    pub fn ends_after_script(mut self) -> Self {
        self.ends_after_script = true;
        self
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Events handed out by all handles so far.
    pub fn delivered_count(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureAdapter for ScriptedCapture {
    async fn open(
        &self,
        _interface: &str,
        _mode: ScanMode,
    ) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        if let Some(error) = &self.fail_on_open {
            return Err(error.clone());
        }
        if self.hang_on_open {
            std::future::pending::<()>().await;
        }

        self.opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ScriptedHandle {
            script: self.script.iter().cloned().collect(),
            hang_on_close: self.hang_on_close,
            ends_after_script: self.ends_after_script,
            closed: self.closed.clone(),
            delivered: self.delivered.clone(),
        }))
    }
}

struct ScriptedHandle {
    script: VecDeque<Result<CaptureEvent, CaptureError>>,
    hang_on_close: bool,
    ends_after_script: bool,
    closed: Arc<AtomicUsize>,
    delivered: Arc<AtomicUsize>,
}

#[async_trait]
impl CaptureHandle for ScriptedHandle {
    async fn next_event(&mut self) -> Option<Result<CaptureEvent, CaptureError>> {
        match self.script.pop_front() {
            Some(event) => {
                self.delivered.fetch_add(1, Ordering::SeqCst);
                Some(event)
            }
            None if self.ends_after_script => None,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), CaptureError> {
        if self.hang_on_close {
            std::future::pending::<()>().await;
        }

        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn mac(value: &str) -> MacAddress {
    value.parse().unwrap()
}

pub fn network_obs(
    bssid: &str,
    ssid: &str,
    channel: u16,
    signal_strength: i32,
    encryption: EncryptionKind,
    observed_at: OffsetDateTime,
) -> NetworkObservation {
    NetworkObservation {
        bssid: mac(bssid),
        ssid: ssid.to_string(),
        channel,
        frequency: None,
        signal_strength,
        encryption,
        cipher: None,
        authentication: None,
        mode: NetworkMode::Infrastructure,
        observed_at,
    }
}

pub fn client_obs(
    client: &str,
    signal_strength: i32,
    associated_bssid: Option<&str>,
    observed_at: OffsetDateTime,
) -> ClientObservation {
    ClientObservation {
        mac: mac(client),
        signal_strength,
        associated_bssid: associated_bssid.map(mac),
        probed_ssid: None,
        observed_at,
    }
}
