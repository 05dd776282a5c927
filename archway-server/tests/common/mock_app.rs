use std::sync::Arc;

use archway_api::capture::CaptureAdapter;
use archway_mock::SimulationSettings;
use archway_server::app::AppContext;
use archway_server::configs::{Database, InterfaceConfig, Scan, Settings};
use archway_server::services::{InterfaceInventory, StaticInventory};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

pub struct MockApp {
    pub router: Router,
    pub context: AppContext,
}

pub fn test_settings() -> Settings {
    Settings {
        database: Database {
            url: String::from("sqlite::memory:"),
            clean_start: true,
            restore_on_start: false,
        },
        scan: Scan {
            event_buffer: 64,
            shutdown_timeout_ms: 200,
            open_timeout_ms: 200,
            max_duration_secs: 3600,
        },
        simulation: SimulationSettings {
            seed: Some(42),
            networks: 8,
            clients: 12,
            frame_interval_ms: 1,
            sweep_interval_ms: 20,
        },
        ..Default::default()
    }
}

fn test_inventory() -> Arc<dyn InterfaceInventory> {
    Arc::new(StaticInventory::new(&[
        InterfaceConfig {
            name: String::from("wlan0"),
            monitor_capable: true,
        },
        InterfaceConfig {
            name: String::from("wlan1"),
            monitor_capable: false,
        },
    ]))
}

impl MockApp {
    /// Backed by the simulated capture.
    pub async fn new() -> Self {
        let settings = Arc::new(test_settings());
        let sample = Arc::new(archway_mock::SimulatedCapture::new(settings.simulation.clone()));

        Self::with_capture(sample).await
    }

    pub async fn with_capture(adapter: Arc<dyn CaptureAdapter>) -> Self {
        Self::with_settings(test_settings(), adapter).await
    }

    pub async fn with_settings(settings: Settings, adapter: Arc<dyn CaptureAdapter>) -> Self {
        let settings = Arc::new(settings);
        let context = AppContext::with_capture(&settings, adapter, test_inventory())
            .await
            .unwrap();
        context.start().await.unwrap();

        Self {
            router: context.router(),
            context,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().uri(uri).method(method);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }
}
