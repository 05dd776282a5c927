use std::env;

use archway_mock::SimulationSettings;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            level: String::from("info"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub url: String,
    pub clean_start: bool,
    /// Load the last persisted registry snapshot at startup.
    pub restore_on_start: bool,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            clean_start: true,
            restore_on_start: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scan {
    /// Capacity of the channel between the capture pump and the ingest loop.
    pub event_buffer: usize,
    /// Budget for draining queued events and closing the adapter.
    pub shutdown_timeout_ms: u64,
    /// How long an adapter may take to open before it counts as unavailable.
    pub open_timeout_ms: u64,
    pub max_duration_secs: u64,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            event_buffer: 256,
            shutdown_timeout_ms: 3000,
            open_timeout_ms: 5000,
            max_duration_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Api {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            default_per_page: 50,
            max_per_page: 200,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureBackend {
    #[default]
    Simulated,
    Sysfs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub name: String,
    #[serde(default)]
    pub monitor_capable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Capture {
    pub backend: CaptureBackend,
    /// Interfaces offered by the static inventory, or overrides for sysfs.
    pub interfaces: Vec<InterfaceConfig>,
}

impl Default for Capture {
    fn default() -> Self {
        Self {
            backend: CaptureBackend::Simulated,
            interfaces: vec![InterfaceConfig {
                name: String::from("wlan0"),
                monitor_capable: true,
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RogueHeuristic {
    /// Smallest SSID group considered a multi-AP deployment.
    pub min_bssids: usize,
    /// Signals closer than this (dB) on one channel look like a twin.
    pub signal_delta_db: i32,
    pub flag_co_channel: bool,
}

impl Default for RogueHeuristic {
    fn default() -> Self {
        Self {
            min_bssids: 2,
            signal_delta_db: 10,
            flag_co_channel: true,
        }
    }
}

/// Per-flag risk weights, 0 to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub unsecured: f64,
    pub weak_encryption: f64,
    pub legacy_encryption: f64,
    pub weak_cipher: f64,
    pub rogue_ap_suspect: f64,
    pub suspicious_ssid: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            unsecured: 100.0,
            weak_encryption: 80.0,
            legacy_encryption: 40.0,
            weak_cipher: 30.0,
            rogue_ap_suspect: 70.0,
            suspicious_ssid: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    pub suspicious_ssids: Vec<String>,
    pub rogue: RogueHeuristic,
    pub weights: RiskWeights,
}

impl Default for Security {
    fn default() -> Self {
        Self {
            suspicious_ssids: ["free wifi", "free_wifi", "public", "guest", "open", "internet"]
                .into_iter()
                .map(String::from)
                .collect(),
            rogue: RogueHeuristic::default(),
            weights: RiskWeights::default(),
        }
    }
}

/// Score contributed by each encryption kind to the environment posture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureWeights {
    pub wpa3: f64,
    pub wpa2: f64,
    pub wpa: f64,
    pub wep: f64,
    pub open: f64,
    pub unknown: f64,
}

impl Default for PostureWeights {
    fn default() -> Self {
        Self {
            wpa3: 100.0,
            wpa2: 80.0,
            wpa: 60.0,
            wep: 20.0,
            open: 0.0,
            unknown: 50.0,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Analytics {
    pub posture_weights: PostureWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorEntry {
    /// OUI prefix, e.g. `00:11:22`
    pub prefix: String,
    pub name: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    pub scan: Scan,
    pub api: Api,
    pub capture: Capture,
    pub simulation: SimulationSettings,
    pub security: Security,
    pub analytics: Analytics,
    pub vendors: Vec<VendorEntry>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("_"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                r#"
                [scan]
                shutdown_timeout_ms = 250

                [security.weights]
                unsecured = 90.0

                [[vendors]]
                prefix = "AA:BB:CC"
                name = "Lab Radio"
                "#,
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.scan.shutdown_timeout_ms, 250);
        assert_eq!(settings.scan.event_buffer, 256);
        assert_eq!(settings.security.weights.unsecured, 90.0);
        assert_eq!(settings.security.weights.weak_encryption, 80.0);
        assert_eq!(settings.api.max_per_page, 200);
        assert_eq!(settings.vendors[0].name, "Lab Radio");
        assert_eq!(settings.capture.backend, CaptureBackend::Simulated);
    }
}
