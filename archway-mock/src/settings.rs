use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Fixed seed for reproducible environments, random when absent.
    pub seed: Option<u64>,
    pub networks: usize,
    pub clients: usize,
    /// Delay between two frames inside a sweep.
    pub frame_interval_ms: u64,
    /// Delay between two sweeps of the environment.
    pub sweep_interval_ms: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            networks: 50,
            clients: 30,
            frame_interval_ms: 20,
            sweep_interval_ms: 1000,
        }
    }
}
