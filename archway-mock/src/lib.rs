pub mod capture;
pub mod environment;
pub mod settings;
pub mod simulate;

pub use capture::SimulatedCapture;
pub use environment::SampleEnvironment;
pub use settings::SimulationSettings;
