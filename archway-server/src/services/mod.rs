mod analytics_service;
mod event_bus;
mod inventory_service;
mod persistence_service;
mod registry_service;
mod security_service;
mod session_service;
mod vendor_service;

pub use analytics_service::{AnalyticsService, network_fingerprint};
pub use event_bus::{EventBus, ScanEvent};
pub use inventory_service::{InterfaceInventory, StaticInventory, SysfsInventory};
pub use persistence_service::PersistenceService;
pub use registry_service::{
    NetworkFilter, PageRequest, RegistryService, RegistrySnapshot, SortSpec, Upserted,
};
pub use security_service::{SecurityService, risk_score};
pub use session_service::{SessionRuntime, SessionService, StopOutcome};
pub use vendor_service::{RANDOMIZED_VENDOR, UNKNOWN_VENDOR, VendorService};
