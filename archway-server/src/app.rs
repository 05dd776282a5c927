use std::sync::Arc;

use archway_api::capture::CaptureAdapter;
use archway_mock::SimulatedCapture;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{CaptureBackend, SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::repositories::{ClientRepository, NetworkRepository, ScanSessionRepository};
use crate::services::{
    AnalyticsService, EventBus, InterfaceInventory, PersistenceService, RegistryService,
    SecurityService, SessionService, StaticInventory, SysfsInventory, VendorService,
};

/// Every long-lived service of the engine, wired together once at startup.
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub storage: Arc<Storage>,
    pub event_bus: Arc<EventBus>,
    pub registry_service: Arc<RegistryService>,
    pub security_service: Arc<SecurityService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub session_service: Arc<SessionService>,
    pub persistence_service: Arc<PersistenceService>,
    pub session_repository: Arc<ScanSessionRepository>,
    pub inventory: Arc<dyn InterfaceInventory>,
    pub sample: Arc<SimulatedCapture>,
}

impl AppContext {
    pub async fn new(settings: &Arc<Settings>) -> anyhow::Result<Self> {
        let sample = Arc::new(SimulatedCapture::new(settings.simulation.clone()));

        let inventory: Arc<dyn InterfaceInventory> = match settings.capture.backend {
            CaptureBackend::Simulated => Arc::new(StaticInventory::new(&settings.capture.interfaces)),
            CaptureBackend::Sysfs => Arc::new(SysfsInventory::new(&settings.capture.interfaces)),
        };

        // Frames come from the simulator until a hardware adapter is supplied
        // through `with_capture`.
        let adapter: Arc<dyn CaptureAdapter> = sample.clone();

        Self::build(settings, adapter, inventory, sample).await
    }

    pub async fn with_capture(
        settings: &Arc<Settings>,
        adapter: Arc<dyn CaptureAdapter>,
        inventory: Arc<dyn InterfaceInventory>,
    ) -> anyhow::Result<Self> {
        let sample = Arc::new(SimulatedCapture::new(settings.simulation.clone()));

        Self::build(settings, adapter, inventory, sample).await
    }

    async fn build(
        settings: &Arc<Settings>,
        adapter: Arc<dyn CaptureAdapter>,
        inventory: Arc<dyn InterfaceInventory>,
        sample: Arc<SimulatedCapture>,
    ) -> anyhow::Result<Self> {
        let storage = Arc::new(
            Storage::new(settings.database.clone(), SchemaManager::default()).await?,
        );

        let vendor_service = Arc::new(VendorService::new(&settings.vendors));
        let event_bus = Arc::new(EventBus::new(settings.scan.event_buffer.max(1)));
        let registry_service = Arc::new(RegistryService::new(vendor_service));
        let security_service = Arc::new(SecurityService::new(settings.security.clone()));
        let analytics_service = Arc::new(AnalyticsService::new(
            registry_service.clone(),
            security_service.clone(),
            &settings.analytics,
            settings.security.rogue.signal_delta_db,
        ));
        let session_service = Arc::new(SessionService::new(
            adapter,
            inventory.clone(),
            registry_service.clone(),
            event_bus.clone(),
            settings.scan.clone(),
        ));

        let session_repository = Arc::new(ScanSessionRepository::new(storage.clone()));
        let persistence_service = Arc::new(PersistenceService::new(
            registry_service.clone(),
            Arc::new(NetworkRepository::new(storage.clone())),
            Arc::new(ClientRepository::new(storage.clone())),
            session_repository.clone(),
        ));

        Ok(Self {
            settings: settings.clone(),
            storage,
            event_bus,
            registry_service,
            security_service,
            analytics_service,
            session_service,
            persistence_service,
            session_repository,
            inventory,
            sample,
        })
    }

    /// Restores the persisted registry when configured and starts the
    /// persistence listener.
    pub async fn start(&self) -> anyhow::Result<()> {
        if self.settings.database.restore_on_start {
            self.persistence_service.restore_registry().await?;
        }

        // Subscribe before spawning so nothing published after `start` is missed.
        let receiver = self.event_bus.subscribe();
        let persistence_service = self.persistence_service.clone();
        tokio::spawn(async move {
            persistence_service.start_listening(receiver).await;
        });

        Ok(())
    }

    pub fn router(&self) -> Router {
        let api = self.settings.api.clone();

        Router::new()
            .merge(health_router(HealthState {
                session_service: self.session_service.clone(),
            }))
            .merge(interface_router(InterfaceState {
                inventory: self.inventory.clone(),
            }))
            .merge(scan_router(ScanState {
                session_service: self.session_service.clone(),
                registry_service: self.registry_service.clone(),
                session_repository: self.session_repository.clone(),
                api: api.clone(),
            }))
            .merge(sse_router(SseState {
                event_bus: self.event_bus.clone(),
            }))
            .merge(network_router(NetworkState {
                registry_service: self.registry_service.clone(),
                security_service: self.security_service.clone(),
                event_bus: self.event_bus.clone(),
                api,
            }))
            .merge(analytics_router(AnalyticsState {
                analytics_service: self.analytics_service.clone(),
            }))
            .merge(demo_router(DemoState {
                registry_service: self.registry_service.clone(),
                event_bus: self.event_bus.clone(),
                sample: self.sample.clone(),
            }))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }
}

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let context = AppContext::new(settings).await?;
    context.start().await?;

    Ok(context.router())
}
