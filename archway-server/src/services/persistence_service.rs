use std::sync::Arc;

use anyhow::Context;
use archway_api::models::{ClientRecord, NetworkRecord, ScanSession};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::models::{ClientRow, NetworkRow, ScanSessionRow};
use crate::repositories::{ClientRepository, NetworkRepository, ScanSessionRepository};
use crate::services::{RegistryService, ScanEvent};

/// Mirrors registry and session state into SQLite by following the event bus.
pub struct PersistenceService {
    registry: Arc<RegistryService>,
    network_repository: Arc<NetworkRepository>,
    client_repository: Arc<ClientRepository>,
    session_repository: Arc<ScanSessionRepository>,
}

impl PersistenceService {
    pub fn new(
        registry: Arc<RegistryService>,
        network_repository: Arc<NetworkRepository>,
        client_repository: Arc<ClientRepository>,
        session_repository: Arc<ScanSessionRepository>,
    ) -> Self {
        Self {
            registry,
            network_repository,
            client_repository,
            session_repository,
        }
    }

    pub async fn start_listening(&self, mut receiver: broadcast::Receiver<ScanEvent>) {
        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Persistence listener skipped {skipped} events");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if let Err(e) = self.handle(&event).await {
                tracing::error!("Failed to persist {}: {:#}", event.name(), e);
            }
        }

        tracing::debug!("Persistence listener stopped");
    }

    async fn handle(&self, event: &ScanEvent) -> anyhow::Result<()> {
        match event {
            ScanEvent::SessionStarted { session } => self.save_session(session).await,
            ScanEvent::SessionFinished { session } => {
                self.save_session(session).await?;
                self.save_registry().await
            }
            ScanEvent::RegistryPopulated { .. } => self.save_registry().await,
            ScanEvent::RegistryCleared { .. } => self.clear_registry().await,
            ScanEvent::SessionStopping { .. } | ScanEvent::NetworkDiscovered { .. } => Ok(()),
        }
    }

    pub async fn save_session(&self, session: &ScanSession) -> anyhow::Result<()> {
        let row = ScanSessionRow::try_from(session)?;
        self.session_repository.upsert(&row).await?;
        Ok(())
    }

    /// Writes the whole registry in one transaction.
    pub async fn save_registry(&self) -> anyhow::Result<()> {
        let snapshot = self.registry.snapshot().await;
        let mut tx = self.network_repository.get_pool().begin().await?;

        for network in &snapshot.networks {
            self.network_repository
                .upsert(&NetworkRow::from(network.as_ref()), &mut tx)
                .await?;
        }
        for client in &snapshot.clients {
            let row = ClientRow::try_from(client.as_ref())
                .with_context(|| format!("encoding client {}", client.mac))?;
            self.client_repository.upsert(&row, &mut tx).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            "Persisted registry revision {} ({} networks, {} clients)",
            snapshot.revision,
            snapshot.networks.len(),
            snapshot.clients.len()
        );
        Ok(())
    }

    async fn clear_registry(&self) -> anyhow::Result<()> {
        let mut tx = self.network_repository.get_pool().begin().await?;
        self.client_repository.delete_all(&mut tx).await?;
        self.network_repository.delete_all(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Loads the last persisted registry. Rows that no longer decode are skipped.
    pub async fn restore_registry(&self) -> anyhow::Result<(u64, u64)> {
        let networks: Vec<NetworkRecord> = self
            .network_repository
            .find_all()
            .await?
            .into_iter()
            .filter_map(|row| {
                let bssid = row.bssid.clone();
                NetworkRecord::try_from(row)
                    .inspect_err(|e| tracing::warn!("Skipping stored network {bssid}: {e}"))
                    .ok()
            })
            .collect();

        let clients: Vec<ClientRecord> = self
            .client_repository
            .find_all()
            .await?
            .into_iter()
            .filter_map(|row| {
                let mac = row.mac.clone();
                ClientRecord::try_from(row)
                    .inspect_err(|e| tracing::warn!("Skipping stored client {mac}: {e}"))
                    .ok()
            })
            .collect();

        let restored = (networks.len() as u64, clients.len() as u64);
        self.registry.restore(networks, clients).await;

        tracing::info!(
            "Restored {} networks and {} clients from storage",
            restored.0,
            restored.1
        );
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use archway_api::models::{
        ClientObservation, EncryptionKind, NetworkMode, NetworkObservation, ScanMode,
    };
    use time::OffsetDateTime;

    use super::*;
    use crate::configs::{Database, SchemaManager, Storage};
    use crate::services::VendorService;

    async fn persistence(registry: Arc<RegistryService>) -> (Arc<Storage>, PersistenceService) {
        let storage = Arc::new(
            Storage::new(
                Database {
                    url: String::from("sqlite::memory:"),
                    clean_start: true,
                    restore_on_start: false,
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        );

        let service = PersistenceService::new(
            registry,
            Arc::new(NetworkRepository::new(storage.clone())),
            Arc::new(ClientRepository::new(storage.clone())),
            Arc::new(ScanSessionRepository::new(storage.clone())),
        );
        (storage, service)
    }

    fn registry() -> Arc<RegistryService> {
        Arc::new(RegistryService::new(Arc::new(VendorService::default())))
    }

    #[tokio::test]
    async fn test_registry_round_trip() {
        let source = registry();
        let now = OffsetDateTime::now_utc();
        let bssid = "00:11:22:33:44:55".parse().unwrap();

        source
            .upsert_network(NetworkObservation {
                bssid,
                ssid: String::from("Office"),
                channel: 36,
                frequency: None,
                signal_strength: -52,
                encryption: EncryptionKind::Wpa3,
                cipher: Some(String::from("CCMP")),
                authentication: Some(String::from("SAE")),
                mode: NetworkMode::Infrastructure,
                observed_at: now,
            })
            .await;
        source
            .upsert_client(ClientObservation {
                mac: "00:1B:63:00:00:01".parse().unwrap(),
                signal_strength: -61,
                associated_bssid: Some(bssid),
                probed_ssid: Some(String::from("Office")),
                observed_at: now,
            })
            .await;

        let (storage, writer) = persistence(source).await;
        writer.save_registry().await.unwrap();

        let target = registry();
        let reader = PersistenceService::new(
            target.clone(),
            Arc::new(NetworkRepository::new(storage.clone())),
            Arc::new(ClientRepository::new(storage.clone())),
            Arc::new(ScanSessionRepository::new(storage.clone())),
        );
        assert_eq!(reader.restore_registry().await.unwrap(), (1, 1));

        let network = target.get_network(&bssid).await.unwrap();
        assert_eq!(network.ssid, "Office");
        assert_eq!(network.frequency, 5180);
        assert_eq!(target.clients_of(&bssid).await.len(), 1);
    }

    #[tokio::test]
    async fn test_session_upsert_overwrites_terminal_fields() {
        let (storage, service) = persistence(registry()).await;
        let mut session = ScanSession::new("wlan0", ScanMode::Monitor, Some(30));
        service.save_session(&session).await.unwrap();

        session.status = archway_api::models::SessionStatus::Stopped;
        session.ended_at = Some(OffsetDateTime::now_utc());
        session.networks_seen = 4;
        service.save_session(&session).await.unwrap();

        let repository = ScanSessionRepository::new(storage);
        assert_eq!(repository.count().await.unwrap(), 1);

        let stored: ScanSession = repository
            .find_by_id(&session.id.to_string())
            .await
            .unwrap()
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(stored.status, archway_api::models::SessionStatus::Stopped);
        assert_eq!(stored.networks_seen, 4);
        assert_eq!(stored.duration_secs, Some(30));
    }
}
