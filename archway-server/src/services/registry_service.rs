use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use archway_api::models::{
    ClientObservation, ClientRecord, EncryptionKind, MacAddress, NetworkObservation,
    NetworkRecord, Page, channel_to_frequency, signal_quality,
};
use archway_api::restful::{SortKey, SortOrder};
use tokio::sync::RwLock;

use crate::errors::RegistryError;
use crate::services::VendorService;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NetworkFilter {
    /// Case-insensitive substring of the SSID.
    pub ssid: Option<String>,
    pub encryption: Option<EncryptionKind>,
    pub channel: Option<u16>,
    /// Lower bound on signal strength, dBm.
    pub min_signal: Option<i32>,
}

impl NetworkFilter {
    fn matches(&self, network: &NetworkRecord) -> bool {
        if let Some(ssid) = &self.ssid {
            if !network.ssid.to_lowercase().contains(&ssid.to_lowercase()) {
                return false;
            }
        }
        if self.encryption.is_some_and(|kind| kind != network.encryption) {
            return false;
        }
        if self.channel.is_some_and(|channel| channel != network.channel) {
            return false;
        }
        if self.min_signal.is_some_and(|min| network.signal_strength < min) {
            return false;
        }
        true
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Everything on one page.
    pub fn unbounded() -> Self {
        Self {
            page: 1,
            per_page: u32::MAX,
        }
    }
}

/// Result of merging one observation.
#[derive(Debug, Clone)]
pub struct Upserted<T> {
    pub record: Arc<T>,
    /// True when the key was not in the registry before.
    pub created: bool,
}

/// A point-in-time copy of the registry.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    pub revision: u64,
    pub networks: Vec<Arc<NetworkRecord>>,
    pub clients: Vec<Arc<ClientRecord>>,
}

/// Deduplicated access points and stations keyed by MAC.
///
/// Records are immutable `Arc`s replaced whole on every merge. Lock order is
/// networks before clients.
pub struct RegistryService {
    networks: RwLock<HashMap<MacAddress, Arc<NetworkRecord>>>,
    clients: RwLock<HashMap<MacAddress, Arc<ClientRecord>>>,
    revision: AtomicU64,
    vendors: Arc<VendorService>,
}

impl RegistryService {
    pub fn new(vendors: Arc<VendorService>) -> Self {
        Self {
            networks: RwLock::new(HashMap::new()),
            clients: RwLock::new(HashMap::new()),
            revision: AtomicU64::new(0),
            vendors,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(AtomicOrdering::SeqCst)
    }

    fn bump(&self) {
        self.revision.fetch_add(1, AtomicOrdering::SeqCst);
    }

    pub async fn upsert_network(&self, observation: NetworkObservation) -> Upserted<NetworkRecord> {
        let mut networks = self.networks.write().await;

        let (record, created) = match networks.get(&observation.bssid) {
            Some(existing) => (merge_network(existing, observation), false),
            None => {
                let vendor = self.vendors.lookup(&observation.bssid);
                (new_network(observation, vendor), true)
            }
        };

        let record = Arc::new(record);
        networks.insert(record.bssid, Arc::clone(&record));
        self.bump();

        Upserted { record, created }
    }

    pub async fn upsert_client(&self, observation: ClientObservation) -> Upserted<ClientRecord> {
        let networks = self.networks.read().await;
        let mut clients = self.clients.write().await;

        // Only keep associations that point at a known access point.
        let association = observation
            .associated_bssid
            .filter(|bssid| networks.contains_key(bssid));
        drop(networks);

        let (record, created) = match clients.get(&observation.mac) {
            Some(existing) => (merge_client(existing, observation, association), false),
            None => {
                let vendor = self.vendors.lookup(&observation.mac);
                (new_client(observation, association, vendor), true)
            }
        };

        let record = Arc::new(record);
        clients.insert(record.mac, Arc::clone(&record));
        self.bump();

        Upserted { record, created }
    }

    pub async fn get_network(&self, bssid: &MacAddress) -> Result<NetworkRecord, RegistryError> {
        self.networks
            .read()
            .await
            .get(bssid)
            .map(|record| record.as_ref().clone())
            .ok_or(RegistryError::NetworkNotFound(*bssid))
    }

    pub async fn get_client(&self, mac: &MacAddress) -> Result<ClientRecord, RegistryError> {
        self.clients
            .read()
            .await
            .get(mac)
            .map(|record| record.as_ref().clone())
            .ok_or(RegistryError::ClientNotFound(*mac))
    }

    pub async fn list_networks(
        &self,
        filter: &NetworkFilter,
        sort: SortSpec,
        page: PageRequest,
    ) -> Page<NetworkRecord> {
        let mut matching: Vec<Arc<NetworkRecord>> = {
            let networks = self.networks.read().await;
            networks.values().cloned().collect()
        };

        matching.retain(|network| filter.matches(network));
        matching.sort_by(|a, b| compare_networks(a, b, sort));

        let page = Page::slice(matching, page.page, page.per_page);
        Page {
            items: page.items.iter().map(|record| record.as_ref().clone()).collect(),
            page: page.page,
            per_page: page.per_page,
            total: page.total,
        }
    }

    /// Clients ordered by most recently seen.
    pub async fn list_clients(&self, page: PageRequest) -> Page<ClientRecord> {
        let mut clients: Vec<Arc<ClientRecord>> = {
            let clients = self.clients.read().await;
            clients.values().cloned().collect()
        };

        clients.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then(a.mac.cmp(&b.mac)));

        let page = Page::slice(clients, page.page, page.per_page);
        Page {
            items: page.items.iter().map(|record| record.as_ref().clone()).collect(),
            page: page.page,
            per_page: page.per_page,
            total: page.total,
        }
    }

    pub async fn clients_of(&self, bssid: &MacAddress) -> Vec<ClientRecord> {
        let mut clients: Vec<ClientRecord> = self
            .clients
            .read()
            .await
            .values()
            .filter(|client| client.associated_bssid.as_ref() == Some(bssid))
            .map(|client| client.as_ref().clone())
            .collect();

        clients.sort_by(|a, b| a.mac.cmp(&b.mac));
        clients
    }

    pub async fn counts(&self) -> (u64, u64) {
        let networks = self.networks.read().await;
        let clients = self.clients.read().await;
        (networks.len() as u64, clients.len() as u64)
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        let networks = self.networks.read().await;
        let clients = self.clients.read().await;

        RegistrySnapshot {
            revision: self.revision(),
            networks: networks.values().cloned().collect(),
            clients: clients.values().cloned().collect(),
        }
    }

    /// Drops every record and returns how many networks and clients were removed.
    pub async fn clear(&self) -> (u64, u64) {
        let mut networks = self.networks.write().await;
        let mut clients = self.clients.write().await;

        let removed = (networks.len() as u64, clients.len() as u64);
        networks.clear();
        clients.clear();
        self.bump();

        removed
    }

    /// Loads previously persisted records, replacing any with the same key.
    pub async fn restore(&self, restored_networks: Vec<NetworkRecord>, restored_clients: Vec<ClientRecord>) {
        let mut networks = self.networks.write().await;
        let mut clients = self.clients.write().await;

        for record in restored_networks {
            networks.insert(record.bssid, Arc::new(record));
        }
        for record in restored_clients {
            clients.insert(record.mac, Arc::new(record));
        }
        self.bump();
    }
}

fn new_network(observation: NetworkObservation, vendor: String) -> NetworkRecord {
    NetworkRecord {
        bssid: observation.bssid,
        frequency: observation
            .frequency
            .or_else(|| channel_to_frequency(observation.channel))
            .unwrap_or_default(),
        ssid: observation.ssid,
        channel: observation.channel,
        signal_strength: observation.signal_strength,
        quality: signal_quality(observation.signal_strength),
        encryption: observation.encryption,
        cipher: observation.cipher.unwrap_or_default(),
        authentication: observation.authentication.unwrap_or_default(),
        vendor,
        mode: observation.mode,
        beacon_count: 1,
        first_seen: observation.observed_at,
        last_seen: observation.observed_at,
    }
}

/// Folds an observation into an existing record. Radio fields always take
/// the observation's values; only the seen window is kept monotonic.
fn merge_network(existing: &NetworkRecord, observation: NetworkObservation) -> NetworkRecord {
    let mut record = existing.clone();
    record.beacon_count += 1;
    record.first_seen = record.first_seen.min(observation.observed_at);
    record.last_seen = record.last_seen.max(observation.observed_at);

    if !observation.ssid.is_empty() {
        record.ssid = observation.ssid;
    }

    record.channel = observation.channel;
    record.frequency = observation
        .frequency
        .or_else(|| channel_to_frequency(observation.channel))
        .unwrap_or(record.frequency);
    record.signal_strength = observation.signal_strength;
    record.quality = signal_quality(observation.signal_strength);
    record.mode = observation.mode;
    if observation.encryption != EncryptionKind::Unknown {
        record.encryption = observation.encryption;
    }
    if let Some(cipher) = observation.cipher {
        record.cipher = cipher;
    }
    if let Some(authentication) = observation.authentication {
        record.authentication = authentication;
    }

    record
}

fn new_client(
    observation: ClientObservation,
    association: Option<MacAddress>,
    vendor: String,
) -> ClientRecord {
    ClientRecord {
        mac: observation.mac,
        vendor,
        signal_strength: observation.signal_strength,
        associated_bssid: association,
        probed_ssids: observation
            .probed_ssid
            .filter(|ssid| !ssid.is_empty())
            .into_iter()
            .collect::<BTreeSet<_>>(),
        frame_count: 1,
        first_seen: observation.observed_at,
        last_seen: observation.observed_at,
    }
}

fn merge_client(
    existing: &ClientRecord,
    observation: ClientObservation,
    association: Option<MacAddress>,
) -> ClientRecord {
    let mut record = existing.clone();
    record.frame_count += 1;
    record.first_seen = record.first_seen.min(observation.observed_at);

    if let Some(ssid) = observation.probed_ssid.filter(|ssid| !ssid.is_empty()) {
        record.probed_ssids.insert(ssid);
    }

    record.last_seen = record.last_seen.max(observation.observed_at);
    record.signal_strength = observation.signal_strength;
    // A frame without an association proves nothing about disassociation.
    if association.is_some() {
        record.associated_bssid = association;
    }

    record
}

fn compare_networks(a: &NetworkRecord, b: &NetworkRecord, sort: SortSpec) -> Ordering {
    let primary = match sort.key {
        SortKey::LastSeen => a.last_seen.cmp(&b.last_seen),
        SortKey::SignalStrength => a.signal_strength.cmp(&b.signal_strength),
        SortKey::Ssid => a.ssid.to_lowercase().cmp(&b.ssid.to_lowercase()),
        SortKey::Channel => a.channel.cmp(&b.channel),
        SortKey::Encryption => a.encryption.cmp(&b.encryption),
    };

    let primary = match sort.order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };

    primary.then_with(|| a.bssid.cmp(&b.bssid))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use archway_api::models::NetworkMode;
    use time::{Duration, OffsetDateTime};

    use super::*;

    fn registry() -> RegistryService {
        RegistryService::new(Arc::new(VendorService::default()))
    }

    fn mac(last: u8) -> MacAddress {
        MacAddress([0x00, 0x11, 0x22, 0x00, 0x00, last])
    }

    fn beacon(bssid: MacAddress, ssid: &str, at: OffsetDateTime) -> NetworkObservation {
        NetworkObservation {
            bssid,
            ssid: ssid.to_string(),
            channel: 6,
            frequency: None,
            signal_strength: -60,
            encryption: EncryptionKind::Wpa2,
            cipher: Some("CCMP".into()),
            authentication: Some("PSK".into()),
            mode: NetworkMode::Infrastructure,
            observed_at: at,
        }
    }

    fn probe(station: MacAddress, bssid: Option<MacAddress>, at: OffsetDateTime) -> ClientObservation {
        ClientObservation {
            mac: station,
            signal_strength: -55,
            associated_bssid: bssid,
            probed_ssid: Some("Office".into()),
            observed_at: at,
        }
    }

    #[tokio::test]
    async fn test_seen_window_is_monotonic() {
        let registry = registry();
        let t0 = OffsetDateTime::now_utc();

        let first = registry.upsert_network(beacon(mac(1), "Office", t0)).await;
        assert!(first.created);
        assert_eq!(first.record.first_seen, t0);
        assert_eq!(first.record.frequency, 2437);
        assert_eq!(first.record.vendor, "Cisco Systems");

        let later = registry
            .upsert_network(beacon(mac(1), "Office", t0 + Duration::seconds(5)))
            .await;
        assert!(!later.created);
        assert_eq!(later.record.first_seen, t0);
        assert_eq!(later.record.last_seen, t0 + Duration::seconds(5));

        // A late observation still updates the radio fields but never moves
        // last_seen backwards.
        let mut stale = beacon(mac(1), "Office", t0 - Duration::seconds(5));
        stale.signal_strength = -40;
        stale.channel = 11;
        let merged = registry.upsert_network(stale).await;
        assert_eq!(merged.record.first_seen, t0 - Duration::seconds(5));
        assert_eq!(merged.record.last_seen, t0 + Duration::seconds(5));
        assert_eq!(merged.record.signal_strength, -40);
        assert_eq!(merged.record.channel, 11);
        assert_eq!(merged.record.frequency, 2462);
        assert_eq!(merged.record.beacon_count, 3);
    }

    #[tokio::test]
    async fn test_late_client_frame_updates_signal() {
        let registry = registry();
        let t0 = OffsetDateTime::now_utc();
        let station = MacAddress([0x3C, 0x22, 0xFB, 0x00, 0x00, 0x01]);

        registry.upsert_client(probe(station, None, t0)).await;
        let mut late = probe(station, None, t0 - Duration::seconds(3));
        late.signal_strength = -80;

        let merged = registry.upsert_client(late).await;
        assert_eq!(merged.record.signal_strength, -80);
        assert_eq!(merged.record.last_seen, t0);
        assert_eq!(merged.record.first_seen, t0 - Duration::seconds(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_see_consistent_records_during_writes() {
        let registry = Arc::new(registry());
        let t0 = OffsetDateTime::now_utc();
        const WRITES: i64 = 500;

        // Every write derives signal and channel from its offset, so a torn
        // record would break the relation.
        let expected = |offset: i64| (-30 - (offset % 60) as i32, 1 + (offset % 11) as u16);

        let writer = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for offset in 0..WRITES {
                    let mut observation = beacon(mac(1), "Office", t0 + Duration::milliseconds(offset));
                    (observation.signal_strength, observation.channel) = expected(offset);
                    registry.upsert_network(observation).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..3)
            .map(|reader| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    let mut previous = None;
                    let mut reads = 0;
                    while reads < WRITES {
                        let record = if reader % 2 == 0 {
                            registry.get_network(&mac(1)).await.ok()
                        } else {
                            registry
                                .list_networks(
                                    &NetworkFilter::default(),
                                    SortSpec::default(),
                                    PageRequest::unbounded(),
                                )
                                .await
                                .items
                                .into_iter()
                                .next()
                        };

                        if let Some(record) = record {
                            let offset = (record.last_seen - t0).whole_milliseconds() as i64;
                            assert_eq!((record.signal_strength, record.channel), expected(offset));
                            assert_eq!(Some(record.frequency), channel_to_frequency(record.channel));
                            assert_eq!(record.beacon_count, offset as u64 + 1);
                            if let Some(previous) = previous {
                                assert!(record.last_seen >= previous);
                            }
                            previous = Some(record.last_seen);
                        }
                        reads += 1;
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }

        let last = registry.get_network(&mac(1)).await.unwrap();
        assert_eq!(last.beacon_count, WRITES as u64);
        assert_eq!(last.last_seen, t0 + Duration::milliseconds(WRITES - 1));
    }

    #[tokio::test]
    async fn test_hidden_ssid_never_erases_known_name() {
        let registry = registry();
        let t0 = OffsetDateTime::now_utc();

        registry.upsert_network(beacon(mac(1), "Office", t0)).await;
        let merged = registry
            .upsert_network(beacon(mac(1), "", t0 + Duration::seconds(1)))
            .await;

        assert_eq!(merged.record.ssid, "Office");
    }

    #[tokio::test]
    async fn test_unknown_encryption_keeps_previous_kind() {
        let registry = registry();
        let t0 = OffsetDateTime::now_utc();

        registry.upsert_network(beacon(mac(1), "Office", t0)).await;
        let mut unknown = beacon(mac(1), "Office", t0 + Duration::seconds(1));
        unknown.encryption = EncryptionKind::Unknown;
        unknown.cipher = None;

        let merged = registry.upsert_network(unknown).await;
        assert_eq!(merged.record.encryption, EncryptionKind::Wpa2);
        assert_eq!(merged.record.cipher, "CCMP");
    }

    #[tokio::test]
    async fn test_last_seen_desc_ordering() {
        let registry = registry();
        let t0 = OffsetDateTime::now_utc();

        registry.upsert_network(beacon(mac(1), "A", t0)).await;
        registry.upsert_network(beacon(mac(2), "B", t0 + Duration::seconds(20))).await;
        registry.upsert_network(beacon(mac(3), "C", t0 + Duration::seconds(10))).await;

        let page = registry
            .list_networks(
                &NetworkFilter::default(),
                SortSpec::default(),
                PageRequest { page: 1, per_page: 10 },
            )
            .await;

        let order: Vec<_> = page.items.iter().map(|n| n.ssid.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_pagination_is_exhaustive_without_duplicates() {
        let registry = registry();
        let t0 = OffsetDateTime::now_utc();

        // Identical timestamps force the BSSID tiebreak.
        for i in 0..23 {
            registry.upsert_network(beacon(mac(i), "Same", t0)).await;
        }

        let mut seen = HashSet::new();
        for page in 1..=5 {
            let result = registry
                .list_networks(
                    &NetworkFilter::default(),
                    SortSpec::default(),
                    PageRequest { page, per_page: 5 },
                )
                .await;
            assert_eq!(result.total, 23);
            for network in result.items {
                assert!(seen.insert(network.bssid));
            }
        }
        assert_eq!(seen.len(), 23);

        let beyond = registry
            .list_networks(
                &NetworkFilter::default(),
                SortSpec::default(),
                PageRequest { page: 6, per_page: 5 },
            )
            .await;
        assert!(beyond.items.is_empty());
    }

    #[tokio::test]
    async fn test_filters() {
        let registry = registry();
        let t0 = OffsetDateTime::now_utc();

        registry.upsert_network(beacon(mac(1), "Office_WiFi", t0)).await;
        let mut open = beacon(mac(2), "Cafe", t0);
        open.encryption = EncryptionKind::Open;
        open.channel = 11;
        open.signal_strength = -85;
        registry.upsert_network(open).await;

        let by_ssid = NetworkFilter {
            ssid: Some("office".into()),
            ..Default::default()
        };
        let by_encryption = NetworkFilter {
            encryption: Some(EncryptionKind::Open),
            ..Default::default()
        };
        let by_signal = NetworkFilter {
            min_signal: Some(-70),
            ..Default::default()
        };

        for (filter, expected) in [(by_ssid, mac(1)), (by_encryption, mac(2)), (by_signal, mac(1))] {
            let page = registry
                .list_networks(&filter, SortSpec::default(), PageRequest::unbounded())
                .await;
            assert_eq!(page.total, 1);
            assert_eq!(page.items[0].bssid, expected);
        }
    }

    #[tokio::test]
    async fn test_client_association_rules() {
        let registry = registry();
        let t0 = OffsetDateTime::now_utc();
        let station = MacAddress([0xDA, 0xA1, 0x19, 0x00, 0x00, 0x01]);

        // Unknown BSSID: association is not recorded.
        let created = registry.upsert_client(probe(station, Some(mac(9)), t0)).await;
        assert!(created.record.associated_bssid.is_none());
        assert_eq!(created.record.vendor, "Private (randomized)");

        registry.upsert_network(beacon(mac(1), "Office", t0)).await;
        let associated = registry
            .upsert_client(probe(station, Some(mac(1)), t0 + Duration::seconds(1)))
            .await;
        assert_eq!(associated.record.associated_bssid, Some(mac(1)));

        // A later probe without association keeps the known one.
        let mut later = probe(station, None, t0 + Duration::seconds(2));
        later.probed_ssid = Some("Home".into());
        let merged = registry.upsert_client(later).await;
        assert_eq!(merged.record.associated_bssid, Some(mac(1)));
        assert_eq!(merged.record.probed_ssids.len(), 2);
        assert_eq!(merged.record.frame_count, 3);

        assert_eq!(registry.clients_of(&mac(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_and_revision() {
        let registry = registry();
        let t0 = OffsetDateTime::now_utc();
        let start = registry.revision();

        registry.upsert_network(beacon(mac(1), "Office", t0)).await;
        assert!(registry.revision() > start);

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.networks.len(), 1);
        assert_eq!(snapshot.revision, registry.revision());

        assert_eq!(registry.clear().await, (1, 0));
        assert_eq!(registry.counts().await, (0, 0));
        assert!(matches!(
            registry.get_network(&mac(1)).await,
            Err(RegistryError::NetworkNotFound(_))
        ));
    }
}
