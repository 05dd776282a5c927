use archway_api::models::{
    ClientObservation, EncryptionKind, MacAddress, NetworkMode, NetworkObservation,
    channel_to_frequency,
};
use rand::Rng;
use rand::seq::IndexedRandom;
use time::{Duration, OffsetDateTime};

use crate::simulate::{base_signal, fluctuate_signal, weighted_choice};

const SSIDS: &[&str] = &[
    "HomeNetwork_5G",
    "NETGEAR_2.4G",
    "Linksys_Guest",
    "TP-Link_AC1750",
    "ATT_WiFi_5G",
    "Verizon_Home",
    "Xfinity_2.4G",
    "Spectrum_5G",
    "ASUS_AX6000",
    "Nighthawk_Pro",
    "Office_WiFi",
    "Conference_Room",
    "Guest_Network",
    "IoT_Devices",
    "Smart_Home",
    "Gaming_Network",
    "Free_WiFi",
    "Public_Access",
    "Starbucks_WiFi",
    "Hotel_Guest",
];

/// Access point OUIs, one row per vendor.
const AP_OUIS: &[[[u8; 3]; 3]] = &[
    [[0x00, 0x1B, 0x63], [0x00, 0x23, 0xDF], [0x00, 0x25, 0x00]],
    [[0x00, 0x0A, 0x41], [0x00, 0x0B, 0x46], [0x00, 0x0C, 0x85]],
    [[0x00, 0x09, 0x5B], [0x00, 0x0F, 0xB5], [0x00, 0x14, 0x6C]],
    [[0x00, 0x06, 0x25], [0x00, 0x0C, 0x41], [0x00, 0x12, 0x17]],
    [[0x00, 0x27, 0x19], [0x14, 0xCC, 0x20], [0x50, 0xC7, 0xBF]],
    [[0x00, 0x1F, 0xC6], [0x00, 0x22, 0x15], [0x00, 0x26, 0x18]],
    [[0x00, 0x05, 0x5D], [0x00, 0x0F, 0x3D], [0x00, 0x15, 0xE9]],
    [[0x00, 0x15, 0x6D], [0x04, 0x18, 0xD6], [0x24, 0xA4, 0x3C]],
    [[0x00, 0x0B, 0x86], [0x00, 0x1A, 0x1E], [0x00, 0x24, 0x6C]],
    [[0x00, 0x24, 0xA8], [0x2C, 0x5A, 0x0F], [0x58, 0x93, 0x96]],
];

const CLIENT_OUIS: &[[u8; 3]] = &[
    [0x00, 0x1B, 0x63],
    [0x00, 0x12, 0xFB],
    [0x00, 0x1A, 0x11],
    [0x00, 0x14, 0x22],
    [0x00, 0x1F, 0x29],
];

const ENCRYPTION_WEIGHTS: &[(EncryptionKind, f64)] = &[
    (EncryptionKind::Wpa3, 0.15),
    (EncryptionKind::Wpa2, 0.65),
    (EncryptionKind::Wpa, 0.10),
    (EncryptionKind::Wep, 0.05),
    (EncryptionKind::Open, 0.05),
];

const CHANNELS_2_4GHZ: &[u16] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
const CHANNELS_5GHZ: &[u16] = &[36, 40, 44, 48, 149, 153, 157, 161, 165];

#[derive(Debug, Clone)]
pub struct SimulatedNetwork {
    pub bssid: MacAddress,
    pub ssid: String,
    pub channel: u16,
    pub base_signal: i32,
    pub encryption: EncryptionKind,
    /// How long before "now" the access point was first heard.
    pub age: Duration,
}

impl SimulatedNetwork {
    pub fn observe<R: Rng + ?Sized>(&self, rng: &mut R, observed_at: OffsetDateTime) -> NetworkObservation {
        let (cipher, authentication) = cipher_suite(self.encryption);

        NetworkObservation {
            bssid: self.bssid,
            ssid: self.ssid.clone(),
            channel: self.channel,
            frequency: channel_to_frequency(self.channel),
            signal_strength: fluctuate_signal(rng, self.base_signal, 3.0),
            encryption: self.encryption,
            cipher: Some(cipher.to_string()),
            authentication: Some(authentication.to_string()),
            mode: NetworkMode::Infrastructure,
            observed_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedClient {
    pub mac: MacAddress,
    pub base_signal: i32,
    /// Index into the environment's network list.
    pub associated: Option<usize>,
    pub probes: Vec<String>,
    pub age: Duration,
}

/// A fixed set of access points and stations a simulated radio can hear.
#[derive(Debug, Clone, Default)]
pub struct SampleEnvironment {
    pub networks: Vec<SimulatedNetwork>,
    pub clients: Vec<SimulatedClient>,
}

impl SampleEnvironment {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, networks: usize, clients: usize) -> Self {
        let networks: Vec<SimulatedNetwork> = (0..networks).map(|_| random_network(rng)).collect();
        let clients = (0..clients)
            .map(|_| random_client(rng, &networks))
            .collect();

        Self { networks, clients }
    }

    pub fn network_ssid(&self, index: usize) -> Option<&str> {
        self.networks.get(index).map(|n| n.ssid.as_str())
    }

    /// One sighting per entity at its first-seen time and one at `now`, so the
    /// registry ends up with realistic history. Networks come before clients.
    pub fn history<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: OffsetDateTime,
    ) -> (Vec<NetworkObservation>, Vec<ClientObservation>) {
        let mut networks = Vec::with_capacity(self.networks.len() * 2);
        for network in &self.networks {
            networks.push(network.observe(rng, now - network.age));
            networks.push(network.observe(rng, now));
        }

        let mut clients = Vec::with_capacity(self.clients.len() * 2);
        for client in &self.clients {
            clients.push(self.probe_request(rng, client, now - client.age));
            clients.push(self.data_frame(rng, client, now));
        }

        (networks, clients)
    }

    pub fn probe_request<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        client: &SimulatedClient,
        observed_at: OffsetDateTime,
    ) -> ClientObservation {
        ClientObservation {
            mac: client.mac,
            signal_strength: fluctuate_signal(rng, client.base_signal, 4.0),
            associated_bssid: None,
            probed_ssid: client.probes.choose(rng).cloned(),
            observed_at,
        }
    }

    pub fn data_frame<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        client: &SimulatedClient,
        observed_at: OffsetDateTime,
    ) -> ClientObservation {
        ClientObservation {
            mac: client.mac,
            signal_strength: fluctuate_signal(rng, client.base_signal, 4.0),
            associated_bssid: client
                .associated
                .and_then(|index| self.networks.get(index))
                .map(|network| network.bssid),
            probed_ssid: None,
            observed_at,
        }
    }
}

pub fn cipher_suite(encryption: EncryptionKind) -> (&'static str, &'static str) {
    match encryption {
        EncryptionKind::Wpa3 => ("CCMP", "SAE"),
        EncryptionKind::Wpa2 => ("CCMP", "PSK"),
        EncryptionKind::Wpa => ("TKIP", "PSK"),
        EncryptionKind::Wep => ("WEP", "Open"),
        EncryptionKind::Open | EncryptionKind::Unknown => ("None", "Open"),
    }
}

fn random_mac<R: Rng + ?Sized>(rng: &mut R, oui: [u8; 3]) -> MacAddress {
    MacAddress([
        oui[0],
        oui[1],
        oui[2],
        rng.random(),
        rng.random(),
        rng.random(),
    ])
}

fn random_network<R: Rng + ?Sized>(rng: &mut R) -> SimulatedNetwork {
    let vendor = AP_OUIS.choose(rng).unwrap_or(&AP_OUIS[0]);
    let oui = *vendor.choose(rng).unwrap_or(&vendor[0]);

    let ssid = if rng.random_bool(0.9) {
        SSIDS.choose(rng).copied().unwrap_or_default().to_string()
    } else {
        String::new()
    };

    let channels = if rng.random_bool(0.7) {
        CHANNELS_5GHZ
    } else {
        CHANNELS_2_4GHZ
    };
    let channel = *channels.choose(rng).unwrap_or(&channels[0]);

    SimulatedNetwork {
        bssid: random_mac(rng, oui),
        ssid,
        channel,
        base_signal: base_signal(rng),
        encryption: *weighted_choice(rng, ENCRYPTION_WEIGHTS),
        age: Duration::hours(rng.random_range(1..=72)),
    }
}

fn random_client<R: Rng + ?Sized>(rng: &mut R, networks: &[SimulatedNetwork]) -> SimulatedClient {
    let mac = if rng.random_bool(0.3) {
        // Modern phones probe with a randomised, locally administered address.
        let oui: [u8; 3] = rng.random();
        let mut mac = random_mac(rng, oui);
        mac.0[0] = (mac.0[0] | 0x02) & !0x01;
        mac
    } else {
        let oui = *CLIENT_OUIS.choose(rng).unwrap_or(&CLIENT_OUIS[0]);
        random_mac(rng, oui)
    };

    let associated = if !networks.is_empty() && rng.random_bool(0.8) {
        Some(rng.random_range(0..networks.len()))
    } else {
        None
    };

    let probes = (0..rng.random_range(0..=3))
        .filter_map(|_| SSIDS.choose(rng).map(|ssid| ssid.to_string()))
        .collect();

    SimulatedClient {
        mac,
        base_signal: rng.random_range(-80..=-30),
        associated,
        probes,
        age: Duration::hours(rng.random_range(1..=24)),
    }
}
