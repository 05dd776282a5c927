use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::MacAddress;

/// A single sighting of a station, from a probe request or a data frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientObservation {
    pub mac: MacAddress,
    pub signal_strength: i32,
    /// BSSID the station was seen talking to, if any.
    #[serde(default)]
    pub associated_bssid: Option<MacAddress>,
    /// SSID asked for in a directed probe request.
    #[serde(default)]
    pub probed_ssid: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub observed_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Hardware address of the station
    pub mac: MacAddress,
    /// Vendor resolved from the OUI prefix
    pub vendor: String,
    /// Last reported signal strength in dBm
    pub signal_strength: i32,
    /// Access point the station was last seen associated with
    pub associated_bssid: Option<MacAddress>,
    /// Network names the station has probed for
    pub probed_ssids: BTreeSet<String>,
    /// Number of frames merged into this record
    pub frame_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub first_seen: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
}
