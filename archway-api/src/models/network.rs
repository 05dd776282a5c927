use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::MacAddress;

/// Link-layer protection advertised by an access point.
///
/// Declaration order is the sort order used when listing by encryption.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EncryptionKind {
    Open,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WPA2")]
    Wpa2,
    #[serde(rename = "WPA3")]
    Wpa3,
    Unknown,
}

impl EncryptionKind {
    pub const ALL: [EncryptionKind; 6] = [
        EncryptionKind::Open,
        EncryptionKind::Wep,
        EncryptionKind::Wpa,
        EncryptionKind::Wpa2,
        EncryptionKind::Wpa3,
        EncryptionKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionKind::Open => "Open",
            EncryptionKind::Wep => "WEP",
            EncryptionKind::Wpa => "WPA",
            EncryptionKind::Wpa2 => "WPA2",
            EncryptionKind::Wpa3 => "WPA3",
            EncryptionKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EncryptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncryptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" | "NONE" => Ok(EncryptionKind::Open),
            "WEP" => Ok(EncryptionKind::Wep),
            "WPA" => Ok(EncryptionKind::Wpa),
            "WPA2" => Ok(EncryptionKind::Wpa2),
            "WPA3" => Ok(EncryptionKind::Wpa3),
            "UNKNOWN" => Ok(EncryptionKind::Unknown),
            _ => Err(format!("unknown encryption kind '{s}'")),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkMode {
    #[default]
    Infrastructure,
    AdHoc,
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkMode::Infrastructure => write!(f, "Infrastructure"),
            NetworkMode::AdHoc => write!(f, "AdHoc"),
        }
    }
}

impl FromStr for NetworkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Infrastructure" | "Master" => Ok(NetworkMode::Infrastructure),
            "AdHoc" | "Ad-Hoc" => Ok(NetworkMode::AdHoc),
            _ => Err(format!("unknown network mode '{s}'")),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "2.4GHz")]
    Band2_4GHz,
    #[serde(rename = "5GHz")]
    Band5GHz,
    #[serde(rename = "6GHz")]
    Band6GHz,
}

impl Band {
    pub fn from_channel(channel: u16) -> Self {
        match channel {
            1..=14 => Band::Band2_4GHz,
            32..=177 => Band::Band5GHz,
            _ => Band::Band6GHz,
        }
    }
}

/// Centre frequency in MHz for a 2.4/5 GHz channel number.
pub fn channel_to_frequency(channel: u16) -> Option<u32> {
    match channel {
        14 => Some(2484),
        1..=13 => Some(2407 + 5 * channel as u32),
        32..=177 => Some(5000 + 5 * channel as u32),
        _ => None,
    }
}

/// Linear dBm to percentage mapping: -100 dBm is 0 %, -50 dBm and above is 100 %.
pub fn signal_quality(signal_dbm: i32) -> u8 {
    (2 * (signal_dbm + 100)).clamp(0, 100) as u8
}

/// A single sighting of an access point, as produced by the capture adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkObservation {
    pub bssid: MacAddress,
    /// Empty for hidden networks.
    #[serde(default)]
    pub ssid: String,
    pub channel: u16,
    /// Derived from the channel when the adapter does not report it.
    #[serde(default)]
    pub frequency: Option<u32>,
    pub signal_strength: i32,
    pub encryption: EncryptionKind,
    #[serde(default)]
    pub cipher: Option<String>,
    #[serde(default)]
    pub authentication: Option<String>,
    #[serde(default)]
    pub mode: NetworkMode,
    #[serde(with = "time::serde::rfc3339")]
    pub observed_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    /// Hardware address of the access point radio
    pub bssid: MacAddress,
    /// Advertised network name, empty when hidden
    pub ssid: String,
    pub channel: u16,
    /// Centre frequency in MHz
    pub frequency: u32,
    /// Last reported signal strength in dBm
    pub signal_strength: i32,
    /// Signal quality percentage derived from the signal strength
    pub quality: u8,
    pub encryption: EncryptionKind,
    pub cipher: String,
    pub authentication: String,
    /// Vendor resolved from the OUI prefix
    pub vendor: String,
    pub mode: NetworkMode,
    /// Number of observations merged into this record
    pub beacon_count: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub first_seen: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_to_frequency() {
        assert_eq!(channel_to_frequency(1), Some(2412));
        assert_eq!(channel_to_frequency(6), Some(2437));
        assert_eq!(channel_to_frequency(14), Some(2484));
        assert_eq!(channel_to_frequency(36), Some(5180));
        assert_eq!(channel_to_frequency(165), Some(5825));
        assert_eq!(channel_to_frequency(0), None);
    }

    #[test]
    fn test_signal_quality_bounds() {
        assert_eq!(signal_quality(-30), 100);
        assert_eq!(signal_quality(-50), 100);
        assert_eq!(signal_quality(-70), 60);
        assert_eq!(signal_quality(-100), 0);
        assert_eq!(signal_quality(-120), 0);
    }

    #[test]
    fn test_encryption_order_and_names() {
        assert!(EncryptionKind::Open < EncryptionKind::Wep);
        assert!(EncryptionKind::Wpa2 < EncryptionKind::Wpa3);
        assert_eq!("wpa2".parse::<EncryptionKind>(), Ok(EncryptionKind::Wpa2));
        assert_eq!(
            serde_json::to_string(&EncryptionKind::Wpa3).unwrap(),
            "\"WPA3\""
        );
        assert!("WPA4".parse::<EncryptionKind>().is_err());
    }

    #[test]
    fn test_band_from_channel() {
        assert_eq!(Band::from_channel(11), Band::Band2_4GHz);
        assert_eq!(Band::from_channel(149), Band::Band5GHz);
    }
}
