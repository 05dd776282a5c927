use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{ClientRecord, NetworkRecord, SecurityAssessment};
use crate::restful::Pagination;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    LastSeen,
    SignalStrength,
    Ssid,
    Channel,
    Encryption,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_seen" => Ok(SortKey::LastSeen),
            "signal_strength" => Ok(SortKey::SignalStrength),
            "ssid" => Ok(SortKey::Ssid),
            "channel" => Ok(SortKey::Channel),
            "encryption" => Ok(SortKey::Encryption),
            _ => Err(format!(
                "invalid sort_by '{s}', expected one of last_seen, signal_strength, ssid, channel, encryption"
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SortKey::LastSeen => write!(f, "last_seen"),
            SortKey::SignalStrength => write!(f, "signal_strength"),
            SortKey::Ssid => write!(f, "ssid"),
            SortKey::Channel => write!(f, "channel"),
            SortKey::Encryption => write!(f, "encryption"),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("invalid order '{s}', expected asc or desc")),
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkListResponse {
    /// Networks on the requested page.
    pub networks: Vec<NetworkRecord>,
    pub pagination: Pagination,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDetailResponse {
    pub network: NetworkRecord,
    /// Stable hash of BSSID, SSID, channel, encryption and vendor.
    pub fingerprint: String,
    /// Risk assessment for this access point.
    pub security: SecurityAssessment,
    /// Clients associated with this access point.
    pub clients: Vec<ClientRecord>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientListResponse {
    pub clients: Vec<ClientRecord>,
    pub pagination: Pagination,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearRegistryResponse {
    pub networks_removed: u64,
    pub clients_removed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("signal_strength".parse::<SortKey>(), Ok(SortKey::SignalStrength));
        assert!("bogus".parse::<SortKey>().is_err());
        assert_eq!(SortKey::default().to_string(), "last_seen");
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert!("DESC".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }
}
