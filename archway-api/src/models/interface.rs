use serde::{Deserialize, Serialize};

use super::MacAddress;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirelessInterface {
    /// Kernel interface name, e.g. wlan0
    pub name: String,
    /// Whether the interface exposes an 802.11 PHY
    pub wireless: bool,
    /// Whether the adapter can be switched into monitor mode
    pub monitor_capable: bool,
    /// Hardware address, when readable
    pub mac: Option<MacAddress>,
    /// Current operating mode reported by the driver
    pub current_mode: Option<String>,
}
