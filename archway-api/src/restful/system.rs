use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::WirelessInterface;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// True while a scan session is active.
    pub scanning: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceListResponse {
    pub interfaces: Vec<WirelessInterface>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceResponse {
    pub interface: WirelessInterface,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoPopulateResponse {
    /// Networks loaded into the registry.
    pub networks: u64,
    /// Clients loaded into the registry.
    pub clients: u64,
    pub message: String,
}
