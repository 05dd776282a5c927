use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Band, MacAddress, SecurityLevel};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorCount {
    pub vendor: String,
    pub count: u64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Number of distinct access points
    pub total_networks: u64,
    /// Number of distinct client stations
    pub total_clients: u64,
    /// Network count per encryption kind
    pub encryption_distribution: BTreeMap<String, u64>,
    /// Network count per channel
    pub channel_distribution: BTreeMap<u16, u64>,
    /// Networks with at least one security flag
    pub security_issues: u64,
    /// Largest vendor buckets, most common first
    pub top_vendors: Vec<VendorCount>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    None,
    Low,
    Moderate,
    High,
    Severe,
}

impl CongestionLevel {
    pub fn from_mean(mean_networks_per_channel: Option<f64>) -> Self {
        match mean_networks_per_channel {
            None => CongestionLevel::None,
            Some(m) if m < 2.0 => CongestionLevel::Low,
            Some(m) if m < 5.0 => CongestionLevel::Moderate,
            Some(m) if m < 10.0 => CongestionLevel::High,
            Some(_) => CongestionLevel::Severe,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRating {
    Excellent,
    Good,
    Poor,
}

impl ChannelRating {
    pub fn from_interference(score: f64) -> Self {
        if score < 20.0 {
            ChannelRating::Excellent
        } else if score < 50.0 {
            ChannelRating::Good
        } else {
            ChannelRating::Poor
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelUsage {
    pub channel: u16,
    pub band: Band,
    pub network_count: u64,
    /// Sum of |dBm| over the networks on this channel
    pub total_signal_power: u64,
    /// `min(100, count * 10 + total_signal_power / 10)`
    pub interference_score: f64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecommendation {
    pub channel: u16,
    pub interference_score: f64,
    pub network_count: u64,
    pub rating: ChannelRating,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAnalysis {
    /// Per-channel utilisation, ordered by channel number
    pub channels: Vec<ChannelUsage>,
    /// Least interfered channels, best first
    pub optimal_channels: Vec<ChannelRecommendation>,
    pub congestion_level: CongestionLevel,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityPosture {
    pub total_networks: u64,
    pub encryption_distribution: BTreeMap<String, u64>,
    /// Encryption-weighted score, 0 to 100
    pub security_score: f64,
    pub security_level: SecurityLevel,
    pub recommendations: Vec<String>,
    /// Open and WEP networks
    pub vulnerable_networks: u64,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl SignalQuality {
    /// Buckets a signal magnitude (|dBm|); smaller is stronger.
    pub fn from_magnitude(magnitude: f64) -> Self {
        if magnitude < 50.0 {
            SignalQuality::Excellent
        } else if magnitude < 70.0 {
            SignalQuality::Good
        } else if magnitude < 85.0 {
            SignalQuality::Fair
        } else {
            SignalQuality::Poor
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalDistribution {
    pub excellent: u64,
    pub good: u64,
    pub fair: u64,
    pub poor: u64,
}

/// Statistics over signal magnitudes (|dBm|). All optional fields are
/// absent for an empty registry.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAnalysis {
    pub sample_count: u64,
    pub average_signal: Option<f64>,
    pub median_signal: Option<f64>,
    pub min_signal: Option<u32>,
    pub max_signal: Option<u32>,
    /// Sample standard deviation, needs at least two networks
    pub standard_deviation: Option<f64>,
    pub signal_distribution: SignalDistribution,
    pub quality_assessment: Option<SignalQuality>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatSeverity {
    Medium,
    High,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    None,
    Low,
    Medium,
    High,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvilTwinThreat {
    pub ssid: String,
    pub bssids: Vec<MacAddress>,
    /// |signal difference| in dB
    pub signal_delta: u32,
    pub severity: ThreatSeverity,
    pub description: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RogueApThreat {
    pub bssid: MacAddress,
    pub ssid: String,
    pub risk_score: u8,
    pub reasons: Vec<String>,
    pub severity: ThreatSeverity,
    pub description: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatReport {
    pub evil_twins: Vec<EvilTwinThreat>,
    pub rogue_aps: Vec<RogueApThreat>,
    pub total_threats: u64,
    pub threat_level: ThreatLevel,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveReport {
    pub total_networks: u64,
    pub threat_analysis: ThreatReport,
    pub channel_analysis: ChannelAnalysis,
    pub security_analysis: SecurityPosture,
    pub signal_analysis: SignalAnalysis,
    pub recommendations: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}
