use std::fmt;

use serde::{Deserialize, Serialize};

use super::MacAddress;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityFlag {
    /// No link-layer encryption
    Unsecured,
    /// WEP, broken
    WeakEncryption,
    /// WPA version 1
    LegacyEncryption,
    /// TKIP or WEP cipher on a WPA-family network
    WeakCipher,
    /// Breaks the pattern of the other access points sharing its SSID
    RogueApSuspect,
    /// SSID commonly used for honeypots
    SuspiciousSsid,
}

impl fmt::Display for SecurityFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SecurityFlag::Unsecured => "unsecured",
            SecurityFlag::WeakEncryption => "weak-encryption",
            SecurityFlag::LegacyEncryption => "legacy-encryption",
            SecurityFlag::WeakCipher => "weak-cipher",
            SecurityFlag::RogueApSuspect => "rogue-ap-suspect",
            SecurityFlag::SuspiciousSsid => "suspicious-ssid",
        };
        f.write_str(name)
    }
}

/// Five-step grading shared by per-network scores and the overall posture.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl SecurityLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => SecurityLevel::Excellent,
            s if s >= 70.0 => SecurityLevel::Good,
            s if s >= 50.0 => SecurityLevel::Fair,
            s if s >= 30.0 => SecurityLevel::Poor,
            _ => SecurityLevel::Critical,
        }
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAssessment {
    pub bssid: MacAddress,
    pub ssid: String,
    pub flags: Vec<SecurityFlag>,
    /// Combined risk, 0 (none) to 100 (maximum)
    pub risk_score: u8,
    /// `100 - risk_score`
    pub security_score: u8,
    pub level: SecurityLevel,
}

impl SecurityAssessment {
    pub fn has_issues(&self) -> bool {
        !self.flags.is_empty()
    }
}
