use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use archway_api::models::{
    EncryptionKind, MacAddress, NetworkRecord, SecurityAssessment, SecurityFlag, SecurityLevel,
};

use crate::configs::{RiskWeights, Security};

/// Read-only risk scoring over a registry snapshot.
pub struct SecurityService {
    settings: Security,
    suspicious_ssids: Vec<String>,
}

impl SecurityService {
    pub fn new(settings: Security) -> Self {
        let suspicious_ssids = settings
            .suspicious_ssids
            .iter()
            .map(|ssid| ssid.to_lowercase())
            .collect();

        Self {
            settings,
            suspicious_ssids,
        }
    }

    /// Scores every network, ordered by BSSID.
    pub fn assess_all(&self, networks: &[Arc<NetworkRecord>]) -> Vec<SecurityAssessment> {
        let rogues = self.rogue_reasons(networks);

        let mut assessments: Vec<SecurityAssessment> = networks
            .iter()
            .map(|network| self.assess(network, rogues.contains_key(&network.bssid)))
            .collect();

        assessments.sort_by(|a, b| a.bssid.cmp(&b.bssid));
        assessments
    }

    /// Scores one network; the rest of the snapshot is needed for the rogue heuristic.
    pub fn assess_one(
        &self,
        bssid: &MacAddress,
        networks: &[Arc<NetworkRecord>],
    ) -> Option<SecurityAssessment> {
        let network = networks.iter().find(|network| network.bssid == *bssid)?;
        let rogues = self.rogue_reasons(networks);

        Some(self.assess(network, rogues.contains_key(bssid)))
    }

    fn assess(&self, network: &NetworkRecord, rogue_suspect: bool) -> SecurityAssessment {
        let mut flags = Vec::new();

        match network.encryption {
            EncryptionKind::Open => flags.push(SecurityFlag::Unsecured),
            EncryptionKind::Wep => flags.push(SecurityFlag::WeakEncryption),
            EncryptionKind::Wpa => flags.push(SecurityFlag::LegacyEncryption),
            _ => {}
        }

        let cipher = network.cipher.to_uppercase();
        if network.encryption != EncryptionKind::Wep
            && (cipher.contains("TKIP") || cipher.contains("WEP"))
        {
            flags.push(SecurityFlag::WeakCipher);
        }

        if rogue_suspect {
            flags.push(SecurityFlag::RogueApSuspect);
        }

        if self.is_suspicious_ssid(&network.ssid) {
            flags.push(SecurityFlag::SuspiciousSsid);
        }

        flags.sort();

        let risk_score = risk_score(&flags, &self.settings.weights);
        let security_score = 100 - risk_score;

        SecurityAssessment {
            bssid: network.bssid,
            ssid: network.ssid.clone(),
            flags,
            risk_score,
            security_score,
            level: SecurityLevel::from_score(security_score as f64),
        }
    }

    fn is_suspicious_ssid(&self, ssid: &str) -> bool {
        if ssid.is_empty() {
            return false;
        }
        let ssid = ssid.to_lowercase();
        self.suspicious_ssids
            .iter()
            .any(|pattern| ssid.contains(pattern.as_str()))
    }

    /// Access points whose SSID is shared by a deployment they do not fit into,
    /// with a human readable reason for each mismatch.
    pub fn rogue_reasons(&self, networks: &[Arc<NetworkRecord>]) -> HashMap<MacAddress, Vec<String>> {
        let heuristic = &self.settings.rogue;

        let mut groups: BTreeMap<&str, Vec<&NetworkRecord>> = BTreeMap::new();
        for network in networks.iter().filter(|network| !network.ssid.is_empty()) {
            groups.entry(network.ssid.as_str()).or_default().push(network);
        }

        let mut suspects: HashMap<MacAddress, Vec<String>> = HashMap::new();

        for (ssid, members) in groups {
            if members.len() < heuristic.min_bssids.max(2) {
                continue;
            }

            let vendor = majority(members.iter().map(|network| network.vendor.as_str()));
            let encryption = majority(members.iter().map(|network| network.encryption));

            for network in &members {
                let mut reasons = Vec::new();

                if vendor.is_none_or(|vendor| vendor != network.vendor) {
                    reasons.push(format!(
                        "vendor {} differs from other '{ssid}' access points",
                        network.vendor
                    ));
                }

                if encryption.is_none_or(|encryption| encryption != network.encryption) {
                    reasons.push(format!(
                        "encryption {} differs from other '{ssid}' access points",
                        network.encryption
                    ));
                }

                if heuristic.flag_co_channel {
                    let twin = members.iter().find(|other| {
                        other.bssid != network.bssid
                            && other.channel == network.channel
                            && (other.signal_strength - network.signal_strength).abs()
                                < heuristic.signal_delta_db
                    });
                    if let Some(twin) = twin {
                        reasons.push(format!(
                            "shares channel {} with {} at similar strength",
                            network.channel, twin.bssid
                        ));
                    }
                }

                if !reasons.is_empty() {
                    suspects.insert(network.bssid, reasons);
                }
            }
        }

        suspects
    }
}

/// The value held by more than half of the items, if any. A group that agrees
/// completely always has a majority.
fn majority<T: Eq + Hash + Copy>(items: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut total = 0;
    for item in items {
        *counts.entry(item).or_default() += 1;
        total += 1;
    }

    counts
        .into_iter()
        .find(|(_, count)| count * 2 > total)
        .map(|(item, _)| item)
}

/// Combines flag weights as independent probabilities:
/// `100 * (1 - Π(1 - w/100))`.
pub fn risk_score(flags: &[SecurityFlag], weights: &RiskWeights) -> u8 {
    let survival: f64 = flags
        .iter()
        .map(|flag| {
            let weight = match flag {
                SecurityFlag::Unsecured => weights.unsecured,
                SecurityFlag::WeakEncryption => weights.weak_encryption,
                SecurityFlag::LegacyEncryption => weights.legacy_encryption,
                SecurityFlag::WeakCipher => weights.weak_cipher,
                SecurityFlag::RogueApSuspect => weights.rogue_ap_suspect,
                SecurityFlag::SuspiciousSsid => weights.suspicious_ssid,
            };
            1.0 - weight.clamp(0.0, 100.0) / 100.0
        })
        .product();

    (100.0 * (1.0 - survival)).round().clamp(0.0, 100.0) as u8
}
