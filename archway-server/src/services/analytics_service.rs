use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use archway_api::models::{
    AnalyticsSummary, Band, ChannelAnalysis, ChannelRating, ChannelRecommendation, ChannelUsage,
    ComprehensiveReport, CongestionLevel, EncryptionKind, EvilTwinThreat, NetworkRecord,
    RogueApThreat, SecurityFlag, SecurityLevel, SecurityPosture, SignalAnalysis,
    SignalDistribution, SignalQuality, ThreatLevel, ThreatReport, ThreatSeverity, VendorCount,
};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::configs::{Analytics, PostureWeights};
use crate::services::{RegistryService, RegistrySnapshot, SecurityService};

const TOP_VENDORS: usize = 10;
const OPTIMAL_CHANNELS: usize = 5;
/// Risk at or above which a suspicious access point is a high severity threat.
const HIGH_RISK: u8 = 70;

/// Statistics and reports over the registry. Readers work on snapshots and
/// never hold the registry locks while computing.
pub struct AnalyticsService {
    registry: Arc<RegistryService>,
    security: Arc<SecurityService>,
    posture_weights: PostureWeights,
    twin_signal_delta: i32,
    summary_cache: Mutex<Option<(u64, Arc<AnalyticsSummary>)>>,
}

impl AnalyticsService {
    pub fn new(
        registry: Arc<RegistryService>,
        security: Arc<SecurityService>,
        settings: &Analytics,
        twin_signal_delta: i32,
    ) -> Self {
        Self {
            registry,
            security,
            posture_weights: settings.posture_weights.clone(),
            twin_signal_delta,
            summary_cache: Mutex::new(None),
        }
    }

    /// Cached per registry revision, so the result always includes every
    /// completed mutation.
    pub async fn summary(&self) -> Arc<AnalyticsSummary> {
        let mut cache = self.summary_cache.lock().await;

        if let Some((revision, summary)) = cache.as_ref() {
            if *revision == self.registry.revision() {
                return Arc::clone(summary);
            }
        }

        let snapshot = self.registry.snapshot().await;
        let summary = Arc::new(self.compute_summary(&snapshot));
        *cache = Some((snapshot.revision, Arc::clone(&summary)));

        summary
    }

    fn compute_summary(&self, snapshot: &RegistrySnapshot) -> AnalyticsSummary {
        let networks = &snapshot.networks;

        let mut channel_distribution: BTreeMap<u16, u64> = BTreeMap::new();
        let mut vendors: HashMap<&str, u64> = HashMap::new();
        for network in networks {
            *channel_distribution.entry(network.channel).or_default() += 1;
            *vendors.entry(network.vendor.as_str()).or_default() += 1;
        }

        let mut top_vendors: Vec<VendorCount> = vendors
            .into_iter()
            .map(|(vendor, count)| VendorCount {
                vendor: vendor.to_string(),
                count,
            })
            .collect();
        top_vendors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.vendor.cmp(&b.vendor)));
        top_vendors.truncate(TOP_VENDORS);

        let security_issues = self
            .security
            .assess_all(networks)
            .iter()
            .filter(|assessment| assessment.has_issues())
            .count() as u64;

        AnalyticsSummary {
            total_networks: networks.len() as u64,
            total_clients: snapshot.clients.len() as u64,
            encryption_distribution: encryption_distribution(networks),
            channel_distribution,
            security_issues,
            top_vendors,
            generated_at: OffsetDateTime::now_utc(),
        }
    }

    pub async fn channel_analysis(&self) -> ChannelAnalysis {
        channel_analysis(&self.registry.snapshot().await.networks)
    }

    pub async fn security_posture(&self) -> SecurityPosture {
        security_posture(&self.registry.snapshot().await.networks, &self.posture_weights)
    }

    pub async fn signal_analysis(&self) -> SignalAnalysis {
        signal_analysis(&self.registry.snapshot().await.networks)
    }

    pub async fn threat_report(&self) -> ThreatReport {
        self.threats(&self.registry.snapshot().await.networks)
    }

    pub async fn comprehensive_report(&self) -> ComprehensiveReport {
        let snapshot = self.registry.snapshot().await;
        let networks = &snapshot.networks;

        let threat_analysis = self.threats(networks);
        let channel_analysis = channel_analysis(networks);
        let security_analysis = security_posture(networks, &self.posture_weights);
        let signal_analysis = signal_analysis(networks);

        let mut recommendations = Vec::new();
        if security_analysis.vulnerable_networks > 0 {
            recommendations.push(format!(
                "Secure {} vulnerable networks",
                security_analysis.vulnerable_networks
            ));
        }
        if matches!(
            channel_analysis.congestion_level,
            CongestionLevel::High | CongestionLevel::Severe
        ) {
            recommendations.push(String::from("Consider using less congested channels"));
            if let Some(best) = channel_analysis.optimal_channels.first() {
                recommendations.push(format!("Channel {} shows optimal performance", best.channel));
            }
        }
        if threat_analysis.total_threats > 0 {
            recommendations.push(String::from("Investigate detected security threats immediately"));
        }
        if signal_analysis.quality_assessment == Some(SignalQuality::Poor) {
            recommendations.push(String::from("Consider improving AP placement for better coverage"));
        }

        ComprehensiveReport {
            total_networks: networks.len() as u64,
            threat_analysis,
            channel_analysis,
            security_analysis,
            signal_analysis,
            recommendations,
            generated_at: OffsetDateTime::now_utc(),
        }
    }

    fn threats(&self, networks: &[Arc<NetworkRecord>]) -> ThreatReport {
        let evil_twins = evil_twins(networks, self.twin_signal_delta);

        let mut rogue_reasons = self.security.rogue_reasons(networks);
        let rogue_aps: Vec<RogueApThreat> = self
            .security
            .assess_all(networks)
            .into_iter()
            .filter(|assessment| {
                assessment.flags.contains(&SecurityFlag::RogueApSuspect)
                    || assessment.flags.contains(&SecurityFlag::SuspiciousSsid)
            })
            .map(|assessment| {
                let mut reasons = rogue_reasons.remove(&assessment.bssid).unwrap_or_default();
                if assessment.flags.contains(&SecurityFlag::SuspiciousSsid) {
                    reasons.push(String::from("Suspicious SSID pattern"));
                }
                if assessment.flags.contains(&SecurityFlag::Unsecured) {
                    reasons.push(String::from("Open network detected"));
                }

                let name = if assessment.ssid.is_empty() {
                    "Hidden"
                } else {
                    assessment.ssid.as_str()
                };

                RogueApThreat {
                    description: format!("Potential rogue AP: {name}"),
                    bssid: assessment.bssid,
                    risk_score: assessment.risk_score,
                    severity: if assessment.risk_score >= HIGH_RISK {
                        ThreatSeverity::High
                    } else {
                        ThreatSeverity::Medium
                    },
                    ssid: assessment.ssid,
                    reasons,
                }
            })
            .collect();

        let severities: Vec<ThreatSeverity> = evil_twins
            .iter()
            .map(|threat| threat.severity)
            .chain(rogue_aps.iter().map(|threat| threat.severity))
            .collect();

        ThreatReport {
            total_threats: severities.len() as u64,
            threat_level: threat_level(&severities),
            evil_twins,
            rogue_aps,
        }
    }
}

fn encryption_distribution(networks: &[Arc<NetworkRecord>]) -> BTreeMap<String, u64> {
    let mut distribution = BTreeMap::new();
    for network in networks {
        *distribution.entry(network.encryption.to_string()).or_default() += 1;
    }
    distribution
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn channel_analysis(networks: &[Arc<NetworkRecord>]) -> ChannelAnalysis {
    let mut by_channel: BTreeMap<u16, (u64, u64)> = BTreeMap::new();
    for network in networks.iter().filter(|network| network.channel > 0) {
        let (count, power) = by_channel.entry(network.channel).or_default();
        *count += 1;
        *power += network.signal_strength.unsigned_abs() as u64;
    }

    let channels: Vec<ChannelUsage> = by_channel
        .into_iter()
        .map(|(channel, (network_count, total_signal_power))| ChannelUsage {
            channel,
            band: Band::from_channel(channel),
            network_count,
            total_signal_power,
            interference_score: (network_count as f64 * 10.0 + total_signal_power as f64 / 10.0)
                .min(100.0),
        })
        .collect();

    let mut ranked: Vec<&ChannelUsage> = channels.iter().collect();
    ranked.sort_by(|a, b| {
        a.interference_score
            .total_cmp(&b.interference_score)
            .then(a.channel.cmp(&b.channel))
    });

    let optimal_channels = ranked
        .into_iter()
        .take(OPTIMAL_CHANNELS)
        .map(|usage| ChannelRecommendation {
            channel: usage.channel,
            interference_score: usage.interference_score,
            network_count: usage.network_count,
            rating: ChannelRating::from_interference(usage.interference_score),
        })
        .collect();

    let mean = (!channels.is_empty()).then(|| {
        channels.iter().map(|usage| usage.network_count).sum::<u64>() as f64 / channels.len() as f64
    });

    ChannelAnalysis {
        channels,
        optimal_channels,
        congestion_level: CongestionLevel::from_mean(mean),
    }
}

fn security_posture(networks: &[Arc<NetworkRecord>], weights: &PostureWeights) -> SecurityPosture {
    let total = networks.len() as u64;

    let mut counts: BTreeMap<EncryptionKind, u64> = BTreeMap::new();
    for network in networks {
        *counts.entry(network.encryption).or_default() += 1;
    }
    let count = |kind: EncryptionKind| counts.get(&kind).copied().unwrap_or(0);

    let security_score = if total == 0 {
        0.0
    } else {
        let weighted: f64 = counts
            .iter()
            .map(|(kind, count)| {
                let weight = match kind {
                    EncryptionKind::Wpa3 => weights.wpa3,
                    EncryptionKind::Wpa2 => weights.wpa2,
                    EncryptionKind::Wpa => weights.wpa,
                    EncryptionKind::Wep => weights.wep,
                    EncryptionKind::Open => weights.open,
                    EncryptionKind::Unknown => weights.unknown,
                };
                *count as f64 * weight
            })
            .sum();
        round1(weighted / total as f64)
    };

    let mut recommendations = Vec::new();
    if count(EncryptionKind::Open) > 0 {
        recommendations.push(String::from("Secure open networks with WPA2/WPA3"));
    }
    if count(EncryptionKind::Wep) > 0 {
        recommendations.push(String::from("Upgrade WEP networks to WPA2/WPA3"));
    }
    if count(EncryptionKind::Wpa) > 0 {
        recommendations.push(String::from("Upgrade WPA networks to WPA2/WPA3"));
    }

    SecurityPosture {
        total_networks: total,
        encryption_distribution: encryption_distribution(networks),
        security_score,
        security_level: SecurityLevel::from_score(security_score),
        recommendations,
        vulnerable_networks: count(EncryptionKind::Open) + count(EncryptionKind::Wep),
    }
}

fn signal_analysis(networks: &[Arc<NetworkRecord>]) -> SignalAnalysis {
    let mut magnitudes: Vec<u32> = networks
        .iter()
        .map(|network| network.signal_strength.unsigned_abs())
        .collect();
    magnitudes.sort_unstable();

    let mut signal_distribution = SignalDistribution::default();
    for magnitude in &magnitudes {
        match SignalQuality::from_magnitude(*magnitude as f64) {
            SignalQuality::Excellent => signal_distribution.excellent += 1,
            SignalQuality::Good => signal_distribution.good += 1,
            SignalQuality::Fair => signal_distribution.fair += 1,
            SignalQuality::Poor => signal_distribution.poor += 1,
        }
    }

    let n = magnitudes.len();
    let mean = (n > 0).then(|| magnitudes.iter().map(|m| *m as f64).sum::<f64>() / n as f64);

    let median = (n > 0).then(|| {
        if n % 2 == 1 {
            magnitudes[n / 2] as f64
        } else {
            (magnitudes[n / 2 - 1] as f64 + magnitudes[n / 2] as f64) / 2.0
        }
    });

    let standard_deviation = mean.filter(|_| n > 1).map(|mean| {
        let variance = magnitudes
            .iter()
            .map(|m| (*m as f64 - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;
        round1(variance.sqrt())
    });

    SignalAnalysis {
        sample_count: n as u64,
        average_signal: mean.map(round1),
        median_signal: median.map(round1),
        min_signal: magnitudes.first().copied(),
        max_signal: magnitudes.last().copied(),
        standard_deviation,
        signal_distribution,
        quality_assessment: mean.map(SignalQuality::from_magnitude),
    }
}

/// Every pair of access points sharing a name at nearly the same strength.
fn evil_twins(networks: &[Arc<NetworkRecord>], signal_delta: i32) -> Vec<EvilTwinThreat> {
    let mut groups: BTreeMap<&str, Vec<&NetworkRecord>> = BTreeMap::new();
    for network in networks.iter().filter(|network| !network.ssid.is_empty()) {
        groups.entry(network.ssid.as_str()).or_default().push(network);
    }

    let mut threats = Vec::new();
    for (ssid, mut members) in groups {
        members.sort_by(|a, b| a.bssid.cmp(&b.bssid));

        for (i, first) in members.iter().enumerate() {
            for second in &members[i + 1..] {
                let delta = (first.signal_strength - second.signal_strength).unsigned_abs();
                if first.bssid != second.bssid && (delta as i64) < signal_delta as i64 {
                    threats.push(EvilTwinThreat {
                        ssid: ssid.to_string(),
                        bssids: vec![first.bssid, second.bssid],
                        signal_delta: delta,
                        severity: ThreatSeverity::High,
                        description: format!("Potential evil twin detected for {ssid}"),
                    });
                }
            }
        }
    }

    threats
}

/// Short identifier over the identity fields of an access point. Volatile
/// radio readings do not contribute, so it survives signal changes.
pub fn network_fingerprint(network: &NetworkRecord) -> String {
    let mut hasher = Sha256::new();
    for field in [
        network.bssid.to_string(),
        network.ssid.clone(),
        network.channel.to_string(),
        network.encryption.to_string(),
        network.vendor.clone(),
    ] {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }

    hasher.finalize()[..8]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

fn threat_level(severities: &[ThreatSeverity]) -> ThreatLevel {
    let medium = severities
        .iter()
        .filter(|severity| **severity == ThreatSeverity::Medium)
        .count();

    if severities.contains(&ThreatSeverity::High) {
        ThreatLevel::High
    } else if medium > 2 {
        ThreatLevel::Medium
    } else if medium > 0 {
        ThreatLevel::Low
    } else {
        ThreatLevel::None
    }
}

#[cfg(test)]
mod tests {
    use archway_api::models::{NetworkMode, NetworkObservation};
    use time::Duration;

    use super::*;
    use crate::configs::Security;
    use crate::services::VendorService;

    fn service() -> (Arc<RegistryService>, AnalyticsService) {
        let registry = Arc::new(RegistryService::new(Arc::new(VendorService::default())));
        let security = Arc::new(SecurityService::new(Security::default()));
        let analytics = AnalyticsService::new(
            Arc::clone(&registry),
            security,
            &Analytics::default(),
            10,
        );
        (registry, analytics)
    }

    fn observation(bssid: &str, ssid: &str, channel: u16, signal: i32, encryption: EncryptionKind) -> NetworkObservation {
        NetworkObservation {
            bssid: bssid.parse().unwrap(),
            ssid: ssid.into(),
            channel,
            frequency: None,
            signal_strength: signal,
            encryption,
            cipher: None,
            authentication: None,
            mode: NetworkMode::Infrastructure,
            observed_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_empty_registry_yields_zeroed_reports() {
        let (_, analytics) = service();

        let summary = analytics.summary().await;
        assert_eq!(summary.total_networks, 0);
        assert!(summary.encryption_distribution.is_empty());
        assert!(summary.channel_distribution.is_empty());

        let channels = analytics.channel_analysis().await;
        assert!(channels.channels.is_empty());
        assert_eq!(channels.congestion_level, CongestionLevel::None);

        let signal = analytics.signal_analysis().await;
        assert_eq!(signal.sample_count, 0);
        assert!(signal.average_signal.is_none());
        assert!(signal.quality_assessment.is_none());

        let report = analytics.comprehensive_report().await;
        assert_eq!(report.threat_analysis.threat_level, ThreatLevel::None);
        assert!(report.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_summary_tracks_every_mutation() {
        let (registry, analytics) = service();

        registry
            .upsert_network(observation("00:11:22:00:00:01", "A", 6, -50, EncryptionKind::Wpa2))
            .await;
        let first = analytics.summary().await;
        assert_eq!(first.total_networks, 1);

        // Same revision is served from cache.
        assert!(Arc::ptr_eq(&first, &analytics.summary().await));

        registry
            .upsert_network(observation("00:11:22:00:00:02", "B", 6, -50, EncryptionKind::Open))
            .await;
        let second = analytics.summary().await;
        assert_eq!(second.total_networks, 2);
        assert_eq!(second.channel_distribution[&6], 2);
        assert_eq!(second.encryption_distribution["Open"], 1);
        assert_eq!(second.security_issues, 1);
        assert_eq!(second.top_vendors[0].vendor, "Cisco Systems");
        assert_eq!(second.top_vendors[0].count, 2);
    }

    #[test]
    fn test_channel_interference() {
        let now = OffsetDateTime::now_utc();
        let record = |bssid: &str, channel: u16, signal: i32| {
            Arc::new(NetworkRecord {
                bssid: bssid.parse().unwrap(),
                ssid: String::new(),
                channel,
                frequency: 0,
                signal_strength: signal,
                quality: 0,
                encryption: EncryptionKind::Wpa2,
                cipher: String::new(),
                authentication: String::new(),
                vendor: String::new(),
                mode: NetworkMode::Infrastructure,
                beacon_count: 1,
                first_seen: now - Duration::seconds(1),
                last_seen: now,
            })
        };

        let analysis = channel_analysis(&[
            record("00:00:00:00:00:01", 1, -40),
            record("00:00:00:00:00:02", 1, -60),
            record("00:00:00:00:00:03", 36, -90),
        ]);

        // 2 * 10 + 100 / 10 = 30, 1 * 10 + 90 / 10 = 19
        assert_eq!(analysis.channels[0].interference_score, 30.0);
        assert_eq!(analysis.channels[1].interference_score, 19.0);
        assert_eq!(analysis.channels[1].band, Band::Band5GHz);
        assert_eq!(analysis.optimal_channels[0].channel, 36);
        assert_eq!(analysis.optimal_channels[0].rating, ChannelRating::Excellent);
        assert_eq!(analysis.optimal_channels[1].rating, ChannelRating::Good);
        assert_eq!(analysis.congestion_level, CongestionLevel::Low);
    }

    #[tokio::test]
    async fn test_posture_and_signal() {
        let (registry, analytics) = service();
        for (i, (signal, encryption)) in [
            (-45, EncryptionKind::Wpa3),
            (-65, EncryptionKind::Wpa2),
            (-80, EncryptionKind::Wep),
            (-90, EncryptionKind::Open),
        ]
        .into_iter()
        .enumerate()
        {
            registry
                .upsert_network(observation(&format!("00:11:22:00:00:0{i}"), &format!("N{i}"), 6, signal, encryption))
                .await;
        }

        let posture = analytics.security_posture().await;
        // (100 + 80 + 20 + 0) / 4
        assert_eq!(posture.security_score, 50.0);
        assert_eq!(posture.security_level, SecurityLevel::Fair);
        assert_eq!(posture.vulnerable_networks, 2);
        assert_eq!(posture.recommendations.len(), 2);

        let signal = analytics.signal_analysis().await;
        assert_eq!(signal.average_signal, Some(70.0));
        assert_eq!(signal.median_signal, Some(72.5));
        assert_eq!(signal.min_signal, Some(45));
        assert_eq!(signal.max_signal, Some(90));
        assert_eq!(
            signal.signal_distribution,
            SignalDistribution {
                excellent: 1,
                good: 1,
                fair: 1,
                poor: 1
            }
        );
        assert_eq!(signal.quality_assessment, Some(SignalQuality::Fair));
        assert!(signal.standard_deviation.is_some());
    }

    #[tokio::test]
    async fn test_threat_report() {
        let (registry, analytics) = service();
        registry
            .upsert_network(observation("00:11:22:00:00:01", "Corp", 6, -50, EncryptionKind::Wpa2))
            .await;
        registry
            .upsert_network(observation("00:11:22:00:00:02", "Corp", 11, -55, EncryptionKind::Wpa2))
            .await;
        registry
            .upsert_network(observation("00:11:22:00:00:03", "Guest", 1, -70, EncryptionKind::Wpa2))
            .await;

        let report = analytics.threat_report().await;
        assert_eq!(report.evil_twins.len(), 1);
        assert_eq!(report.evil_twins[0].signal_delta, 5);
        assert_eq!(report.rogue_aps.len(), 1);
        assert_eq!(report.rogue_aps[0].ssid, "Guest");
        assert_eq!(report.rogue_aps[0].severity, ThreatSeverity::Medium);
        assert_eq!(report.total_threats, 2);
        assert_eq!(report.threat_level, ThreatLevel::High);

        let comprehensive = analytics.comprehensive_report().await;
        assert!(
            comprehensive
                .recommendations
                .contains(&String::from("Investigate detected security threats immediately"))
        );
    }

    #[test]
    fn test_threat_levels() {
        use ThreatSeverity::*;
        assert_eq!(threat_level(&[]), ThreatLevel::None);
        assert_eq!(threat_level(&[Medium]), ThreatLevel::Low);
        assert_eq!(threat_level(&[Medium, Medium, Medium]), ThreatLevel::Medium);
        assert_eq!(threat_level(&[Medium, High]), ThreatLevel::High);
    }

    #[tokio::test]
    async fn test_fingerprint_tracks_identity_fields() {
        let (registry, _) = service();
        let office = registry
            .upsert_network(observation("00:11:22:00:00:01", "Office", 6, -50, EncryptionKind::Wpa2))
            .await
            .record;

        let fingerprint = network_fingerprint(&office);
        assert_eq!(fingerprint.len(), 16);
        assert!(fingerprint.bytes().all(|b| b.is_ascii_hexdigit()));

        let weaker = registry
            .upsert_network(observation("00:11:22:00:00:01", "Office", 6, -80, EncryptionKind::Wpa2))
            .await
            .record;
        assert_eq!(network_fingerprint(&weaker), fingerprint);

        let moved = registry
            .upsert_network(observation("00:11:22:00:00:01", "Office", 11, -80, EncryptionKind::Wpa2))
            .await
            .record;
        assert_ne!(network_fingerprint(&moved), fingerprint);
    }
}
