use anyhow::anyhow;
use archway_api::models::NetworkRecord;
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NetworkRow {
    pub bssid: String,
    pub ssid: String,
    pub channel: i64,
    pub frequency: i64,
    pub signal_strength: i64,
    pub quality: i64,
    pub encryption: String,
    pub cipher: String,
    pub authentication: String,
    pub vendor: String,
    pub mode: String,
    pub beacon_count: i64,
    pub first_seen: OffsetDateTime,
    pub last_seen: OffsetDateTime,
}

impl From<&NetworkRecord> for NetworkRow {
    fn from(record: &NetworkRecord) -> Self {
        Self {
            bssid: record.bssid.to_string(),
            ssid: record.ssid.clone(),
            channel: record.channel as i64,
            frequency: record.frequency as i64,
            signal_strength: record.signal_strength as i64,
            quality: record.quality as i64,
            encryption: record.encryption.to_string(),
            cipher: record.cipher.clone(),
            authentication: record.authentication.clone(),
            vendor: record.vendor.clone(),
            mode: record.mode.to_string(),
            beacon_count: record.beacon_count as i64,
            first_seen: record.first_seen,
            last_seen: record.last_seen,
        }
    }
}

impl TryFrom<NetworkRow> for NetworkRecord {
    type Error = anyhow::Error;

    fn try_from(row: NetworkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            bssid: row.bssid.parse()?,
            ssid: row.ssid,
            channel: u16::try_from(row.channel)?,
            frequency: u32::try_from(row.frequency)?,
            signal_strength: i32::try_from(row.signal_strength)?,
            quality: u8::try_from(row.quality)?,
            encryption: row.encryption.parse().map_err(|e: String| anyhow!(e))?,
            cipher: row.cipher,
            authentication: row.authentication,
            vendor: row.vendor,
            mode: row.mode.parse().map_err(|e: String| anyhow!(e))?,
            beacon_count: u64::try_from(row.beacon_count)?,
            first_seen: row.first_seen,
            last_seen: row.last_seen,
        })
    }
}

#[derive(Clone)]
pub struct NetworkTable;

impl Table for NetworkTable {
    fn name(&self) -> &'static str {
        "networks"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS networks (
                bssid VARCHAR(17) PRIMARY KEY,
                ssid VARCHAR(32) NOT NULL DEFAULT '',
                channel INTEGER NOT NULL,
                frequency INTEGER NOT NULL,
                signal_strength INTEGER NOT NULL,
                quality INTEGER NOT NULL,
                encryption VARCHAR(16) NOT NULL,
                cipher VARCHAR(32) NOT NULL DEFAULT '',
                authentication VARCHAR(32) NOT NULL DEFAULT '',
                vendor VARCHAR(255) NOT NULL DEFAULT 'Unknown',
                mode VARCHAR(16) NOT NULL DEFAULT 'Infrastructure',
                beacon_count INTEGER NOT NULL DEFAULT 0,
                first_seen TIMESTAMP NOT NULL,
                last_seen TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS networks;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
