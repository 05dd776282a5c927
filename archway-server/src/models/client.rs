use std::collections::BTreeSet;

use archway_api::models::ClientRecord;
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientRow {
    pub mac: String,
    pub vendor: String,
    pub signal_strength: i64,
    pub associated_bssid: Option<String>,
    /// JSON array of SSIDs
    pub probed_ssids: String,
    pub frame_count: i64,
    pub first_seen: OffsetDateTime,
    pub last_seen: OffsetDateTime,
}

impl TryFrom<&ClientRecord> for ClientRow {
    type Error = serde_json::Error;

    fn try_from(record: &ClientRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            mac: record.mac.to_string(),
            vendor: record.vendor.clone(),
            signal_strength: record.signal_strength as i64,
            associated_bssid: record.associated_bssid.map(|bssid| bssid.to_string()),
            probed_ssids: serde_json::to_string(&record.probed_ssids)?,
            frame_count: record.frame_count as i64,
            first_seen: record.first_seen,
            last_seen: record.last_seen,
        })
    }
}

impl TryFrom<ClientRow> for ClientRecord {
    type Error = anyhow::Error;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let probed_ssids: BTreeSet<String> = serde_json::from_str(&row.probed_ssids)?;

        Ok(Self {
            mac: row.mac.parse()?,
            vendor: row.vendor,
            signal_strength: i32::try_from(row.signal_strength)?,
            associated_bssid: row.associated_bssid.map(|bssid| bssid.parse()).transpose()?,
            probed_ssids,
            frame_count: u64::try_from(row.frame_count)?,
            first_seen: row.first_seen,
            last_seen: row.last_seen,
        })
    }
}

#[derive(Clone)]
pub struct ClientTable;

impl Table for ClientTable {
    fn name(&self) -> &'static str {
        "clients"
    }

    fn create(&self) -> String {
        // associated_bssid is a weak reference: the network may be cleared first.
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                mac VARCHAR(17) PRIMARY KEY,
                vendor VARCHAR(255) NOT NULL DEFAULT 'Unknown',
                signal_strength INTEGER NOT NULL,
                associated_bssid VARCHAR(17),
                probed_ssids TEXT NOT NULL DEFAULT '[]',
                frame_count INTEGER NOT NULL DEFAULT 0,
                first_seen TIMESTAMP NOT NULL,
                last_seen TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS clients;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["networks"]
    }
}
