use anyhow::anyhow;
use archway_api::models::{FailureReason, ScanSession, SessionStatus};
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScanSessionRow {
    pub id: String,
    pub interface: String,
    pub mode: String,
    pub status: String,
    pub started_at: OffsetDateTime,
    pub ended_at: Option<OffsetDateTime>,
    pub duration_secs: Option<i64>,
    pub networks_seen: i64,
    pub clients_seen: i64,
    pub packets_captured: i64,
    /// JSON encoded failure reason
    pub failure: Option<String>,
}

impl TryFrom<&ScanSession> for ScanSessionRow {
    type Error = serde_json::Error;

    fn try_from(session: &ScanSession) -> Result<Self, Self::Error> {
        Ok(Self {
            id: session.id.to_string(),
            interface: session.interface.clone(),
            mode: session.mode.to_string(),
            status: session.status.to_string(),
            started_at: session.started_at,
            ended_at: session.ended_at,
            duration_secs: session.duration_secs.map(|secs| secs as i64),
            networks_seen: session.networks_seen as i64,
            clients_seen: session.clients_seen as i64,
            packets_captured: session.packets_captured as i64,
            failure: session
                .failure
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
        })
    }
}

impl TryFrom<ScanSessionRow> for ScanSession {
    type Error = anyhow::Error;

    fn try_from(row: ScanSessionRow) -> Result<Self, Self::Error> {
        let failure: Option<FailureReason> = row
            .failure
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(Self {
            id: row.id.parse()?,
            interface: row.interface,
            mode: row.mode.parse().map_err(|e: String| anyhow!(e))?,
            status: SessionStatus::from(row.status),
            started_at: row.started_at,
            ended_at: row.ended_at,
            duration_secs: row.duration_secs.map(u64::try_from).transpose()?,
            networks_seen: u64::try_from(row.networks_seen)?,
            clients_seen: u64::try_from(row.clients_seen)?,
            packets_captured: u64::try_from(row.packets_captured)?,
            failure,
        })
    }
}

#[derive(Clone)]
pub struct ScanSessionTable;

impl Table for ScanSessionTable {
    fn name(&self) -> &'static str {
        "scan_sessions"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS scan_sessions (
                id VARCHAR(36) PRIMARY KEY,
                interface VARCHAR(64) NOT NULL,
                mode VARCHAR(16) NOT NULL,
                status VARCHAR(16) NOT NULL,
                started_at TIMESTAMP NOT NULL,
                ended_at TIMESTAMP,
                duration_secs INTEGER,
                networks_seen INTEGER NOT NULL DEFAULT 0,
                clients_seen INTEGER NOT NULL DEFAULT 0,
                packets_captured INTEGER NOT NULL DEFAULT 0,
                failure TEXT
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS scan_sessions;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
