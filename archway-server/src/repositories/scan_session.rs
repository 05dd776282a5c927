use std::sync::Arc;

use sqlx::{Error, Pool, Sqlite};

use crate::configs::Storage;
use crate::models::ScanSessionRow;

#[derive(Clone)]
pub struct ScanSessionRepository {
    storage: Arc<Storage>,
}

impl ScanSessionRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl ScanSessionRepository {
    /// Sessions are written when they start and again when they finish.
    pub async fn upsert(&self, item: &ScanSessionRow) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO scan_sessions (
                id, interface, mode, status, started_at, ended_at, duration_secs,
                networks_seen, clients_seen, packets_captured, failure
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                status = excluded.status,
                ended_at = excluded.ended_at,
                networks_seen = excluded.networks_seen,
                clients_seen = excluded.clients_seen,
                packets_captured = excluded.packets_captured,
                failure = excluded.failure
            "#,
        )
        .bind(&item.id)
        .bind(&item.interface)
        .bind(&item.mode)
        .bind(&item.status)
        .bind(item.started_at)
        .bind(item.ended_at)
        .bind(item.duration_secs)
        .bind(item.networks_seen)
        .bind(item.clients_seen)
        .bind(item.packets_captured)
        .bind(&item.failure)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ScanSessionRow>, Error> {
        let session: Option<ScanSessionRow> =
            sqlx::query_as("SELECT * FROM scan_sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(session)
    }

    /// Newest first.
    pub async fn find_page(&self, page: u32, per_page: u32) -> Result<Vec<ScanSessionRow>, Error> {
        let offset = (page.saturating_sub(1) as i64) * per_page as i64;

        let sessions: Vec<ScanSessionRow> = sqlx::query_as(
            r#"
            SELECT * FROM scan_sessions
            ORDER BY started_at DESC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(sessions)
    }

    pub async fn count(&self) -> Result<u64, Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scan_sessions")
            .fetch_one(self.storage.get_pool())
            .await?;

        Ok(count as u64)
    }
}
