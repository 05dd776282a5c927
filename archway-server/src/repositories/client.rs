use std::sync::Arc;

use sqlx::{Error, Pool, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::ClientRow;

#[derive(Clone)]
pub struct ClientRepository {
    storage: Arc<Storage>,
}

impl ClientRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl ClientRepository {
    pub async fn upsert(
        &self,
        item: &ClientRow,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO clients (
                mac, vendor, signal_strength, associated_bssid, probed_ssids,
                frame_count, first_seen, last_seen
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (mac) DO UPDATE SET
                vendor = excluded.vendor,
                signal_strength = excluded.signal_strength,
                associated_bssid = excluded.associated_bssid,
                probed_ssids = excluded.probed_ssids,
                frame_count = excluded.frame_count,
                first_seen = excluded.first_seen,
                last_seen = excluded.last_seen
            "#,
        )
        .bind(&item.mac)
        .bind(&item.vendor)
        .bind(item.signal_strength)
        .bind(&item.associated_bssid)
        .bind(&item.probed_ssids)
        .bind(item.frame_count)
        .bind(item.first_seen)
        .bind(item.last_seen)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn find_all(&self) -> Result<Vec<ClientRow>, Error> {
        let clients: Vec<ClientRow> = sqlx::query_as("SELECT * FROM clients ORDER BY mac")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(clients)
    }

    pub async fn find_by_network(&self, bssid: &str) -> Result<Vec<ClientRow>, Error> {
        let clients: Vec<ClientRow> =
            sqlx::query_as("SELECT * FROM clients WHERE associated_bssid = $1 ORDER BY mac")
                .bind(bssid)
                .fetch_all(self.storage.get_pool())
                .await?;

        Ok(clients)
    }

    pub async fn delete_all(&self, transaction: &mut Transaction<'_, Sqlite>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM clients")
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
