use std::sync::Arc;

use sqlx::{Error, Pool, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::NetworkRow;

#[derive(Clone)]
pub struct NetworkRepository {
    storage: Arc<Storage>,
}

impl NetworkRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl NetworkRepository {
    pub async fn upsert(
        &self,
        item: &NetworkRow,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO networks (
                bssid, ssid, channel, frequency, signal_strength, quality, encryption,
                cipher, authentication, vendor, mode, beacon_count, first_seen, last_seen
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (bssid) DO UPDATE SET
                ssid = excluded.ssid,
                channel = excluded.channel,
                frequency = excluded.frequency,
                signal_strength = excluded.signal_strength,
                quality = excluded.quality,
                encryption = excluded.encryption,
                cipher = excluded.cipher,
                authentication = excluded.authentication,
                vendor = excluded.vendor,
                mode = excluded.mode,
                beacon_count = excluded.beacon_count,
                first_seen = excluded.first_seen,
                last_seen = excluded.last_seen
            "#,
        )
        .bind(&item.bssid)
        .bind(&item.ssid)
        .bind(item.channel)
        .bind(item.frequency)
        .bind(item.signal_strength)
        .bind(item.quality)
        .bind(&item.encryption)
        .bind(&item.cipher)
        .bind(&item.authentication)
        .bind(&item.vendor)
        .bind(&item.mode)
        .bind(item.beacon_count)
        .bind(item.first_seen)
        .bind(item.last_seen)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn find_by_bssid(&self, bssid: &str) -> Result<Option<NetworkRow>, Error> {
        let network: Option<NetworkRow> = sqlx::query_as("SELECT * FROM networks WHERE bssid = $1")
            .bind(bssid)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(network)
    }

    pub async fn find_all(&self) -> Result<Vec<NetworkRow>, Error> {
        let networks: Vec<NetworkRow> = sqlx::query_as("SELECT * FROM networks ORDER BY bssid")
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(networks)
    }

    pub async fn delete_all(&self, transaction: &mut Transaction<'_, Sqlite>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM networks")
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}
