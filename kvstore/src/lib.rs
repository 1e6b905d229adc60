//! Partitioned key-value store on top of SQLite
//!
//! Every value lives under a `(partition, key)` pair and is stored as JSON.
//! Partitions are created implicitly on first write and removed as a whole
//! with [`KVDb::drop_partition`].

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

const TABLENAME: &str = "kvstore";
const PARTITION_FIELD: &str = "partition";
const KEY_FIELD: &str = "key";
const VALUE_FIELD: &str = "value";

#[derive(Error, Debug)]
pub enum KVStoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("could not (de)serialize value: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

pub struct KVDb {
    conn: Connection,
}

impl KVDb {
    /// Open (and create if needed) the store at `path`. `":memory:"` gives a private
    /// in-memory store.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        log::debug!("Opening KV store at {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS '{TABLENAME}' (
                {PARTITION_FIELD} TEXT NOT NULL,
                {KEY_FIELD} TEXT NOT NULL,
                {VALUE_FIELD} BLOB NOT NULL,
                PRIMARY KEY ({PARTITION_FIELD}, {KEY_FIELD})
                )"
            ),
            [],
        )?;
        Ok(Self { conn })
    }

    fn select(&self, partition: &str, key: &str) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {VALUE_FIELD} FROM '{TABLENAME}'
                    WHERE {PARTITION_FIELD} = ?1 AND {KEY_FIELD} = ?2"
                ),
                params![partition, key],
                |r| r.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        partition: impl AsRef<str>,
        key: impl AsRef<str>,
    ) -> Result<Option<T>, KVStoreError> {
        self.select(partition.as_ref(), key.as_ref())?
            .map(|v| serde_json::from_slice::<T>(&v))
            .transpose()
            .map_err(Into::into)
    }

    fn upsert(&self, partition: &str, key: &str, value: &[u8]) -> Result<(), KVStoreError> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "INSERT INTO '{TABLENAME}' ({PARTITION_FIELD}, {KEY_FIELD}, {VALUE_FIELD})
            VALUES (?1, ?2, ?3)
            ON CONFLICT({PARTITION_FIELD}, {KEY_FIELD}) DO UPDATE SET {VALUE_FIELD}=?3",
        ))?;
        stmt.execute(params![partition, key, value])?;
        Ok(())
    }

    /// Insert or overwrite; the last write to a key wins.
    pub fn set<V: Serialize + ?Sized>(
        &self,
        partition: impl AsRef<str>,
        key: impl AsRef<str>,
        value: &V,
    ) -> Result<(), KVStoreError> {
        self.upsert(partition.as_ref(), key.as_ref(), &serde_json::to_vec(value)?)
    }

    /// Returns whether a value was actually removed.
    pub fn delete(
        &self,
        partition: impl AsRef<str>,
        key: impl AsRef<str>,
    ) -> Result<bool, KVStoreError> {
        let removed = self.conn.execute(
            &format!(
                "DELETE FROM '{TABLENAME}' WHERE {PARTITION_FIELD} = ?1 AND {KEY_FIELD} = ?2"
            ),
            params![partition.as_ref(), key.as_ref()],
        )?;
        Ok(removed > 0)
    }

    pub fn keys(&self, partition: impl AsRef<str>) -> Result<Vec<String>, KVStoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {KEY_FIELD} FROM '{TABLENAME}'
            WHERE {PARTITION_FIELD} = ?1 ORDER BY {KEY_FIELD}"
        ))?;
        let keys = stmt
            .query_map([partition.as_ref()], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Names of all partitions holding at least one entry.
    pub fn partitions(&self) -> Result<Vec<String>, KVStoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT {PARTITION_FIELD} FROM '{TABLENAME}' ORDER BY {PARTITION_FIELD}"
        ))?;
        let names = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Remove a whole partition, returning the number of entries deleted.
    pub fn drop_partition(&self, partition: impl AsRef<str>) -> Result<usize, KVStoreError> {
        let removed = self.conn.execute(
            &format!("DELETE FROM '{TABLENAME}' WHERE {PARTITION_FIELD} = ?1"),
            [partition.as_ref()],
        )?;
        log::debug!("Dropped partition {} ({removed} entries)", partition.as_ref());
        Ok(removed)
    }
}
