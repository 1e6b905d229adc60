use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use kvstore::{KVDb, KVStoreError};
use thiserror::Error;

use super::fetch::FetchResponse;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error(transparent)]
    KVStore(#[from] KVStoreError),
    #[error("cache storage lock poisoned")]
    Poisoned,
}

/// Named cache partitions holding responses by cache key
pub trait CacheStorage: Send + Sync {
    fn get(&self, partition: &str, key: &str) -> Result<Option<FetchResponse>, StorageError>;
    fn put(
        &self,
        partition: &str,
        key: &str,
        response: &FetchResponse,
    ) -> Result<(), StorageError>;
    fn partitions(&self) -> Result<Vec<String>, StorageError>;
    /// Cache keys stored in `partition`, sorted.
    fn keys(&self, partition: &str) -> Result<Vec<String>, StorageError>;
    /// Returns whether the partition existed.
    fn delete_partition(&self, partition: &str) -> Result<bool, StorageError>;

    fn has_partition(&self, partition: &str) -> Result<bool, StorageError> {
        Ok(self.partitions()?.iter().any(|p| p == partition))
    }
}

#[derive(Default)]
pub struct MemoryCacheStorage {
    partitions: RwLock<HashMap<String, HashMap<String, FetchResponse>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn get(&self, partition: &str, key: &str) -> Result<Option<FetchResponse>, StorageError> {
        let partitions = self.partitions.read().map_err(|_| StorageError::Poisoned)?;
        Ok(partitions.get(partition).and_then(|p| p.get(key)).cloned())
    }

    fn put(
        &self,
        partition: &str,
        key: &str,
        response: &FetchResponse,
    ) -> Result<(), StorageError> {
        let mut partitions = self.partitions.write().map_err(|_| StorageError::Poisoned)?;
        partitions
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), response.clone());
        Ok(())
    }

    fn partitions(&self) -> Result<Vec<String>, StorageError> {
        let partitions = self.partitions.read().map_err(|_| StorageError::Poisoned)?;
        let mut names: Vec<String> = partitions.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn keys(&self, partition: &str) -> Result<Vec<String>, StorageError> {
        let partitions = self.partitions.read().map_err(|_| StorageError::Poisoned)?;
        let mut keys: Vec<String> = partitions
            .get(partition)
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        Ok(keys)
    }

    fn delete_partition(&self, partition: &str) -> Result<bool, StorageError> {
        let mut partitions = self.partitions.write().map_err(|_| StorageError::Poisoned)?;
        Ok(partitions.remove(partition).is_some())
    }
}

/// Cache partitions persisted in the KV store, one KV partition per cache partition
pub struct SqliteCacheStorage {
    db: Mutex<KVDb>,
}

impl SqliteCacheStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self {
            db: Mutex::new(KVDb::new(path)?),
        })
    }
}

impl CacheStorage for SqliteCacheStorage {
    fn get(&self, partition: &str, key: &str) -> Result<Option<FetchResponse>, StorageError> {
        let db = self.db.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(db.get(partition, key)?)
    }

    fn put(
        &self,
        partition: &str,
        key: &str,
        response: &FetchResponse,
    ) -> Result<(), StorageError> {
        let db = self.db.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(db.set(partition, key, response)?)
    }

    fn partitions(&self) -> Result<Vec<String>, StorageError> {
        let db = self.db.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(db.partitions()?)
    }

    fn keys(&self, partition: &str) -> Result<Vec<String>, StorageError> {
        let db = self.db.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(db.keys(partition)?)
    }

    fn delete_partition(&self, partition: &str) -> Result<bool, StorageError> {
        let db = self.db.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(db.drop_partition(partition)? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use crate::offline::fetch::ResponseKind;

    fn asset(body: &str) -> FetchResponse {
        FetchResponse {
            status: 200,
            kind: ResponseKind::Basic,
            headers: BTreeMap::from([("content-type".into(), "text/html".into())]),
            body: body.as_bytes().to_vec(),
        }
    }

    fn exercise(storage: &dyn CacheStorage) {
        storage.put("solar-pwa-v1", "GET /", &asset("v1")).unwrap();
        storage.put("solar-pwa-v2", "GET /", &asset("v2")).unwrap();

        assert_eq!(storage.get("solar-pwa-v1", "GET /").unwrap(), Some(asset("v1")));
        assert_eq!(storage.get("solar-pwa-v2", "GET /").unwrap(), Some(asset("v2")));
        assert_eq!(storage.get("solar-pwa-v2", "GET /app.js").unwrap(), None);
        assert!(storage.has_partition("solar-pwa-v1").unwrap());
        storage.put("solar-pwa-v2", "GET /app.js", &asset("js")).unwrap();
        assert_eq!(storage.keys("solar-pwa-v2").unwrap(), vec!["GET /", "GET /app.js"]);
        assert!(storage.keys("solar-pwa-v3").unwrap().is_empty());

        assert!(storage.delete_partition("solar-pwa-v1").unwrap());
        assert!(!storage.delete_partition("solar-pwa-v1").unwrap());
        assert_eq!(storage.partitions().unwrap(), vec!["solar-pwa-v2".to_string()]);
    }

    #[test]
    fn memory_storage() {
        exercise(&MemoryCacheStorage::new());
    }

    #[test]
    fn sqlite_storage_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("offline-cache.db");

        exercise(&SqliteCacheStorage::open(&path).unwrap());

        let reopened = SqliteCacheStorage::open(&path).unwrap();
        assert_eq!(reopened.get("solar-pwa-v2", "GET /").unwrap(), Some(asset("v2")));
    }
}
