use anyhow::Result;

use crate::interfaces::kvpath;
use crate::offline::{CacheStorage, SqliteCacheStorage};

pub fn cache_clear() -> Result<()> {
    let storage = SqliteCacheStorage::open(kvpath::OFFLINE_CACHE.as_path())?;
    let partitions = storage.partitions()?;
    for partition in &partitions {
        let entries = storage.keys(partition)?.len();
        storage.delete_partition(partition)?;
        log::info!("Removed cache {partition} ({entries} entries)");
    }
    log::info!("Removed {} cache partition(s)", partitions.len());
    Ok(())
}
