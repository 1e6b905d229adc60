use std::path::PathBuf;

use once_cell::sync::Lazy;

use crate::helpers::base_path;

pub static SESSION_STORE: Lazy<PathBuf> =
    Lazy::new(|| base_path::DATA_DIR.join("kvs-db/session.db"));

pub static OFFLINE_CACHE: Lazy<PathBuf> =
    Lazy::new(|| base_path::DATA_DIR.join("cache/offline-cache.db"));
