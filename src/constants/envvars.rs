pub const DATA_DIR: &str = "SE_DATA_DIR";

pub const LOG_LEVEL: &str = "LOGGING_LEVEL";

// Gateway
pub const PWA_ACCESS_TOKEN: &str = "PWA_ACCESS_TOKEN";
pub const UPSTREAM_BASE_URL: &str = "UPSTREAM_BASE_URL";
pub const UPSTREAM_API_TOKEN: &str = "UPSTREAM_API_TOKEN";
pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";
pub const STATIC_DIR: &str = "STATIC_DIR";

// Dashboard client
pub const DASHBOARD_BASE_URL: &str = "DASHBOARD_BASE_URL";
pub const CACHE_VERSION: &str = "CACHE_VERSION";
pub const POLL_INTERVAL_SECS: &str = "POLL_INTERVAL_SECS";
