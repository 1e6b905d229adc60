use std::time::Duration;

pub const LOG_LEVEL: &str = "INFO";

pub const LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

pub const DASHBOARD_BASE_URL: &str = "http://localhost:8080";
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

pub const CACHE_NAME_PREFIX: &str = "solar-pwa";
pub const CACHE_VERSION: &str = "v1";

pub const CHART_LIBRARY_URL: &str =
    "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Shell assets fetched into the cache partition on install.
pub const SHELL_MANIFEST: [&str; 7] = [
    "/",
    "/index.html",
    "/app.js",
    "/manifest.json",
    "/icons/icon-192.png",
    "/icons/icon-512.png",
    CHART_LIBRARY_URL,
];
