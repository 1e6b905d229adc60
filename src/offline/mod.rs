//! Offline cache worker
//!
//! Sits between the dashboard and the network. Static shell assets are served
//! cache-first and the data endpoints network-first, so the dashboard keeps showing
//! the last known readings while the gateway is unreachable. All cache entries of one
//! release live in a single partition named after the cache version; activating a
//! new version purges every other partition.

pub mod fetch;
pub mod network;
pub mod storage;
pub mod strategy;
mod writer;

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::auth::AccessToken;
use crate::constants::defaults;

pub use fetch::{FetchRequest, FetchResponse, Method, ResponseKind};
pub use network::{HttpNetwork, Network, NetworkError};
pub use storage::{CacheStorage, MemoryCacheStorage, SqliteCacheStorage, StorageError};
pub use strategy::{CacheWrite, Handled, RoutePolicy, Source, Strategy};
pub use writer::CacheWriter;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub cache_prefix: String,
    pub version: String,
    /// Origin of the app; relative manifest entries and request paths resolve against it
    pub origin: Url,
    pub manifest: Vec<String>,
    pub policy: RoutePolicy,
}

impl WorkerConfig {
    pub fn new(origin: Url, version: impl Into<String>) -> Self {
        Self {
            cache_prefix: defaults::CACHE_NAME_PREFIX.to_string(),
            version: version.into(),
            origin,
            manifest: defaults::SHELL_MANIFEST.iter().map(|s| s.to_string()).collect(),
            policy: RoutePolicy::default(),
        }
    }

    pub fn partition_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Activated,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InstallReport {
    pub cached: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActivationReport {
    pub purged: Vec<String>,
    pub clients_claimed: bool,
}

pub struct OfflineWorker<S: CacheStorage + 'static, N: Network> {
    config: WorkerConfig,
    storage: Arc<S>,
    network: N,
    writer: CacheWriter,
    state: WorkerState,
    controlling: bool,
}

impl<S: CacheStorage + 'static, N: Network> OfflineWorker<S, N> {
    pub fn new(config: WorkerConfig, storage: Arc<S>, network: N) -> std::io::Result<Self> {
        let writer = CacheWriter::spawn(storage.clone(), config.partition_name())?;
        Ok(Self {
            config,
            storage,
            network,
            writer,
            state: WorkerState::Installing,
            controlling: false,
        })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn is_controlling(&self) -> bool {
        self.controlling
    }

    /// Whether the partition for the current version already exists.
    pub fn is_installed(&self) -> Result<bool, StorageError> {
        self.storage.has_partition(&self.config.partition_name())
    }

    /// Pre-cache the app shell. Entries that cannot be fetched are reported, not fatal.
    ///
    /// `token` is sent to same-origin entries only; third-party assets never see it.
    pub fn install(&mut self, token: Option<&AccessToken>) -> InstallReport {
        let partition = self.config.partition_name();
        log::info!("Installing offline cache {partition}");

        let mut report = InstallReport::default();
        for entry in &self.config.manifest {
            match self.precache(&partition, entry, token) {
                Ok(()) => report.cached.push(entry.clone()),
                Err(reason) => {
                    log::warn!("Could not pre-cache {entry}: {reason}");
                    report.failed.push(entry.clone());
                }
            }
        }

        log::info!(
            "Pre-cached {} of {} shell assets",
            report.cached.len(),
            self.config.manifest.len()
        );
        self.state = WorkerState::Installed;
        report
    }

    fn precache(
        &self,
        partition: &str,
        entry: &str,
        token: Option<&AccessToken>,
    ) -> Result<(), String> {
        let url = self.config.origin.join(entry).map_err(|e| e.to_string())?;
        let same_origin = url.origin() == self.config.origin.origin();
        let request = match token {
            Some(token) if same_origin => FetchRequest::get(url).with_token(token),
            _ => FetchRequest::get(url),
        };
        let response = self.network.fetch(&request).map_err(|e| e.to_string())?;
        if !response.is_ok() {
            return Err(format!("status {}", response.status));
        }
        self.storage
            .put(partition, &request.cache_key(), &response)
            .map_err(|e| e.to_string())
    }

    /// Purge every partition but the current one and take control of all clients.
    pub fn activate(&mut self) -> Result<ActivationReport, StorageError> {
        self.state = WorkerState::Activating;
        let current = self.config.partition_name();

        let mut report = ActivationReport::default();
        for partition in self.storage.partitions()? {
            if partition != current {
                log::info!("Deleting stale cache {partition}");
                self.storage.delete_partition(&partition)?;
                report.purged.push(partition);
            }
        }

        self.controlling = true;
        report.clients_claimed = true;
        self.state = WorkerState::Activated;
        log::debug!("Offline worker {current} {}", self.state);
        Ok(report)
    }

    /// Build a request for `path` on the app origin, carrying `token` if given.
    pub fn request_for(
        &self,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<FetchRequest, url::ParseError> {
        let request = FetchRequest::get(self.config.origin.join(path)?);
        Ok(match token {
            Some(token) => request.with_token(token),
            None => request,
        })
    }

    /// Resolve a request and queue its cache write, if any.
    pub fn dispatch(&self, request: &FetchRequest) -> Handled {
        if !self.controlling {
            // Not claimed yet: plain network, nothing cached
            return match self.network.fetch(request) {
                Ok(response) => Handled {
                    response,
                    cache_write: None,
                    source: Source::Network,
                },
                Err(e) => {
                    log::debug!("Network failed for {}: {e}", request.url);
                    Handled {
                        response: FetchResponse::offline(),
                        cache_write: None,
                        source: Source::Offline,
                    }
                }
            };
        }

        let partition = self.config.partition_name();
        let key = request.cache_key();
        let cached = self.storage.get(&partition, &key).unwrap_or_else(|e| {
            log::warn!("Cache lookup for {key} failed: {e}");
            None
        });

        let strategy = self.config.policy.strategy_for(request);
        let handled = strategy::handle(request, strategy, cached, |r| self.network.fetch(r));
        if let Some(write) = &handled.cache_write {
            self.writer.submit(write.clone());
        }
        log::debug!("{key} served from {:?}", handled.source);
        handled
    }

    pub fn fetch(&self, request: &FetchRequest) -> FetchResponse {
        self.dispatch(request).response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    const ORIGIN: &str = "http://localhost:8080";

    /// Network stub with a fixed set of answers and a kill switch
    #[derive(Default)]
    struct StubNetwork {
        answers: HashMap<String, FetchResponse>,
        offline: AtomicBool,
        calls: AtomicUsize,
        seen: Mutex<Vec<FetchRequest>>,
    }

    impl StubNetwork {
        fn answer(mut self, path: &str, status: u16, body: &str) -> Self {
            self.answers.insert(
                path.to_string(),
                FetchResponse {
                    status,
                    kind: ResponseKind::Basic,
                    headers: BTreeMap::new(),
                    body: body.as_bytes().to_vec(),
                },
            );
            self
        }
    }

    impl Network for Arc<StubNetwork> {
        fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            if self.offline.load(Ordering::SeqCst) {
                return Err(NetworkError::Unavailable("offline".into()));
            }
            self.answers
                .get(request.path())
                .cloned()
                .ok_or_else(|| NetworkError::Unavailable(format!("no route to {}", request.url)))
        }
    }

    fn config(version: &str, manifest: &[&str]) -> WorkerConfig {
        WorkerConfig {
            manifest: manifest.iter().map(|s| s.to_string()).collect(),
            ..WorkerConfig::new(Url::parse(ORIGIN).unwrap(), version)
        }
    }

    fn worker(
        config: WorkerConfig,
        storage: Arc<MemoryCacheStorage>,
        network: Arc<StubNetwork>,
    ) -> OfflineWorker<MemoryCacheStorage, Arc<StubNetwork>> {
        OfflineWorker::new(config, storage, network).unwrap()
    }

    fn wait_for_entry(storage: &MemoryCacheStorage, partition: &str, key: &str) -> FetchResponse {
        for _ in 0..200 {
            if let Some(entry) = storage.get(partition, key).unwrap() {
                return entry;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("{key} never reached the cache");
    }

    #[test]
    fn partition_name_embeds_version() {
        let config = config("v7", &[]);
        assert_eq!(config.partition_name(), "solar-pwa-v7");
    }

    #[test]
    fn install_tolerates_partial_failure() {
        let network = Arc::new(
            StubNetwork::default()
                .answer("/", 200, "<html></html>")
                .answer("/app.js", 200, "main()")
                .answer("/manifest.json", 404, "{}"),
        );
        let storage = Arc::new(MemoryCacheStorage::new());
        let mut worker = worker(
            config("v1", &["/", "/app.js", "/manifest.json", "/icons/icon-192.png"]),
            storage.clone(),
            network,
        );

        let report = worker.install(None);
        assert_eq!(report.cached, vec!["/", "/app.js"]);
        assert_eq!(report.failed, vec!["/manifest.json", "/icons/icon-192.png"]);
        assert_eq!(worker.state(), WorkerState::Installed);
        assert!(worker.is_installed().unwrap());
        assert!(storage
            .get("solar-pwa-v1", "GET http://localhost:8080/app.js")
            .unwrap()
            .is_some());
    }

    #[test]
    fn install_sends_token_to_own_origin_only() {
        let network = Arc::new(StubNetwork::default().answer("/app.js", 200, "main()"));
        let mut worker = worker(
            config("v1", &["/app.js", "https://cdn.example.com/chart.js"]),
            Arc::new(MemoryCacheStorage::new()),
            network.clone(),
        );

        let token = AccessToken::new("s3cr3t").unwrap();
        let report = worker.install(Some(&token));
        assert_eq!(report.cached, vec!["/app.js"]);

        let seen = network.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].headers.get("Authorization").unwrap(), "Bearer s3cr3t");
        assert_eq!(seen[1].url.host_str(), Some("cdn.example.com"));
        assert!(seen[1].headers.is_empty());
    }

    #[test]
    fn activation_purges_other_versions() {
        let network = Arc::new(StubNetwork::default().answer("/", 200, "v2 shell"));
        let storage = Arc::new(MemoryCacheStorage::new());
        storage
            .put("solar-pwa-v1", "GET http://localhost:8080/", &FetchResponse::offline())
            .unwrap();

        let mut worker = worker(config("v2", &["/"]), storage.clone(), network);
        worker.install(None);
        let report = worker.activate().unwrap();

        assert_eq!(report.purged, vec!["solar-pwa-v1"]);
        assert!(report.clients_claimed);
        assert!(worker.is_controlling());
        assert_eq!(storage.partitions().unwrap(), vec!["solar-pwa-v2"]);
    }

    #[test]
    fn api_response_survives_going_offline() {
        let network =
            Arc::new(StubNetwork::default().answer("/api/current", 200, r#"{"Power":42}"#));
        let storage = Arc::new(MemoryCacheStorage::new());
        let mut worker = worker(config("v1", &[]), storage.clone(), network.clone());
        worker.activate().unwrap();

        let request = worker.request_for("/api/current", None).unwrap();
        let online = worker.dispatch(&request);
        assert_eq!(online.source, Source::Network);
        wait_for_entry(&storage, "solar-pwa-v1", &request.cache_key());

        network.offline.store(true, Ordering::SeqCst);
        let offline = worker.dispatch(&request);
        assert_eq!(offline.source, Source::Cache);
        assert_eq!(offline.response.body, br#"{"Power":42}"#);
    }

    #[test]
    fn cached_asset_is_served_without_network() {
        let network = Arc::new(StubNetwork::default().answer("/app.js", 200, "main()"));
        let storage = Arc::new(MemoryCacheStorage::new());
        let mut worker = worker(config("v1", &["/app.js"]), storage, network.clone());
        worker.install(None);
        worker.activate().unwrap();
        let installs = network.calls.load(Ordering::SeqCst);

        let request = worker.request_for("/app.js", None).unwrap();
        assert_eq!(worker.fetch(&request).body, b"main()");
        assert_eq!(network.calls.load(Ordering::SeqCst), installs);
    }

    #[test]
    fn nothing_cached_and_no_network_is_503() {
        let network = Arc::new(StubNetwork::default());
        network.offline.store(true, Ordering::SeqCst);
        let mut worker = worker(config("v1", &[]), Arc::new(MemoryCacheStorage::new()), network);
        worker.activate().unwrap();

        for path in ["/api/today", "/index.html"] {
            let response = worker.fetch(&worker.request_for(path, None).unwrap());
            assert_eq!(response.status, 503);
            assert_eq!(response.body, b"Offline");
        }
    }

    #[test]
    fn unclaimed_worker_does_not_cache() {
        let network = Arc::new(StubNetwork::default().answer("/api/current", 200, "{}"));
        let storage = Arc::new(MemoryCacheStorage::new());
        let worker = worker(config("v1", &[]), storage.clone(), network);

        let handled = worker.dispatch(&worker.request_for("/api/current", None).unwrap());
        assert_eq!(handled.source, Source::Network);
        assert!(handled.cache_write.is_none());
        drop(worker);
        assert!(storage.partitions().unwrap().is_empty());
    }
}
