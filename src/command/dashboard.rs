use std::sync::Arc;
use std::thread;

use anyhow::{bail, Result};

use crate::argsets::DashboardArgs;
use crate::client::{poll_once, DashboardController, PollOutcome, SessionStore};
use crate::config::ClientConfig;
use crate::interfaces::kvpath;
use crate::offline::{HttpNetwork, OfflineWorker, SqliteCacheStorage, WorkerConfig};

pub fn dashboard(args: DashboardArgs) -> Result<()> {
    let config = ClientConfig::from_env(args.base_url)?;
    let mut session = SessionStore::persistent(kvpath::SESSION_STORE.as_path())?;
    let token = session.load()?;
    if token.is_none() {
        log::warn!("No session token stored; requests are sent without credentials");
    }

    let storage = Arc::new(SqliteCacheStorage::open(kvpath::OFFLINE_CACHE.as_path())?);
    let network = HttpNetwork::new(&config.base_url, config.request_timeout);
    let worker_config = WorkerConfig::new(config.base_url.clone(), config.cache_version.clone());
    let mut worker = OfflineWorker::new(worker_config, storage, network)?;

    if !worker.is_installed()? {
        let report = worker.install(token.as_ref());
        if !report.failed.is_empty() {
            log::warn!("{} shell asset(s) are not available offline", report.failed.len());
        }
    }
    let activation = worker.activate()?;
    if !activation.purged.is_empty() {
        log::info!("Purged {} stale cache partition(s)", activation.purged.len());
    }

    let mut controller = DashboardController::new();
    loop {
        match poll_once(&worker, &mut controller, token.as_ref())? {
            PollOutcome::Unauthorized => {
                let route = session.clear()?;
                bail!("Access token rejected by {}; sign in again at {route}", config.base_url);
            }
            PollOutcome::Offline => log::warn!("Gateway unreachable, showing last known values"),
            PollOutcome::Updated => log::debug!("Dashboard updated"),
        }
        println!("{}", controller.render());

        if args.once {
            return Ok(());
        }
        thread::sleep(config.poll_interval);
    }
}
