use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::storage::CacheStorage;
use super::strategy::CacheWrite;

/// Persists cache writes on a background thread so responses never wait on storage.
///
/// Failures are logged and dropped. Dropping the writer drains the queue first.
pub struct CacheWriter {
    sender: Option<flume::Sender<CacheWrite>>,
    handle: Option<JoinHandle<()>>,
}

impl CacheWriter {
    pub fn spawn<S: CacheStorage + 'static>(
        storage: Arc<S>,
        partition: String,
    ) -> io::Result<Self> {
        let (sender, receiver) = flume::unbounded::<CacheWrite>();
        let handle = thread::Builder::new()
            .name("cache-writer".into())
            .spawn(move || {
                for write in receiver.iter() {
                    if let Err(e) = storage.put(&partition, &write.key, &write.response) {
                        log::warn!("Could not cache {}: {e}", write.key);
                    } else {
                        log::trace!("Cached {}", write.key);
                    }
                }
            })?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    pub fn submit(&self, write: CacheWrite) {
        if let Some(sender) = &self.sender {
            if sender.send(write).is_err() {
                log::warn!("Cache writer has stopped; dropping write");
            }
        }
    }
}

impl Drop for CacheWriter {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Cache writer thread panicked");
            }
        }
    }
}
