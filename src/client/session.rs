use std::path::Path;

use kvstore::{KVDb, KVStoreError};
use thiserror::Error;

use crate::auth::AccessToken;
use crate::routes;

const PARTITION: &str = "session";
const TOKEN_KEY: &str = "pwa_access_token";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    KVStore(#[from] KVStoreError),
    #[error("stored session token is empty")]
    EmptyToken,
}

/// Where a session credential lives and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    /// Forgotten when the process exits, like browser session storage
    Tab,
    /// Kept on disk until logout
    Persistent,
}

enum Backend {
    Memory(Option<AccessToken>),
    Disk(KVDb),
}

/// The single place a client keeps its access token
pub struct SessionStore {
    backend: Backend,
}

impl SessionStore {
    pub fn tab() -> Self {
        Self {
            backend: Backend::Memory(None),
        }
    }

    pub fn persistent(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        Ok(Self {
            backend: Backend::Disk(KVDb::new(path)?),
        })
    }

    pub fn scope(&self) -> SessionScope {
        match self.backend {
            Backend::Memory(_) => SessionScope::Tab,
            Backend::Disk(_) => SessionScope::Persistent,
        }
    }

    pub fn load(&self) -> Result<Option<AccessToken>, SessionError> {
        match &self.backend {
            Backend::Memory(token) => Ok(token.clone()),
            Backend::Disk(db) => db
                .get::<String>(PARTITION, TOKEN_KEY)?
                .map(|raw| AccessToken::new(raw).ok_or(SessionError::EmptyToken))
                .transpose(),
        }
    }

    pub fn save(&mut self, token: &AccessToken) -> Result<(), SessionError> {
        match &mut self.backend {
            Backend::Memory(slot) => *slot = Some(token.clone()),
            Backend::Disk(db) => db.set(PARTITION, TOKEN_KEY, token)?,
        }
        Ok(())
    }

    /// Forget the credential and return the route the user must go back to.
    pub fn clear(&mut self) -> Result<&'static str, SessionError> {
        match &mut self.backend {
            Backend::Memory(slot) => *slot = None,
            Backend::Disk(db) => {
                db.delete(PARTITION, TOKEN_KEY)?;
            }
        }
        Ok(routes::AUTH_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_scope_is_in_memory() {
        let mut store = SessionStore::tab();
        assert_eq!(store.scope(), SessionScope::Tab);
        assert!(store.load().unwrap().is_none());

        let token = AccessToken::new("s3cr3t").unwrap();
        store.save(&token).unwrap();
        assert_eq!(store.load().unwrap(), Some(token));

        assert_eq!(store.clear().unwrap(), "/auth.html");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn persistent_scope_outlives_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kvs-db").join("session.db");
        let token = AccessToken::new("s3cr3t").unwrap();

        {
            let mut store = SessionStore::persistent(&path).unwrap();
            assert_eq!(store.scope(), SessionScope::Persistent);
            store.save(&token).unwrap();
        }

        let mut store = SessionStore::persistent(&path).unwrap();
        assert_eq!(store.load().unwrap(), Some(token));
        store.clear().unwrap();
        assert!(SessionStore::persistent(&path).unwrap().load().unwrap().is_none());
    }
}
