//! SessionCache - the local mirror of sessions known to the remote service.

use serde_json::Value;
use thiserror::Error;

use super::record::SessionRecord;
use crate::store::{KeyValueStore, StorageError};

/// Store key holding the serialized session list.
pub const DEFAULT_SESSIONS_KEY: &str = "rammerhead_sessionids";

/// Store key holding the default session id.
pub const DEFAULT_DEFAULT_KEY: &str = "rammerhead_default_sessionid";

/// Keys the cache reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub sessions: String,
    pub default_session: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            sessions: DEFAULT_SESSIONS_KEY.to_string(),
            default_session: DEFAULT_DEFAULT_KEY.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CacheError {
    /// The id is not in the local cache. Local and remote state disagree.
    #[error("cannot find {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What the stored default pointer says, before resolving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultSession {
    NoDefault,
    DefaultSet(String),
}

/// Local cache of session records on top of a [`KeyValueStore`].
///
/// The cache is advisory: a record here does not mean the remote service
/// still knows the session. Callers re-validate before use.
pub struct SessionCache<S> {
    store: S,
    keys: StoreKeys,
}

impl<S: KeyValueStore> SessionCache<S> {
    pub fn new(store: S) -> Self {
        Self::with_keys(store, StoreKeys::default())
    }

    pub fn with_keys(store: S, keys: StoreKeys) -> Self {
        Self { store, keys }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// All cached sessions, most recently created first.
    ///
    /// Unreadable or malformed payloads read as an empty list. The cache is
    /// disposable, so corruption is logged and otherwise ignored.
    pub fn list_sessions(&self) -> Vec<SessionRecord> {
        let raw = match self.store.get(&self.keys.sessions) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read session list: {}", e);
                return Vec::new();
            }
        };

        let items = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                log::warn!("Stored session list is not an array, ignoring it");
                return Vec::new();
            }
            Err(e) => {
                log::warn!("Stored session list is not valid JSON: {}", e);
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<SessionRecord>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping malformed session record: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Find a cached session by id.
    pub fn get_session(&self, id: &str) -> Option<SessionRecord> {
        self.list_sessions().into_iter().find(|r| r.id == id)
    }

    /// The raw default pointer. May name a session that no longer exists.
    pub fn default_state(&self) -> DefaultSession {
        match self.store.get(&self.keys.default_session) {
            Ok(Some(id)) if !id.is_empty() => DefaultSession::DefaultSet(id),
            Ok(_) => DefaultSession::NoDefault,
            Err(e) => {
                log::warn!("Failed to read default session: {}", e);
                DefaultSession::NoDefault
            }
        }
    }

    /// Resolve the default pointer against the cached list.
    ///
    /// A pointer to a deleted session resolves to `None`.
    pub fn get_default(&self) -> Option<SessionRecord> {
        match self.default_state() {
            DefaultSession::NoDefault => None,
            DefaultSession::DefaultSet(id) => self.get_session(&id),
        }
    }

    /// Record `id` as the default. The id is not checked against the list.
    pub fn set_default(&self, id: &str) -> Result<(), CacheError> {
        self.store.set(&self.keys.default_session, id)?;
        Ok(())
    }

    /// Cache a freshly issued session id, stamped with the current time.
    pub fn create_local(&self, id: &str) -> Result<SessionRecord, CacheError> {
        self.insert_first(SessionRecord::new(id))
    }

    /// Cache a freshly issued session id with an explicit `createdOn`.
    pub fn create_local_at(&self, id: &str, created_on: &str) -> Result<SessionRecord, CacheError> {
        self.insert_first(SessionRecord::with_created_on(id, created_on))
    }

    /// Apply a confirmed remote edit to the cached record.
    ///
    /// An empty `httpproxy` clears the proxy.
    pub fn edit_local(
        &self,
        id: &str,
        httpproxy: &str,
        enable_shuffling: bool,
    ) -> Result<(), CacheError> {
        let mut records = self.list_sessions();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CacheError::NotFound(id.to_string()))?;

        record.httpproxy = if httpproxy.is_empty() {
            None
        } else {
            Some(httpproxy.to_string())
        };
        record.enable_shuffling = enable_shuffling;

        self.save(&records)
    }

    /// Drop a session from the cache.
    ///
    /// Returns whether a record was removed. The default pointer is left alone.
    pub fn delete_local(&self, id: &str) -> Result<bool, CacheError> {
        let mut records = self.list_sessions();
        let Some(position) = records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };

        records.remove(position);
        self.save(&records)?;
        Ok(true)
    }

    fn insert_first(&self, record: SessionRecord) -> Result<SessionRecord, CacheError> {
        let mut records = self.list_sessions();
        records.retain(|r| r.id != record.id);
        records.insert(0, record.clone());
        self.save(&records)?;
        Ok(record)
    }

    fn save(&self, records: &[SessionRecord]) -> Result<(), CacheError> {
        let json = serde_json::to_string(records).map_err(StorageError::from)?;
        self.store.set(&self.keys.sessions, &json)?;
        Ok(())
    }
}
