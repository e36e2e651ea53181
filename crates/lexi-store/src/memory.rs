//! In-memory implementation of the `SessionStore` trait.
//!
//! Expiry is evaluated against the injected `Clock`, so TTL behaviour is
//! deterministic under test. Expired entries are invisible to reads
//! immediately; [`InMemorySessionStore::purge_expired`] reclaims their memory.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;

use lexi_core::clock::Clock;
use lexi_core::key::StorageKey;
use lexi_core::store::{SessionStore, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expiry| now < expiry)
    }
}

/// Process-local key-value store with per-entry TTL.
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore").finish_non_exhaustive()
    }
}

impl InMemorySessionStore {
    /// Creates an empty store that reads time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Removes every expired entry and returns how many were dropped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = self.clock.now();
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(before - entries.len())
    }

    /// Number of stored entries, including expired ones not yet purged.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    /// Returns `true` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Spawns a background task that purges expired entries every `period`.
    /// The task runs until the returned handle is aborted.
    #[must_use]
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match self.purge_expired() {
                    Ok(0) => {}
                    Ok(purged) => debug!(purged, "purged expired session store entries"),
                    Err(e) => {
                        tracing::error!(error = %e, "session store sweeper stopped");
                        return;
                    }
                }
            }
        })
    }

    fn expiry_for(&self, ttl: Option<Duration>) -> Result<Option<DateTime<Utc>>, StoreError> {
        let Some(ttl) = ttl else {
            return Ok(None);
        };
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StoreError::Unavailable(format!("TTL out of range: {e}")))?;
        Ok(Some(self.clock.now() + ttl))
    }
}

#[allow(clippy::needless_pass_by_value)]
fn poisoned<T>(err: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable(format!("session store lock poisoned: {err}"))
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<serde_json::Value>, StoreError> {
        let now = self.clock.now();
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(&key.pack())
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        key: &StorageKey,
        value: serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let expires_at = self.expiry_for(ttl)?;
        self.entries
            .write()
            .map_err(poisoned)?
            .insert(key.pack(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), StoreError> {
        self.entries.write().map_err(poisoned)?.remove(&key.pack());
        Ok(())
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}
