//! Test session stores — failure-injecting `SessionStore` implementations.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lexi_core::key::StorageKey;
use lexi_core::store::{SessionStore, StoreError};

/// A session store that always fails.
#[derive(Debug)]
pub struct FailingSessionStore;

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn get(&self, _key: &StorageKey) -> Result<Option<serde_json::Value>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn set(
        &self,
        _key: &StorageKey,
        _value: serde_json::Value,
        _ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _key: &StorageKey) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn exists(&self, _key: &StorageKey) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// Wraps another store: reads pass through, writes fail. Counts rejected
/// writes. Used to prove a failed commit leaves prior state intact.
pub struct ReadOnlySessionStore {
    inner: Arc<dyn SessionStore>,
    rejected_writes: AtomicUsize,
}

impl ReadOnlySessionStore {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn SessionStore>) -> Self {
        Self {
            inner,
            rejected_writes: AtomicUsize::new(0),
        }
    }

    /// Number of writes refused so far.
    pub fn rejected_writes(&self) -> usize {
        self.rejected_writes.load(Ordering::SeqCst)
    }

    fn reject(&self) -> StoreError {
        self.rejected_writes.fetch_add(1, Ordering::SeqCst);
        StoreError::Unavailable("store is read-only".into())
    }
}

#[async_trait]
impl SessionStore for ReadOnlySessionStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<serde_json::Value>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(
        &self,
        _key: &StorageKey,
        _value: serde_json::Value,
        _ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        Err(self.reject())
    }

    async fn delete(&self, _key: &StorageKey) -> Result<(), StoreError> {
        Err(self.reject())
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool, StoreError> {
        self.inner.exists(key).await
    }
}

/// Wraps another store and refuses only selected operations: every delete,
/// and/or writes into one key namespace. Everything else passes through.
pub struct SelectiveFailureStore {
    inner: Arc<dyn SessionStore>,
    refuse_deletes: bool,
    refused_write_prefix: Option<&'static str>,
}

impl SelectiveFailureStore {
    /// Wrap `inner` with nothing refused yet.
    #[must_use]
    pub fn new(inner: Arc<dyn SessionStore>) -> Self {
        Self {
            inner,
            refuse_deletes: false,
            refused_write_prefix: None,
        }
    }

    /// Refuse every delete.
    #[must_use]
    pub fn refusing_deletes(mut self) -> Self {
        self.refuse_deletes = true;
        self
    }

    /// Refuse writes to keys whose namespace is `prefix`, e.g. `"story_session"`.
    #[must_use]
    pub fn refusing_writes_to(mut self, prefix: &'static str) -> Self {
        self.refused_write_prefix = Some(prefix);
        self
    }
}

#[async_trait]
impl SessionStore for SelectiveFailureStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<serde_json::Value>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(
        &self,
        key: &StorageKey,
        value: serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        if self.refused_write_prefix == Some(key.prefix()) {
            return Err(StoreError::Unavailable(format!("write to {key} refused")));
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), StoreError> {
        if self.refuse_deletes {
            return Err(StoreError::Unavailable(format!("delete of {key} refused")));
        }
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool, StoreError> {
        self.inner.exists(key).await
    }
}
