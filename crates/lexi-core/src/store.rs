//! Session store abstraction.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::DomainError;
use crate::key::StorageKey;

/// Failures reported by a [`SessionStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    /// A stored document does not decode into the requested record.
    #[error("stored record under {key} is malformed: {message}")]
    Malformed {
        /// Packed key of the record.
        key: String,
        /// Decoder message.
        message: String,
    },

    /// A record could not be encoded for storage.
    #[error("record serialization failed: {0}")]
    Serialization(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::Generation(err.to_string())
    }
}

/// Key-value persistence with optional per-entry TTL.
///
/// Values are opaque JSON documents; callers serialize their own records.
/// Writes are last-writer-wins per key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &StorageKey) -> Result<Option<serde_json::Value>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value. `None` TTL
    /// means the entry never expires.
    async fn set(
        &self,
        key: &StorageKey,
        value: serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &StorageKey) -> Result<(), StoreError>;

    /// Returns `true` if a live value exists under `key`.
    async fn exists(&self, key: &StorageKey) -> Result<bool, StoreError>;
}

/// Loads and deserializes the record under `key`.
///
/// # Errors
///
/// Returns `StoreError` if the store fails or the stored document does not
/// deserialize into `T`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn SessionStore,
    key: &StorageKey,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Malformed {
                key: key.pack(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Serializes `record` and stores it under `key`.
///
/// # Errors
///
/// Returns `StoreError` if serialization or the store write fails.
pub async fn set_json<T: Serialize + Sync>(
    store: &dyn SessionStore,
    key: &StorageKey,
    record: &T,
    ttl: Option<Duration>,
) -> Result<(), StoreError> {
    let value =
        serde_json::to_value(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.set(key, value, ttl).await
}
