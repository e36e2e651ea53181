//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use lexi_core::store::SessionStore;
use lexi_story::application::StoryEngine;
use tokio::sync::OwnedMutexGuard;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The story engine.
    pub engine: Arc<StoryEngine>,
    /// Store the engine writes to, for read-side queries.
    pub store: Arc<dyn SessionStore>,
    /// Serializes transitions per owner.
    pub locks: Arc<OwnerLocks>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(engine: Arc<StoryEngine>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            engine,
            store,
            locks: Arc::new(OwnerLocks::default()),
        }
    }
}

type OwnerMutex = Arc<tokio::sync::Mutex<()>>;

/// One async mutex per owner, created on first use and dropped when the
/// last holder or waiter lets go.
///
/// Holding the guard returned by [`OwnerLocks::lock`] keeps other requests
/// for the same owner waiting. Different owners never contend.
#[derive(Debug, Default)]
pub struct OwnerLocks {
    locks: Mutex<HashMap<i64, OwnerMutex>>,
}

impl OwnerLocks {
    /// Waits for exclusive access to `owner_id`.
    pub async fn lock(self: &Arc<Self>, owner_id: i64) -> OwnerGuard {
        let lock = Arc::clone(self.entries().entry(owner_id).or_default());
        OwnerGuard {
            guard: Some(lock.lock_owned().await),
            owner_id,
            locks: Arc::clone(self),
        }
    }

    /// Number of owners with a live lock.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` if no owner holds a lock.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<i64, OwnerMutex>> {
        self.locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Drops the entry of `owner_id` unless another request holds or waits
    /// on it. Clones are only taken under the map lock, so the count is exact.
    fn release(&self, owner_id: i64) {
        let mut entries = self.entries();
        if entries
            .get(&owner_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            entries.remove(&owner_id);
        }
    }
}

/// Exclusive access to one owner. Releases on drop.
#[derive(Debug)]
pub struct OwnerGuard {
    guard: Option<OwnedMutexGuard<()>>,
    owner_id: i64,
    locks: Arc<OwnerLocks>,
}

impl Drop for OwnerGuard {
    fn drop(&mut self) {
        // The mutex guard holds a clone of the entry; release it first.
        drop(self.guard.take());
        self.locks.release(self.owner_id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_owner_waits_for_release() {
        // Arrange
        let locks = Arc::new(OwnerLocks::default());
        let guard = locks.lock(1).await;

        // Act
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let finished_while_held = contender.is_finished();
        drop(guard);

        // Assert
        assert!(!finished_while_held);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_owners_do_not_contend() {
        let locks = Arc::new(OwnerLocks::default());
        let _first = locks.lock(1).await;

        let second = tokio::time::timeout(Duration::from_millis(100), locks.lock(2)).await;

        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_released_locks_are_pruned() {
        let locks = Arc::new(OwnerLocks::default());
        drop(locks.lock(1).await);
        drop(locks.lock(2).await);

        let _guard = locks.lock(3).await;

        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn test_entry_survives_release_while_another_request_waits() {
        // Arrange
        let locks = Arc::new(OwnerLocks::default());
        let guard = locks.lock(1).await;
        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(1).await;
                locks.len()
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Act
        drop(guard);
        let len_while_waiter_held = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        // Assert
        assert_eq!(len_while_waiter_held, 1);
        assert!(locks.is_empty());
    }
}
