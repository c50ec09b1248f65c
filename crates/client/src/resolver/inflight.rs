//! Per-serial exclusion for concurrent resolutions.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async lock per key, created on demand and dropped once nobody holds
/// or waits for it.
#[derive(Debug, Default)]
pub(crate) struct InflightLocks {
    locks: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl InflightLocks {
    /// Wait until no other caller holds `key`, then hold it until the guard
    /// is dropped.
    pub(crate) async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, weak| weak.strong_count() > 0);

            match locks.get(key).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(Mutex::new(()));
                    locks.insert(key.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        let locks = self.locks.lock().await;
        locks.values().filter(|w| w.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_waits() {
        let locks = Arc::new(InflightLocks::default());
        let guard = locks.acquire("R1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("R1").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = InflightLocks::default();
        let _a = locks.acquire("R1").await;
        let b = tokio::time::timeout(Duration::from_millis(200), locks.acquire("R2")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_released_locks_are_forgotten() {
        let locks = InflightLocks::default();
        {
            let _a = locks.acquire("R1").await;
            assert_eq!(locks.tracked().await, 1);
        }
        assert_eq!(locks.tracked().await, 0);
    }
}
