//! In-memory key-value store.
//!
//! Used when no `Dragonfly` URL is configured (dry runs of the support
//! tool) and by tests. Clones share the same map, so a test can hand one
//! clone to the engine and inspect or sabotage the store through another.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::error::StoreError;

/// Shared state behind every clone of a [`MemoryStore`].
#[derive(Debug, Default)]
struct MemoryInner {
    entries: RwLock<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    refused_keys: RwLock<BTreeSet<String>>,
    stalled: AtomicBool,
}

/// A key-value store held entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            inner: Arc::new(MemoryInner {
                entries: RwLock::new(map),
                ..MemoryInner::default()
            }),
        }
    }

    /// Read the raw string stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] while read failures are injected.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.wait_while_stalled().await;
        if self.inner.fail_reads.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable(format!("read of {key} refused")));
        }
        Ok(self.inner.entries.read().await.get(key).cloned())
    }

    /// Store `value` at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] while write failures are injected.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.wait_while_stalled().await;
        if self.refuses_write(key).await {
            return Err(StoreError::Unavailable(format!("write of {key} refused")));
        }
        self.inner
            .entries
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] while write failures are injected.
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.wait_while_stalled().await;
        if self.refuses_write(key).await {
            return Err(StoreError::Unavailable(format!("delete of {key} refused")));
        }
        self.inner.entries.write().await.remove(key);
        Ok(())
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::Release);
    }

    /// Make every subsequent write and delete fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::Release);
    }

    /// Make writes and deletes of `key` alone fail (or succeed again).
    pub async fn fail_writes_to(&self, key: &str, fail: bool) {
        let mut refused = self.inner.refused_keys.write().await;
        if fail {
            refused.insert(key.to_owned());
        } else {
            refused.remove(key);
        }
    }

    /// Make every subsequent operation hang until the caller gives up.
    pub fn stall(&self, stalled: bool) {
        self.inner.stalled.store(stalled, Ordering::Release);
    }

    /// Copy of every stored entry.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner.entries.read().await.clone()
    }

    /// Raw value at `key`, bypassing failure injection.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.inner.entries.read().await.get(key).cloned()
    }

    async fn refuses_write(&self, key: &str) -> bool {
        self.inner.fail_writes.load(Ordering::Acquire)
            || self.inner.refused_keys.read().await.contains(key)
    }

    async fn wait_while_stalled(&self) {
        if self.inner.stalled.load(Ordering::Acquire) {
            std::future::pending::<()>().await;
        }
    }
}
