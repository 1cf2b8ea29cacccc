//! Backend selection for the persisted key-value store.
//!
//! Uses enum dispatch instead of trait objects because async methods are
//! not dyn-compatible in Rust.

use crate::dragonfly::DragonflyStore;
use crate::error::StoreError;
use crate::memory::MemoryStore;

/// A key-value backend holding opaque string blobs.
#[derive(Clone)]
pub enum StoreBackend {
    /// Durable `Dragonfly`/Redis store.
    Dragonfly(DragonflyStore),
    /// Process-local store (dry runs and tests).
    Memory(MemoryStore),
}

impl StoreBackend {
    /// Connect to `Dragonfly` when a URL is given, otherwise start an empty
    /// in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the `Dragonfly` connection fails.
    pub async fn connect(url: Option<&str>) -> Result<Self, StoreError> {
        match url {
            Some(url) => Ok(Self::Dragonfly(DragonflyStore::connect(url).await?)),
            None => {
                tracing::warn!("no store URL configured, using in-memory store");
                Ok(Self::Memory(MemoryStore::new()))
            }
        }
    }

    /// Read the raw string stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend read fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Dragonfly(store) => store.get(key).await,
            Self::Memory(store) => store.get(key).await,
        }
    }

    /// Store `value` at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend write fails.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Self::Dragonfly(store) => store.set(key, value).await,
            Self::Memory(store) => store.set(key, value).await,
        }
    }

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend delete fails.
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Dragonfly(store) => store.remove(key).await,
            Self::Memory(store) => store.remove(key).await,
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dragonfly(_) => "dragonfly",
            Self::Memory(_) => "memory",
        }
    }
}

impl core::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("StoreBackend").field(&self.name()).finish()
    }
}

impl From<MemoryStore> for StoreBackend {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

impl From<DragonflyStore> for StoreBackend {
    fn from(store: DragonflyStore) -> Self {
        Self::Dragonfly(store)
    }
}
