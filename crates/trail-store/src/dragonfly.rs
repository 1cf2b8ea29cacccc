//! `Dragonfly` (Redis-compatible) key-value operations.
//!
//! The progress engine stores every entity as one string blob under a fixed
//! key (see [`crate::keys`]), so this adapter only needs plain `GET`, `SET`
//! and `DEL`.

use fred::prelude::*;

use crate::error::StoreError;

/// Blob adapter over a shared `fred` client.
///
/// Cloning shares the connection.
#[derive(Clone)]
pub struct DragonflyStore {
    client: Client,
}

impl DragonflyStore {
    /// Open a client for `url` (`redis://host:port[/db]`) and wait until it
    /// is ready.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed.
    /// Returns [`StoreError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client_config = Config::from_url(url)
            .map_err(|e| StoreError::Config(format!("bad progress store URL: {e}")))?;
        let client = Builder::from_config(client_config).build()?;
        client.init().await?;

        tracing::info!("progress store connected");
        Ok(Self { client })
    }

    /// Read the raw string stored at `key`.
    ///
    /// Returns `None` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the read fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.client.get::<Option<String>, _>(key).await?)
    }

    /// Store `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the write fails.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _: () = self.client.set(key, value, None, None, false).await?;
        Ok(())
    }

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the delete fails.
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _removed: u32 = self.client.del(key).await?;
        Ok(())
    }

    /// Drop every key in the selected database. Test setup only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), StoreError> {
        self.client.flushall::<()>(false).await?;
        Ok(())
    }
}
