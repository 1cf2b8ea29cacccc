//! Typed access to persisted blobs.
//!
//! [`Blobs`] is the adapter boundary between the progress engine and the
//! raw store. Every backend call runs under an I/O timeout, and values are
//! encoded the way earlier releases of the app wrote them: JSON documents
//! for collections and decimal strings for counters.
//!
//! A blob that fails to parse is reported as absent (with a warning), never
//! as an error. A backend failure, on the other hand, is always returned to
//! the caller, who decides whether a default is safe.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::backend::StoreBackend;
use crate::error::StoreError;

/// Default time allowed for a single store operation.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// A store backend plus the encoding rules and I/O timeout for its blobs.
#[derive(Debug, Clone)]
pub struct Blobs {
    backend: StoreBackend,
    io_timeout: Duration,
}

impl Blobs {
    /// Wrap `backend`, giving each operation `io_timeout` to complete.
    pub const fn new(backend: StoreBackend, io_timeout: Duration) -> Self {
        Self {
            backend,
            io_timeout,
        }
    }

    /// The wrapped backend.
    pub const fn backend(&self) -> &StoreBackend {
        &self.backend
    }

    /// The per-operation timeout.
    pub const fn io_timeout(&self) -> Duration {
        self.io_timeout
    }

    // =========================================================================
    // Raw access
    // =========================================================================

    /// Read the raw string at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the backend does not answer in
    /// time, or the backend's own error.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.bounded("get", key, self.backend.get(key)).await
    }

    /// Store the raw string `value` at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the backend does not answer in
    /// time, or the backend's own error.
    pub async fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.bounded("set", key, self.backend.set(key, value)).await
    }

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the backend does not answer in
    /// time, or the backend's own error.
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.bounded("remove", key, self.backend.remove(key)).await
    }

    // =========================================================================
    // JSON documents
    // =========================================================================

    /// Read and decode the JSON document at `key`.
    ///
    /// Returns `None` if the key is absent or its content does not decode.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when the backend read itself fails.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored blob is malformed, treating as absent");
                Ok(None)
            }
        }
    }

    /// Encode `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if encoding fails, or the
    /// backend's error if the write fails.
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json).await
    }

    // =========================================================================
    // Counters
    // =========================================================================

    /// Read the non-negative integer at `key`.
    ///
    /// Accepts a decimal string (`250`), a JSON integer, or a JSON string
    /// holding digits (`"250"`). Returns `None` if the key is absent or the
    /// content is not a non-negative integer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when the backend read itself fails.
    pub async fn read_counter(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };
        let parsed = parse_counter(&raw);
        if parsed.is_none() {
            tracing::warn!(key, raw = %raw, "stored counter is malformed, treating as absent");
        }
        Ok(parsed)
    }

    /// Store `value` at `key` as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the write fails.
    pub async fn write_counter(&self, key: &str, value: u64) -> Result<(), StoreError> {
        self.set_raw(key, &value.to_string()).await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        key: &str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.io_timeout, fut).await {
            Ok(result) => result,
            Err(_elapsed) => {
                let timeout_ms = u64::try_from(self.io_timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(operation, key, timeout_ms, "store operation timed out");
                Err(StoreError::Timeout {
                    operation,
                    key: key.to_owned(),
                    timeout_ms,
                })
            }
        }
    }
}

/// Parse a stored counter: digits, optionally wrapped in JSON quotes.
pub fn parse_counter(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();
    digits.parse::<u64>().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn blobs(store: &MemoryStore) -> Blobs {
        Blobs::new(StoreBackend::Memory(store.clone()), DEFAULT_IO_TIMEOUT)
    }

    #[test]
    fn counters_accept_legacy_encodings() {
        assert_eq!(parse_counter("250"), Some(250));
        assert_eq!(parse_counter(" 250\n"), Some(250));
        assert_eq!(parse_counter("\"250\""), Some(250));
        assert_eq!(parse_counter("-5"), None);
        assert_eq!(parse_counter("NaN"), None);
        assert_eq!(parse_counter(""), None);
    }

    #[tokio::test]
    async fn malformed_json_reads_as_absent() {
        let store = MemoryStore::with_entries([("list", "[1, 2,")]);
        let value: Option<Vec<u32>> = blobs(&store).read_json("list").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn json_roundtrip() {
        let store = MemoryStore::new();
        let b = blobs(&store);
        b.write_json("list", &vec![1_u32, 2, 3]).await.unwrap();
        let value: Option<Vec<u32>> = b.read_json("list").await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
        assert_eq!(store.peek("list").await.as_deref(), Some("[1,2,3]"));
    }

    #[tokio::test]
    async fn counters_are_written_as_decimal_strings() {
        let store = MemoryStore::new();
        blobs(&store).write_counter("xp", 450).await.unwrap();
        assert_eq!(store.peek("xp").await.as_deref(), Some("450"));
    }

    #[tokio::test]
    async fn backend_read_failure_is_not_masked() {
        let store = MemoryStore::new();
        store.fail_reads(true);
        assert!(blobs(&store).read_counter("xp").await.is_err());
    }

    #[tokio::test]
    async fn stalled_backend_times_out() {
        let store = MemoryStore::new();
        store.stall(true);
        let b = Blobs::new(StoreBackend::Memory(store), Duration::from_millis(20));
        let err = b.get_raw("xp").await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout { operation: "get", .. }));
        assert!(err.is_transient());
    }
}
