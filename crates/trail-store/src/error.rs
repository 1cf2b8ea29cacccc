//! Error types for the store layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! [`fred`] and [`serde_json`] errors and adds the timeout and injected
//! failures raised at the adapter boundary.

/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A value could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A store operation did not complete within the I/O timeout.
    #[error("{operation} on {key} timed out after {timeout_ms} ms")]
    Timeout {
        /// Which operation stalled (`get`, `set`, `remove`).
        operation: &'static str,
        /// The key being accessed.
        key: String,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The backend refused the operation (used by the in-memory store's
    /// failure injection).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether retrying the same operation later may succeed.
    ///
    /// Timeouts and backend failures are transient; serialization and
    /// configuration errors are not.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Dragonfly(_) | Self::Timeout { .. } | Self::Unavailable(_)
        )
    }
}
