//! Error types for the progress engine.

use trail_store::StoreError;

/// Errors produced by progress mutations.
///
/// Read-only queries never return these: they fall back to defaults and
/// log a warning instead.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// The persisted store failed or timed out.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An XP amount outside the accepted range was supplied.
    #[error("invalid XP amount {amount}: {reason}")]
    InvalidAmount {
        /// The rejected amount.
        amount: i64,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A checked arithmetic operation overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of the operation that overflowed.
        context: String,
    },

    /// The configured level table breaks an ordering rule.
    #[error("invalid level table: {0}")]
    InvalidLevelTable(String),
}

impl ProgressError {
    /// Whether retrying the same call may succeed.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Store(e) => e.is_transient(),
            Self::InvalidAmount { .. }
            | Self::ArithmeticOverflow { .. }
            | Self::InvalidLevelTable(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_are_transient() {
        let err = ProgressError::from(StoreError::Unavailable("down".to_owned()));
        assert!(err.is_transient());
        assert!(err.to_string().contains("down"));
    }

    #[test]
    fn validation_failures_are_not_transient() {
        let err = ProgressError::InvalidAmount {
            amount: -5,
            reason: "XP amounts must be positive",
        };
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "invalid XP amount -5: XP amounts must be positive"
        );
    }
}
