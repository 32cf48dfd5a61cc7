//! Error types for vault operations.

use thiserror::Error;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors raised by the record vault.
///
/// An absent backing file is not an error anywhere in the vault: it reads
/// as an empty store.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Malformed id, value, or passphrase. The caller can recover by
    /// correcting the input; storage is never touched.
    #[error("invalid {parameter}: {reason}")]
    Validation {
        /// Name of the rejected parameter.
        parameter: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Authentication-tag failure, wrong passphrase, or a corrupted or
    /// oversized blob. Never downgraded to an empty store.
    #[error("crypto failure: {0}")]
    Crypto(String),

    /// Snapshot encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Filesystem failure other than "file absent".
    #[error("I/O error during {context}: {source}")]
    Io {
        /// The operation that failed.
        context: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl VaultError {
    /// Creates an I/O error with context.
    pub(crate) fn io<C: Into<String>>(context: C, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a validation error.
    pub(crate) fn validation<R: Into<String>>(parameter: &'static str, reason: R) -> Self {
        Self::Validation {
            parameter,
            reason: reason.into(),
        }
    }
}
