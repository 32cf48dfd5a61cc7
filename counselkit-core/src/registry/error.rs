//! Error types for registry verification.
//!
//! Each failed check has its own error kind because the remediation
//! differs per kind: re-publish a missing artifact, re-sign a stale one,
//! investigate tampering on a signature or hash failure.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for registry verification.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// The four files that make up the registry artifact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryArtifact {
    /// The registry document itself.
    Document,
    /// The detached signature over the document.
    Signature,
    /// The recorded content hash of the document.
    Hash,
    /// The public key the signature must verify under.
    PublicKey,
}

impl std::fmt::Display for RegistryArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Document => "registry document",
            Self::Signature => "registry signature",
            Self::Hash => "registry SHA-256 digest",
            Self::PublicKey => "registry public key",
        };
        f.write_str(name)
    }
}

/// Errors raised by the registry trust gate.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An artifact in the set does not exist as a readable file.
    #[error("{artifact} is missing at {}", .path.display())]
    MissingArtifact {
        /// Which artifact is missing.
        artifact: RegistryArtifact,
        /// Where it was expected.
        path: PathBuf,
    },

    /// The detached signature does not verify against the document bytes
    /// under the supplied public key.
    #[error("signature verification failed: {reason}")]
    SignatureInvalid {
        /// Why verification failed.
        reason: String,
    },

    /// The recomputed content hash does not match the recorded one.
    #[error("registry hash mismatch: recorded {recorded:?}, computed {computed}")]
    HashMismatch {
        /// First whitespace-delimited token of the hash file.
        recorded: String,
        /// Hex digest computed over the document's exact bytes.
        computed: String,
    },

    /// The signature is cryptographically valid but older than the
    /// staleness ceiling.
    #[error("registry signature is {age_days} days old (max {max_age_days})")]
    StaleSignature {
        /// Age of the signature file in whole days.
        age_days: u64,
        /// The configured ceiling in whole days.
        max_age_days: u64,
    },

    /// Filesystem failure other than "file absent".
    #[error("I/O error during {context}: {source}")]
    Io {
        /// The operation that failed.
        context: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
