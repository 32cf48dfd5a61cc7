//! Trusted-model registry gate.
//!
//! A four-stage verifier (existence, signature, hash, freshness) that
//! must pass before a dependent process is allowed to trust the registry
//! file. The gate runs once at process bootstrap and fails closed: any
//! stage failure is terminal for that startup attempt, with no retry and
//! no degraded mode.
//!
//! The registry artifact set is produced and signed out-of-band; the gate
//! only verifies, never writes.

mod error;
mod gate;
mod paths;
mod verifier;

pub use error::{RegistryArtifact, RegistryError, RegistryResult};
pub use gate::{RegistryGate, DEFAULT_MAX_SIGNATURE_AGE};
pub use paths::RegistryPaths;
pub use verifier::{Ed25519Verifier, SignatureVerifier};
