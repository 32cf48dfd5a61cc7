//! Passphrase key derivation.
//!
//! PBKDF2-HMAC-SHA256 over a fixed deployment salt turns the vault
//! passphrase into the 256-bit vault key. The derivation is deliberately
//! slow (iteration count is the cost factor) and deterministic: the same
//! passphrase, salt, and iteration count always yield the same key, which
//! is what makes the store re-openable across process restarts.

use pbkdf2::pbkdf2_hmac;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{error::VaultError, VaultResult, MIN_PASSPHRASE_CHARS};

/// Default PBKDF2 iteration count, balancing brute-force resistance
/// against derivation latency.
pub const DEFAULT_ITERATIONS: u32 = 120_000;

/// Default derivation salt. Not secret, but must be stable across runs for
/// a deployment so the same passphrase always yields the same key.
pub const DEFAULT_SALT: &[u8] = b"counselkit:vault-kdf:salt:v1";

/// Vault encryption key (256-bit).
///
/// # Security
///
/// - The key is zeroized on drop to prevent memory leaks.
/// - The key is never logged or serialized in plaintext.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey([u8; 32]);

impl VaultKey {
    /// Creates a vault key from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns a reference to the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Tunable key-derivation parameters.
#[derive(Debug, Clone)]
pub struct KdfParams {
    /// Derivation salt, fixed per deployment.
    pub salt: Vec<u8>,
    /// PBKDF2 iteration count.
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            salt: DEFAULT_SALT.to_vec(),
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Derives the vault key from a passphrase.
///
/// The iterated hash is CPU-bound and runs on the blocking pool so it does
/// not stall other tasks sharing the runtime.
///
/// # Errors
///
/// Returns [`VaultError::Validation`] if the passphrase is shorter than
/// [`MIN_PASSPHRASE_CHARS`] or the iteration count is zero, and
/// [`VaultError::Crypto`] if the blocking task is cancelled.
pub async fn derive_key(passphrase: SecretString, params: KdfParams) -> VaultResult<VaultKey> {
    if passphrase.expose_secret().chars().count() < MIN_PASSPHRASE_CHARS {
        return Err(VaultError::validation(
            "passphrase",
            format!("must be at least {MIN_PASSPHRASE_CHARS} characters"),
        ));
    }
    if params.iterations == 0 {
        return Err(VaultError::validation(
            "iterations",
            "iteration count must be non-zero",
        ));
    }

    tokio::task::spawn_blocking(move || {
        let mut key = [0u8; 32];
        pbkdf2_hmac::<Sha256>(
            passphrase.expose_secret().as_bytes(),
            &params.salt,
            params.iterations,
            &mut key,
        );
        VaultKey(key)
    })
    .await
    .map_err(|err| VaultError::Crypto(format!("key derivation task failed: {err}")))
}
