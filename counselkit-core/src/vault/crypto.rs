//! Authenticated codec for vault snapshots.
//!
//! ChaCha20-Poly1305 AEAD with a 96-bit nonce and 128-bit tag. A sealed
//! blob is self-contained: `nonce (12) || tag (16) || ciphertext`.
//!
//! Nonce reuse under the same key is a correctness violation and must
//! never happen: every [`seal`] sources a fresh nonce from the operating
//! system CSPRNG, never from a counter that could reset across restarts.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use super::{error::VaultError, kdf::VaultKey, VaultResult};

/// Size of the ChaCha20-Poly1305 nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of the Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Fixed per-blob overhead: nonce plus tag.
pub const BLOB_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Encrypts a payload into a self-contained authenticated blob.
///
/// # Errors
///
/// Returns [`VaultError::Crypto`] if encryption fails (should not happen
/// with valid inputs).
pub fn seal(key: &VaultKey, plaintext: &[u8]) -> VaultResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    // The aead API returns ciphertext || tag; the blob layout puts the tag
    // up front, next to the nonce.
    let mut ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| VaultError::Crypto("ChaCha20-Poly1305 encryption failed".to_owned()))?;
    let tag = ciphertext.split_off(ciphertext.len() - TAG_SIZE);

    let mut blob = Vec::with_capacity(BLOB_OVERHEAD + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&tag);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypts an authenticated blob, verifying the tag before returning any
/// plaintext.
///
/// # Errors
///
/// Returns [`VaultError::Crypto`] if the blob is truncated or the tag does
/// not verify against the key and the exact nonce/ciphertext pair. Callers
/// never receive partially-decrypted or unauthenticated data.
pub fn open(key: &VaultKey, blob: &[u8]) -> VaultResult<Vec<u8>> {
    if blob.len() < BLOB_OVERHEAD {
        return Err(VaultError::Crypto(format!(
            "blob truncated: {} bytes, need at least {BLOB_OVERHEAD}",
            blob.len()
        )));
    }

    let (nonce, rest) = blob.split_at(NONCE_SIZE);
    let (tag, ciphertext) = rest.split_at(TAG_SIZE);

    let mut joined = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
    joined.extend_from_slice(ciphertext);
    joined.extend_from_slice(tag);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce), joined.as_slice())
        .map_err(|_| VaultError::Crypto("authentication tag mismatch".to_owned()))
}
