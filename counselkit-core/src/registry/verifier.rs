//! Signature verification capability.
//!
//! The gate does not reimplement signature verification; it is injected as
//! a capability so the concrete mechanism is swappable and independently
//! testable with a fake verifier.

use ed25519_dalek::{Signature, VerifyingKey};

use super::error::{RegistryError, RegistryResult};

/// Verifies a detached signature over a document.
pub trait SignatureVerifier: Send + Sync {
    /// Returns whether `signature` verifies over `document` under
    /// `public_key`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SignatureInvalid`] when the key or
    /// signature material itself is malformed. A well-formed signature
    /// that simply does not verify is `Ok(false)`, not an error.
    fn verify(&self, document: &[u8], signature: &[u8], public_key: &[u8])
        -> RegistryResult<bool>;
}

/// Ed25519 verification over raw or hex-encoded key material.
///
/// Accepts 32-byte public keys and 64-byte detached signatures, either as
/// raw bytes or as hex text (surrounding whitespace tolerated).
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(
        &self,
        document: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> RegistryResult<bool> {
        let key_bytes: [u8; 32] = decode_material(public_key, "public key")?;
        let sig_bytes: [u8; 64] = decode_material(signature, "signature")?;

        let key = VerifyingKey::from_bytes(&key_bytes).map_err(|err| {
            RegistryError::SignatureInvalid {
                reason: format!("malformed public key: {err}"),
            }
        })?;
        let signature = Signature::from_bytes(&sig_bytes);

        Ok(key.verify_strict(document, &signature).is_ok())
    }
}

/// Decodes key material that may be raw bytes or hex text.
fn decode_material<const N: usize>(bytes: &[u8], what: &str) -> RegistryResult<[u8; N]> {
    let malformed = || RegistryError::SignatureInvalid {
        reason: format!("{what} must be {N} raw bytes or {} hex characters", N * 2),
    };

    let decoded = if bytes.len() == N {
        bytes.to_vec()
    } else {
        let text = std::str::from_utf8(bytes).map_err(|_| malformed())?;
        hex::decode(text.trim()).map_err(|_| malformed())?
    };
    decoded.try_into().map_err(|_| malformed())
}
