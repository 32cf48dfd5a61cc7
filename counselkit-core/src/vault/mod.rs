//! Encrypted record vault.
//!
//! The vault persists a map of string-keyed records to a single file whose
//! entire contents are one authenticated blob. Layers, leaf first:
//!
//! 1. [`kdf`]: turns the deployment passphrase into the 256-bit vault key.
//! 2. [`crypto`]: seals/opens byte payloads under that key
//!    (ChaCha20-Poly1305, `nonce || tag || ciphertext`).
//! 3. the [`RecordStore`] handle: every mutation is a full
//!    read-decrypt-mutate-encrypt-write cycle over the snapshot file.

pub mod crypto;
mod error;
mod file;
pub mod kdf;
mod store;

pub use error::{VaultError, VaultResult};
pub use kdf::{KdfParams, VaultKey};
pub use store::{RecordStore, VaultRecord};

/// Minimum passphrase length in characters. A security floor, not a
/// usability suggestion.
pub const MIN_PASSPHRASE_CHARS: usize = 16;

/// Maximum record identifier length in characters.
pub const MAX_ID_CHARS: usize = 255;

/// Maximum serialized size of a single record value, in bytes (10 MiB).
pub const MAX_RECORD_VALUE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum decrypted snapshot size, in bytes (100 MiB). Bounds memory use
/// and rejects hostile blobs before they are parsed.
pub const MAX_SNAPSHOT_BYTES: usize = 100 * 1024 * 1024;
