//! The record store: a map of versioned records behind one encrypted file.
//!
//! Every operation runs a full read-decrypt-mutate-encrypt-write cycle over
//! the snapshot; there is no append-only or delta persistence. That trades
//! O(total store size) per write for the guarantee that the on-disk form is
//! always a single well-formed authenticated blob.
//!
//! # Concurrency
//!
//! A store handle holds no internal lock. Concurrent writers racing on the
//! same backing file can lose updates: the last full-snapshot write wins,
//! with no per-id merging. Production use with concurrent writers needs a
//! per-store mutex or a versioned compare-and-swap around the
//! read-modify-write cycle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::{
    crypto,
    error::VaultError,
    file,
    kdf::{self, KdfParams, VaultKey},
    VaultResult, MAX_ID_CHARS, MAX_RECORD_VALUE_BYTES, MAX_SNAPSHOT_BYTES,
};

/// A single versioned record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Record identifier, unique within a store (1..=255 characters).
    pub id: String,
    /// Unix seconds of the first write. Immutable once set.
    pub created_at: u64,
    /// Unix seconds of the most recent write. Never below `created_at`.
    pub updated_at: u64,
    /// The stored payload.
    pub value: serde_json::Value,
}

/// Handle to an encrypted record store.
///
/// Constructed once at startup and passed by reference to every consumer;
/// the passphrase is consumed during construction and only the derived key
/// is retained.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    key: VaultKey,
}

impl RecordStore {
    /// Opens a store backed by `path`, deriving the vault key with default
    /// parameters. The backing file is not required to exist; it is created
    /// on the first mutation.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Validation`] for a passphrase shorter than the
    /// minimum length.
    pub async fn open(path: impl Into<PathBuf>, passphrase: SecretString) -> VaultResult<Self> {
        Self::open_with_params(path, passphrase, KdfParams::default()).await
    }

    /// Opens a store with explicit key-derivation parameters.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Validation`] for a passphrase shorter than the
    /// minimum length or a zero iteration count.
    pub async fn open_with_params(
        path: impl Into<PathBuf>,
        passphrase: SecretString,
        params: KdfParams,
    ) -> VaultResult<Self> {
        let key = kdf::derive_key(passphrase, params).await?;
        Ok(Self {
            path: path.into(),
            key,
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the record stored under `id`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Crypto`] if the backing file fails
    /// authentication and [`VaultError::Io`] on filesystem failure. An
    /// absent id is `Ok(None)`, not an error.
    pub async fn get(&self, id: &str) -> VaultResult<Option<VaultRecord>> {
        let mut records = self.read_snapshot().await?;
        Ok(records.remove(id))
    }

    /// Returns all records. Order is not contractual.
    ///
    /// A store whose backing file does not exist yet lists as empty.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Crypto`] if the backing file fails
    /// authentication and [`VaultError::Io`] on filesystem failure.
    pub async fn list(&self) -> VaultResult<Vec<VaultRecord>> {
        let records = self.read_snapshot().await?;
        Ok(records.into_values().collect())
    }

    /// Creates or updates the record under `id`.
    ///
    /// `created_at` is preserved when the id already exists; `updated_at`
    /// is refreshed on every write.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Validation`], before touching storage, if
    /// the id is empty or longer than 255 characters, or the value
    /// serializes to more than the per-record ceiling. Propagates
    /// [`VaultError::Crypto`] and [`VaultError::Io`] from the
    /// read-modify-write cycle.
    pub async fn put(&self, id: &str, value: serde_json::Value) -> VaultResult<VaultRecord> {
        validate_id(id)?;
        let serialized_len = serde_json::to_vec(&value)
            .map_err(|err| VaultError::Serialization(err.to_string()))?
            .len();
        if serialized_len > MAX_RECORD_VALUE_BYTES {
            return Err(VaultError::validation(
                "value",
                format!(
                    "serialized size {serialized_len} exceeds the {MAX_RECORD_VALUE_BYTES}-byte ceiling"
                ),
            ));
        }

        let mut records = self.read_snapshot().await?;
        let now = unix_now();
        let created_at = records.get(id).map_or(now, |existing| existing.created_at);
        let record = VaultRecord {
            id: id.to_owned(),
            created_at,
            // Holds updated_at >= created_at even if the clock stepped back
            // between the two writes.
            updated_at: now.max(created_at),
            value,
        };
        records.insert(id.to_owned(), record.clone());
        self.write_snapshot(&records).await?;
        Ok(record)
    }

    /// Removes the record under `id`, reporting whether it existed.
    ///
    /// # Errors
    ///
    /// Propagates [`VaultError::Crypto`] and [`VaultError::Io`] from the
    /// read-modify-write cycle.
    pub async fn delete(&self, id: &str) -> VaultResult<bool> {
        let mut records = self.read_snapshot().await?;
        let existed = records.remove(id).is_some();
        if existed {
            self.write_snapshot(&records).await?;
        }
        Ok(existed)
    }

    /// Reads and decrypts the full snapshot. An absent backing file is an
    /// empty mapping, not an error; an authentication failure is an error,
    /// never an empty mapping.
    async fn read_snapshot(&self) -> VaultResult<BTreeMap<String, VaultRecord>> {
        let Some(blob) = file::read_optional(&self.path).await? else {
            return Ok(BTreeMap::new());
        };
        if blob.len() > MAX_SNAPSHOT_BYTES + crypto::BLOB_OVERHEAD {
            return Err(VaultError::Crypto(format!(
                "snapshot of {} bytes exceeds the {MAX_SNAPSHOT_BYTES}-byte ceiling",
                blob.len()
            )));
        }

        let plaintext = crypto::open(&self.key, &blob)?;
        let document: serde_json::Value = serde_json::from_slice(&plaintext)
            .map_err(|err| VaultError::Serialization(format!("snapshot is not valid JSON: {err}")))?;
        let serde_json::Value::Object(entries) = document else {
            return Err(VaultError::Serialization(
                "snapshot root is not a JSON object".to_owned(),
            ));
        };

        // Decode-with-skip: each record decodes independently, so one
        // corrupted entry cannot make the rest of the store unreadable.
        let mut records = BTreeMap::new();
        for (id, entry) in entries {
            match decode_record(&id, entry) {
                Ok(record) => {
                    records.insert(id, record);
                }
                Err(reason) => {
                    tracing::warn!(id = %id, %reason, "dropping undecodable record entry");
                }
            }
        }
        Ok(records)
    }

    /// Serializes, encrypts, and atomically writes the full snapshot.
    async fn write_snapshot(&self, records: &BTreeMap<String, VaultRecord>) -> VaultResult<()> {
        let plaintext = serde_json::to_vec(records)
            .map_err(|err| VaultError::Serialization(err.to_string()))?;
        let blob = crypto::seal(&self.key, &plaintext)?;
        file::write_atomic(&self.path, &blob).await?;
        tracing::debug!(
            records = records.len(),
            path = %self.path.display(),
            "snapshot written"
        );
        Ok(())
    }
}

/// Validates an entry against the record schema. Returns the decoded
/// record or the reason it was dropped.
fn decode_record(id: &str, entry: serde_json::Value) -> Result<VaultRecord, String> {
    let record: VaultRecord =
        serde_json::from_value(entry).map_err(|err| err.to_string())?;
    if record.id != id {
        return Err(format!("entry id {:?} does not match its key", record.id));
    }
    validate_id(&record.id).map_err(|err| err.to_string())?;
    if record.updated_at < record.created_at {
        return Err("updated_at precedes created_at".to_owned());
    }
    Ok(record)
}

fn validate_id(id: &str) -> VaultResult<()> {
    if id.is_empty() {
        return Err(VaultError::validation("id", "must not be empty"));
    }
    let chars = id.chars().count();
    if chars > MAX_ID_CHARS {
        return Err(VaultError::validation(
            "id",
            format!("{chars} characters exceeds the {MAX_ID_CHARS}-character ceiling"),
        ));
    }
    Ok(())
}

/// Current Unix timestamp in seconds.
fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time before Unix epoch")
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_validation_bounds() {
        assert!(validate_id("a").is_ok());
        assert!(validate_id(&"x".repeat(MAX_ID_CHARS)).is_ok());
        assert!(validate_id("").is_err());
        assert!(validate_id(&"x".repeat(MAX_ID_CHARS + 1)).is_err());
    }

    #[test]
    fn test_decode_record_rejects_mismatched_id() {
        let entry = serde_json::json!({
            "id": "other",
            "created_at": 1,
            "updated_at": 2,
            "value": null,
        });
        assert!(decode_record("case-1", entry).is_err());
    }

    #[test]
    fn test_decode_record_rejects_regressed_update_time() {
        let entry = serde_json::json!({
            "id": "case-1",
            "created_at": 10,
            "updated_at": 5,
            "value": null,
        });
        assert!(decode_record("case-1", entry).is_err());
    }
}
