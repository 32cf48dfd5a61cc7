//! File-backed byte primitive for the vault snapshot.
//!
//! Writes are atomic (write-to-temp, fsync, rename): a reader sees either
//! the complete old content or the complete new content, never a partial
//! state.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use super::{error::VaultError, VaultResult};

/// Reads the full contents of `path`, treating an absent file as `None`.
pub(super) async fn read_optional(path: &Path) -> VaultResult<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(VaultError::io(
            format!("reading {}", path.display()),
            err,
        )),
    }
}

/// Atomically replaces `path` with `bytes`, creating parent directories as
/// needed.
pub(super) async fn write_atomic(path: &Path, bytes: &[u8]) -> VaultResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| VaultError::io(format!("creating {}", parent.display()), err))?;
    }

    let tmp = temp_path(path);
    let io_err = |context: &str, err| VaultError::io(format!("{context} {}", tmp.display()), err);

    let mut file = tokio::fs::File::create(&tmp)
        .await
        .map_err(|err| io_err("creating", err))?;
    file.write_all(bytes)
        .await
        .map_err(|err| io_err("writing", err))?;
    file.sync_all()
        .await
        .map_err(|err| io_err("syncing", err))?;
    drop(file);

    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|err| VaultError::io(format!("replacing {}", path.display()), err))
}

/// Appends `.tmp` to the full file name (`vault.bin` -> `vault.bin.tmp`).
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        assert!(read_optional(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.bin");
        write_atomic(&path, b"payload").await.unwrap();
        assert_eq!(read_optional(&path).await.unwrap().unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_replace_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");
        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();
        assert_eq!(read_optional(&path).await.unwrap().unwrap(), b"second");
        assert!(!temp_path(&path).exists());
    }
}
