//! Registry artifact path resolution.

use std::path::{Path, PathBuf};

const REGISTRY_FILENAME: &str = "trusted_models.json";
const SIGNATURE_SUFFIX: &str = "asc";
const HASH_SUFFIX: &str = "sha256";
const KEYS_DIRNAME: &str = "keys";
const PUBLIC_KEY_FILENAME: &str = "current.pub";

/// Paths of the registry artifact set under a deployment root.
///
/// The signature and hash live next to the document as `<document>.asc`
/// and `<document>.sha256`; the public key at a fixed location under
/// `<root>/keys`.
#[derive(Debug, Clone)]
pub struct RegistryPaths {
    document: PathBuf,
    signature: PathBuf,
    hash: PathBuf,
    public_key: PathBuf,
}

impl RegistryPaths {
    /// Resolves the artifact set for the default document name
    /// (`trusted_models.json`) under `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::for_document(root, REGISTRY_FILENAME)
    }

    /// Resolves the artifact set for a custom document file name under
    /// `root`.
    #[must_use]
    pub fn for_document(root: impl AsRef<Path>, document_filename: &str) -> Self {
        let root = root.as_ref();
        Self {
            document: root.join(document_filename),
            signature: root.join(format!("{document_filename}.{SIGNATURE_SUFFIX}")),
            hash: root.join(format!("{document_filename}.{HASH_SUFFIX}")),
            public_key: root.join(KEYS_DIRNAME).join(PUBLIC_KEY_FILENAME),
        }
    }

    /// Path of the registry document.
    #[must_use]
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Path of the detached signature.
    #[must_use]
    pub fn signature(&self) -> &Path {
        &self.signature
    }

    /// Path of the recorded hash file.
    #[must_use]
    pub fn hash(&self) -> &Path {
        &self.hash
    }

    /// Path of the public key file.
    #[must_use]
    pub fn public_key(&self) -> &Path {
        &self.public_key
    }
}

#[cfg(test)]
mod tests {
    use super::RegistryPaths;
    use std::path::PathBuf;

    #[test]
    fn test_default_layout() {
        let root = PathBuf::from("/srv/counselkit");
        let paths = RegistryPaths::new(&root);

        assert_eq!(paths.document(), root.join("trusted_models.json"));
        assert_eq!(paths.signature(), root.join("trusted_models.json.asc"));
        assert_eq!(paths.hash(), root.join("trusted_models.json.sha256"));
        assert_eq!(paths.public_key(), root.join("keys").join("current.pub"));
    }

    #[test]
    fn test_custom_document_name() {
        let paths = RegistryPaths::for_document("/srv/counselkit", "staging_models.json");
        assert_eq!(
            paths.signature(),
            PathBuf::from("/srv/counselkit/staging_models.json.asc")
        );
    }
}
