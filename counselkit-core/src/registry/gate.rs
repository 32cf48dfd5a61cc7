//! The four-stage registry trust gate.

use std::path::Path;
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};

use super::{
    error::{RegistryArtifact, RegistryError, RegistryResult},
    paths::RegistryPaths,
    verifier::SignatureVerifier,
};

/// Default staleness ceiling for the registry signature: 180 days.
pub const DEFAULT_MAX_SIGNATURE_AGE: Duration = Duration::from_secs(180 * 24 * 60 * 60);

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Fail-closed verifier for the registry artifact set.
///
/// [`verify`](Self::verify) runs four stages in a fixed order, terminal on
/// the first failure:
///
/// 1. existence of all four artifacts (later stages need the files);
/// 2. detached-signature verification via the injected
///    [`SignatureVerifier`];
/// 3. recomputed SHA-256 against the recorded digest, which catches
///    bit-level divergence even if the key were compromised after the
///    fact;
/// 4. signature freshness (the softest check runs last so it cannot mask
///    a harder failure).
///
/// Run once per process lifetime, before any consumer of the registry is
/// activated. A failure is terminal for that startup attempt; there is no
/// retry policy.
#[derive(Debug)]
pub struct RegistryGate<V> {
    paths: RegistryPaths,
    verifier: V,
    max_signature_age: Duration,
}

impl<V: SignatureVerifier> RegistryGate<V> {
    /// Creates a gate over `paths` with the default staleness ceiling.
    #[must_use]
    pub const fn new(paths: RegistryPaths, verifier: V) -> Self {
        Self {
            paths,
            verifier,
            max_signature_age: DEFAULT_MAX_SIGNATURE_AGE,
        }
    }

    /// Replaces the staleness ceiling, forcing periodic re-signing of the
    /// registry even while the signature stays cryptographically valid.
    #[must_use]
    pub const fn with_max_signature_age(mut self, max_age: Duration) -> Self {
        self.max_signature_age = max_age;
        self
    }

    /// Runs all four stages.
    ///
    /// # Errors
    ///
    /// Returns the stage-specific [`RegistryError`] of the first failed
    /// check; the dependent process must treat any of them as fatal.
    pub async fn verify(&self) -> RegistryResult<()> {
        self.check_artifacts_exist().await?;
        let document = self
            .read_artifact(RegistryArtifact::Document, self.paths.document())
            .await?;
        self.check_signature(&document).await?;
        self.check_content_hash(&document).await?;
        self.check_freshness().await
    }

    /// Stage 1: every artifact must exist as a readable file.
    async fn check_artifacts_exist(&self) -> RegistryResult<()> {
        let artifacts = [
            (RegistryArtifact::Document, self.paths.document()),
            (RegistryArtifact::Signature, self.paths.signature()),
            (RegistryArtifact::Hash, self.paths.hash()),
            (RegistryArtifact::PublicKey, self.paths.public_key()),
        ];
        for (artifact, path) in artifacts {
            match tokio::fs::metadata(path).await {
                Ok(_) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    return Err(RegistryError::MissingArtifact {
                        artifact,
                        path: path.to_path_buf(),
                    });
                }
                Err(err) => {
                    return Err(RegistryError::Io {
                        context: format!("checking {artifact}"),
                        source: err,
                    });
                }
            }
        }
        Ok(())
    }

    /// Stage 2: the detached signature must verify under the public key.
    async fn check_signature(&self, document: &[u8]) -> RegistryResult<()> {
        let signature = self
            .read_artifact(RegistryArtifact::Signature, self.paths.signature())
            .await?;
        let public_key = self
            .read_artifact(RegistryArtifact::PublicKey, self.paths.public_key())
            .await?;

        if self.verifier.verify(document, &signature, &public_key)? {
            Ok(())
        } else {
            Err(RegistryError::SignatureInvalid {
                reason: "detached signature does not verify against the registry document"
                    .to_owned(),
            })
        }
    }

    /// Stage 3: recomputed SHA-256 must equal the recorded digest.
    ///
    /// The recorded digest is the first whitespace-delimited token of the
    /// hash file (the `sha256sum` output format). An empty hash file
    /// yields an empty token, which can never match.
    async fn check_content_hash(&self, document: &[u8]) -> RegistryResult<()> {
        let hash_file = self
            .read_artifact(RegistryArtifact::Hash, self.paths.hash())
            .await?;
        let recorded = String::from_utf8_lossy(&hash_file)
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        let computed = hex::encode(Sha256::digest(document));
        if recorded == computed {
            Ok(())
        } else {
            Err(RegistryError::HashMismatch { recorded, computed })
        }
    }

    /// Stage 4: the signature file's mtime must be within the ceiling.
    async fn check_freshness(&self) -> RegistryResult<()> {
        let io_err = |context: &str, err| RegistryError::Io {
            context: context.to_owned(),
            source: err,
        };
        let metadata = tokio::fs::metadata(self.paths.signature())
            .await
            .map_err(|err| io_err("reading signature metadata", err))?;
        let modified = metadata
            .modified()
            .map_err(|err| io_err("reading signature mtime", err))?;

        // An mtime in the future counts as age zero.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        if age > self.max_signature_age {
            return Err(RegistryError::StaleSignature {
                age_days: age.as_secs() / SECONDS_PER_DAY,
                max_age_days: self.max_signature_age.as_secs() / SECONDS_PER_DAY,
            });
        }
        Ok(())
    }

    /// Reads one artifact, mapping an absent file to
    /// [`RegistryError::MissingArtifact`].
    async fn read_artifact(
        &self,
        artifact: RegistryArtifact,
        path: &Path,
    ) -> RegistryResult<Vec<u8>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(RegistryError::MissingArtifact {
                    artifact,
                    path: path.to_path_buf(),
                })
            }
            Err(err) => Err(RegistryError::Io {
                context: format!("reading {artifact}"),
                source: err,
            }),
        }
    }
}
