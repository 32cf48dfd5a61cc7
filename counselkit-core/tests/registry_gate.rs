//! Behavior of the registry trust gate against a real artifact set.

use std::path::Path;
use std::time::Duration;

use counselkit_core::registry::{
    Ed25519Verifier, RegistryArtifact, RegistryError, RegistryGate, RegistryPaths,
    RegistryResult, SignatureVerifier,
};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

const DOCUMENT: &[u8] = br#"{"models": [{"name": "mistral-7b-instruct"}]}"#;

/// Writes a fully consistent artifact set under `root` and returns its
/// paths.
fn write_artifact_set(root: &Path) -> RegistryPaths {
    let paths = RegistryPaths::new(root);
    let signing_key = SigningKey::generate(&mut OsRng);
    let signature = signing_key.sign(DOCUMENT);

    std::fs::write(paths.document(), DOCUMENT).unwrap();
    std::fs::write(paths.signature(), signature.to_bytes()).unwrap();
    std::fs::write(
        paths.hash(),
        format!("{}  trusted_models.json\n", hex::encode(Sha256::digest(DOCUMENT))),
    )
    .unwrap();
    std::fs::create_dir_all(root.join("keys")).unwrap();
    std::fs::write(paths.public_key(), signing_key.verifying_key().to_bytes()).unwrap();

    paths
}

/// A verifier the gate must never reach.
struct UnreachableVerifier;

impl SignatureVerifier for UnreachableVerifier {
    fn verify(&self, _: &[u8], _: &[u8], _: &[u8]) -> RegistryResult<bool> {
        panic!("signature verification ran before the existence stage failed");
    }
}

#[tokio::test]
async fn test_consistent_artifact_set_passes() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifact_set(dir.path());

    RegistryGate::new(paths, Ed25519Verifier).verify().await.unwrap();
}

#[tokio::test]
async fn test_missing_public_key_fails_before_signature_verification() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifact_set(dir.path());
    std::fs::remove_file(paths.public_key()).unwrap();

    let result = RegistryGate::new(paths, UnreachableVerifier).verify().await;
    match result {
        Err(RegistryError::MissingArtifact { artifact, path }) => {
            assert_eq!(artifact, RegistryArtifact::PublicKey);
            assert!(path.ends_with("keys/current.pub"));
        }
        other => panic!("expected MissingArtifact, got {other:?}"),
    }
}

#[tokio::test]
async fn test_each_missing_artifact_is_named() {
    for (remove, expected) in [
        ("trusted_models.json", RegistryArtifact::Document),
        ("trusted_models.json.asc", RegistryArtifact::Signature),
        ("trusted_models.json.sha256", RegistryArtifact::Hash),
    ] {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifact_set(dir.path());
        std::fs::remove_file(dir.path().join(remove)).unwrap();

        let result = RegistryGate::new(paths, Ed25519Verifier).verify().await;
        match result {
            Err(RegistryError::MissingArtifact { artifact, .. }) => {
                assert_eq!(artifact, expected);
            }
            other => panic!("expected MissingArtifact for {remove}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_tampered_document_fails_signature_stage() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifact_set(dir.path());

    let mut tampered = DOCUMENT.to_vec();
    tampered[0] ^= 0xFF;
    std::fs::write(paths.document(), &tampered).unwrap();

    let result = RegistryGate::new(paths, Ed25519Verifier).verify().await;
    assert!(matches!(
        result,
        Err(RegistryError::SignatureInvalid { .. })
    ));
}

#[tokio::test]
async fn test_divergent_recorded_hash_fails_hash_stage() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifact_set(dir.path());

    // Signature still verifies; only the recorded digest diverges.
    let bogus = hex::encode(Sha256::digest(b"something else"));
    std::fs::write(paths.hash(), format!("{bogus}  trusted_models.json\n")).unwrap();

    let result = RegistryGate::new(paths, Ed25519Verifier).verify().await;
    match result {
        Err(RegistryError::HashMismatch { recorded, computed }) => {
            assert_eq!(recorded, bogus);
            assert_eq!(computed, hex::encode(Sha256::digest(DOCUMENT)));
        }
        other => panic!("expected HashMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_hash_file_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifact_set(dir.path());
    std::fs::write(paths.hash(), "\n").unwrap();

    let result = RegistryGate::new(paths, Ed25519Verifier).verify().await;
    assert!(matches!(result, Err(RegistryError::HashMismatch { .. })));
}

#[tokio::test]
async fn test_stale_signature_fails_even_though_it_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifact_set(dir.path());

    // A zero ceiling makes any wall-clock age stale.
    std::thread::sleep(Duration::from_millis(20));
    let gate = RegistryGate::new(paths, Ed25519Verifier)
        .with_max_signature_age(Duration::ZERO);

    let result = gate.verify().await;
    assert!(matches!(result, Err(RegistryError::StaleSignature { .. })));
}

#[tokio::test]
async fn test_generous_ceiling_accepts_a_fresh_signature() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_artifact_set(dir.path());

    RegistryGate::new(paths, Ed25519Verifier)
        .with_max_signature_age(Duration::from_secs(60))
        .verify()
        .await
        .unwrap();
}
