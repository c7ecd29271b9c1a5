//! Artifact manifest: SHA-256 digests binding the model directory contents.
//!
//! `manifest.json` lists every artifact file with its digest. When present,
//! each listed file must hash to its recorded value before anything is
//! deserialized. The bytes that are hashed are the bytes that get parsed.
//! Missing manifests are tolerated unless the caller requires one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ArtifactError;

/// File name of the manifest inside a model directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Only manifest format understood by this build.
pub const MANIFEST_VERSION: u32 = 1;

/// Allowed clock skew for `created_at` in the future (seconds).
const MAX_FUTURE_SKEW_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<i64>,
    /// File name (relative to the model directory) -> lowercase SHA-256 hex
    pub files: BTreeMap<String, String>,
}

impl ArtifactManifest {
    /// Hash `files` inside `dir` into a new manifest.
    ///
    /// # Errors
    /// Returns error if any file cannot be read.
    pub fn for_files(dir: &Path, files: &[&str]) -> Result<Self, ArtifactError> {
        let mut map = BTreeMap::new();
        for rel in files {
            check_entry_name(rel)?;
            let path = dir.join(rel);
            let bytes = fs::read(&path).map_err(|source| ArtifactError::Io {
                path: path.clone(),
                source,
            })?;
            map.insert((*rel).to_string(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            created_at: Some(chrono::Utc::now().timestamp()),
            files: map,
        })
    }

    /// Read `manifest.json` from `dir`, if one exists.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(dir: &Path) -> Result<Option<Self>, ArtifactError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest = serde_json::from_slice(&bytes)
            .map_err(|source| ArtifactError::Parse { path, source })?;
        Ok(Some(manifest))
    }

    /// Whether the manifest lists `file`.
    #[must_use]
    pub fn binds(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }

    /// Check the manifest header and every listed digest.
    ///
    /// `artifacts` are the already-read `(file name, contents)` pairs the
    /// caller is about to parse; each must be bound and is hashed as given.
    /// Other listed files are read from `dir`.
    ///
    /// # Errors
    /// Returns error on unsupported version, a future timestamp, an entry
    /// naming a path outside `dir`, an artifact that is not bound, or any
    /// digest mismatch.
    pub fn verify(&self, dir: &Path, artifacts: &[(&str, &[u8])]) -> Result<(), ArtifactError> {
        if self.version != MANIFEST_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                what: MANIFEST_FILE,
                version: self.version,
            });
        }

        if let Some(created_at) = self.created_at {
            if created_at > chrono::Utc::now().timestamp() + MAX_FUTURE_SKEW_SECS {
                return Err(ArtifactError::Manifest(
                    "manifest created_at is in the future".into(),
                ));
            }
        }

        for rel in self.files.keys() {
            check_entry_name(rel)?;
        }

        if let Some((missing, _)) = artifacts.iter().find(|(f, _)| !self.binds(f)) {
            return Err(ArtifactError::Manifest(format!(
                "manifest does not bind required file {missing}"
            )));
        }

        for (rel, expected_hex) in &self.files {
            let digest = match artifacts.iter().find(|(f, _)| *f == rel.as_str()) {
                Some((_, bytes)) => sha256_hex(bytes),
                None => {
                    let path = dir.join(rel);
                    let bytes = fs::read(&path).map_err(|source| ArtifactError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    sha256_hex(&bytes)
                }
            };
            if !constant_time_eq_str(&digest, &expected_hex.to_ascii_lowercase()) {
                return Err(ArtifactError::DigestMismatch { file: rel.clone() });
            }
        }

        tracing::info!("Verified {} artifact digests", self.files.len());
        Ok(())
    }
}

/// Verify already-read artifacts from `dir` against its manifest.
///
/// # Errors
/// Returns error if verification fails, or if no manifest exists and
/// `require_manifest` is set.
pub fn verify_model_dir(
    dir: &Path,
    artifacts: &[(&str, &[u8])],
    require_manifest: bool,
) -> Result<Option<ArtifactManifest>, ArtifactError> {
    match ArtifactManifest::load(dir)? {
        Some(manifest) => {
            manifest.verify(dir, artifacts)?;
            Ok(Some(manifest))
        }
        None if require_manifest => Err(ArtifactError::ManifestRequired(dir.join(MANIFEST_FILE))),
        None => {
            tracing::warn!("No {MANIFEST_FILE} in {:?}; artifact digests not checked", dir);
            Ok(None)
        }
    }
}

/// Manifest entries must be plain relative names inside the model directory.
fn check_entry_name(rel: &str) -> Result<(), ArtifactError> {
    let path = Path::new(rel);
    let plain = !rel.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if plain {
        Ok(())
    } else {
        Err(ArtifactError::Manifest(format!(
            "entry {rel:?} is not a file inside the model directory"
        )))
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
