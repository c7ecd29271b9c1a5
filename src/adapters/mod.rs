//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the integration with the exported artifacts:
//! - `forest`: random-forest classifier loaded from `forest.json`
//! - `scaler`: standard scaler loaded from `scaler.json`
//! - `manifest`: SHA-256 manifest binding the model directory
//! - `sanitize`: patient-data filtering for logs

pub mod forest;
pub mod manifest;
pub mod sanitize;
pub mod scaler;

use std::path::{Path, PathBuf};

use crate::domain::TRAINED_FEATURE_NAMES;

pub use forest::{RandomForest, FOREST_FILE};
pub use manifest::{ArtifactManifest, MANIFEST_FILE};
pub use scaler::{StandardScaler, SCALER_FILE};

/// Errors raised while loading or checking model artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0:?}")]
    Missing(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported {what} version: {version}")]
    UnsupportedVersion { what: &'static str, version: u32 },

    #[error("Invalid artifact shape: {0}")]
    Shape(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Manifest required but not found at {0:?}")]
    ManifestRequired(PathBuf),

    #[error("File hash mismatch for {file}")]
    DigestMismatch { file: String },
}

/// Read one artifact file into memory.
///
/// # Errors
/// Returns `Missing` if the file does not exist, `Io` if it cannot be read.
pub fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Deserialize JSON artifact bytes; `path` is only used in errors.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    path: &Path,
    bytes: &[u8],
) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}


/// Check that an artifact was fit on the trained feature order.
pub(crate) fn check_feature_names(what: &str, names: &[String]) -> Result<(), ArtifactError> {
    if names.len() != TRAINED_FEATURE_NAMES.len() {
        return Err(ArtifactError::Shape(format!(
            "{what}: expected {} features, got {}",
            TRAINED_FEATURE_NAMES.len(),
            names.len()
        )));
    }
    if let Some((i, (got, want))) = names
        .iter()
        .zip(TRAINED_FEATURE_NAMES.iter())
        .enumerate()
        .find(|(_, (got, want))| got.as_str() != **want)
    {
        return Err(ArtifactError::Shape(format!(
            "{what}: feature {i} is {got:?}, expected {want:?}"
        )));
    }
    Ok(())
}

/// Verify and load both artifacts from `model_dir`.
///
/// # Errors
/// Returns error if the manifest check fails or either artifact is missing,
/// malformed, or fit on a different feature layout.
pub fn load_artifacts(
    model_dir: &Path,
    require_manifest: bool,
) -> Result<(RandomForest, StandardScaler), ArtifactError> {
    if !model_dir.is_dir() {
        return Err(ArtifactError::Missing(model_dir.to_path_buf()));
    }

    let forest_path = model_dir.join(FOREST_FILE);
    let scaler_path = model_dir.join(SCALER_FILE);
    let forest_bytes = read_artifact(&forest_path)?;
    let scaler_bytes = read_artifact(&scaler_path)?;

    manifest::verify_model_dir(
        model_dir,
        &[
            (FOREST_FILE, forest_bytes.as_slice()),
            (SCALER_FILE, scaler_bytes.as_slice()),
        ],
        require_manifest,
    )?;

    let forest = RandomForest::from_json(&forest_path, &forest_bytes)?;
    let scaler = StandardScaler::from_json(&scaler_path, &scaler_bytes)?;

    tracing::info!(
        "Loaded artifacts from {:?} (trees={}, features={})",
        model_dir,
        forest.tree_count(),
        TRAINED_FEATURE_NAMES.len()
    );
    Ok((forest, scaler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_artifacts_load() {
        let (forest, scaler) = load_artifacts(Path::new("models"), false).expect("load models/");
        // Demo export, not the production model.
        assert_eq!(forest.tree_count(), 3);
        assert_eq!(scaler.mean().len(), TRAINED_FEATURE_NAMES.len());
    }

    #[test]
    fn test_shipped_artifacts_match_manifest() {
        assert!(load_artifacts(Path::new("models"), true).is_ok());
    }

    #[test]
    fn test_required_manifest_missing_is_fatal() {
        let temp = tempfile::tempdir().expect("tempdir");
        for file in [FOREST_FILE, SCALER_FILE] {
            std::fs::copy(Path::new("models").join(file), temp.path().join(file)).expect("copy");
        }
        assert!(load_artifacts(temp.path(), false).is_ok());
        assert!(matches!(
            load_artifacts(temp.path(), true),
            Err(ArtifactError::ManifestRequired(_))
        ));
    }

    #[test]
    fn test_missing_model_dir_is_fatal() {
        let err = load_artifacts(Path::new("does-not-exist"), false).expect_err("missing");
        assert!(matches!(err, ArtifactError::Missing(_)));
    }

    #[test]
    fn test_feature_name_order_is_checked() {
        let mut names: Vec<String> = TRAINED_FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        assert!(check_feature_names("test", &names).is_ok());
        names.swap(0, 1);
        let err = check_feature_names("test", &names).expect_err("swapped");
        assert!(err.to_string().contains("feature 0"));
        names.pop();
        assert!(check_feature_names("test", &names).is_err());
    }
}
