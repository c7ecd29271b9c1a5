//! Standard-scaler adapter: Implementation of `FeatureScaler`.
//!
//! Reproduces scikit-learn's `StandardScaler.transform`:
//! `x_scaled = (x - mean) / scale`, where zero-variance features were stored
//! with scale 1.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{check_feature_names, parse_json, ArtifactError};
use crate::domain::{FeatureVector, ScaledVector, MODEL_ARITY};
use crate::ports::FeatureScaler;

/// File name of the scaler artifact inside a model directory.
pub const SCALER_FILE: &str = "scaler.json";

pub const SCALER_FORMAT_VERSION: u32 = 1;

/// Scaler parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedScaler {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: [f64; MODEL_ARITY],
    scale: [f64; MODEL_ARITY],
}

impl StandardScaler {
    /// Parse and validate the contents of `scaler.json` read from `path`.
    ///
    /// # Errors
    /// Returns error if the bytes are unparsable or do not match the trained
    /// feature layout.
    pub fn from_json(path: &Path, bytes: &[u8]) -> Result<Self, ArtifactError> {
        let exported: ExportedScaler = parse_json(path, bytes)?;
        let scaler = Self::from_exported(exported)?;
        tracing::info!("Loaded scaler from {:?}", path);
        Ok(scaler)
    }

    /// # Errors
    /// Returns error on wrong arity or non-finite parameters.
    pub fn from_exported(exported: ExportedScaler) -> Result<Self, ArtifactError> {
        if exported.format_version != SCALER_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                what: SCALER_FILE,
                version: exported.format_version,
            });
        }
        check_feature_names("scaler", &exported.feature_names)?;

        let mean: [f64; MODEL_ARITY] = exported.mean.as_slice().try_into().map_err(|_| {
            ArtifactError::Shape(format!(
                "scaler mean: expected {MODEL_ARITY} values, got {}",
                exported.mean.len()
            ))
        })?;
        let mut scale: [f64; MODEL_ARITY] =
            exported.scale.as_slice().try_into().map_err(|_| {
                ArtifactError::Shape(format!(
                    "scaler scale: expected {MODEL_ARITY} values, got {}",
                    exported.scale.len()
                ))
            })?;

        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(ArtifactError::Shape("scaler has non-finite parameters".into()));
        }
        for s in scale.iter_mut() {
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(Self { mean, scale })
    }

    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    #[must_use]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, x: &FeatureVector) -> ScaledVector {
        let mut out = [0.0; MODEL_ARITY];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = (x.0[i] - self.mean[i]) / self.scale[i];
        }
        ScaledVector(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TRAINED_FEATURE_NAMES;

    fn exported(mean: Vec<f64>, scale: Vec<f64>) -> ExportedScaler {
        ExportedScaler {
            format_version: SCALER_FORMAT_VERSION,
            feature_names: TRAINED_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            mean,
            scale,
        }
    }

    #[test]
    fn test_transform_standardizes() {
        let mut mean = vec![0.0; MODEL_ARITY];
        let mut scale = vec![1.0; MODEL_ARITY];
        mean[0] = 50.0;
        scale[0] = 10.0;
        let scaler = StandardScaler::from_exported(exported(mean, scale)).expect("valid");

        let mut x = [3.0; MODEL_ARITY];
        x[0] = 65.0;
        let y = scaler.transform(&FeatureVector(x));
        assert!((y.0[0] - 1.5).abs() < 1e-12);
        assert!((y.0[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_scale_is_treated_as_one() {
        let mut scale = vec![1.0; MODEL_ARITY];
        scale[5] = 0.0;
        let scaler =
            StandardScaler::from_exported(exported(vec![2.0; MODEL_ARITY], scale)).expect("valid");
        let y = scaler.transform(&FeatureVector([7.0; MODEL_ARITY]));
        assert!((y.0[5] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_wrong_lengths_and_nan() {
        assert!(StandardScaler::from_exported(exported(
            vec![0.0; MODEL_ARITY - 1],
            vec![1.0; MODEL_ARITY]
        ))
        .is_err());

        let mut mean = vec![0.0; MODEL_ARITY];
        mean[3] = f64::NAN;
        assert!(StandardScaler::from_exported(exported(mean, vec![1.0; MODEL_ARITY])).is_err());
    }
}
