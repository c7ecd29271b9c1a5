//! Scaler port: Trait for the pre-fit feature standardization.

use crate::domain::{FeatureVector, ScaledVector};

/// Per-feature rescaling learned at training time.
///
/// Must carry the exact parameters the classifier was trained with. A
/// parameter mismatch cannot be detected here and yields meaningless
/// probabilities.
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, x: &FeatureVector) -> ScaledVector;
}
