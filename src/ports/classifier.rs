//! Classifier port: Trait for the pre-trained risk model.

use crate::domain::{Prediction, ScaledVector};

/// A fitted binary classifier over scaled feature vectors.
///
/// Implementations are loaded once at startup and never mutated, so every
/// method takes `&self`.
pub trait Classifier: Send + Sync {
    /// Binary decision for one sample (0 or 1).
    fn predict(&self, x: &ScaledVector) -> u8;

    /// Class probabilities `[p0, p1]` for one sample.
    fn predict_proba(&self, x: &ScaledVector) -> [f64; 2];

    /// Per-feature importances, aligned with trained feature order.
    fn feature_importances(&self) -> &[f64];

    /// Trained feature names, aligned with [`Classifier::feature_importances`].
    fn feature_names(&self) -> &[String];

    /// Decision and class-1 probability in one call.
    fn classify(&self, x: &ScaledVector) -> Prediction {
        Prediction {
            label: self.predict(x),
            probability: self.predict_proba(x)[1],
        }
    }
}
