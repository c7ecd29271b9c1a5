//! Ports layer: Trait definitions for external collaborators.
//!
//! The fitted classifier and scaler are produced by the training pipeline;
//! these traits are the only way the application touches them.

mod classifier;
mod scaler;

pub use classifier::Classifier;
pub use scaler::FeatureScaler;
