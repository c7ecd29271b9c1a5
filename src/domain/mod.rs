//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O. The model and scaler are reached only through
//! the traits in `ports`.

mod diagnosis;
mod layout;
mod patient;

pub use diagnosis::{
    Prediction, RiskLevel, RiskProportion, RiskReport, TopFactor, HIGH_THRESHOLD,
    MODERATE_THRESHOLD, TOP_FACTOR_LABELS,
};
pub use layout::{
    FeatureLayout, FeatureVector, FillerConfig, ScaledVector, MODEL_ARITY, TRAINED_FEATURE_NAMES,
};
pub use patient::{FieldKind, FieldSpec, PatientSubmission, SUBMISSION_FIELDS};
