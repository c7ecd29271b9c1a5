//! # HealthAI
//!
//! Individual health-risk prediction from a short clinical and lifestyle form.
//!
//! This crate provides:
//! - Validated patient submissions mapped onto the trained 22-feature layout
//! - Standard scaling and random-forest inference over exported artifacts
//! - Risk categorization and chart data for a terminal report
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (submission, feature layout, risk report)
//! - `ports`: Trait definitions for the classifier and scaler
//! - `adapters`: Concrete implementations (JSON forest, JSON scaler, manifest)
//! - `application`: The prediction pipeline
//! - `config`: Environment-driven settings
//! - `tui`: Terminal user interface
//!
//! The artifacts shipped under `models/` are a small three-tree demo export
//! with the trained feature layout, not the production model. Point
//! `HEALTHAI_MODEL_PATH` at a full export for real use.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{PatientSubmission, Prediction, RiskLevel, RiskReport};

/// Result type for HealthAI operations
pub type Result<T> = std::result::Result<T, HealthAiError>;

/// Main error type for HealthAI
#[derive(Debug, thiserror::Error)]
pub enum HealthAiError {
    #[error("Model artifacts unavailable: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Model output invalid: {0}")]
    Model(String),
}
