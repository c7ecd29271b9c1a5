//! Application layer: Use cases and services.
//!
//! Orchestrates domain logic with the classifier and scaler ports.

mod pipeline;

pub use pipeline::RiskPipeline;
