//! Risk pipeline: Turns one patient submission into a risk report.
//!
//! Steps, in order:
//! 1. Assemble the 22-column feature vector (inputs + fillers)
//! 2. Standardize with the training-time scaler
//! 3. Classify (label + class-1 probability)
//! 4. Categorize into a risk tier
//! 5. Derive the two chart datasets

use std::sync::Arc;

use crate::domain::{
    FeatureLayout, FeatureVector, PatientSubmission, Prediction, RiskLevel, RiskReport,
    ScaledVector, TopFactor, TOP_FACTOR_LABELS,
};
use crate::ports::{Classifier, FeatureScaler};
use crate::HealthAiError;

/// Linear prediction pipeline over a loaded classifier and scaler.
///
/// The classifier and scaler are loaded once at startup and shared read-only;
/// the pipeline keeps no per-request state.
pub struct RiskPipeline<C, S>
where
    C: Classifier,
    S: FeatureScaler,
{
    classifier: Arc<C>,
    scaler: Arc<S>,
    layout: FeatureLayout,
}

impl<C, S> RiskPipeline<C, S>
where
    C: Classifier,
    S: FeatureScaler,
{
    /// Create a pipeline using the trained feature layout.
    pub fn new(classifier: Arc<C>, scaler: Arc<S>) -> Self {
        Self::with_layout(classifier, scaler, FeatureLayout::trained())
    }

    pub fn with_layout(classifier: Arc<C>, scaler: Arc<S>, layout: FeatureLayout) -> Self {
        Self {
            classifier,
            scaler,
            layout,
        }
    }

    /// Place the submission into trained feature order.
    ///
    /// # Errors
    /// Returns `Validation` if any field is outside its declared bound.
    pub fn build_feature_vector(
        &self,
        submission: &PatientSubmission,
    ) -> Result<FeatureVector, HealthAiError> {
        submission
            .validate()
            .map_err(|errors| HealthAiError::Validation(errors.join(", ")))?;
        Ok(self.layout.assemble(submission))
    }

    /// Apply the training-time standardization.
    #[must_use]
    pub fn scale(&self, vector: &FeatureVector) -> ScaledVector {
        self.scaler.transform(vector)
    }

    /// Classify one scaled vector.
    ///
    /// # Errors
    /// Returns `Model` if the classifier yields a label other than 0/1 or a
    /// probability outside [0, 1].
    pub fn predict(&self, scaled: &ScaledVector) -> Result<Prediction, HealthAiError> {
        let prediction = self.classifier.classify(scaled);
        if prediction.label > 1 {
            return Err(HealthAiError::Model(format!(
                "classifier returned label {}",
                prediction.label
            )));
        }
        if !(0.0..=1.0).contains(&prediction.probability) {
            return Err(HealthAiError::Model(format!(
                "classifier returned probability {}",
                prediction.probability
            )));
        }
        Ok(prediction)
    }

    /// Risk tier for a class-1 probability.
    #[must_use]
    pub fn categorize(probability: f64) -> RiskLevel {
        RiskLevel::from_probability(probability)
    }

    /// Five largest importances paired with the fixed display labels.
    ///
    /// # Errors
    /// Returns `Model` if the classifier reports fewer than five importances.
    pub fn top_features(&self) -> Result<Vec<TopFactor>, HealthAiError> {
        rank_top_factors(
            self.classifier.feature_importances(),
            self.classifier.feature_names(),
        )
    }

    /// Run the whole pipeline for one submission.
    ///
    /// # Errors
    /// Returns error if the submission is invalid or the model output is
    /// unusable.
    pub fn generate_report(
        &self,
        submission: &PatientSubmission,
    ) -> Result<RiskReport, HealthAiError> {
        tracing::debug!("Step 1: Building feature vector...");
        let vector = self.build_feature_vector(submission)?;

        tracing::debug!("Step 2: Scaling features...");
        let scaled = self.scale(&vector);

        tracing::debug!("Step 3: Classifying...");
        let prediction = self.predict(&scaled)?;

        tracing::debug!("Step 4: Ranking feature importances...");
        let top_factors = self.top_features()?;

        let report = RiskReport::new(prediction, top_factors);

        if report.has_mislabeled_factors() {
            let pairs: Vec<String> = report
                .top_factors
                .iter()
                .filter(|f| f.is_mislabeled())
                .map(|f| format!("{} <- {}", f.label, f.source_feature))
                .collect();
            tracing::warn!(
                "Top risk factor labels are positional and do not match ranked features: {}",
                pairs.join(", ")
            );
        }

        tracing::info!(
            "Report generated: label={}, probability={:.2}, risk={}",
            report.prediction.label,
            report.prediction.probability,
            report.risk_level
        );

        Ok(report)
    }
}

/// Sort importances descending and pair the top five with
/// [`TOP_FACTOR_LABELS`] by rank.
///
/// # Errors
/// Returns `Model` if fewer than five importances are available or names and
/// importances are misaligned.
pub fn rank_top_factors(
    importances: &[f64],
    names: &[String],
) -> Result<Vec<TopFactor>, HealthAiError> {
    if importances.len() != names.len() {
        return Err(HealthAiError::Model(format!(
            "{} importances for {} feature names",
            importances.len(),
            names.len()
        )));
    }
    if importances.len() < TOP_FACTOR_LABELS.len() {
        return Err(HealthAiError::Model(format!(
            "model reports {} feature importances, need at least {}",
            importances.len(),
            TOP_FACTOR_LABELS.len()
        )));
    }

    let mut order: Vec<usize> = (0..importances.len()).collect();
    order.sort_by(|&a, &b| importances[b].total_cmp(&importances[a]));

    Ok(TOP_FACTOR_LABELS
        .iter()
        .zip(order)
        .map(|(label, idx)| TopFactor {
            label: (*label).to_string(),
            importance: importances[idx],
            source_feature: names[idx].clone(),
        })
        .collect())
}
