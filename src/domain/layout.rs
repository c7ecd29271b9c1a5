//! Trained feature layout of the risk model.
//!
//! The classifier was fit on a 22-column record. The form only collects 12 of
//! those columns; the remaining positions are filled with the constants the
//! training pipeline used for them. Those constants live in [`FillerConfig`]
//! and nowhere else.

use serde::{Deserialize, Serialize};

use super::PatientSubmission;

/// Number of features the model was trained on.
pub const MODEL_ARITY: usize = 22;

/// Trained feature names, in trained column order.
pub const TRAINED_FEATURE_NAMES: [&str; MODEL_ARITY] = [
    "age",
    "bmi",
    "blood_pressure",
    "cholesterol",
    "glucose",
    "heart_rate",
    "sleep_hours",
    "exercise_hours",
    "water_intake",
    "stress_level",
    "smoking",
    "alcohol",
    "diet",
    "mental_health",
    "physical_activity",
    "medical_history",
    "allergies",
    "diet_type_vegan",
    "diet_type_vegetarian",
    "blood_group_ab",
    "blood_group_b",
    "blood_group_o",
];

/// Raw model input: one value per trained feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; MODEL_ARITY]);

/// Model input after standardization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaledVector(pub [f64; MODEL_ARITY]);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl ScaledVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Values for the trained columns the form does not collect.
///
/// These reproduce training-time defaults. They are not derived from the
/// patient and cannot be reconstructed from the submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillerConfig {
    pub cholesterol: f64,
    pub diet: f64,
    pub mental_health: f64,
    pub physical_activity: f64,
    pub allergies: f64,
    /// One-hot category columns (diet type, blood group); always zero.
    pub category_slots: [f64; 5],
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            cholesterol: 0.0,
            diet: 0.0,
            mental_health: 5.0,
            physical_activity: 5.0,
            allergies: 0.0,
            category_slots: [0.0; 5],
        }
    }
}

/// Maps a [`PatientSubmission`] onto the trained column order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub fillers: FillerConfig,
}

impl FeatureLayout {
    /// Layout used when the model was trained.
    #[must_use]
    pub fn trained() -> Self {
        Self::default()
    }

    /// Trained feature names in column order.
    #[must_use]
    pub fn feature_names(&self) -> &'static [&'static str; MODEL_ARITY] {
        &TRAINED_FEATURE_NAMES
    }

    /// Place the submission and fillers into trained column order.
    #[must_use]
    pub fn assemble(&self, s: &PatientSubmission) -> FeatureVector {
        let f = &self.fillers;
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        FeatureVector([
            s.age,
            s.bmi,
            s.blood_pressure,
            f.cholesterol,
            s.glucose,
            s.heart_rate,
            s.sleep_hours,
            s.exercise_hours,
            s.water_intake,
            s.stress_level,
            flag(s.smoking),
            flag(s.alcohol),
            f.diet,
            f.mental_health,
            f.physical_activity,
            flag(s.medical_history),
            f.allergies,
            f.category_slots[0],
            f.category_slots[1],
            f.category_slots[2],
            f.category_slots[3],
            f.category_slots[4],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_sample_matches_trained_order() {
        let v = FeatureLayout::trained().assemble(&PatientSubmission::sample());
        let expected = [
            45.0, 27.0, 130.0, 0.0, 110.0, 75.0, 7.0, 1.0, 2.0, 5.0, 0.0, 0.0, 0.0, 5.0, 5.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        assert_eq!(v.0, expected);
    }

    #[test]
    fn test_selectors_land_in_their_columns() {
        let s = PatientSubmission {
            smoking: true,
            alcohol: true,
            medical_history: true,
            ..PatientSubmission::sample()
        };
        let v = FeatureLayout::trained().assemble(&s);
        let names = FeatureLayout::trained().feature_names();
        for (name, value) in names.iter().zip(v.0.iter()) {
            if matches!(*name, "smoking" | "alcohol" | "medical_history") {
                assert!((value - 1.0).abs() < f64::EPSILON, "{name}");
            }
        }
    }

    #[test]
    fn test_custom_fillers_are_used() {
        let layout = FeatureLayout {
            fillers: FillerConfig {
                cholesterol: 190.0,
                ..FillerConfig::default()
            },
        };
        let v = layout.assemble(&PatientSubmission::sample());
        assert!((v.0[3] - 190.0).abs() < f64::EPSILON);
    }
}
