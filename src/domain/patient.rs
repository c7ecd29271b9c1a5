//! Patient submission collected by the input form.
//!
//! Twelve clinical and lifestyle metrics. The model was trained on a wider
//! record, see [`FeatureLayout`](super::FeatureLayout) for how a submission is
//! widened to the trained arity.

use serde::{Deserialize, Serialize};

/// Numeric kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole numbers only
    Integer,
    /// Any value within bounds
    Decimal,
    /// Selector: 0 = no, 1 = yes
    Boolean,
}

/// Declared bound, default and step of one submission field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Whether `value` satisfies this field's bound and kind.
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        if !value.is_finite() || value < self.min || value > self.max {
            return false;
        }
        match self.kind {
            FieldKind::Decimal => true,
            FieldKind::Integer => value.fract() == 0.0,
            FieldKind::Boolean => value == 0.0 || value == 1.0,
        }
    }

    /// Clamp `value` into the field's bounds.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Field specifications in form order (same order as [`PatientSubmission::to_vec`]).
pub const SUBMISSION_FIELDS: [FieldSpec; 12] = [
    FieldSpec {
        name: "age",
        label: "Age",
        unit: "years",
        min: 1.0,
        max: 100.0,
        default: 1.0,
        step: 1.0,
        kind: FieldKind::Integer,
    },
    FieldSpec {
        name: "bmi",
        label: "BMI",
        unit: "kg/m²",
        min: 10.0,
        max: 60.0,
        default: 10.0,
        step: 0.1,
        kind: FieldKind::Decimal,
    },
    FieldSpec {
        name: "blood_pressure",
        label: "Blood Pressure",
        unit: "mmHg",
        min: 70.0,
        max: 220.0,
        default: 70.0,
        step: 1.0,
        kind: FieldKind::Integer,
    },
    FieldSpec {
        name: "glucose",
        label: "Glucose Level",
        unit: "mg/dL",
        min: 60.0,
        max: 350.0,
        default: 60.0,
        step: 1.0,
        kind: FieldKind::Integer,
    },
    FieldSpec {
        name: "heart_rate",
        label: "Heart Rate",
        unit: "bpm",
        min: 40.0,
        max: 160.0,
        default: 40.0,
        step: 1.0,
        kind: FieldKind::Integer,
    },
    FieldSpec {
        name: "sleep_hours",
        label: "Sleep Hours",
        unit: "h",
        min: 0.0,
        max: 12.0,
        default: 7.0,
        step: 0.5,
        kind: FieldKind::Decimal,
    },
    FieldSpec {
        name: "stress_level",
        label: "Stress Level",
        unit: "1-10",
        min: 1.0,
        max: 10.0,
        default: 5.0,
        step: 1.0,
        kind: FieldKind::Integer,
    },
    FieldSpec {
        name: "exercise_hours",
        label: "Exercise Hours",
        unit: "h",
        min: 0.0,
        max: 5.0,
        default: 1.0,
        step: 0.5,
        kind: FieldKind::Decimal,
    },
    FieldSpec {
        name: "water_intake",
        label: "Water Intake",
        unit: "litres",
        min: 0.0,
        max: 6.0,
        default: 2.0,
        step: 0.5,
        kind: FieldKind::Decimal,
    },
    FieldSpec {
        name: "smoking",
        label: "Smoking",
        unit: "0=no, 1=yes",
        min: 0.0,
        max: 1.0,
        default: 0.0,
        step: 1.0,
        kind: FieldKind::Boolean,
    },
    FieldSpec {
        name: "alcohol",
        label: "Alcohol",
        unit: "0=no, 1=yes",
        min: 0.0,
        max: 1.0,
        default: 0.0,
        step: 1.0,
        kind: FieldKind::Boolean,
    },
    FieldSpec {
        name: "medical_history",
        label: "Medical History",
        unit: "0=no, 1=yes",
        min: 0.0,
        max: 1.0,
        default: 0.0,
        step: 1.0,
        kind: FieldKind::Boolean,
    },
];

/// One report request's worth of patient metrics.
///
/// Created fresh for each report and dropped after rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSubmission {
    pub age: f64,
    pub bmi: f64,
    pub blood_pressure: f64,
    pub glucose: f64,
    pub heart_rate: f64,
    pub sleep_hours: f64,
    pub stress_level: f64,
    pub exercise_hours: f64,
    pub water_intake: f64,
    pub smoking: bool,
    pub alcohol: bool,
    pub medical_history: bool,
}

impl Default for PatientSubmission {
    /// The form's initial values.
    fn default() -> Self {
        let mut values = [0.0; 12];
        for (slot, spec) in values.iter_mut().zip(SUBMISSION_FIELDS.iter()) {
            *slot = spec.default;
        }
        Self::from_array(&values)
    }
}

impl PatientSubmission {
    /// Field values in form order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.age,
            self.bmi,
            self.blood_pressure,
            self.glucose,
            self.heart_rate,
            self.sleep_hours,
            self.stress_level,
            self.exercise_hours,
            self.water_intake,
            flag(self.smoking),
            flag(self.alcohol),
            flag(self.medical_history),
        ]
    }

    /// Build a submission from values in form order.
    ///
    /// # Errors
    /// Returns error if the slice does not hold exactly 12 values or a
    /// selector is not 0 or 1.
    pub fn from_vec(v: &[f64]) -> Result<Self, String> {
        let values: &[f64; 12] = v
            .try_into()
            .map_err(|_| format!("Expected 12 fields, got {}", v.len()))?;
        for (spec, value) in SUBMISSION_FIELDS.iter().zip(values.iter()) {
            if spec.kind == FieldKind::Boolean && *value != 0.0 && *value != 1.0 {
                return Err(format!("{} {} must be 0 or 1", spec.label, value));
            }
        }
        Ok(Self::from_array(values))
    }

    fn from_array(v: &[f64; 12]) -> Self {
        Self {
            age: v[0],
            bmi: v[1],
            blood_pressure: v[2],
            glucose: v[3],
            heart_rate: v[4],
            sleep_hours: v[5],
            stress_level: v[6],
            exercise_hours: v[7],
            water_intake: v[8],
            smoking: v[9] == 1.0,
            alcohol: v[10] == 1.0,
            medical_history: v[11] == 1.0,
        }
    }

    /// Check every field against its declared bound.
    ///
    /// # Errors
    /// Returns one message per violated field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = SUBMISSION_FIELDS
            .iter()
            .zip(self.to_vec())
            .filter(|(spec, value)| !spec.accepts(*value))
            .map(|(spec, value)| match spec.kind {
                FieldKind::Integer => format!(
                    "{} {} must be a whole number in [{}, {}]",
                    spec.label, value, spec.min, spec.max
                ),
                _ => format!(
                    "{} {} out of range [{}, {}]",
                    spec.label, value, spec.min, spec.max
                ),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Sample patient used by the form's sample-data shortcut.
    #[must_use]
    pub fn sample() -> Self {
        Self {
            age: 45.0,
            bmi: 27.0,
            blood_pressure: 130.0,
            glucose: 110.0,
            heart_rate: 75.0,
            sleep_hours: 7.0,
            stress_level: 5.0,
            exercise_hours: 1.0,
            water_intake: 2.0,
            smoking: false,
            alcohol: false,
            medical_history: false,
        }
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
