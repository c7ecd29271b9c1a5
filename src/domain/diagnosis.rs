//! Prediction and report types.
//!
//! Represents the output of the risk pipeline, down to the two chart datasets
//! the report screen draws.

use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of the MODERATE tier.
pub const MODERATE_THRESHOLD: f64 = 0.4;

/// Lower bound (inclusive) of the HIGH tier.
pub const HIGH_THRESHOLD: f64 = 0.7;

/// Risk tier derived from the class-1 probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// p < 0.4
    Low,
    /// 0.4 <= p < 0.7
    Moderate,
    /// p >= 0.7
    High,
}

impl RiskLevel {
    /// Map a probability to its tier. Boundaries belong to the upper tier.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability < MODERATE_THRESHOLD {
            Self::Low
        } else if probability < HIGH_THRESHOLD {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "No significant risk indicators",
            Self::Moderate => "Follow-up recommended",
            Self::High => "Medical consultation advised",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (34, 197, 94), // Green (#22C55E)
            Self::Moderate => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (239, 68, 68), // Red (#EF4444)
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW RISK"),
            Self::Moderate => write!(f, "MODERATE RISK"),
            Self::High => write!(f, "HIGH RISK"),
        }
    }
}

/// Classifier output for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Binary decision (0 = healthy, 1 = at risk)
    pub label: u8,

    /// Class-1 probability (0.0 to 1.0)
    pub probability: f64,
}

impl Prediction {
    #[must_use]
    pub fn is_at_risk(&self) -> bool {
        self.label == 1
    }

    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.probability)
    }
}

/// Two-slice proportion chart: risk vs healthy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProportion {
    pub risk: f64,
    pub healthy: f64,
}

impl RiskProportion {
    pub const RISK_LABEL: &'static str = "High Risk";
    pub const HEALTHY_LABEL: &'static str = "Healthy";

    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        Self {
            risk: probability,
            healthy: 1.0 - probability,
        }
    }

    /// Slices with their labels, risk first.
    #[must_use]
    pub fn slices(&self) -> [(&'static str, f64); 2] {
        [(Self::RISK_LABEL, self.risk), (Self::HEALTHY_LABEL, self.healthy)]
    }
}

/// Fixed display labels paired with the five largest importances.
pub const TOP_FACTOR_LABELS: [&str; 5] = ["BMI", "Age", "Blood Pressure", "Glucose", "Stress"];

/// One bar of the "top risk factors" chart.
///
/// `label` comes from [`TOP_FACTOR_LABELS`] by rank, not from the feature the
/// importance belongs to. `source_feature` names that feature; when the two
/// disagree the bar is mislabeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopFactor {
    pub label: String,
    pub importance: f64,
    pub source_feature: String,
}

impl TopFactor {
    #[must_use]
    pub fn is_mislabeled(&self) -> bool {
        let canonical = match self.label.as_str() {
            "BMI" => "bmi",
            "Age" => "age",
            "Blood Pressure" => "blood_pressure",
            "Glucose" => "glucose",
            "Stress" => "stress_level",
            _ => return true,
        };
        canonical != self.source_feature
    }
}

/// Everything the report screen renders for one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    /// Unique identifier (for log correlation only)
    pub id: String,

    pub prediction: Prediction,

    pub risk_level: RiskLevel,

    pub proportion: RiskProportion,

    pub top_factors: Vec<TopFactor>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RiskReport {
    #[must_use]
    pub fn new(prediction: Prediction, top_factors: Vec<TopFactor>) -> Self {
        Self {
            id: report_id(),
            risk_level: prediction.risk_level(),
            proportion: RiskProportion::from_probability(prediction.probability),
            prediction,
            top_factors,
            created_at: chrono::Utc::now(),
        }
    }

    /// Whether any factor bar carries a label for a different feature.
    #[must_use]
    pub fn has_mislabeled_factors(&self) -> bool {
        self.top_factors.iter().any(TopFactor::is_mislabeled)
    }
}

/// Generate a random UUID v4 string.
fn report_id() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_risk_level_from_probability() {
        assert_eq!(RiskLevel::from_probability(0.1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.55), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.9), RiskLevel::High);
    }

    #[test]
    fn test_boundaries_belong_to_upper_tier() {
        assert_eq!(RiskLevel::from_probability(0.4).to_string(), "MODERATE RISK");
        assert_eq!(RiskLevel::from_probability(0.7).to_string(), "HIGH RISK");
        assert_eq!(RiskLevel::from_probability(0.399_999).to_string(), "LOW RISK");
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
    }

    #[test]
    fn test_report_creation() {
        let report = RiskReport::new(
            Prediction {
                label: 1,
                probability: 0.75,
            },
            Vec::new(),
        );
        assert_eq!(report.risk_level, RiskLevel::High);
        assert!(report.prediction.is_at_risk());
        assert!((report.proportion.risk - 0.75).abs() < f64::EPSILON);
        assert_eq!(report.id.len(), 36);
    }

    #[test]
    fn test_report_ids_differ() {
        assert_ne!(report_id(), report_id());
    }

    #[test]
    fn test_mislabeled_factor_detection() {
        let honest = TopFactor {
            label: "Age".into(),
            importance: 0.2,
            source_feature: "age".into(),
        };
        let swapped = TopFactor {
            label: "BMI".into(),
            importance: 0.3,
            source_feature: "glucose".into(),
        };
        assert!(!honest.is_mislabeled());
        assert!(swapped.is_mislabeled());
    }

    proptest! {
        #[test]
        fn prop_categorize_matches_thresholds(p in 0.0f64..=1.0) {
            let level = RiskLevel::from_probability(p);
            prop_assert_eq!(level == RiskLevel::Low, p < 0.4);
            prop_assert_eq!(level == RiskLevel::Moderate, (0.4..0.7).contains(&p));
            prop_assert_eq!(level == RiskLevel::High, p >= 0.7);
        }

        #[test]
        fn prop_proportion_sums_to_one(p in 0.0f64..=1.0) {
            let slices = RiskProportion::from_probability(p);
            prop_assert_eq!(slices.risk, p);
            prop_assert_eq!(slices.risk + slices.healthy, 1.0);
        }
    }
}
