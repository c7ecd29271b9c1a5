//! Random-forest adapter: Implementation of `Classifier` over an exported forest.
//!
//! The training pipeline exports the fitted scikit-learn forest as JSON using
//! the estimator's own tree arrays (`children_left`, `children_right`,
//! `feature`, `threshold`, `value`). Loading validates the arrays once so
//! prediction can walk the trees without bounds surprises.
//!
//! # Semantics
//!
//! - Each split sends `x[feature] <= threshold` to the left child.
//! - A tree's probability is the class distribution of the leaf reached,
//!   normalized to sum to 1.
//! - The forest probability is the mean over trees.
//! - `predict` picks the class with the highest mean probability; a tie goes to
//!   class 0.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{check_feature_names, parse_json, ArtifactError};
use crate::domain::{ScaledVector, MODEL_ARITY};
use crate::ports::Classifier;

/// File name of the forest artifact inside a model directory.
///
/// The copy shipped in `models/` is a three-tree demo export on the trained
/// feature layout, small enough to read by hand. It is not a clinical model.
pub const FOREST_FILE: &str = "forest.json";

/// Only forest export format understood by this build.
pub const FOREST_FORMAT_VERSION: u32 = 1;

/// Marker used by scikit-learn for "no child" in leaf nodes.
const TREE_LEAF: i64 = -1;

/// One fitted tree, as exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights `[class 0, class 1]`
    pub value: Vec<[f64; 2]>,
}

/// Forest parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedForest {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub classes: Vec<u8>,
    pub feature_importances: Vec<f64>,
    pub trees: Vec<ExportedTree>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        proba: [f64; 2],
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_exported(index: usize, t: &ExportedTree) -> Result<Self, ArtifactError> {
        let n = t.children_left.len();
        if n == 0 {
            return Err(ArtifactError::Shape(format!("tree {index} has no nodes")));
        }
        if t.children_right.len() != n
            || t.feature.len() != n
            || t.threshold.len() != n
            || t.value.len() != n
        {
            return Err(ArtifactError::Shape(format!(
                "tree {index}: node array lengths differ"
            )));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (t.children_left[i], t.children_right[i]);
            let node = if left == TREE_LEAF && right == TREE_LEAF {
                let [c0, c1] = t.value[i];
                let total = c0 + c1;
                if !(total.is_finite() && total > 0.0 && c0 >= 0.0 && c1 >= 0.0) {
                    return Err(ArtifactError::Shape(format!(
                        "tree {index} node {i}: invalid leaf value {:?}",
                        t.value[i]
                    )));
                }
                Node::Leaf {
                    proba: [c0 / total, c1 / total],
                }
            } else {
                // scikit-learn numbers children after their parent; requiring
                // that here also rules out cycles.
                let child = |c: i64| -> Result<usize, ArtifactError> {
                    usize::try_from(c)
                        .ok()
                        .filter(|&c| c > i && c < n)
                        .ok_or_else(|| {
                            ArtifactError::Shape(format!(
                                "tree {index} node {i}: invalid child index {c}"
                            ))
                        })
                };
                let feature = usize::try_from(t.feature[i])
                    .ok()
                    .filter(|&f| f < MODEL_ARITY)
                    .ok_or_else(|| {
                        ArtifactError::Shape(format!(
                            "tree {index} node {i}: feature index {} out of range",
                            t.feature[i]
                        ))
                    })?;
                if !t.threshold[i].is_finite() {
                    return Err(ArtifactError::Shape(format!(
                        "tree {index} node {i}: non-finite threshold"
                    )));
                }
                Node::Split {
                    feature,
                    threshold: t.threshold[i],
                    left: child(left)?,
                    right: child(right)?,
                }
            };
            nodes.push(node);
        }

        Ok(Self { nodes })
    }

    fn leaf_proba(&self, x: &[f64; MODEL_ARITY]) -> [f64; 2] {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Random-forest classifier with validated trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    feature_names: Vec<String>,
    importances: Vec<f64>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Parse and validate the contents of `forest.json` read from `path`.
    ///
    /// # Errors
    /// Returns error if the bytes are unparsable or the shape does not match
    /// the trained feature layout.
    pub fn from_json(path: &Path, bytes: &[u8]) -> Result<Self, ArtifactError> {
        let exported: ExportedForest = parse_json(path, bytes)?;
        let forest = Self::from_exported(exported)?;
        tracing::info!(
            "Loaded forest from {:?} (trees={}, n_features={})",
            path,
            forest.trees.len(),
            forest.feature_names.len()
        );
        Ok(forest)
    }

    /// Validate exported parameters.
    ///
    /// # Errors
    /// Returns error on any shape or value inconsistency.
    pub fn from_exported(exported: ExportedForest) -> Result<Self, ArtifactError> {
        if exported.format_version != FOREST_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                what: FOREST_FILE,
                version: exported.format_version,
            });
        }
        check_feature_names("forest", &exported.feature_names)?;
        if exported.classes != [0, 1] {
            return Err(ArtifactError::Shape(format!(
                "forest classes must be [0, 1], got {:?}",
                exported.classes
            )));
        }
        if exported.feature_importances.len() != exported.feature_names.len() {
            return Err(ArtifactError::Shape(
                "feature_importances length does not match feature_names".into(),
            ));
        }
        if let Some((i, v)) = exported
            .feature_importances
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ArtifactError::Shape(format!(
                "feature_importances[{i}] must be finite and non-negative, got {v}"
            )));
        }
        if exported.trees.is_empty() {
            return Err(ArtifactError::Shape("forest has no trees".into()));
        }

        let trees = exported
            .trees
            .iter()
            .enumerate()
            .map(|(i, t)| DecisionTree::from_exported(i, t))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            feature_names: exported.feature_names,
            importances: exported.feature_importances,
            trees,
        })
    }

    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn predict(&self, x: &ScaledVector) -> u8 {
        let [p0, p1] = self.predict_proba(x);
        if p1 > p0 {
            1
        } else {
            0
        }
    }

    fn predict_proba(&self, x: &ScaledVector) -> [f64; 2] {
        let mut sum = [0.0; 2];
        for tree in &self.trees {
            let p = tree.leaf_proba(&x.0);
            sum[0] += p[0];
            sum[1] += p[1];
        }
        let n = self.trees.len() as f64;
        [sum[0] / n, sum[1] / n]
    }

    fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TRAINED_FEATURE_NAMES;

    /// Single split on `feature`: left leaf `l`, right leaf `r`.
    fn stump(feature: i64, threshold: f64, l: [f64; 2], r: [f64; 2]) -> ExportedTree {
        ExportedTree {
            children_left: vec![1, TREE_LEAF, TREE_LEAF],
            children_right: vec![2, TREE_LEAF, TREE_LEAF],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![[l[0] + r[0], l[1] + r[1]], l, r],
        }
    }

    fn exported(trees: Vec<ExportedTree>) -> ExportedForest {
        ExportedForest {
            format_version: FOREST_FORMAT_VERSION,
            feature_names: TRAINED_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            classes: vec![0, 1],
            feature_importances: vec![1.0 / MODEL_ARITY as f64; MODEL_ARITY],
            trees,
        }
    }

    fn x_with(feature: usize, value: f64) -> ScaledVector {
        let mut x = [0.0; MODEL_ARITY];
        x[feature] = value;
        ScaledVector(x)
    }

    #[test]
    fn test_probability_is_mean_of_leaf_distributions() {
        let forest = RandomForest::from_exported(exported(vec![
            stump(0, 0.5, [8.0, 2.0], [1.0, 3.0]),
            stump(4, 0.0, [1.0, 1.0], [0.0, 5.0]),
        ]))
        .expect("valid forest");

        // tree 1 -> left (0.2), tree 2 -> left (0.5)
        let p = forest.predict_proba(&x_with(0, 0.5));
        assert!((p[1] - 0.35).abs() < 1e-12);
        assert!((p[0] + p[1] - 1.0).abs() < 1e-12);
        assert_eq!(forest.predict(&x_with(0, 0.5)), 0);

        // tree 1 -> right (0.75), tree 2 -> left (0.5)
        let x = x_with(0, 0.6);
        assert!((forest.predict_proba(&x)[1] - 0.625).abs() < 1e-12);
        assert_eq!(forest.predict(&x), 1);
    }

    #[test]
    fn test_tie_goes_to_class_zero() {
        let forest =
            RandomForest::from_exported(exported(vec![stump(0, 0.0, [1.0, 1.0], [1.0, 1.0])]))
                .expect("valid forest");
        let prediction = forest.classify(&x_with(0, -1.0));
        assert_eq!(prediction.label, 0);
        assert!((prediction.probability - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let mut e = exported(vec![stump(0, 0.0, [1.0, 0.0], [0.0, 1.0])]);
        e.feature_names.truncate(21);
        e.feature_importances.truncate(21);
        assert!(matches!(
            RandomForest::from_exported(e),
            Err(ArtifactError::Shape(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_feature_and_child() {
        let bad_feature = exported(vec![stump(22, 0.0, [1.0, 0.0], [0.0, 1.0])]);
        assert!(RandomForest::from_exported(bad_feature).is_err());

        let mut cyclic = stump(0, 0.0, [1.0, 0.0], [0.0, 1.0]);
        cyclic.children_left[0] = 0;
        assert!(RandomForest::from_exported(exported(vec![cyclic])).is_err());
    }

    #[test]
    fn test_rejects_empty_leaf_and_bad_version() {
        let empty_leaf = exported(vec![stump(0, 0.0, [0.0, 0.0], [0.0, 1.0])]);
        assert!(RandomForest::from_exported(empty_leaf).is_err());

        let mut e = exported(vec![stump(0, 0.0, [1.0, 0.0], [0.0, 1.0])]);
        e.format_version = 2;
        assert!(matches!(
            RandomForest::from_exported(e),
            Err(ArtifactError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_load_from_json_bytes() {
        let path = Path::new("models").join(FOREST_FILE);
        let json = serde_json::to_vec(&exported(vec![stump(1, 0.0, [3.0, 1.0], [1.0, 3.0])]))
            .expect("serialize");

        let forest = RandomForest::from_json(&path, &json).expect("load");
        assert_eq!(forest.tree_count(), 1);
        assert_eq!(forest.feature_names()[1], "bmi");

        let err = RandomForest::from_json(&path, b"{\"trees\":").expect_err("truncated");
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn test_rejects_bad_importances() {
        for bad in [f64::NAN, f64::INFINITY, -0.01] {
            let mut e = exported(vec![stump(1, 0.0, [3.0, 1.0], [1.0, 3.0])]);
            e.feature_importances[3] = bad;
            let err = RandomForest::from_exported(e).expect_err("bad importance");
            assert!(
                err.to_string().contains("feature_importances[3]"),
                "{bad} gave {err}"
            );
        }
    }
}
