//! Pretrained model artifacts
//!
//! Each model ships as a JSON manifest exported from training: a name,
//! the feature columns it was trained on, and the model parameters. The
//! core treats every artifact as an opaque `predict(features) -> value`
//! function; the math here reproduces the exported estimators
//! (standard-scaled linear/forest regressors, boosted trees with an
//! optional logistic link, a single decision tree, an isolation forest).
//!
//! Inference never panics: malformed trees and wrong-width inputs are
//! errors the adapters turn into per-model failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("feature vector length mismatch: expected {expected}, got {got}")]
    FeatureLength { expected: usize, got: usize },

    #[error("tree node index {0} out of bounds")]
    NodeIndex(usize),

    #[error("tree feature index {0} out of bounds")]
    FeatureIndex(usize),

    #[error("tree walk exceeded node count, tree is cyclic")]
    CyclicTree,

    #[error("model produced a non-finite value")]
    NonFinite,
}

//
// ================= Manifest =================
//

/// On-disk artifact file: metadata plus the parameterized model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub name: String,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    pub feature_names: Vec<String>,
    pub model: ModelArtifact,
}

/// The supported exported-model families.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    Forest(ForestModel),
    Boosted(BoostedModel),
    Tree(TreeModel),
    IsolationForest(IsolationForestModel),
}

impl ModelArtifact {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ModelArtifact::Linear(_) => "linear",
            ModelArtifact::Forest(_) => "forest",
            ModelArtifact::Boosted(_) => "boosted",
            ModelArtifact::Tree(_) => "tree",
            ModelArtifact::IsolationForest(_) => "isolation_forest",
        }
    }
}

//
// ================= Scaler =================
//

/// Standardization fitted at training time: `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        if features.len() != self.mean.len() || self.mean.len() != self.scale.len() {
            return Err(ArtifactError::FeatureLength {
                expected: self.mean.len(),
                got: features.len(),
            });
        }

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| {
                if *scale == 0.0 {
                    0.0
                } else {
                    (x - mean) / scale
                }
            })
            .collect())
    }
}

//
// ================= Trees =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A decision tree as a node array rooted at index 0. Left branch is
/// taken when `x[feature] <= threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn score(&self, features: &[f64]) -> Result<f64, ArtifactError> {
        let mut index = 0usize;

        // A well-formed tree visits each node at most once.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index).ok_or(ArtifactError::NodeIndex(index))? {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features
                        .get(*feature)
                        .ok_or(ArtifactError::FeatureIndex(*feature))?;
                    index = if *x <= *threshold { *left } else { *right };
                }
            }
        }

        Err(ArtifactError::CyclicTree)
    }
}

/// Single decision tree (the savings-target classifier).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeModel {
    pub tree: DecisionTree,
}

impl TreeModel {
    pub fn predict(&self, features: &[f64]) -> Result<f64, ArtifactError> {
        finite(self.tree.score(features)?)
    }
}

/// Averaged tree ensemble with an optional input scaler (the random
/// forest expense regressor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub trees: Vec<DecisionTree>,
}

impl ForestModel {
    pub fn predict(&self, features: &[f64]) -> Result<f64, ArtifactError> {
        let scaled;
        let input = match &self.scaler {
            Some(scaler) => {
                scaled = scaler.transform(features)?;
                scaled.as_slice()
            }
            None => features,
        };

        if self.trees.is_empty() {
            return Err(ArtifactError::NonFinite);
        }

        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.score(input)?;
        }
        finite(sum / self.trees.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Link {
    Identity,
    Logistic,
}

/// Boosted tree ensemble: `base_score` plus summed tree outputs, mapped
/// through the link (the overspending classifier and the health-score
/// regressor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedModel {
    pub base_score: f64,
    pub link: Link,
    pub trees: Vec<DecisionTree>,
}

impl BoostedModel {
    pub fn predict(&self, features: &[f64]) -> Result<f64, ArtifactError> {
        let mut margin = self.base_score;
        for tree in &self.trees {
            margin += tree.score(features)?;
        }

        let value = match self.link {
            Link::Identity => margin,
            Link::Logistic => 1.0 / (1.0 + (-margin).exp()),
        };
        finite(value)
    }
}

//
// ================= Isolation Forest =================
//

/// Isolation forest: leaves carry the (correction-adjusted) path depth
/// at which a sample isolates. The anomaly score is
/// `2^(-mean_depth / normalizer)` with `normalizer` the average path
/// length c(n) fixed at training time; scores at or above
/// `score_threshold` carry the outlier label -1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForestModel {
    pub trees: Vec<DecisionTree>,
    pub normalizer: f64,
    pub score_threshold: f64,
}

impl IsolationForestModel {
    pub fn anomaly_score(&self, features: &[f64]) -> Result<f64, ArtifactError> {
        if self.trees.is_empty() || self.normalizer <= 0.0 {
            return Err(ArtifactError::NonFinite);
        }

        let mut depth_sum = 0.0;
        for tree in &self.trees {
            depth_sum += tree.score(features)?;
        }
        let mean_depth = depth_sum / self.trees.len() as f64;

        finite(2.0_f64.powf(-mean_depth / self.normalizer))
    }

    /// Raw label convention of the underlying detector: -1 outlier, 1 inlier.
    pub fn predict_label(&self, features: &[f64]) -> Result<i8, ArtifactError> {
        let score = self.anomaly_score(features)?;
        Ok(if score >= self.score_threshold { -1 } else { 1 })
    }
}

/// Standard-scaled linear regressor (the savings-percentage model behind
/// the recommendation policy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl LinearModel {
    pub fn predict(&self, features: &[f64]) -> Result<f64, ArtifactError> {
        let scaled;
        let input = match &self.scaler {
            Some(scaler) => {
                scaled = scaler.transform(features)?;
                scaled.as_slice()
            }
            None => features,
        };

        if input.len() != self.coefficients.len() {
            return Err(ArtifactError::FeatureLength {
                expected: self.coefficients.len(),
                got: input.len(),
            });
        }

        let value = self.intercept
            + input
                .iter()
                .zip(self.coefficients.iter())
                .map(|(x, w)| x * w)
                .sum::<f64>();
        finite(value)
    }
}

fn finite(value: f64) -> Result<f64, ArtifactError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArtifactError::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        }
    }

    #[test]
    fn test_tree_walk_takes_left_on_at_most_threshold() {
        let tree = stump(0, 10.0, -1.0, 1.0);
        assert_eq!(tree.score(&[10.0]).unwrap(), -1.0);
        assert_eq!(tree.score(&[10.1]).unwrap(), 1.0);
    }

    #[test]
    fn test_tree_rejects_out_of_bounds_feature() {
        let tree = stump(5, 1.0, 0.0, 1.0);
        assert!(matches!(
            tree.score(&[1.0, 2.0]),
            Err(ArtifactError::FeatureIndex(5))
        ));
    }

    #[test]
    fn test_cyclic_tree_is_an_error_not_a_hang() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(matches!(tree.score(&[1.0]), Err(ArtifactError::CyclicTree)));
    }

    #[test]
    fn test_linear_model_dot_product() {
        let model = LinearModel {
            intercept: 1.5,
            coefficients: vec![2.0, -1.0],
            scaler: None,
        };
        assert_eq!(model.predict(&[3.0, 4.0]).unwrap(), 3.5);
    }

    #[test]
    fn test_linear_model_rejects_wrong_width() {
        let model = LinearModel {
            intercept: 0.0,
            coefficients: vec![1.0, 1.0, 1.0],
            scaler: None,
        };
        assert!(matches!(
            model.predict(&[1.0]),
            Err(ArtifactError::FeatureLength {
                expected: 3,
                got: 1
            })
        ));
    }

    #[test]
    fn test_scaler_standardizes_and_guards_zero_scale() {
        let scaler = StandardScaler {
            mean: vec![10.0, 5.0],
            scale: vec![2.0, 0.0],
        };
        assert_eq!(scaler.transform(&[14.0, 9.0]).unwrap(), vec![2.0, 0.0]);
    }

    #[test]
    fn test_forest_averages_trees() {
        let model = ForestModel {
            scaler: None,
            trees: vec![stump(0, 0.0, 2.0, 4.0), stump(0, 0.0, 4.0, 8.0)],
        };
        assert_eq!(model.predict(&[1.0]).unwrap(), 6.0);
        assert_eq!(model.predict(&[-1.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_boosted_logistic_stays_in_unit_interval() {
        let model = BoostedModel {
            base_score: 0.0,
            link: Link::Logistic,
            trees: vec![stump(0, 1.0, -2.0, 2.0)],
        };

        let low = model.predict(&[0.5]).unwrap();
        let high = model.predict(&[1.5]).unwrap();
        assert!(low < 0.5);
        assert!(high > 0.5);
        assert!((0.0..=1.0).contains(&low) && (0.0..=1.0).contains(&high));
    }

    #[test]
    fn test_isolation_forest_short_paths_score_higher() {
        let model = IsolationForestModel {
            // Depth 1 on the left of the split, depth 6 on the right.
            trees: vec![stump(0, 0.0, 1.0, 6.0)],
            normalizer: 4.0,
            score_threshold: 0.6,
        };

        let outlier = model.anomaly_score(&[-1.0]).unwrap();
        let inlier = model.anomaly_score(&[1.0]).unwrap();
        assert!(outlier > inlier);
        assert_eq!(model.predict_label(&[-1.0]).unwrap(), -1);
        assert_eq!(model.predict_label(&[1.0]).unwrap(), 1);
    }

    #[test]
    fn test_manifest_roundtrip() {
        let json = serde_json::json!({
            "name": "savings_target",
            "trained_at": "2025-11-02T10:41:00Z",
            "feature_names": ["Income", "Disposable_Income"],
            "model": {
                "kind": "tree",
                "tree": {
                    "nodes": [
                        { "type": "split", "feature": 1, "threshold": 0.0, "left": 1, "right": 2 },
                        { "type": "leaf", "value": 0.0 },
                        { "type": "leaf", "value": 1.0 }
                    ]
                }
            }
        });

        let artifact: ArtifactFile = serde_json::from_value(json).unwrap();
        assert_eq!(artifact.name, "savings_target");
        assert_eq!(artifact.model.kind_name(), "tree");
        match &artifact.model {
            ModelArtifact::Tree(model) => {
                assert_eq!(model.predict(&[100.0, 5.0]).unwrap(), 1.0);
            }
            other => panic!("unexpected kind {}", other.kind_name()),
        }
    }
}
