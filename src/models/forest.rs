//! Random forest regressor.
//!
//! Trees are stored structure-of-arrays, in the layout scikit-learn exposes
//! through `tree_`: parallel `children_left`, `children_right`, `feature`,
//! `threshold` and `value` arrays, where `children_left == -1` marks a leaf.
//! A sample goes left when `x[feature] <= threshold`. The forest predicts
//! the mean of its trees.

use crate::error::PredictionError;
use crate::models::Regressor;
use serde::{Deserialize, Serialize};

const LEAF: i64 = -1;

/// Serialized form of a forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    /// Width of the input rows the forest was fitted on
    pub n_features: usize,
    pub trees: Vec<TreeArrays>,
}

/// Serialized form of one tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArrays {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

/// Immutable SoA tree, validated on construction.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f64]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f64]>,
}

impl RegressionTree {
    /// Build a tree from its exported arrays.
    ///
    /// Children must be in bounds and stored after their parent, which
    /// rules out cycles and guarantees traversal terminates.
    pub fn from_arrays(arrays: &TreeArrays, n_features: usize) -> Result<Self, String> {
        let n_nodes = arrays.children_left.len();
        if n_nodes == 0 {
            return Err("tree has no nodes".to_string());
        }
        let lengths = [
            arrays.children_right.len(),
            arrays.feature.len(),
            arrays.threshold.len(),
            arrays.value.len(),
        ];
        if lengths.iter().any(|&len| len != n_nodes) {
            return Err(format!(
                "node arrays differ in length (children_left has {n_nodes}, others {lengths:?})"
            ));
        }

        let mut split_indices = Vec::with_capacity(n_nodes);
        let mut split_thresholds = Vec::with_capacity(n_nodes);
        let mut left_children = Vec::with_capacity(n_nodes);
        let mut right_children = Vec::with_capacity(n_nodes);
        let mut is_leaf = Vec::with_capacity(n_nodes);
        let mut leaf_values = Vec::with_capacity(n_nodes);

        for node in 0..n_nodes {
            let left = arrays.children_left[node];
            let right = arrays.children_right[node];
            let leaf = left == LEAF;

            if leaf {
                if right != LEAF {
                    return Err(format!("node {node} has only a right child"));
                }
                if !arrays.value[node].is_finite() {
                    return Err(format!("leaf {node} has a non-finite value"));
                }
                split_indices.push(0);
                split_thresholds.push(0.0);
                left_children.push(0);
                right_children.push(0);
            } else {
                for (side, child) in [("left", left), ("right", right)] {
                    if child <= node as i64 || child >= n_nodes as i64 {
                        return Err(format!(
                            "node {node} {side} child {child} out of bounds (n_nodes = {n_nodes})"
                        ));
                    }
                }
                let feature = arrays.feature[node];
                if feature < 0 || feature as usize >= n_features {
                    return Err(format!(
                        "node {node} splits on feature {feature}, forest has {n_features}"
                    ));
                }
                split_indices.push(feature as u32);
                split_thresholds.push(arrays.threshold[node]);
                left_children.push(left as u32);
                right_children.push(right as u32);
            }
            is_leaf.push(leaf);
            leaf_values.push(arrays.value[node]);
        }

        Ok(Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
        })
    }

    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Walk from the root to a leaf. `row` must be at least as wide as the forest.
    fn predict_row(&self, row: &[f32]) -> f64 {
        let mut node = 0usize;
        while !self.is_leaf[node] {
            let x = f64::from(row[self.split_indices[node] as usize]);
            node = if x <= self.split_thresholds[node] {
                self.left_children[node]
            } else {
                self.right_children[node]
            } as usize;
        }
        self.leaf_values[node]
    }
}

/// Averaging ensemble of regression trees
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn from_artifact(artifact: &ForestArtifact) -> Result<Self, String> {
        if artifact.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        let trees = artifact
            .trees
            .iter()
            .enumerate()
            .map(|(i, tree)| {
                RegressionTree::from_arrays(tree, artifact.n_features)
                    .map_err(|e| format!("tree {i}: {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            n_features: artifact.n_features,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn predict(&self, features: &[f32]) -> Result<f64, PredictionError> {
        if features.len() != self.n_features {
            return Err(PredictionError::FeatureCount {
                model: self.name().to_string(),
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let sum: f64 = self.trees.iter().map(|t| t.predict_row(features)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}
