//! Irrigation classifier backed by an exported decision tree
//!
//! The tree is stored as parallel arrays the way scikit-learn keeps them:
//! node `i` tests `x[feature[i]] <= threshold[i]`, going to `children_left[i]`
//! when true and `children_right[i]` otherwise. Leaves have
//! `children_left[i] == -1` and `value[i]` holds per-class weights; class 1
//! means irrigate.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::IrrigationClassifier;
use crate::error::{AppError, AppResult};

const LEAF: i64 = -1;

/// Decision tree with its ordered input columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeModel {
    pub feature_names: Vec<String>,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights, `[not irrigate, irrigate]`
    pub value: Vec<Vec<f64>>,
}

impl DecisionTreeModel {
    /// Load and validate a model file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Cannot read model {}: {}", path.display(), e))
        })?;
        let model = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            nodes = model.node_count(),
            features = model.feature_names.len(),
            "Loaded irrigation model"
        );
        Ok(model)
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        let model: Self = serde_json::from_str(json)
            .map_err(|e| AppError::Configuration(format!("Invalid model file: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Check that the arrays describe a tree that every input can traverse
    pub fn validate(&self) -> AppResult<()> {
        let invalid = |msg: String| Err(AppError::Configuration(format!("Invalid model: {}", msg)));
        let n = self.node_count();

        if n == 0 {
            return invalid("tree has no nodes".to_string());
        }
        if self.feature_names.is_empty() {
            return invalid("no feature names".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return invalid("node arrays differ in length".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if self.value[node].len() < 2 {
                    return invalid(format!("leaf {} has fewer than two class weights", node));
                }
                continue;
            }
            // Children always come after their parent, so traversal terminates
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return invalid(format!("node {} has out-of-order child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= self.feature_names.len() as i64 {
                return invalid(format!("node {} splits on unknown feature {}", node, feature));
            }
        }
        Ok(())
    }

    fn leaf_for(&self, features: &[f64]) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = features[self.feature[node] as usize];
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }
}

impl IrrigationClassifier for DecisionTreeModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &[f64]) -> AppResult<bool> {
        if features.len() != self.feature_names.len() {
            return Err(AppError::Classifier(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                features.len()
            )));
        }

        let weights = &self.value[self.leaf_for(features)];
        // Ties go to the lower class, as argmax does
        let class = weights
            .iter()
            .enumerate()
            .fold((0usize, f64::NEG_INFINITY), |best, (i, w)| {
                if *w > best.1 {
                    (i, *w)
                } else {
                    best
                }
            })
            .0;
        Ok(class == 1)
    }
}
