//! Gradient-boosted regression trees, evaluated from a JSON dump.
//!
//! ```json
//! {"base_score": 0.0,
//!  "trees": [{"nodes": [{"split": {"feature": 1, "threshold": 16.5, "left": 1, "right": 2}},
//!                       {"leaf": 1400.0},
//!                       {"leaf": 1900.0}]}]}
//! ```
//! A split sends `x[feature] <= threshold` left. Node 0 is the root.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ModelError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn eval(&self, x: &[f32]) -> f64 {
        let mut i = 0usize;
        // validated acyclic paths are at most nodes.len() long
        for _ in 0..=self.nodes.len() {
            match self.nodes[i] {
                Node::Leaf(v) => return v,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if f64::from(x[feature]) <= threshold { left } else { right };
                }
            }
        }
        0.0
    }

    fn validate(&self, idx: usize, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Invalid(format!("tree {idx} has no nodes")));
        }
        for (n, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = *node
            {
                if feature >= n_features {
                    return Err(ModelError::Invalid(format!(
                        "tree {idx} node {n}: feature {feature} out of range ({n_features} features)"
                    )));
                }
                // children must point forward, which also rules out cycles
                for child in [left, right] {
                    if child <= n || child >= self.nodes.len() {
                        return Err(ModelError::Invalid(format!(
                            "tree {idx} node {n}: bad child index {child}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let s = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&s).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("ensemble has no trees".into()));
        }
        for (i, t) in self.trees.iter().enumerate() {
            t.validate(i, n_features)?;
        }
        Ok(())
    }

    /// Sum of tree outputs plus the base score. `x` must be validated width.
    pub fn predict(&self, x: &[f32]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.eval(x)).sum::<f64>()
    }
}
