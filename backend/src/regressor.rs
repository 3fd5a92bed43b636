//! Native regressors that can be evaluated straight from the JSON artifact.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn validate(&self, width: usize) -> Result<(), String> {
        if self.coefficients.len() != width {
            return Err(format!(
                "linear model has {} coefficients for {} features",
                self.coefficients.len(),
                width
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("linear model contains non-finite weights".to_string());
        }
        Ok(())
    }

    pub fn predict(&self, row: &[f32]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            bail!(
                "expected {} features, got {}",
                self.coefficients.len(),
                row.len()
            );
        }

        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * f64::from(*x))
                .sum::<f64>())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Random forest: average of the trees.
    Mean,
    /// Gradient boosting: scaled sum of the trees.
    Sum,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
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

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(format!(
                            "node {} splits on feature {} but only {} features exist",
                            idx, feature, width
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", idx));
                    }
                    // children must come later so every walk terminates
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {} points to invalid child {}", idx, child));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", idx));
                    }
                }
            }
        }

        Ok(())
    }

    fn evaluate(&self, row: &[f32]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if f64::from(row[*feature]) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

fn default_learning_rate() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    pub aggregation: Aggregation,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
    #[serde(skip)]
    width: usize,
}

impl TreeEnsemble {
    pub fn new(aggregation: Aggregation, trees: Vec<Tree>) -> Self {
        Self {
            base_score: 0.0,
            aggregation,
            learning_rate: default_learning_rate(),
            trees,
            width: 0,
        }
    }

    /// Checks the ensemble against the feature count and pins it as the expected row width.
    pub fn validate(&mut self, width: usize) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("tree ensemble has no trees".to_string());
        }
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err("tree ensemble has a non-finite base score or learning rate".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(width)
                .map_err(|e| format!("tree {}: {}", idx, e))?;
        }
        self.width = width;
        Ok(())
    }

    pub fn predict(&self, row: &[f32]) -> Result<f64> {
        if row.len() != self.width {
            bail!("expected {} features, got {}", self.width, row.len());
        }

        let total: f64 = self.trees.iter().map(|tree| tree.evaluate(row)).sum();
        Ok(match self.aggregation {
            Aggregation::Mean => self.base_score + total / self.trees.len() as f64,
            Aggregation::Sum => self.base_score + self.learning_rate * total,
        })
    }
}

// `width` is set by validation and not part of the serialized model.
impl PartialEq for TreeEnsemble {
    fn eq(&self, other: &Self) -> bool {
        self.base_score == other.base_score
            && self.aggregation == other.aggregation
            && self.learning_rate == other.learning_rate
            && self.trees == other.trees
    }
}
