//! On-disk model formats.
//!
//! The artifact is a JSON document tagged by `kind`:
//!
//! ```json
//! { "kind": "tree_ensemble", "base_score": 0.5,
//!   "trees": [ { "nodes": [
//!       { "feature": 9, "threshold": 60.0, "left": 1, "right": 2 },
//!       { "leaf": 1.2 },
//!       { "leaf": 2.9 } ] } ] }
//! ```
//!
//! or `{ "kind": "linear", "intercept": 0.3, "coefficients": [ ...18 values ] }`.

use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result, anyhow, bail, ensure};
use serde::Deserialize;

use super::RegressionModel;
use crate::features::FEATURE_COUNT;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    TreeEnsemble(TreeEnsemble),
    Linear(LinearModel),
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ModelArtifact =
            serde_json::from_str(json).context("Failed to parse model artifact JSON")?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("Invalid model file: {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        match self {
            ModelArtifact::TreeEnsemble(ensemble) => ensemble.validate(),
            ModelArtifact::Linear(linear) => linear.validate(),
        }
    }

    pub fn into_model(self) -> Arc<dyn RegressionModel> {
        match self {
            ModelArtifact::TreeEnsemble(ensemble) => Arc::new(ensemble),
            ModelArtifact::Linear(linear) => Arc::new(linear),
        }
    }
}

/// Boosted regression trees; the score is `base_score` plus one leaf per tree.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// `x[feature] < threshold` goes left.
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { leaf: f64 },
}

impl Tree {
    // Children must point forward, which also rules out cycles.
    fn validate(&self, tree_idx: usize) -> Result<()> {
        ensure!(!self.nodes.is_empty(), "tree {tree_idx} has no nodes");

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split { feature, threshold, left, right } => {
                    ensure!(
                        *feature < FEATURE_COUNT,
                        "tree {tree_idx} node {idx}: feature {feature} out of range (0..{FEATURE_COUNT})"
                    );
                    ensure!(threshold.is_finite(), "tree {tree_idx} node {idx}: threshold is not finite");
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            bail!("tree {tree_idx} node {idx}: invalid child index {child}");
                        }
                    }
                }
                Node::Leaf { leaf } => {
                    ensure!(leaf.is_finite(), "tree {tree_idx} node {idx}: leaf is not finite");
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split { feature, threshold, left, right } => {
                    idx = if features[*feature] < *threshold { *left } else { *right };
                }
            }
        }
    }
}

impl TreeEnsemble {
    fn validate(&self) -> Result<()> {
        ensure!(self.base_score.is_finite(), "base_score is not finite");
        ensure!(!self.trees.is_empty(), "tree ensemble has no trees");
        self.trees.iter().enumerate().try_for_each(|(idx, tree)| tree.validate(idx))
    }
}

impl RegressionModel for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|tree| tree.evaluate(features)).sum::<f64>()
    }
}

/// `intercept + coefficients · x`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    fn validate(&self) -> Result<()> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(anyhow!(
                "linear model has {} coefficients, expected {FEATURE_COUNT}",
                self.coefficients.len()
            ));
        }
        ensure!(
            self.intercept.is_finite() && self.coefficients.iter().all(|c| c.is_finite()),
            "linear model contains non-finite weights"
        );
        Ok(())
    }
}

impl RegressionModel for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept + self.coefficients.iter().zip(features).map(|(w, x)| w * x).sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_ENSEMBLE: &str = r#"{
        "kind": "tree_ensemble",
        "base_score": 0.5,
        "trees": [
            { "nodes": [
                { "feature": 9, "threshold": 60.0, "left": 1, "right": 2 },
                { "leaf": 1.0 },
                { "leaf": 3.0 }
            ] },
            { "nodes": [ { "leaf": 0.25 } ] }
        ]
    }"#;

    fn features_with_pm25(pm25: f64) -> Vec<f64> {
        let mut x = vec![0.0; FEATURE_COUNT];
        x[9] = pm25;
        x
    }

    #[test]
    fn tree_ensemble_sums_leaves() {
        let model = ModelArtifact::from_json(SMALL_ENSEMBLE).expect("valid").into_model();
        assert_eq!(model.predict(&features_with_pm25(35.0)), 1.75);
        assert_eq!(model.predict(&features_with_pm25(60.0)), 3.75);
    }

    #[test]
    fn linear_model_dot_product() {
        let mut coefficients = vec![0.0; FEATURE_COUNT];
        coefficients[9] = 0.05;
        let json = serde_json::json!({
            "kind": "linear",
            "intercept": 1.0,
            "coefficients": coefficients,
        })
        .to_string();

        let model = ModelArtifact::from_json(&json).expect("valid").into_model();
        assert!((model.predict(&features_with_pm25(40.0)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_range_feature() {
        let json = r#"{ "kind": "tree_ensemble", "trees": [ { "nodes": [
            { "feature": 18, "threshold": 1.0, "left": 1, "right": 2 },
            { "leaf": 1.0 }, { "leaf": 2.0 } ] } ] }"#;
        let err = ModelArtifact::from_json(json).unwrap_err();
        assert!(format!("{err:#}").contains("feature 18 out of range"));
    }

    #[test]
    fn rejects_backward_child() {
        let json = r#"{ "kind": "tree_ensemble", "trees": [ { "nodes": [
            { "feature": 0, "threshold": 1.0, "left": 0, "right": 1 },
            { "leaf": 1.0 } ] } ] }"#;
        let err = ModelArtifact::from_json(json).unwrap_err();
        assert!(format!("{err:#}").contains("invalid child index 0"));
    }

    #[test]
    fn rejects_wrong_coefficient_count() {
        let json = r#"{ "kind": "linear", "intercept": 0.0, "coefficients": [1.0, 2.0] }"#;
        let err = ModelArtifact::from_json(json).unwrap_err();
        assert!(format!("{err:#}").contains("expected 18"));
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = ModelArtifact::from_json(r#"{ "kind": "pickle" }"#).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse model artifact JSON"));
    }

    #[test]
    fn missing_file_has_path_in_error() {
        let err = ModelArtifact::from_file(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/model.json"));
    }
}
