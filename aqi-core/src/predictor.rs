use std::{fmt::Debug, path::Path, sync::Arc};

use tracing::{error, info};

use crate::{
    error::{Error, Result},
    features::FEATURE_COUNT,
    model::AqiCategory,
};

pub mod artifact;

pub use artifact::ModelArtifact;

/// A loaded regression model. Inference must not mutate the model so one
/// instance can serve concurrent callers.
pub trait RegressionModel: Send + Sync + Debug {
    /// Continuous AQI score for exactly [`FEATURE_COUNT`] features.
    fn predict(&self, features: &[f64]) -> f64;
}

#[derive(Debug, Clone)]
enum ModelState {
    Ready(Arc<dyn RegressionModel>),
    Unavailable(String),
}

/// Model handle plus score normalization.
///
/// Built once at startup. If loading failed every prediction fails with
/// [`Error::ModelUnavailable`] until the process constructs a new predictor.
#[derive(Debug, Clone)]
pub struct Predictor {
    state: ModelState,
}

impl Predictor {
    pub fn new(model: Arc<dyn RegressionModel>) -> Self {
        Self { state: ModelState::Ready(model) }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { state: ModelState::Unavailable(reason.into()) }
    }

    /// Load a model artifact from disk. Never fails; a bad artifact yields an unavailable predictor.
    pub fn load(path: &Path) -> Self {
        match ModelArtifact::from_file(path) {
            Ok(artifact) => {
                info!(path = %path.display(), "Loaded AQI model");
                Self::new(artifact.into_model())
            }
            Err(err) => {
                error!(path = %path.display(), error = %format!("{err:#}"), "Failed to load AQI model");
                Self::unavailable(format!("{err:#}"))
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ModelState::Ready(_) => None,
            ModelState::Unavailable(reason) => Some(reason),
        }
    }

    /// Raw model output.
    pub fn score(&self, features: &[f64]) -> Result<f64> {
        let model = match &self.state {
            ModelState::Ready(model) => model,
            ModelState::Unavailable(reason) => return Err(Error::ModelUnavailable(reason.clone())),
        };

        if features.len() != FEATURE_COUNT {
            return Err(Error::FeatureLengthMismatch {
                expected: FEATURE_COUNT,
                actual: features.len(),
            });
        }

        Ok(model.predict(features))
    }

    pub fn predict_category(&self, features: &[f64]) -> Result<AqiCategory> {
        let score = self.score(features)?;
        AqiCategory::from_score(score)
    }
}
