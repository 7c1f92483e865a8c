use thiserror::Error;

/// Failures surfaced by the observation → prediction pipeline.
///
/// Everything except [`Error::ModelUnavailable`] is scoped to a single
/// location and is recoverable at that granularity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Unknown location '{0}'")]
    UnknownLocation(String),

    #[error("Data unavailable for '{location}': {cause}")]
    DataUnavailable { location: String, cause: String },

    #[error("Observation for '{location}' is missing field '{field}'")]
    IncompleteObservation { location: String, field: String },

    #[error("Feature vector has {actual} values, model expects {expected}")]
    FeatureLengthMismatch { expected: usize, actual: usize },

    #[error("Prediction model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("AQI category {0} is outside 1..=5")]
    InvalidCategory(i64),

    #[error("Model produced a non-numeric score")]
    InvalidScore,
}

impl Error {
    /// Wrap a plumbing error (HTTP, JSON) as `DataUnavailable`, keeping the full context chain.
    pub(crate) fn data_unavailable(location: &str, cause: anyhow::Error) -> Self {
        Error::DataUnavailable { location: location.to_string(), cause: format!("{cause:#}") }
    }

    /// True when the failure affects every prediction, not just one location.
    pub fn is_process_fatal(&self) -> bool {
        matches!(self, Error::ModelUnavailable(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
