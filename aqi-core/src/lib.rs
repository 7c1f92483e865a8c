//! Core library for the `aqi` CLI.
//!
//! This crate defines:
//! - The location registry and OpenWeatherMap observation source
//! - Feature extraction and the AQI regression predictor
//! - Severity classification and the per-run orchestrator
//! - Configuration & credentials handling
//!
//! Rendering is left to consumers; everything here returns structured results.

pub mod config;
pub mod error;
pub mod features;
pub mod location;
pub mod model;
pub mod pipeline;
pub mod predictor;
pub mod provider;
pub mod severity;

pub use config::Config;
pub use error::{Error, Result};
pub use features::{FEATURE_COUNT, FeatureVector, vectorize};
pub use location::{Coordinate, Location, LocationRegistry};
pub use model::{
    AqiCategory, AqiSource, FullReport, LocationFailure, ObservationRecord, Pollutant, RunReport,
    SimpleReport,
};
pub use pipeline::Orchestrator;
pub use predictor::{Predictor, RegressionModel};
pub use provider::{ObservationSource, openweather::OpenWeatherSource, source_from_config};
pub use severity::{SEVERITY_BANDS, SeverityBand, classify, classify_raw};
