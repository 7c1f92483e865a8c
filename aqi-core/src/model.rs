use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    severity::SeverityBand,
};

/// Air pollutants reported by the pollution endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "PM2.5")]
    Pm2_5,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "NH3")]
    Nh3,
}

impl Pollutant {
    pub const fn all() -> &'static [Pollutant] {
        &[
            Pollutant::Co,
            Pollutant::No,
            Pollutant::No2,
            Pollutant::O3,
            Pollutant::So2,
            Pollutant::Pm2_5,
            Pollutant::Pm10,
            Pollutant::Nh3,
        ]
    }

    /// Key used in the upstream `components` object.
    pub fn key(&self) -> &'static str {
        match self {
            Pollutant::Co => "co",
            Pollutant::No => "no",
            Pollutant::No2 => "no2",
            Pollutant::O3 => "o3",
            Pollutant::So2 => "so2",
            Pollutant::Pm2_5 => "pm2_5",
            Pollutant::Pm10 => "pm10",
            Pollutant::Nh3 => "nh3",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::Co => "CO",
            Pollutant::No => "NO",
            Pollutant::No2 => "NO2",
            Pollutant::O3 => "O3",
            Pollutant::So2 => "SO2",
            Pollutant::Pm2_5 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::Nh3 => "NH3",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.key() == key)
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// AQI category on the 1 (Good) ..= 5 (Very Poor) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AqiCategory(u8);

impl AqiCategory {
    pub const MIN: AqiCategory = AqiCategory(1);
    pub const MAX: AqiCategory = AqiCategory(5);

    pub fn new(value: i64) -> Result<Self> {
        if (1..=5).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidCategory(value))
        }
    }

    /// `clamp(round(score), 1, 5)`, rounding half to even.
    ///
    /// Infinite scores saturate; NaN has no category.
    pub fn from_score(score: f64) -> Result<Self> {
        if score.is_nan() {
            return Err(Error::InvalidScore);
        }
        let rounded = score.round_ties_even().clamp(1.0, 5.0);
        Ok(Self(rounded as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a category came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiSource {
    Reported,
    Predicted,
}

/// Weather and pollution snapshot for one location at retrieval time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub location: String,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    pub description: String,
    /// Concentrations in µg/m³. Species the upstream omitted are absent.
    pub pollutants: BTreeMap<Pollutant, f64>,
    /// Upstream AQI, populated for the primary location only.
    pub reported_aqi: Option<AqiCategory>,
    pub retrieved_at: DateTime<Utc>,
}

impl ObservationRecord {
    pub fn pollutant(&self, pollutant: Pollutant) -> Option<f64> {
        self.pollutants.get(&pollutant).copied()
    }
}

/// Full detail for the primary location.
#[derive(Debug, Clone, Serialize)]
pub struct FullReport {
    pub observation: ObservationRecord,
    pub category: AqiCategory,
    pub source: AqiSource,
    pub band: &'static SeverityBand,
}

/// Category-only result for a secondary location.
#[derive(Debug, Clone, Serialize)]
pub struct SimpleReport {
    pub location: String,
    pub category: AqiCategory,
    pub source: AqiSource,
    pub band: &'static SeverityBand,
    pub retrieved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationFailure {
    pub location: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: Error,
}

/// Result of one pipeline run: whatever succeeded, plus why the rest did not.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub primary: Option<FullReport>,
    pub secondaries: Vec<SimpleReport>,
    pub failures: Vec<LocationFailure>,
    /// Set when no predictions could be attempted for this process.
    pub model_unavailable: Option<String>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.primary.is_some() && self.failures.is_empty() && self.model_unavailable.is_none()
    }
}

fn serialize_display<S: serde::Serializer>(value: &Error, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}
