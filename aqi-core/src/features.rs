//! Observation → model input.
//!
//! The model was trained on 18 columns: four weather readings, the eight
//! pollutants, then PM2.5, PM10, NO2, O3, SO2 and NH3 a second time. The
//! repeated block is part of the model's input layout and must not be
//! collapsed unless the model is retrained.

use crate::{
    error::{Error, Result},
    model::{ObservationRecord, Pollutant},
};

pub const FEATURE_COUNT: usize = 18;

/// One input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    Pollutant(Pollutant),
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Temperature => "temperature",
            Feature::Humidity => "humidity",
            Feature::Pressure => "pressure",
            Feature::WindSpeed => "wind_speed",
            Feature::Pollutant(p) => p.label(),
        }
    }
}

pub const FEATURE_LAYOUT: [Feature; FEATURE_COUNT] = [
    Feature::Temperature,
    Feature::Humidity,
    Feature::Pressure,
    Feature::WindSpeed,
    Feature::Pollutant(Pollutant::Co),
    Feature::Pollutant(Pollutant::No),
    Feature::Pollutant(Pollutant::No2),
    Feature::Pollutant(Pollutant::O3),
    Feature::Pollutant(Pollutant::So2),
    Feature::Pollutant(Pollutant::Pm2_5),
    Feature::Pollutant(Pollutant::Pm10),
    Feature::Pollutant(Pollutant::Nh3),
    Feature::Pollutant(Pollutant::Pm2_5),
    Feature::Pollutant(Pollutant::Pm10),
    Feature::Pollutant(Pollutant::No2),
    Feature::Pollutant(Pollutant::O3),
    Feature::Pollutant(Pollutant::So2),
    Feature::Pollutant(Pollutant::Nh3),
];

/// Exactly [`FEATURE_COUNT`] values in [`FEATURE_LAYOUT`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(Error::FeatureLengthMismatch {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }
        Ok(Self(values))
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Raw magnitudes are passed through unchanged; a missing pollutant is an
/// error, never a default.
pub fn vectorize(record: &ObservationRecord) -> Result<FeatureVector> {
    let values = FEATURE_LAYOUT
        .iter()
        .map(|feature| match feature {
            Feature::Temperature => Ok(record.temperature_c),
            Feature::Humidity => Ok(record.humidity_pct),
            Feature::Pressure => Ok(record.pressure_hpa),
            Feature::WindSpeed => Ok(record.wind_speed_mps),
            Feature::Pollutant(p) => {
                record.pollutant(*p).ok_or_else(|| Error::IncompleteObservation {
                    location: record.location.clone(),
                    field: p.label().to_string(),
                })
            }
        })
        .collect::<Result<Vec<_>>>()?;

    FeatureVector::try_from(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> ObservationRecord {
        let pollutants = [
            (Pollutant::Co, 200.0),
            (Pollutant::No, 5.0),
            (Pollutant::No2, 20.0),
            (Pollutant::O3, 80.0),
            (Pollutant::So2, 10.0),
            (Pollutant::Pm2_5, 35.0),
            (Pollutant::Pm10, 60.0),
            (Pollutant::Nh3, 8.0),
        ]
        .into_iter()
        .collect();

        ObservationRecord {
            location: "Durg".into(),
            temperature_c: 25.0,
            humidity_pct: 60.0,
            pressure_hpa: 1010.0,
            wind_speed_mps: 3.2,
            description: "Haze".into(),
            pollutants,
            reported_aqi: None,
            retrieved_at: Utc::now(),
        }
    }

    #[test]
    fn vector_matches_model_layout() {
        let vector = vectorize(&record()).expect("complete record");
        assert_eq!(
            vector.as_slice(),
            &[
                25.0, 60.0, 1010.0, 3.2, 200.0, 5.0, 20.0, 80.0, 10.0, 35.0, 60.0, 8.0, 35.0,
                60.0, 20.0, 80.0, 10.0, 8.0
            ]
        );
    }

    #[test]
    fn missing_pollutant_is_rejected() {
        let mut rec = record();
        rec.pollutants.remove(&Pollutant::Nh3);

        let err = vectorize(&rec).unwrap_err();
        assert_eq!(
            err,
            Error::IncompleteObservation { location: "Durg".into(), field: "NH3".into() }
        );
        // deterministic
        assert_eq!(vectorize(&rec).unwrap_err(), err);
    }

    #[test]
    fn zero_is_a_value_not_a_gap() {
        let mut rec = record();
        rec.pollutants.insert(Pollutant::So2, 0.0);
        rec.wind_speed_mps = 0.0;

        let vector = vectorize(&rec).expect("zeros are data");
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        assert_eq!(vector.as_slice()[3], 0.0);
        assert_eq!(vector.as_slice()[8], 0.0);
        assert_eq!(vector.as_slice()[16], 0.0);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = FeatureVector::try_from(vec![1.0; 12]).unwrap_err();
        assert_eq!(err, Error::FeatureLengthMismatch { expected: 18, actual: 12 });
    }

    #[test]
    fn layout_names() {
        let names: Vec<_> = FEATURE_LAYOUT.iter().map(Feature::name).collect();
        assert_eq!(&names[..5], &["temperature", "humidity", "pressure", "wind_speed", "CO"]);
        assert_eq!(&names[12..], &["PM2.5", "PM10", "NO2", "O3", "SO2", "NH3"]);
    }
}
