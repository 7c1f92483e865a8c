use std::{collections::HashMap, time::Duration};

use anyhow::{Context, anyhow, ensure};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    location::{Coordinate, LocationRegistry},
    model::{AqiCategory, ObservationRecord, Pollutant},
};

use super::ObservationSource;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Current weather plus current air pollution from OpenWeatherMap.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    base_url: String,
    registry: LocationRegistry,
    timeout: Duration,
    http: Client,
}

impl OpenWeatherSource {
    /// Requests are bounded by [`DEFAULT_TIMEOUT`] until `with_timeout` says otherwise.
    pub fn new(api_key: String, registry: LocationRegistry) -> anyhow::Result<Self> {
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            registry,
            timeout: DEFAULT_TIMEOUT,
            http: build_client(DEFAULT_TIMEOUT)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request; a timeout surfaces as `DataUnavailable`.
    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        ensure!(!timeout.is_zero(), "Request timeout must be greater than zero");
        self.http = build_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        coordinate: Coordinate,
        extra: &[(&str, &str)],
    ) -> anyhow::Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(url = %url, lat = coordinate.latitude, lon = coordinate.longitude, "Requesting OpenWeather");

        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", self.api_key.as_str())])
            .query(extra)
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeather {endpoint} JSON"))
    }

    async fn fetch_weather(&self, coordinate: Coordinate) -> anyhow::Result<OwWeatherResponse> {
        self.get_json("weather", coordinate, &[("units", "metric")]).await
    }

    async fn fetch_pollution(&self, coordinate: Coordinate) -> anyhow::Result<OwPollutionResponse> {
        self.get_json("air_pollution", coordinate, &[]).await
    }

    fn merge(
        &self,
        location: &str,
        weather: OwWeatherResponse,
        pollution: OwPollutionResponse,
    ) -> anyhow::Result<ObservationRecord> {
        let description = weather
            .weather
            .first()
            .map(|w| title_case(&w.description))
            .ok_or_else(|| anyhow!("OpenWeather weather response contained no conditions"))?;

        let entry = pollution
            .list
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather air_pollution response contained no data"))?;

        let pollutants = entry
            .components
            .iter()
            .filter_map(|(key, value)| Some((Pollutant::from_key(key)?, (*value)?)))
            .collect();

        let reported_aqi = if self.registry.is_primary(location) {
            let aqi = AqiCategory::new(entry.main.aqi)
                .with_context(|| format!("OpenWeather reported AQI {}", entry.main.aqi))?;
            Some(aqi)
        } else {
            None
        };

        Ok(ObservationRecord {
            location: location.to_string(),
            temperature_c: weather.main.temp,
            humidity_pct: weather.main.humidity,
            pressure_hpa: weather.main.pressure,
            wind_speed_mps: weather.wind.speed,
            description,
            pollutants,
            reported_aqi,
            retrieved_at: Utc::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeatherResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwPollutionMain {
    aqi: i64,
}

#[derive(Debug, Deserialize)]
struct OwPollutionEntry {
    main: OwPollutionMain,
    components: HashMap<String, Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OwPollutionResponse {
    list: Vec<OwPollutionEntry>,
}

#[async_trait]
impl ObservationSource for OpenWeatherSource {
    #[instrument(skip(self))]
    async fn fetch(&self, location: &str) -> Result<ObservationRecord> {
        let known = self.registry.get(location)?;

        let (weather, pollution) = tokio::try_join!(
            self.fetch_weather(known.coordinate),
            self.fetch_pollution(known.coordinate),
        )
        .map_err(|err| Error::data_unavailable(known.name, err))?;

        self.merge(known.name, weather, pollution)
            .map_err(|err| Error::data_unavailable(known.name, err))
    }
}

fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder().timeout(timeout).build().context("Failed to build HTTP client")
}

/// "broken clouds" → "Broken Clouds".
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect::<String>()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("broken clouds"), "Broken Clouds");
        assert_eq!(title_case("HAZE"), "Haze");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn truncate_long_body() {
        let body = "x".repeat(250);
        let out = truncate_body(&body);
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let source = OpenWeatherSource::new("KEY".into(), LocationRegistry::default())
            .unwrap()
            .with_base_url("http://localhost:1234/");
        assert_eq!(source.base_url, "http://localhost:1234");
    }

    #[test]
    fn new_source_has_bounded_timeout() {
        let source = OpenWeatherSource::new("KEY".into(), LocationRegistry::default()).unwrap();
        assert_eq!(source.timeout(), DEFAULT_TIMEOUT);

        let source = source.with_timeout(Duration::from_secs(3)).unwrap();
        assert_eq!(source.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = OpenWeatherSource::new("KEY".into(), LocationRegistry::default())
            .unwrap()
            .with_timeout(Duration::ZERO)
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[tokio::test]
    async fn unknown_location_fails_before_network() {
        let source = OpenWeatherSource::new("KEY".into(), LocationRegistry::default())
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = source.fetch("Atlantis").await.unwrap_err();
        assert_eq!(err, Error::UnknownLocation("Atlantis".into()));
    }
}
