use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::Result,
    model::ObservationRecord,
    provider::openweather::OpenWeatherSource,
};

pub mod openweather;

/// Something that can produce a fresh observation for a registered location.
#[async_trait]
pub trait ObservationSource: Send + Sync + Debug {
    /// Fails with `UnknownLocation` for names outside the registry and
    /// `DataUnavailable` for any upstream problem.
    async fn fetch(&self, location: &str) -> Result<ObservationRecord>;
}

/// Construct the OpenWeatherMap-backed source from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn ObservationSource>> {
    let api_key = config.resolve_api_key()?;
    let registry = config.registry()?;

    let source = OpenWeatherSource::new(api_key, registry)?
        .with_base_url(config.base_url.clone())
        .with_timeout(config.timeout())?;

    Ok(Box::new(source))
}
