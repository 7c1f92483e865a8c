//! Fetch → vectorize → predict → classify, per location.

use futures::future::join_all;
use tracing::{info, warn};

use crate::{
    error::Result,
    features::vectorize,
    location::LocationRegistry,
    model::{
        AqiCategory, AqiSource, FullReport, LocationFailure, ObservationRecord, RunReport,
        SimpleReport,
    },
    predictor::Predictor,
    provider::ObservationSource,
    severity::classify,
};

/// Runs one pipeline invocation against a source and an already-loaded predictor.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator<'a> {
    source: &'a dyn ObservationSource,
    predictor: &'a Predictor,
}

impl<'a> Orchestrator<'a> {
    pub fn new(source: &'a dyn ObservationSource, predictor: &'a Predictor) -> Self {
        Self { source, predictor }
    }

    /// Upstream AQI always wins; the model only fills in when the source
    /// returned none.
    fn categorize(&self, observation: &ObservationRecord) -> Result<(AqiCategory, AqiSource)> {
        match observation.reported_aqi {
            Some(category) => Ok((category, AqiSource::Reported)),
            None => {
                let features = vectorize(observation)?;
                let category = self.predictor.predict_category(features.as_slice())?;
                Ok((category, AqiSource::Predicted))
            }
        }
    }

    /// Full report for the primary location.
    pub async fn primary(&self, location: &str) -> Result<FullReport> {
        let observation = self.source.fetch(location).await?;
        let (category, source) = self.categorize(&observation)?;

        Ok(FullReport { category, source, band: classify(category), observation })
    }

    /// Category-only report. Secondaries are predicted; a location the
    /// source reports an AQI for (the primary) keeps that value.
    pub async fn secondary(&self, location: &str) -> Result<SimpleReport> {
        let observation = self.source.fetch(location).await?;
        let (category, source) = self.categorize(&observation)?;

        Ok(SimpleReport {
            location: observation.location,
            category,
            source,
            band: classify(category),
            retrieved_at: observation.retrieved_at,
        })
    }

    /// Primary plus every secondary. Failures are collected per location and
    /// never abort the batch.
    pub async fn run(&self, primary: &str, secondaries: &[&str]) -> RunReport {
        let mut report = RunReport {
            primary: None,
            secondaries: Vec::with_capacity(secondaries.len()),
            failures: Vec::new(),
            model_unavailable: self.predictor.unavailable_reason().map(str::to_string),
        };

        match self.primary(primary).await {
            Ok(full) => report.primary = Some(full),
            Err(error) => {
                warn!(location = primary, error = %error, "Primary location failed");
                if !error.is_process_fatal() {
                    report.failures.push(LocationFailure { location: primary.to_string(), error });
                }
            }
        }

        if let Some(reason) = &report.model_unavailable {
            warn!(reason = %reason, "Model unavailable, skipping {} predictions", secondaries.len());
            return report;
        }

        let results = join_all(secondaries.iter().map(|name| self.secondary(name))).await;

        for (name, result) in secondaries.iter().zip(results) {
            match result {
                Ok(simple) => report.secondaries.push(simple),
                Err(error) => {
                    warn!(location = name, error = %error, "Secondary location failed");
                    report.failures.push(LocationFailure { location: name.to_string(), error });
                }
            }
        }

        info!(
            secondaries = report.secondaries.len(),
            failures = report.failures.len(),
            "Pipeline run finished"
        );
        report
    }

    /// `run` over the registry: its primary, then every other entry in order.
    pub async fn run_all(&self, registry: &LocationRegistry) -> RunReport {
        let secondaries = registry.secondaries();
        self.run(registry.primary(), &secondaries).await
    }
}
