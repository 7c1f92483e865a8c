//! Human-friendly text output.

use std::fmt::Write;

use aqi_core::{AqiSource, FullReport, LocationRegistry, RunReport, SeverityBand, SimpleReport};
use chrono::{DateTime, Local, Utc};

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn full_report(report: &FullReport) -> String {
    let obs = &report.observation;
    let source = match report.source {
        AqiSource::Reported => "reported",
        AqiSource::Predicted => "predicted",
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", obs.location, obs.description);
    let _ = writeln!(out, "  Temperature   {:.1} °C", obs.temperature_c);
    let _ = writeln!(out, "  Humidity      {:.0} %", obs.humidity_pct);
    let _ = writeln!(out, "  Pressure      {:.0} hPa", obs.pressure_hpa);
    let _ = writeln!(out, "  Wind speed    {:.1} m/s", obs.wind_speed_mps);
    let _ = writeln!(
        out,
        "  AQI           {} - {} ({source}) {}",
        report.category, report.band.label, report.band.color
    );
    let _ = writeln!(out, "                {}", report.band.description);
    let _ = writeln!(out, "  Pollutants (µg/m³)");
    for (pollutant, value) in &obs.pollutants {
        let _ = writeln!(out, "    {:<6} {value:>8.2}", pollutant.label());
    }
    let _ = writeln!(out, "  Last updated  {}", local_time(obs.retrieved_at));
    out
}

pub fn simple_report(report: &SimpleReport) -> String {
    format!(
        "{:<12} {} - {:<9} (updated {})",
        report.location,
        report.category,
        report.band.label,
        local_time(report.retrieved_at)
    )
}

pub fn run_report(report: &RunReport) -> String {
    let mut out = String::new();

    match &report.primary {
        Some(primary) => out.push_str(&full_report(primary)),
        None => out.push_str("Primary location unavailable\n"),
    }

    out.push_str("\nNearby cities (predicted AQI)\n");
    if let Some(reason) = &report.model_unavailable {
        let _ = writeln!(out, "  Predictions disabled: {reason}");
    } else if report.secondaries.is_empty() {
        out.push_str("  none\n");
    }
    for simple in &report.secondaries {
        let _ = writeln!(out, "  {}", simple_report(simple));
    }

    if !report.failures.is_empty() {
        out.push_str("\nFailed\n");
        for failure in &report.failures {
            let _ = writeln!(out, "  {}: {}", failure.location, failure.error);
        }
    }
    out
}

pub fn locations(registry: &LocationRegistry) -> String {
    let mut out = String::new();
    for loc in registry.all() {
        let marker = if registry.is_primary(loc.name) { " (primary)" } else { "" };
        let _ = writeln!(
            out,
            "{:<12} {:>8.4}, {:>8.4}{marker}",
            loc.name, loc.coordinate.latitude, loc.coordinate.longitude
        );
    }
    out
}

pub fn bands(bands: &[SeverityBand]) -> String {
    let mut out = String::new();
    for band in bands {
        let _ = writeln!(out, "{} - {:<9} {}  {}", band.category, band.label, band.color, band.description);
    }
    out
}
