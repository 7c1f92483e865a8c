use std::path::PathBuf;

use anyhow::Context;
use aqi_core::{Config, Orchestrator, Predictor, SEVERITY_BANDS, source_from_config};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "aqi", version, about = "Air quality reports and AQI predictions")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key, model path and primary location.
    Configure,

    /// Full report for the primary location plus predictions for every other city.
    Report {
        /// Override the configured model artifact.
        #[arg(long)]
        model: Option<PathBuf>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Predict the AQI category for a single city.
    Predict {
        /// City name, e.g. "Durg".
        city: String,

        #[arg(long)]
        model: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// List the monitored cities.
    Locations,

    /// Show the AQI severity bands.
    Bands,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Report { model, json } => {
                let config = Config::load()?;
                let registry = config.registry()?;
                let source = source_from_config(&config)?;
                let predictor = Predictor::load(&model.unwrap_or_else(|| config.model_path.clone()));

                let report = Orchestrator::new(source.as_ref(), &predictor).run_all(&registry).await;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print!("{}", render::run_report(&report));
                }
                Ok(())
            }
            Command::Predict { city, model, json } => {
                let config = Config::load()?;
                let source = source_from_config(&config)?;
                let predictor = Predictor::load(&model.unwrap_or_else(|| config.model_path.clone()));

                let report = Orchestrator::new(source.as_ref(), &predictor)
                    .secondary(&city)
                    .await
                    .with_context(|| format!("Could not predict AQI for '{city}'"))?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("{}", render::simple_report(&report));
                }
                Ok(())
            }
            Command::Locations => {
                let registry = Config::load()?.registry()?;
                print!("{}", render::locations(&registry));
                Ok(())
            }
            Command::Bands => {
                print!("{}", render::bands(&SEVERITY_BANDS));
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let model_path = Text::new("Model artifact path:")
        .with_default(&config.model_path.display().to_string())
        .prompt()
        .context("Failed to read model path")?;
    config.model_path = PathBuf::from(model_path);

    let names: Vec<&str> = config.registry()?.all().iter().map(|loc| loc.name).collect();
    let current = names.iter().position(|name| *name == config.primary).unwrap_or(0);
    let primary = Select::new("Primary location (reported AQI):", names)
        .with_starting_cursor(current)
        .prompt()
        .context("Failed to read primary location")?;
    config.primary = primary.to_string();

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
