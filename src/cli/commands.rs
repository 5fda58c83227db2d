use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::processors::{AggregationEngine, DateRangeStreamer, TemperatureSynthesizer};
use crate::store::{
    CityCatalog, FileCityCatalog, JsonReadingStore, MemoryReadingStore, ReadingStore,
};
use crate::utils::progress::ProgressReporter;
use crate::utils::time::{current_hour, parse_city_time};
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::Level;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Temp {
            city,
            date,
            duration,
            in_memory,
            quiet,
        } => {
            let city = city.unwrap_or_else(|| settings.default_city.clone());
            let catalog = Arc::new(FileCityCatalog::new(&settings.cities_path())?);

            let store: Arc<dyn ReadingStore> = if in_memory {
                Arc::new(MemoryReadingStore::new())
            } else {
                Arc::new(JsonReadingStore::new(&settings.data_dir)?)
            };

            let mut synthesizer = TemperatureSynthesizer::new(catalog.clone(), store);
            if let Some(seed) = settings.seed {
                synthesizer = synthesizer.with_seed(seed);
            }
            let synthesizer = Arc::new(synthesizer);

            let profile = catalog.lookup(&city)?;
            let tz = profile.tz()?;
            let at = match date {
                Some(text) => parse_city_time(&text, &tz)?,
                None => current_hour(&tz)?,
            };
            let code = profile.code.clone();

            match duration {
                None => {
                    tracing::info!("Reading {} at {}", code, at.to_rfc3339());
                    let reading =
                        tokio::task::spawn_blocking(move || synthesizer.get(&code, &at)).await??;
                    print_json(&reading)?;
                }
                Some(duration) => {
                    tracing::info!(
                        "Aggregating {} over {} ending {}",
                        code,
                        duration,
                        at.to_rfc3339()
                    );
                    let engine = AggregationEngine::new(synthesizer).with_streamer(
                        DateRangeStreamer::new().with_batch_size(settings.batch_size),
                    );

                    let result = tokio::task::spawn_blocking(move || {
                        let progress = ProgressReporter::new(
                            0,
                            &format!("Synthesizing {} for {}", duration, code),
                            quiet,
                        );
                        let result = engine.aggregate_period(&code, &at, &duration, Some(&progress));
                        progress.finish_and_clear();
                        result
                    })
                    .await??;

                    tracing::info!("{}", result.summary());
                    print_json(&result)?;
                }
            }
        }

        Commands::Cities => {
            let catalog = FileCityCatalog::new(&settings.cities_path())?;
            let cities = catalog.cities()?;
            tracing::info!("{} cities in {}", cities.len(), catalog.path().display());
            print_json(&cities)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Install the fmt subscriber, on stderr unless a log file is given.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Logging already initialised");
    }
    Ok(())
}
