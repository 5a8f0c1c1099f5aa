//! # Fixture Fetcher Main Driver
//!
//! ## Purpose
//! Command-line entry point for the fixture fetcher. Loads configuration,
//! initializes logging, runs the fetch and consolidation pipeline for the
//! requested date range, and reports run statistics.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments, environment variables
//! - **Output**: Consolidated XML document and a statistics summary
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Build the pipeline (transport, cache, scheduler, consolidator)
//! 4. Fetch the date range and consolidate the results
//! 5. Print the statistics summary

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Arg, ArgAction, Command};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sports_fixture_fetcher::{Config, FixturePipeline, RunStatistics};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("fixture-fetcher")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetches sports fixture data with caching and consolidates it into one XML document")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("start")
                .short('s')
                .long("start")
                .value_name("DATE")
                .help("Start date, inclusive (YYYY-MM-DD or 'DD Mon YYYY')")
                .required_unless_present("clear-cache")
                .requires("end"),
        )
        .arg(
            Arg::new("end")
                .short('e')
                .long("end")
                .value_name("DATE")
                .help("End date, inclusive (YYYY-MM-DD or 'DD Mon YYYY')")
                .required_unless_present("clear-cache")
                .requires("start"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output file name, relative to the cache directory"),
        )
        .arg(
            Arg::new("sequential")
                .long("sequential")
                .help("Process dates one at a time instead of in parallel")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("clear-cache")
                .long("clear-cache")
                .help("Remove all cached responses before doing anything else")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the final statistics as JSON")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = Config::from_file(config_path)?;

    if let Some(output) = matches.get_one::<String>("output") {
        config.fetch.output_file = output.clone();
    }
    if matches.get_flag("sequential") {
        config.fetch.max_workers = 1;
    }

    init_logging(&config)?;
    info!("Starting fixture fetcher v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path);

    let pipeline = FixturePipeline::new(config)?;

    if matches.get_flag("clear-cache") {
        let removed = pipeline.clear_cache().await?;
        info!("Cache cleared ({} entries removed)", removed);
        if matches.get_one::<String>("start").is_none() {
            return Ok(());
        }
    }

    let start = parse_date(matches.get_one::<String>("start").unwrap())?;
    let end = parse_date(matches.get_one::<String>("end").unwrap())?;

    let report = pipeline
        .run(start, end)
        .await
        .context("fetch run failed")?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report.statistics)?);
    } else {
        print_summary(&report.statistics);
    }

    Ok(())
}

/// Parse a date in ISO form, falling back to the API's day-month-year form
fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d %b %Y"))
        .with_context(|| format!("unrecognized date '{}', expected YYYY-MM-DD or 'DD Mon YYYY'", raw))
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .with_context(|| format!("invalid log level: {}", config.logging.level))?;

    let file_layer = match &config.logging.file_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {:?}", path))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    Ok(())
}

/// Print the end-of-run statistics block
fn print_summary(stats: &RunStatistics) {
    println!("Processing complete");
    println!("  dates processed: {}", stats.dates_processed);
    println!("  API calls made:  {}", stats.api_calls);
    println!("  cache hits:      {}", stats.cache_hits);
    println!("  failed requests: {}", stats.failed_requests);
    println!("  cache hit rate:  {:.1}%", stats.cache_hit_rate * 100.0);
    println!("  fixtures found:  {}", stats.total_fixtures);
    if let Some(path) = &stats.output_path {
        println!("  output saved to: {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(
            parse_date("2024-09-26").unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 26).unwrap()
        );
    }

    #[test]
    fn test_parse_date_day_month_year() {
        assert_eq!(
            parse_date("26 Sep 2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 26).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("sometime next week").is_err());
    }
}
