//! Race-Harvest main entry point
//!
//! This is the command-line interface for the race result scraper.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use race_harvest::config::{load_config_with_hash, Config};
use race_harvest::discovery::UrlDiscovery;
use race_harvest::output::{print_report, RunReport};
use race_harvest::pipeline::{Pipeline, RetryCoordinator};
use race_harvest::request::{RaceCode, ScrapeRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Race-Harvest: a resilient batch scraper for race result pages
///
/// Discovers result pages by course/year or by date, extracts their fields
/// into CSV stores, and retries the URLs that failed.
#[derive(Parser, Debug)]
#[command(name = "race-harvest")]
#[command(version)]
#[command(about = "A resilient batch scraper for race result pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "settings.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover result pages and scrape them into fresh stores
    Scrape {
        /// Course ids to scrape (see the [[course]] table)
        #[arg(long = "course", value_name = "ID", conflicts_with = "date")]
        courses: Vec<String>,

        /// Region code; selects every course of that region
        #[arg(long)]
        region: Option<String>,

        /// Year or inclusive range, e.g. 2023 or 2019-2023
        #[arg(long, conflicts_with = "date")]
        years: Option<String>,

        /// Date or inclusive range, e.g. 2024/03/15 or 2024/03/01-2024/03/15
        #[arg(long, requires = "region")]
        date: Option<String>,

        /// Race type
        #[arg(long, value_enum, default_value_t = RaceCode::Flat)]
        code: RaceCode,
    },

    /// Re-run the URLs listed in failure stores
    Retry {
        /// Failure store files, or directories searched for errors_*.csv
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        /// Where retry_results.csv and retry_errors.csv are written
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Fetch one URL and print how the page is classified
    Check {
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Arc::new(cfg)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Scrape {
            courses,
            region,
            years,
            date,
            code,
        } => {
            let request = match date {
                Some(dates) => {
                    let region = region.context("--date requires --region")?;
                    ScrapeRequest::for_dates(&config, &dates, &region, code)?
                }
                None => {
                    let years = years.context("--years is required unless --date is given")?;
                    if courses.is_empty() && region.is_none() {
                        bail!("select courses with --course or --region");
                    }
                    ScrapeRequest::for_courses(&config, &courses, region.as_deref(), &years, code)?
                }
            };
            handle_scrape(config, request).await
        }
        Command::Retry { paths, output_dir } => {
            let output_dir = output_dir.unwrap_or_else(|| default_retry_dir(&paths));
            handle_retry(config, &paths, &output_dir).await
        }
        Command::Check { url } => handle_check(config, &url).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("race_harvest=info,warn"),
            1 => EnvFilter::new("race_harvest=debug,info"),
            2 => EnvFilter::new("race_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// `retry` subdirectory next to the first failure source
fn default_retry_dir(paths: &[PathBuf]) -> PathBuf {
    let first = paths.first().map(PathBuf::as_path).unwrap_or(Path::new("."));
    let base = if first.is_dir() {
        first
    } else {
        first.parent().unwrap_or(Path::new("."))
    };
    base.join("retry")
}

/// Runs a future to completion unless the operator interrupts it
///
/// Every row already written is flushed, so an interrupted run leaves complete
/// stores behind.
async fn until_interrupted<F>(run: F) -> anyhow::Result<Option<RunReport>>
where
    F: std::future::Future<Output = race_harvest::Result<RunReport>>,
{
    tokio::select! {
        result = run => Ok(Some(result?)),
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; stores hold every row written so far");
            Ok(None)
        }
    }
}

/// Handles the scrape command: discovery followed by the pipeline
async fn handle_scrape(config: Arc<Config>, request: ScrapeRequest) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(Arc::clone(&config))?;
    let discovery = UrlDiscovery::new(pipeline.fetcher().clone(), config.site.clone())?;

    let urls = discovery.discover(&request).await;
    if urls.is_empty() {
        tracing::warn!("No result URLs discovered; nothing to scrape");
        return Ok(());
    }

    let paths = request.store_paths(Path::new(&config.output.data_dir));
    tracing::info!("Writing records to {}", paths.records.display());

    if let Some(report) = until_interrupted(pipeline.run_to_stores(&urls, &paths)).await? {
        print_report(&report);
    }
    Ok(())
}

/// Handles the retry command
async fn handle_retry(
    config: Arc<Config>,
    sources: &[PathBuf],
    output_dir: &Path,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(config)?;
    let coordinator = RetryCoordinator::new(&pipeline);

    if let Some(report) = until_interrupted(coordinator.retry_sources(sources, output_dir)).await? {
        print_report(&report);
    }
    Ok(())
}

/// Handles the check command
async fn handle_check(config: Arc<Config>, url: &str) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(config)?;
    let fetch = pipeline.fetcher().fetch(url).await;
    let verdict = pipeline.validator().classify(&fetch);

    println!("URL:     {}", url);
    if fetch.transport_error.is_none() {
        println!("Status:  {}", fetch.status_code);
        println!("Final:   {}", fetch.final_url);
    }
    println!("Verdict: {}", verdict);
    Ok(())
}
