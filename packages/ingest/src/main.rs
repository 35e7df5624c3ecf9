#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the WFPS call log ingestion tool.

use std::path::Path;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use wfps_map_database::{LocationCacheDb, paths};
use wfps_map_features::export;
use wfps_map_geocoder::{NeighbourhoodResolver, mapbox::MapboxGeocoder};
use wfps_map_incident_models::FilterCriterion;
use wfps_map_ingest::IngestPipeline;
use wfps_map_source::{FetchOptions, parsing};

#[derive(Parser)]
#[command(name = "wfps_map_ingest", about = "WFPS call log ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the current call log once and export GeoJSON
    Sync {
        /// Only fetch records with a call time after this timestamp
        /// (e.g., "2024-01-04T00:00:00")
        #[arg(long)]
        since: Option<String>,
        /// Maximum number of records to fetch
        #[arg(long)]
        limit: Option<u64>,
        /// Filter label for the filtered export ("Vehicle Accident" or an
        /// incident type); empty means no filter
        #[arg(long)]
        filter: Option<String>,
    },
    /// Poll the call log on an interval, ingesting only new records each pass
    Watch {
        /// Seconds between polls
        #[arg(long, default_value = "300")]
        interval: u64,
        /// Only fetch records with a call time after this timestamp
        #[arg(long)]
        since: Option<String>,
        /// Maximum number of records to fetch per poll
        #[arg(long)]
        limit: Option<u64>,
        /// Filter label for the filtered export
        #[arg(long)]
        filter: Option<String>,
    },
    /// List cached neighbourhood areas
    Cache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            since,
            limit,
            filter,
        } => {
            let client = http_client()?;
            let mut pipeline = build_pipeline(&client)?;
            let options = fetch_options(since.as_deref(), limit)?;
            let criterion = FilterCriterion::from_label(filter.as_deref().unwrap_or(""));
            run_pass(&client, &mut pipeline, &options, &criterion).await?;
        }
        Commands::Watch {
            interval,
            since,
            limit,
            filter,
        } => {
            let client = http_client()?;
            let mut pipeline = build_pipeline(&client)?;
            let options = fetch_options(since.as_deref(), limit)?;
            let criterion = FilterCriterion::from_label(filter.as_deref().unwrap_or(""));

            log::info!("Polling WFPS call log every {interval}s");
            loop {
                if let Err(e) = run_pass(&client, &mut pipeline, &options, &criterion).await {
                    log::error!("Ingestion pass failed: {e}");
                }
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
        }
        Commands::Cache => {
            let cache = LocationCacheDb::open_default()?;
            let entries = cache.entries()?;
            println!(
                "{:<30} {:>10} {:>10} {:>10} {:>10}",
                "NEIGHBOURHOOD", "MIN_LON", "MIN_LAT", "MAX_LON", "MAX_LAT"
            );
            println!("{}", "-".repeat(74));
            for area in &entries {
                println!(
                    "{:<30} {:>10.5} {:>10.5} {:>10.5} {:>10.5}",
                    area.neighbourhood, area.min_lon, area.min_lat, area.max_lon, area.max_lat
                );
            }
            println!("{} cached neighbourhood(s)", entries.len());
        }
    }

    Ok(())
}

fn http_client() -> Result<reqwest::Client, Box<dyn std::error::Error>> {
    Ok(reqwest::Client::builder()
        .user_agent("wfps-map/1.0")
        .build()?)
}

/// Wires the pipeline together: durable cache, geocoder, resolver.
/// Resources are acquired once at startup and owned by the pipeline until
/// shutdown.
fn build_pipeline(client: &reqwest::Client) -> Result<IngestPipeline, Box<dyn std::error::Error>> {
    let cache = LocationCacheDb::open_default()?;
    let geocoder = MapboxGeocoder::from_env(client.clone())?;

    Ok(IngestPipeline::new(NeighbourhoodResolver::new(
        Box::new(geocoder),
        Box::new(cache),
    )))
}

fn fetch_options(
    since: Option<&str>,
    limit: Option<u64>,
) -> Result<FetchOptions, Box<dyn std::error::Error>> {
    let since = since
        .map(|s| {
            parsing::parse_socrata_date(s).ok_or_else(|| format!("Invalid --since value: {s}"))
        })
        .transpose()?;

    Ok(FetchOptions { since, limit })
}

/// One ingestion pass: fetch the current list, ingest the new records,
/// re-export the canonical and filtered GeoJSON.
async fn run_pass(
    client: &reqwest::Client,
    pipeline: &mut IngestPipeline,
    options: &FetchOptions,
    criterion: &FilterCriterion,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let batch = wfps_map_source::fetch_call_logs(client, options).await?;
    if !batch.malformed.is_empty() {
        log::warn!("Skipped {} malformed call log row(s)", batch.malformed.len());
    }

    let outcome = pipeline.ingest(&batch.records).await;
    for failure in &outcome.failures {
        log::warn!(
            "Unresolved incident {} in {:?}: {}",
            failure.incident_number,
            failure.neighbourhood,
            failure.message
        );
    }

    let canonical = pipeline.snapshot();
    let filtered = pipeline.filtered(criterion);

    let generated = paths::generated_dir();
    paths::ensure_dir(&generated)?;
    write_geojson(&generated.join("call_logs.geojson"), &canonical)?;
    write_geojson(&generated.join("call_logs_filtered.geojson"), &filtered)?;

    log::info!(
        "Ingested {} new feature(s) ({} total, {} unresolved) in {:.1}s",
        outcome.built,
        canonical.len(),
        outcome.failures.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

fn write_geojson(
    path: &Path,
    collection: &wfps_map_features::FeatureCollection,
) -> Result<(), Box<dyn std::error::Error>> {
    let geojson = export::to_geojson(collection);
    std::fs::write(path, serde_json::to_string(&geojson)?)?;
    Ok(())
}
