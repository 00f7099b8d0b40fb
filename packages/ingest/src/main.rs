#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for fetching the RDW parking datasets and aggregating them into
//! per-area cost statistics.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use parking_stats_analytics::location_cost_data;
use parking_stats_analytics_models::{AreaStat, LocationCostParams};
use parking_stats_cli_utils::{IndicatifProgress, MultiProgress};
use parking_stats_database::cache::JsonFileCache;
use parking_stats_ingest::{CacheGate, Pipeline, clean_data};
use parking_stats_parking_models::ParkingArea;
use parking_stats_source::SocrataDataSource;
use parking_stats_source::area_mapping::KeywordAreaClassifier;
use parking_stats_source::registry::{all_datasets, parking_datasets};

#[derive(Parser)]
#[command(name = "parking_stats_ingest", about = "RDW parking data ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, join and normalize the parking datasets
    Clean {
        /// Write the normalized areas to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Ignore the cache and fetch fresh data
        #[arg(long)]
        refresh: bool,

        /// Store the fresh result in the cache
        #[arg(long)]
        write_cache: bool,

        /// Maximum number of records to fetch per dataset
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Print average hourly cost and charging points per area
    Stats {
        /// Read normalized areas from this file instead of running the pipeline
        #[arg(long)]
        input: Option<PathBuf>,

        /// Sort areas by ascending average hourly cost
        #[arg(long)]
        sorted: bool,

        /// Ignore the cache and fetch fresh data
        #[arg(long)]
        refresh: bool,
    },
    /// List the configured datasets
    Datasets,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = parking_stats_cli_utils::init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            output,
            refresh,
            write_cache,
            limit,
        } => {
            let entities = run_pipeline(&multi, refresh, write_cache, limit).await?;
            let json = serde_json::to_string_pretty(&entities)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    log::info!(
                        "Wrote {} parking areas to {}",
                        entities.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Commands::Stats {
            input,
            sorted,
            refresh,
        } => {
            let data = match input {
                Some(path) => read_entities(&path)?,
                None => run_pipeline(&multi, refresh, false, None).await?,
            };

            let stats = location_cost_data(&LocationCostParams {
                data,
                is_sorted: sorted,
            });
            print_stats(&stats);
        }
        Commands::Datasets => {
            println!("{:<12} {:<16} NAME", "ID", "KIND");
            println!("{}", "-".repeat(60));
            for dataset in all_datasets() {
                println!("{:<12} {:<16} {}", dataset.id, dataset.kind, dataset.name);
            }
        }
    }

    Ok(())
}

async fn run_pipeline(
    multi: &MultiProgress,
    refresh: bool,
    write_cache: bool,
    limit: Option<u64>,
) -> Result<Vec<ParkingArea>, Box<dyn std::error::Error>> {
    let source = SocrataDataSource::new()
        .with_limit(limit)
        .with_progress(IndicatifProgress::records_bar(multi, "Fetching datasets"));
    let cache = JsonFileCache::open_default().with_writes(write_cache);
    let classifier = KeywordAreaClassifier::embedded();
    let datasets = parking_datasets();

    let pipeline = Pipeline {
        source: &source,
        cache: &cache,
        classifier: &classifier,
        datasets: &datasets,
    };

    log::debug!("Cache file: {}", cache.path().display());

    Ok(clean_data(&pipeline, CacheGate::from_env(refresh)).await?)
}

fn read_entities(path: &Path) -> Result<Vec<ParkingArea>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn print_stats(stats: &[AreaStat]) {
    println!("{:<24} {:>12} {:>16}", "AREA", "AVG €/HOUR", "CHARGING POINTS");
    println!("{}", "-".repeat(54));
    for stat in stats {
        println!(
            "{:<24} {:>12.2} {:>16}",
            stat.area.as_deref().unwrap_or("(unclassified)"),
            stat.average_hourly_cost,
            stat.average_charging_points
        );
    }
}
