#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line runner for the community analytics engine.
//!
//! Reads a JSON export of vibe reports, runs the requested analysis and
//! prints the result as pretty JSON on stdout. Logging goes to stderr and
//! is controlled with `RUST_LOG`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use hyperapp_analytics::AnalyticsConfig;
use hyperapp_reports::{JsonFileReportSource, ReportFilter, ReportSource as _};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "hyperapp", about = "Community safety analytics over vibe reports")]
struct Cli {
    /// JSON file containing an array of reports
    #[arg(long, global = true, default_value = "reports.json")]
    reports: PathBuf,
    /// TOML file overriding the default analytics thresholds
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Only analyze reports submitted by this user
    #[arg(long, global = true)]
    user: Option<String>,
    /// Only analyze the newest N reports
    #[arg(long, global = true)]
    limit: Option<usize>,
    /// Only analyze reports created at or after this RFC 3339 instant
    #[arg(long, global = true)]
    since: Option<DateTime<Utc>>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run time patterns, hotspots and correlations together
    Analyze,
    /// Report density by day of week and hour of day
    Patterns,
    /// Grid cells with a recent surge in reports
    Hotspots {
        /// Length of the recent window in days
        #[arg(long)]
        days_back: Option<u32>,
    },
    /// Vibe categories that tend to share (or avoid) locations
    Correlations,
    /// Safety score and level, optionally around a point
    Score {
        /// Latitude of the area center
        #[arg(long, allow_negative_numbers = true, requires_all = ["lng", "radius_km"])]
        lat: Option<f64>,
        /// Longitude of the area center
        #[arg(long, allow_negative_numbers = true, requires_all = ["lat", "radius_km"])]
        lng: Option<f64>,
        /// Area radius in kilometers
        #[arg(long, requires_all = ["lat", "lng"])]
        radius_km: Option<f64>,
    },
    /// Hourly safety scores and the recent trend direction
    Trends {
        /// Number of hours covered
        #[arg(long)]
        hours_back: Option<u32>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::default(),
    };

    let source = JsonFileReportSource::new(&cli.reports);
    let filter = ReportFilter {
        user_id: cli.user.clone(),
        limit: cli.limit,
        since: cli.since,
    };
    let reports = source
        .get_reports(&filter)
        .await
        .inspect_err(|e| {
            log::error!("Failed to load reports from {}: {e}", cli.reports.display());
        })?;
    log::info!("Loaded {} reports from {}", reports.len(), source.id());

    let now = Utc::now();

    match cli.command {
        Commands::Analyze => {
            let result = hyperapp_analytics::analyze_community_with(&reports, &config, now);
            print_json(&result)?;
        }
        Commands::Patterns => {
            let patterns = hyperapp_analytics::analyze_time_patterns_with(&reports, &config);
            print_json(&patterns)?;
        }
        Commands::Hotspots { days_back } => {
            if let Some(days_back) = days_back {
                config.hotspot_days_back = days_back;
            }
            let hotspots =
                hyperapp_analytics::detect_emerging_hotspots_with(&reports, &config, now);
            print_json(&hotspots)?;
        }
        Commands::Correlations => {
            let correlations =
                hyperapp_analytics::calculate_vibe_correlations_with(&reports, &config);
            print_json(&correlations)?;
        }
        Commands::Score {
            lat,
            lng,
            radius_km,
        } => {
            let summary = match (lat, lng, radius_km) {
                (Some(lat), Some(lng), Some(radius_km)) => {
                    hyperapp_analytics::area_safety_summary(&reports, (lat, lng), radius_km)
                }
                _ => hyperapp_analytics::safety_summary(&reports),
            };
            print_json(&summary)?;
        }
        Commands::Trends { hours_back } => {
            if let Some(hours_back) = hours_back {
                config.safety_hours_back = hours_back;
            }
            let report = hyperapp_analytics::safety_trend_report_with(&reports, &config, now);
            print_json(&report)?;
        }
    }

    Ok(())
}
