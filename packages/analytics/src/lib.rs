#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Community analytics and safety-scoring engine.
//!
//! Every function here is a pure transformation of an already-fetched list
//! of [`Report`]s: nothing is cached, nothing is written, and the input is
//! never modified. Reports without coordinates are silently left out of
//! the spatial analyses.
//!
//! * [`time_patterns`] — day/hour report density and peak hours.
//! * [`hotspots`] — grid cells with a recent surge in activity.
//! * [`correlations`] — spatial co-occurrence between vibe categories.
//! * [`safety`] — safety score, level, hourly series and trend.
//!
//! [`analyze_community`] runs the first three together.

pub mod config;
pub mod correlations;
pub mod grid;
pub mod hotspots;
pub mod safety;
pub mod time_patterns;

use chrono::{DateTime, Utc};
use hyperapp_analytics_models::{AnalyticsResult, Timeframe};
use hyperapp_vibe_models::Report;
use thiserror::Error;

pub use config::AnalyticsConfig;
pub use correlations::{calculate_vibe_correlations, calculate_vibe_correlations_with};
pub use hotspots::{detect_emerging_hotspots, detect_emerging_hotspots_with};
pub use safety::{
    area_safety_summary, calculate_safety_score, calculate_safety_trends,
    calculate_safety_trends_with, safety_level, safety_summary, safety_trend,
    safety_trend_report_with,
};
pub use time_patterns::{analyze_time_patterns, analyze_time_patterns_with};

/// Errors that can occur while loading analytics configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid TOML or a value has the wrong type.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is outside its usable range.
    #[error("Invalid config value: {message}")]
    Invalid {
        /// Which key is wrong and why.
        message: String,
    },
}

/// Runs the time-pattern, hotspot and correlation analyses with the
/// default configuration, measured from the current time.
#[must_use]
pub fn analyze_community(reports: &[Report]) -> AnalyticsResult {
    analyze_community_with(reports, &AnalyticsConfig::default(), Utc::now())
}

/// Runs the time-pattern, hotspot and correlation analyses.
///
/// The analyses are independent of each other. `analyzed_timeframe` spans
/// the earliest to latest `created_at`, or is `now..now` when there are no
/// reports.
#[must_use]
pub fn analyze_community_with(
    reports: &[Report],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> AnalyticsResult {
    let mut busiest_hours = analyze_time_patterns_with(reports, config);
    if let Some(limit) = config.busiest_hours_limit {
        busiest_hours.truncate(limit);
    }

    let result = AnalyticsResult {
        busiest_hours,
        emerging_hotspots: detect_emerging_hotspots_with(reports, config, now),
        vibe_correlations: calculate_vibe_correlations_with(reports, config),
        total_reports: reports.len(),
        analyzed_timeframe: timeframe(reports, now),
    };

    log::info!(
        "Analyzed {} reports: {} hotspots, {} correlations",
        result.total_reports,
        result.emerging_hotspots.len(),
        result.vibe_correlations.len()
    );

    result
}

fn timeframe(reports: &[Report], now: DateTime<Utc>) -> Timeframe {
    let start = reports.iter().map(|r| r.created_at).min();
    let end = reports.iter().map(|r| r.created_at).max();
    Timeframe {
        start: start.unwrap_or(now),
        end: end.unwrap_or(now),
    }
}
