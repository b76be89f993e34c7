//! Tunable thresholds for the analytics engine.
//!
//! Defaults live in `config/default.toml`, which is embedded at compile
//! time. Override files only need the keys they change.

use std::path::Path;

use chrono::{
    DateTime, Datelike as _, FixedOffset, Local, Offset as _, TimeZone, Timelike as _, Utc,
};
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::safety::MAX_SAFETY_HOURS_BACK;

/// Default configuration, embedded at compile time.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Timezone used to derive hour-of-day and day-of-week from timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketTimezone {
    /// Timezone of the machine running the analysis.
    Local,
    /// Coordinated Universal Time.
    Utc,
    /// Fixed offset east of UTC, in minutes.
    FixedOffsetMinutes(i32),
}

impl BucketTimezone {
    /// Returns `(hour, day_of_week)` for `time`, with Sunday as day 0.
    #[must_use]
    pub fn hour_and_weekday(self, time: DateTime<Utc>) -> (u32, u32) {
        match self {
            Self::Local => hour_and_weekday_in(time, &Local),
            Self::Utc => hour_and_weekday_in(time, &Utc),
            Self::FixedOffsetMinutes(minutes) => hour_and_weekday_in(time, &fixed_offset(minutes)),
        }
    }

    /// Formats `time` as an hour label like `"14:00"`.
    #[must_use]
    pub fn hour_label(self, time: DateTime<Utc>) -> String {
        let (hour, _) = self.hour_and_weekday(time);
        format!("{hour:02}:00")
    }
}

fn hour_and_weekday_in<Tz: TimeZone>(time: DateTime<Utc>, tz: &Tz) -> (u32, u32) {
    let local = time.with_timezone(tz);
    (local.hour(), local.weekday().num_days_from_sunday())
}

/// Out-of-range offsets fall back to UTC.
fn fixed_offset(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| {
            log::warn!("Ignoring out-of-range timezone offset {minutes} minutes, using UTC");
            Utc.fix()
        })
}

/// Representative point reported for a hotspot cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotspotCenter {
    /// Coordinates of the first report bucketed into the cell.
    FirstReport,
    /// Mean coordinates of every report in the cell.
    Centroid,
}

/// How the per-vibe marginal probabilities are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginalEstimate {
    /// Both marginals equal the joint probability. Produces a coefficient
    /// of exactly 0 or 1 for every pair.
    Joint,
    /// Each marginal is the share of sampled cells containing that vibe.
    Independent,
}

/// Thresholds and switches for every analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Hotspot grid cell size in degrees.
    #[serde(default = "default_hotspot_cell_size")]
    pub hotspot_cell_size: f64,
    /// Minimum recent reports for a hotspot.
    #[serde(default = "default_hotspot_min_reports")]
    pub hotspot_min_reports: usize,
    /// Minimum percentage increase for a hotspot.
    #[serde(default = "default_hotspot_min_increase_pct")]
    pub hotspot_min_increase_pct: f64,
    /// Recent window length in days.
    #[serde(default = "default_hotspot_days_back")]
    pub hotspot_days_back: u32,
    /// Representative point of a hotspot cell.
    #[serde(default = "default_hotspot_center")]
    pub hotspot_center: HotspotCenter,
    /// Correlation grid cell size in degrees.
    #[serde(default = "default_correlation_cell_size")]
    pub correlation_cell_size: f64,
    /// Minimum reports in a cell for it to be sampled.
    #[serde(default = "default_correlation_min_cluster_size")]
    pub correlation_min_cluster_size: usize,
    /// Minimum sampled cells before any pair is reported.
    #[serde(default = "default_correlation_min_sample")]
    pub correlation_min_sample: usize,
    /// Minimum absolute coefficient for a reported pair.
    #[serde(default = "default_correlation_min_strength")]
    pub correlation_min_strength: f64,
    /// Marginal probability estimate.
    #[serde(default = "default_correlation_marginals")]
    pub correlation_marginals: MarginalEstimate,
    /// Share of the busiest cell at which a cell counts as a peak.
    #[serde(default = "default_peak_hour_ratio")]
    pub peak_hour_ratio: f64,
    /// Hours covered by the safety trend series.
    #[serde(default = "default_safety_hours_back")]
    pub safety_hours_back: u32,
    /// Trailing points compared for the trend direction.
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
    /// Score change needed to leave `stable`.
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: i32,
    /// Timezone for hour/day bucketing.
    #[serde(default = "default_timezone")]
    pub timezone: BucketTimezone,
    /// Truncates the busiest-hours list in the combined analysis.
    #[serde(default)]
    pub busiest_hours_limit: Option<usize>,
}

const fn default_hotspot_cell_size() -> f64 {
    0.01
}

const fn default_hotspot_min_reports() -> usize {
    3
}

const fn default_hotspot_min_increase_pct() -> f64 {
    25.0
}

const fn default_hotspot_days_back() -> u32 {
    7
}

const fn default_hotspot_center() -> HotspotCenter {
    HotspotCenter::FirstReport
}

const fn default_correlation_cell_size() -> f64 {
    0.005
}

const fn default_correlation_min_cluster_size() -> usize {
    2
}

const fn default_correlation_min_sample() -> usize {
    5
}

const fn default_correlation_min_strength() -> f64 {
    0.1
}

const fn default_correlation_marginals() -> MarginalEstimate {
    MarginalEstimate::Joint
}

const fn default_peak_hour_ratio() -> f64 {
    0.7
}

const fn default_safety_hours_back() -> u32 {
    24
}

const fn default_trend_window() -> usize {
    3
}

const fn default_trend_threshold() -> i32 {
    5
}

const fn default_timezone() -> BucketTimezone {
    BucketTimezone::Local
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            hotspot_cell_size: default_hotspot_cell_size(),
            hotspot_min_reports: default_hotspot_min_reports(),
            hotspot_min_increase_pct: default_hotspot_min_increase_pct(),
            hotspot_days_back: default_hotspot_days_back(),
            hotspot_center: default_hotspot_center(),
            correlation_cell_size: default_correlation_cell_size(),
            correlation_min_cluster_size: default_correlation_min_cluster_size(),
            correlation_min_sample: default_correlation_min_sample(),
            correlation_min_strength: default_correlation_min_strength(),
            correlation_marginals: default_correlation_marginals(),
            peak_hour_ratio: default_peak_hour_ratio(),
            safety_hours_back: default_safety_hours_back(),
            trend_window: default_trend_window(),
            trend_threshold: default_trend_threshold(),
            timezone: default_timezone(),
            busiest_hours_limit: None,
        }
    }
}

impl AnalyticsConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the TOML is malformed or a value
    /// has the wrong type, and [`ConfigError::Invalid`] if a value is out of
    /// range.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a grid cell size that is not a
    /// positive finite number, or a safety series longer than
    /// [`MAX_SAFETY_HOURS_BACK`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("hotspot_cell_size", self.hotspot_cell_size),
            ("correlation_cell_size", self.correlation_cell_size),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    message: format!("{key} must be a positive number, got {value}"),
                });
            }
        }
        if self.safety_hours_back > MAX_SAFETY_HOURS_BACK {
            return Err(ConfigError::Invalid {
                message: format!(
                    "safety_hours_back must be at most {MAX_SAFETY_HOURS_BACK}, got {}",
                    self.safety_hours_back
                ),
            });
        }
        Ok(())
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded analytics config from {}", path.display());
        Ok(config)
    }
}
