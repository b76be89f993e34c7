#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types produced by the community analytics engine.
//!
//! Every type here is an immutable value object derived fresh from a list
//! of reports on each call. They serialize with camelCase keys so they can
//! be handed straight to the web client.

use chrono::{DateTime, Utc};
use hyperapp_vibe_models::VibeType;
use serde::{Deserialize, Serialize};

/// Report density for one (day-of-week, hour-of-day) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePattern {
    /// Hour of day (0-23).
    pub hour: u32,
    /// Day of week (0 = Sunday).
    pub day_of_week: u32,
    /// Reports submitted in this cell.
    pub report_count: usize,
    /// Share of all reports, in percent.
    pub percentage: f64,
    /// Whether this cell is within the peak band of the busiest cell.
    pub peak_hours: bool,
}

/// A grid cell whose recent activity grew against its own history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Representative latitude of the cell.
    pub latitude: f64,
    /// Representative longitude of the cell.
    pub longitude: f64,
    /// Percentage change from the historical to the recent window.
    pub activity_change: f64,
    /// Reports in the recent window.
    pub current_reports: usize,
    /// Reports before the recent window.
    pub previous_reports: usize,
    /// Human-readable window (e.g. "last 7 days").
    pub timeframe: String,
}

/// Estimated spatial co-occurrence between two vibe categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeCorrelation {
    /// Lexicographically smaller vibe of the pair.
    pub vibe_a: VibeType,
    /// Lexicographically larger vibe of the pair.
    pub vibe_b: VibeType,
    /// Phi-style coefficient in `[-1, 1]`.
    pub correlation: f64,
    /// Confidence in `[0, 1]` derived from the sample size.
    pub confidence: f64,
    /// Number of clusters considered.
    pub sample_size: usize,
    /// Human-readable summary.
    pub description: String,
}

/// Safety score for a single hour of the trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyDataPoint {
    /// Start of the hour bucket.
    pub time: DateTime<Utc>,
    /// Score (0-100), 50 when the hour has no reports.
    pub safety_score: u8,
    /// Reports in the hour.
    pub total_reports: usize,
    /// Positive-vibe reports in the hour.
    pub positive_reports: usize,
    /// Negative-vibe reports in the hour.
    pub negative_reports: usize,
    /// Display label for the hour (e.g. "14:00").
    pub hour_label: String,
}

/// Qualitative band for a safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    /// Score of 70 or above.
    Safe,
    /// Score from 40 up to 70.
    Moderate,
    /// Score below 40.
    Caution,
    /// Negative or otherwise invalid score.
    Unknown,
}

impl SafetyLevel {
    /// Display color (hex) used by the map legend.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Safe => "#10b981",
            Self::Moderate => "#f59e0b",
            Self::Caution => "#ef4444",
            Self::Unknown => "#6b7280",
        }
    }

    /// Short explanation shown next to the score.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Safe => "Generally safe area",
            Self::Moderate => "Exercise normal caution",
            Self::Caution => "Exercise increased caution",
            Self::Unknown => "Not enough data",
        }
    }
}

impl std::fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Moderate => write!(f, "moderate"),
            Self::Caution => write!(f, "caution"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A [`SafetyLevel`] together with its presentation attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyLevelInfo {
    /// The qualitative band.
    pub level: SafetyLevel,
    /// Hex color for the band.
    pub color: String,
    /// Short explanation of the band.
    pub description: String,
}

impl From<SafetyLevel> for SafetyLevelInfo {
    fn from(level: SafetyLevel) -> Self {
        Self {
            level,
            color: level.color().to_string(),
            description: level.description().to_string(),
        }
    }
}

/// Direction of the recent safety trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyTrend {
    /// Score rose by more than the threshold.
    Improving,
    /// Score fell by more than the threshold.
    Declining,
    /// Score moved within the threshold.
    Stable,
    /// Not enough data points to tell.
    Unknown,
}

impl std::fmt::Display for SafetyTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Improving => write!(f, "improving"),
            Self::Declining => write!(f, "declining"),
            Self::Stable => write!(f, "stable"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Time bounds of the analyzed reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    /// Earliest `created_at`.
    pub start: DateTime<Utc>,
    /// Latest `created_at`.
    pub end: DateTime<Utc>,
}

/// Combined output of the community analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    /// Day/hour density, busiest first.
    pub busiest_hours: Vec<TimePattern>,
    /// Emerging hotspots, largest increase first.
    pub emerging_hotspots: Vec<Hotspot>,
    /// Vibe co-occurrence estimates, strongest first.
    pub vibe_correlations: Vec<VibeCorrelation>,
    /// Number of reports analyzed.
    pub total_reports: usize,
    /// Bounds of the analyzed reports.
    pub analyzed_timeframe: Timeframe,
}

/// Safety snapshot for a set of reports, as shown on the area card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetySummary {
    /// Score (0-100).
    pub score: u8,
    /// Band and presentation for the score.
    pub level: SafetyLevelInfo,
    /// Reports the score was computed from.
    pub total_reports: usize,
}

/// Hourly safety series with its overall direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyTrendReport {
    /// One point per hour, oldest first.
    pub points: Vec<SafetyDataPoint>,
    /// Direction over the most recent points.
    pub trend: SafetyTrend,
}
