#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Vibe taxonomy types and the community report record.
//!
//! This crate defines the closed set of vibe categories a community member
//! can attach to a report, and the [`Report`] record as it is returned by
//! the hosted backend. Every analysis in the workspace consumes these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How a vibe category contributes to the safety score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibePolarity {
    /// Counts toward the positive share of the safety score.
    Positive,
    /// Tracked as negative but not part of the score formula.
    Negative,
    /// Neither positive nor negative.
    Neutral,
}

/// Category a community member attaches to a report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VibeType {
    // ── Atmosphere ──────────────────────────────────────
    /// The area feels safe
    Safe,
    /// Calm, relaxed surroundings
    Calm,
    /// Busy in a good way
    Lively,
    /// Celebration or event underway
    Festive,
    /// Dense crowds
    Crowded,
    /// Something feels off
    Suspicious,
    /// Immediate danger observed
    Dangerous,
    /// Loud surroundings
    Noisy,
    /// Quiet surroundings
    Quiet,

    // ── Infrastructure ──────────────────────────────────
    /// Construction work blocking or narrowing the way
    Construction,
    /// Missing or broken street lighting
    PoorLighting,
    /// Potholes, debris or other road hazards
    RoadHazard,
    /// Local power outage
    PowerOutage,
    /// Flooding, leaks or water supply problems
    WaterIssue,
    /// Heavy traffic or congestion
    Traffic,
}

impl VibeType {
    /// Returns how this vibe contributes to the safety score.
    #[must_use]
    pub const fn polarity(self) -> VibePolarity {
        match self {
            Self::Safe | Self::Calm | Self::Quiet => VibePolarity::Positive,
            Self::Dangerous | Self::Suspicious => VibePolarity::Negative,
            Self::Lively
            | Self::Festive
            | Self::Crowded
            | Self::Noisy
            | Self::Construction
            | Self::PoorLighting
            | Self::RoadHazard
            | Self::PowerOutage
            | Self::WaterIssue
            | Self::Traffic => VibePolarity::Neutral,
        }
    }

    /// Returns `true` if this vibe counts toward the positive share.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.polarity() == VibePolarity::Positive
    }

    /// Returns `true` if this vibe is tracked as negative.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.polarity() == VibePolarity::Negative
    }

    /// Returns `true` for the infrastructure subtypes.
    #[must_use]
    pub const fn is_infrastructure(self) -> bool {
        matches!(
            self,
            Self::Construction
                | Self::PoorLighting
                | Self::RoadHazard
                | Self::PowerOutage
                | Self::WaterIssue
                | Self::Traffic
        )
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Safe,
            Self::Calm,
            Self::Lively,
            Self::Festive,
            Self::Crowded,
            Self::Suspicious,
            Self::Dangerous,
            Self::Noisy,
            Self::Quiet,
            Self::Construction,
            Self::PoorLighting,
            Self::RoadHazard,
            Self::PowerOutage,
            Self::WaterIssue,
            Self::Traffic,
        ]
    }
}

/// A community-submitted report as stored in the `reports` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Database primary key.
    pub id: i64,
    /// Category attached by the reporter.
    pub vibe_type: VibeType,
    /// Latitude (WGS84). Absent for legacy reports.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude (WGS84). Absent for legacy reports.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Community upvotes.
    #[serde(default)]
    pub upvotes: u32,
    /// Community downvotes.
    #[serde(default)]
    pub downvotes: u32,
    /// Submitting user, if known.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Report {
    /// Returns `(latitude, longitude)` when both are present and finite.
    ///
    /// Reports without a usable location are excluded from every spatial
    /// analysis rather than being placed at the origin.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }
}
