#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Report source trait and backends feeding the analytics engine.
//!
//! The analytics engine only ever sees an already-fetched `Vec<Report>`.
//! Each backend implements [`ReportSource`] to produce that list, applying
//! a [`ReportFilter`] the same way the hosted backend does: newest first,
//! optionally restricted to one user, a time window, and a row limit.

pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyperapp_vibe_models::Report;

pub use json_file::JsonFileReportSource;
pub use memory::InMemoryReportSource;

/// Errors that can occur while fetching reports.
#[derive(Debug, thiserror::Error)]
pub enum ReportsError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The filter cannot be satisfied.
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// Description of what went wrong.
        message: String,
    },
}

/// Restrictions applied when fetching reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Only reports submitted by this user.
    pub user_id: Option<String>,
    /// Maximum number of reports, newest first.
    pub limit: Option<usize>,
    /// Only reports created at or after this instant.
    pub since: Option<DateTime<Utc>>,
}

impl ReportFilter {
    /// Checks that the filter can be satisfied.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::InvalidFilter`] for a zero `limit`.
    pub fn validate(&self) -> Result<(), ReportsError> {
        if self.limit == Some(0) {
            return Err(ReportsError::InvalidFilter {
                message: "limit must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Returns `true` if `report` passes the user and time restrictions.
    #[must_use]
    pub fn matches(&self, report: &Report) -> bool {
        self.user_id
            .as_deref()
            .is_none_or(|user| report.user_id.as_deref() == Some(user))
            && self.since.is_none_or(|since| report.created_at >= since)
    }

    /// Filters, orders newest first, and truncates `reports`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::InvalidFilter`] if the filter is invalid.
    pub fn apply<I>(&self, reports: I) -> Result<Vec<Report>, ReportsError>
    where
        I: IntoIterator<Item = Report>,
    {
        self.validate()?;

        let mut selected: Vec<Report> = reports.into_iter().filter(|r| self.matches(r)).collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        Ok(selected)
    }
}

/// Trait that all report backends must implement.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Returns a short identifier for this source (e.g., `"json_file"`).
    fn id(&self) -> &str;

    /// Fetches the reports matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError`] if the backend cannot be read or the
    /// filter is invalid.
    async fn get_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, ReportsError>;
}
