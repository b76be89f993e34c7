//! Report source reading a JSON export of the `reports` table.
//!
//! The file holds a single JSON array of report rows, as produced by the
//! backend's REST export.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hyperapp_vibe_models::Report;

use crate::{ReportFilter, ReportSource, ReportsError};

/// Reads reports from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileReportSource {
    path: PathBuf,
}

impl JsonFileReportSource {
    /// Creates a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportSource for JsonFileReportSource {
    fn id(&self) -> &str {
        "json_file"
    }

    async fn get_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, ReportsError> {
        filter.validate()?;

        let contents = tokio::fs::read_to_string(&self.path).await?;
        let reports: Vec<Report> = serde_json::from_str(&contents)?;
        log::info!(
            "Read {} reports from {}",
            reports.len(),
            self.path.display()
        );

        filter.apply(reports)
    }
}
