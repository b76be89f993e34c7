//! Report source backed by an owned list, for tests and embedding.

use async_trait::async_trait;
use hyperapp_vibe_models::Report;

use crate::{ReportFilter, ReportSource, ReportsError};

/// Serves reports from memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportSource {
    reports: Vec<Report>,
}

impl InMemoryReportSource {
    /// Creates a source over `reports`.
    #[must_use]
    pub const fn new(reports: Vec<Report>) -> Self {
        Self { reports }
    }

    /// Number of stored reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Returns `true` if no reports are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[async_trait]
impl ReportSource for InMemoryReportSource {
    fn id(&self) -> &str {
        "memory"
    }

    async fn get_reports(&self, filter: &ReportFilter) -> Result<Vec<Report>, ReportsError> {
        filter.apply(self.reports.iter().cloned())
    }
}
