//! Emerging hotspot detection.
//!
//! Splits located reports into a recent window and everything before it,
//! buckets both into grid cells, and flags cells whose recent volume grew
//! sharply against their own history.

use chrono::{DateTime, Duration, Utc};
use hyperapp_analytics_models::Hotspot;
use hyperapp_vibe_models::Report;

use crate::config::{AnalyticsConfig, HotspotCenter};
use crate::grid::{GridCell, bucket_reports};

/// Detects emerging hotspots over the last `days_back` days, measured from
/// the current time, using the default thresholds.
#[must_use]
pub fn detect_emerging_hotspots(reports: &[Report], days_back: u32) -> Vec<Hotspot> {
    let config = AnalyticsConfig {
        hotspot_days_back: days_back,
        ..AnalyticsConfig::default()
    };
    detect_emerging_hotspots_with(reports, &config, Utc::now())
}

/// Detects emerging hotspots relative to `now`.
///
/// A cell qualifies when it has at least `hotspot_min_reports` recent
/// reports and grew by at least `hotspot_min_increase_pct` percent over its
/// historical count. Cells with no history use a baseline of one report.
/// Results are sorted by `activity_change`, largest first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn detect_emerging_hotspots_with(
    reports: &[Report],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Vec<Hotspot> {
    // A window reaching past the earliest representable instant covers everything.
    let cutoff = now
        .checked_sub_signed(Duration::days(i64::from(config.hotspot_days_back)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let (recent, historical): (Vec<&Report>, Vec<&Report>) =
        reports.iter().partition(|r| r.created_at >= cutoff);

    let recent_cells = bucket_reports(recent.iter().copied(), config.hotspot_cell_size);
    let historical_cells = bucket_reports(historical.iter().copied(), config.hotspot_cell_size);

    let timeframe = format!("last {} days", config.hotspot_days_back);

    let mut hotspots: Vec<Hotspot> = recent_cells
        .values()
        .filter(|cell| cell.len() >= config.hotspot_min_reports)
        .filter_map(|cell| {
            let current = cell.len();
            let previous = historical_cells.get(&cell.key).map_or(0, GridCell::len);
            let baseline = previous.max(1) as f64;
            let activity_change = (current as f64 - previous as f64) / baseline * 100.0;

            log::trace!(
                "Cell {}: {current} recent vs {previous} historical ({activity_change:.1}%)",
                cell.key
            );

            if activity_change < config.hotspot_min_increase_pct {
                return None;
            }

            let (latitude, longitude) = match config.hotspot_center {
                HotspotCenter::FirstReport => cell.first_point,
                HotspotCenter::Centroid => cell.centroid(),
            };

            Some(Hotspot {
                latitude,
                longitude,
                activity_change,
                current_reports: current,
                previous_reports: previous,
                timeframe: timeframe.clone(),
            })
        })
        .collect();

    hotspots.sort_by(|a, b| b.activity_change.total_cmp(&a.activity_change));

    log::debug!(
        "Detected {} emerging hotspots from {} recent / {} historical reports",
        hotspots.len(),
        recent.len(),
        historical.len()
    );

    hotspots
}
