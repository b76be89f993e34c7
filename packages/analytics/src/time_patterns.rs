//! Day-of-week × hour-of-day report density.

use hyperapp_analytics_models::TimePattern;
use hyperapp_vibe_models::Report;

use crate::config::AnalyticsConfig;

const DAYS: usize = 7;
const HOURS: usize = 24;

/// Computes report density for every (day, hour) cell using the default
/// configuration.
///
/// See [`analyze_time_patterns_with`].
#[must_use]
pub fn analyze_time_patterns(reports: &[Report]) -> Vec<TimePattern> {
    analyze_time_patterns_with(reports, &AnalyticsConfig::default())
}

/// Computes report density for every (day, hour) cell.
///
/// Returns all 168 cells sorted busiest first (ties keep day/hour order),
/// or an empty list when there are no reports. A cell is flagged as a peak
/// when its count reaches `peak_hour_ratio` of the busiest cell.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze_time_patterns_with(
    reports: &[Report],
    config: &AnalyticsConfig,
) -> Vec<TimePattern> {
    if reports.is_empty() {
        return Vec::new();
    }

    let mut counts = [[0usize; HOURS]; DAYS];
    for report in reports {
        let (hour, day) = config.timezone.hour_and_weekday(report.created_at);
        counts[day as usize][hour as usize] += 1;
    }

    let total = reports.len() as f64;
    let max_count = counts.iter().flatten().copied().max().unwrap_or(0);
    let peak_floor = config.peak_hour_ratio * max_count as f64;

    let mut patterns: Vec<TimePattern> = counts
        .iter()
        .zip(0u32..)
        .flat_map(|(hours, day)| {
            hours.iter().zip(0u32..).map(move |(&count, hour)| TimePattern {
                hour,
                day_of_week: day,
                report_count: count,
                percentage: count as f64 / total * 100.0,
                peak_hours: count as f64 >= peak_floor,
            })
        })
        .collect();

    patterns.sort_by(|a, b| b.report_count.cmp(&a.report_count));

    log::debug!(
        "Analyzed time patterns for {} reports (busiest cell: {max_count})",
        reports.len()
    );

    patterns
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone as _, Utc};
    use hyperapp_vibe_models::VibeType;

    use super::*;
    use crate::config::BucketTimezone;

    fn utc_config() -> AnalyticsConfig {
        AnalyticsConfig {
            timezone: BucketTimezone::Utc,
            ..AnalyticsConfig::default()
        }
    }

    fn report_at(id: i64, created_at: DateTime<Utc>) -> Report {
        Report {
            id,
            vibe_type: VibeType::Lively,
            latitude: None,
            longitude: None,
            created_at,
            upvotes: 0,
            downvotes: 0,
            user_id: None,
        }
    }

    #[test]
    fn empty_input_returns_empty_list() {
        assert!(analyze_time_patterns_with(&[], &utc_config()).is_empty());
        assert!(analyze_time_patterns(&[]).is_empty());
    }

    #[test]
    fn covers_every_day_and_hour() {
        // 2025-03-03 was a Monday.
        let reports = vec![report_at(1, Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap())];
        let patterns = analyze_time_patterns_with(&reports, &utc_config());
        assert_eq!(patterns.len(), 168);

        let mut cells: Vec<(u32, u32)> = patterns.iter().map(|p| (p.day_of_week, p.hour)).collect();
        cells.sort_unstable();
        cells.dedup();
        assert_eq!(cells.len(), 168);
    }

    #[test]
    fn counts_percentages_and_peaks() {
        let monday_9 = Utc.with_ymd_and_hms(2025, 3, 3, 9, 15, 0).unwrap();
        let monday_18 = Utc.with_ymd_and_hms(2025, 3, 3, 18, 5, 0).unwrap();
        let saturday_23 = Utc.with_ymd_and_hms(2025, 3, 8, 23, 59, 0).unwrap();

        let mut reports = Vec::new();
        for i in 0..10 {
            reports.push(report_at(i, monday_9));
        }
        for i in 10..17 {
            reports.push(report_at(i, monday_18));
        }
        for i in 17..20 {
            reports.push(report_at(i, saturday_23));
        }

        let patterns = analyze_time_patterns_with(&reports, &utc_config());

        let first = &patterns[0];
        assert_eq!((first.day_of_week, first.hour), (1, 9));
        assert_eq!(first.report_count, 10);
        assert!((first.percentage - 50.0).abs() < 1e-9);
        assert!(first.peak_hours);

        // 7 >= 0.7 * 10 is a peak; 3 is not.
        let second = &patterns[1];
        assert_eq!((second.day_of_week, second.hour, second.report_count), (1, 18, 7));
        assert!(second.peak_hours);

        let third = &patterns[2];
        assert_eq!((third.day_of_week, third.hour, third.report_count), (6, 23, 3));
        assert!(!third.peak_hours);

        assert!(patterns[3..].iter().all(|p| p.report_count == 0 && !p.peak_hours));

        let total_pct: f64 = patterns.iter().map(|p| p.percentage).sum();
        assert!(total_pct <= 100.0 + 1e-9);
    }

    #[test]
    fn sorted_descending_by_count() {
        let reports: Vec<Report> = (0..50)
            .map(|i| {
                let t = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::hours(i * 7 % 168);
                report_at(i, t)
            })
            .collect();
        let patterns = analyze_time_patterns_with(&reports, &utc_config());
        for pair in patterns.windows(2) {
            assert!(pair[0].report_count >= pair[1].report_count);
        }
    }

    #[test]
    fn bucketing_follows_configured_timezone() {
        // 02:00 UTC Monday is 21:00 Sunday at UTC-5.
        let reports = vec![report_at(1, Utc.with_ymd_and_hms(2025, 3, 3, 2, 0, 0).unwrap())];
        let config = AnalyticsConfig {
            timezone: BucketTimezone::FixedOffsetMinutes(-300),
            ..AnalyticsConfig::default()
        };
        let patterns = analyze_time_patterns_with(&reports, &config);
        assert_eq!((patterns[0].day_of_week, patterns[0].hour), (0, 21));
    }

    #[test]
    fn input_is_untouched_and_output_repeatable() {
        let reports = vec![
            report_at(1, Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()),
            report_at(2, Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap()),
        ];
        let snapshot = reports.clone();
        let first = analyze_time_patterns_with(&reports, &utc_config());
        let second = analyze_time_patterns_with(&reports, &utc_config());
        assert_eq!(first, second);
        assert_eq!(reports, snapshot);
    }
}
