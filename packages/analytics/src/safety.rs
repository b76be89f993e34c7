//! Safety scores, levels and hourly trends.
//!
//! The score is the share of positive-vibe reports, as a percentage.
//! Negative vibes are counted for display but do not enter the formula, so
//! a set of only negative reports scores the same as a set of only neutral
//! ones.

use chrono::{DateTime, Duration, Utc};
use hyperapp_analytics_models::{
    SafetyDataPoint, SafetyLevel, SafetyLevelInfo, SafetySummary, SafetyTrend, SafetyTrendReport,
};
use hyperapp_vibe_models::Report;

use crate::config::AnalyticsConfig;
use crate::grid::reports_within;

/// Score used when there is nothing to score.
pub const NEUTRAL_SCORE: u8 = 50;

/// Longest hourly safety series, one leap year.
pub const MAX_SAFETY_HOURS_BACK: u32 = 24 * 366;

/// Percentage of `positive` in `total`, or [`NEUTRAL_SCORE`] when empty.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn score_ratio(positive: usize, total: usize) -> u8 {
    if total == 0 {
        return NEUTRAL_SCORE;
    }
    (positive as f64 / total as f64 * 100.0).round() as u8
}

/// Computes the safety score (0-100) of a set of reports.
#[must_use]
pub fn calculate_safety_score(reports: &[Report]) -> u8 {
    let positive = reports.iter().filter(|r| r.vibe_type.is_positive()).count();
    score_ratio(positive, reports.len())
}

/// Maps a score onto its qualitative band.
#[must_use]
pub const fn classify_score(score: i32) -> SafetyLevel {
    match score {
        70.. => SafetyLevel::Safe,
        40..=69 => SafetyLevel::Moderate,
        0..=39 => SafetyLevel::Caution,
        _ => SafetyLevel::Unknown,
    }
}

/// Returns the band for `score` with its display color and description.
#[must_use]
pub fn safety_level(score: i32) -> SafetyLevelInfo {
    classify_score(score).into()
}

/// Score and band for a set of reports.
#[must_use]
pub fn safety_summary(reports: &[Report]) -> SafetySummary {
    let score = calculate_safety_score(reports);
    SafetySummary {
        score,
        level: safety_level(i32::from(score)),
        total_reports: reports.len(),
    }
}

/// Score and band for the located reports within `radius_km` of `center`.
#[must_use]
pub fn area_safety_summary(
    reports: &[Report],
    center: (f64, f64),
    radius_km: f64,
) -> SafetySummary {
    let nearby: Vec<Report> = reports_within(reports, center, radius_km)
        .into_iter()
        .cloned()
        .collect();
    log::debug!(
        "Scoring {} reports within {radius_km} km of ({}, {})",
        nearby.len(),
        center.0,
        center.1
    );
    safety_summary(&nearby)
}

/// Builds an hourly safety series covering the last `hours_back` hours.
///
/// See [`calculate_safety_trends_with`].
#[must_use]
pub fn calculate_safety_trends(reports: &[Report], hours_back: u32) -> Vec<SafetyDataPoint> {
    let config = AnalyticsConfig {
        safety_hours_back: hours_back,
        ..AnalyticsConfig::default()
    };
    calculate_safety_trends_with(reports, &config, Utc::now())
}

/// Builds one [`SafetyDataPoint`] per hour for the `safety_hours_back`
/// hours ending at `now`, oldest first. The series is capped at
/// [`MAX_SAFETY_HOURS_BACK`] hours.
///
/// Each bucket covers `[start, start + 1h)`. Hours without reports are
/// still emitted, with the neutral score.
#[must_use]
pub fn calculate_safety_trends_with(
    reports: &[Report],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Vec<SafetyDataPoint> {
    let hours_back = if config.safety_hours_back > MAX_SAFETY_HOURS_BACK {
        log::warn!(
            "Clamping safety series from {} to {MAX_SAFETY_HOURS_BACK} hours",
            config.safety_hours_back
        );
        MAX_SAFETY_HOURS_BACK
    } else {
        config.safety_hours_back
    };

    // Hours before the earliest representable instant are left out.
    let points: Vec<SafetyDataPoint> = (0..i64::from(hours_back))
        .rev()
        .filter_map(|hours_ago| {
            let end = now.checked_sub_signed(Duration::hours(hours_ago))?;
            let start = end.checked_sub_signed(Duration::hours(1))?;

            let mut total = 0;
            let mut positive = 0;
            let mut negative = 0;
            for report in reports
                .iter()
                .filter(|r| r.created_at >= start && r.created_at < end)
            {
                total += 1;
                if report.vibe_type.is_positive() {
                    positive += 1;
                } else if report.vibe_type.is_negative() {
                    negative += 1;
                }
            }

            Some(SafetyDataPoint {
                time: start,
                safety_score: score_ratio(positive, total),
                total_reports: total,
                positive_reports: positive,
                negative_reports: negative,
                hour_label: config.timezone.hour_label(start),
            })
        })
        .collect();

    log::debug!(
        "Built {}-hour safety series from {} reports",
        points.len(),
        reports.len()
    );

    points
}

/// Direction of the trend over the last three points, with a five-point
/// threshold.
#[must_use]
pub fn safety_trend(points: &[SafetyDataPoint]) -> SafetyTrend {
    let config = AnalyticsConfig::default();
    safety_trend_with(points, config.trend_window, config.trend_threshold)
}

/// Direction of the trend over the last `window` points.
///
/// Only hours that had reports carry a score; the first and last of those
/// within the window are compared. Fewer than `window` points, or fewer
/// than two scored hours, is [`SafetyTrend::Unknown`].
#[must_use]
pub fn safety_trend_with(points: &[SafetyDataPoint], window: usize, threshold: i32) -> SafetyTrend {
    if window == 0 || points.len() < window {
        return SafetyTrend::Unknown;
    }

    let scores: Vec<i32> = points[points.len() - window..]
        .iter()
        .filter(|p| p.total_reports > 0)
        .map(|p| i32::from(p.safety_score))
        .collect();

    let (Some(first), Some(last)) = (scores.first(), scores.last()) else {
        return SafetyTrend::Unknown;
    };
    if scores.len() < 2 {
        return SafetyTrend::Unknown;
    }

    let diff = *last - *first;
    if diff > threshold {
        SafetyTrend::Improving
    } else if diff < -threshold {
        SafetyTrend::Declining
    } else {
        SafetyTrend::Stable
    }
}

/// Hourly series ending at `now` together with its trend direction.
#[must_use]
pub fn safety_trend_report_with(
    reports: &[Report],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> SafetyTrendReport {
    let points = calculate_safety_trends_with(reports, config, now);
    let trend = safety_trend_with(&points, config.trend_window, config.trend_threshold);
    SafetyTrendReport { points, trend }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use hyperapp_vibe_models::VibeType;

    use super::*;
    use crate::config::BucketTimezone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn utc_config() -> AnalyticsConfig {
        AnalyticsConfig {
            timezone: BucketTimezone::Utc,
            ..AnalyticsConfig::default()
        }
    }

    fn report(id: i64, vibe_type: VibeType, created_at: DateTime<Utc>) -> Report {
        Report {
            id,
            vibe_type,
            latitude: None,
            longitude: None,
            created_at,
            upvotes: 0,
            downvotes: 0,
            user_id: None,
        }
    }

    fn point(score: u8, total: usize) -> SafetyDataPoint {
        SafetyDataPoint {
            time: now(),
            safety_score: score,
            total_reports: total,
            positive_reports: 0,
            negative_reports: 0,
            hour_label: "12:00".to_string(),
        }
    }

    #[test]
    fn empty_reports_score_neutral() {
        assert_eq!(calculate_safety_score(&[]), 50);
    }

    #[test]
    fn one_safe_one_dangerous_is_fifty() {
        let reports = vec![
            report(1, VibeType::Safe, now()),
            report(2, VibeType::Dangerous, now()),
        ];
        assert_eq!(calculate_safety_score(&reports), 50);
    }

    #[test]
    fn only_positive_share_drives_the_score() {
        let negative = vec![
            report(1, VibeType::Dangerous, now()),
            report(2, VibeType::Suspicious, now()),
        ];
        let neutral = vec![
            report(1, VibeType::Crowded, now()),
            report(2, VibeType::Traffic, now()),
        ];
        assert_eq!(calculate_safety_score(&negative), 0);
        assert_eq!(calculate_safety_score(&negative), calculate_safety_score(&neutral));

        let mixed = vec![
            report(1, VibeType::Calm, now()),
            report(2, VibeType::Quiet, now()),
            report(3, VibeType::Noisy, now()),
        ];
        assert_eq!(calculate_safety_score(&mixed), 67);
    }

    #[test]
    fn levels_by_range() {
        for score in 70..=100 {
            assert_eq!(classify_score(score), SafetyLevel::Safe, "{score}");
        }
        for score in 40..70 {
            assert_eq!(classify_score(score), SafetyLevel::Moderate, "{score}");
        }
        for score in 0..40 {
            assert_eq!(classify_score(score), SafetyLevel::Caution, "{score}");
        }
        assert_eq!(classify_score(-1), SafetyLevel::Unknown);

        let info = safety_level(85);
        assert_eq!(info.color, "#10b981");
        assert_eq!(safety_level(55).color, "#f59e0b");
        assert_eq!(safety_level(10).color, "#ef4444");
        assert_eq!(safety_level(-5).color, "#6b7280");
    }

    #[test]
    fn empty_series_has_every_hour_neutral() {
        let points = calculate_safety_trends_with(&[], &utc_config(), now());
        assert_eq!(points.len(), 24);
        assert!(points.iter().all(|p| p.safety_score == 50 && p.total_reports == 0));
        assert_eq!(points[0].time, now() - Duration::hours(24));
        assert_eq!(points[23].time, now() - Duration::hours(1));
        assert_eq!(points[23].hour_label, "11:00");
        assert_eq!(safety_trend(&points), SafetyTrend::Unknown);

        assert_eq!(calculate_safety_trends(&[], 24).len(), 24);
    }

    #[test]
    fn series_length_is_capped() {
        let points = calculate_safety_trends(&[], 2_400_000_000);
        assert_eq!(points.len(), usize::try_from(MAX_SAFETY_HOURS_BACK).unwrap());
        assert!(points.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn series_stops_at_earliest_representable_hour() {
        let now = DateTime::<Utc>::MIN_UTC + Duration::hours(2);
        let points = calculate_safety_trends_with(&[], &utc_config(), now);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].time, DateTime::<Utc>::MIN_UTC);
        assert_eq!(points[1].time, now - Duration::hours(1));
    }

    #[test]
    fn buckets_are_half_open() {
        let reports = vec![
            report(1, VibeType::Safe, now() - Duration::hours(1)),
            report(2, VibeType::Dangerous, now() - Duration::minutes(1)),
            report(3, VibeType::Calm, now()),
            report(4, VibeType::Suspicious, now() - Duration::hours(2)),
        ];
        let points = calculate_safety_trends_with(&reports, &utc_config(), now());
        let last = &points[23];
        assert_eq!(last.total_reports, 2);
        assert_eq!(last.positive_reports, 1);
        assert_eq!(last.negative_reports, 1);
        assert_eq!(last.safety_score, 50);

        let previous = &points[22];
        assert_eq!(previous.total_reports, 1);
        assert_eq!(previous.safety_score, 0);
    }

    #[test]
    fn trend_directions() {
        let improving = vec![point(40, 2), point(45, 2), point(60, 3)];
        assert_eq!(safety_trend(&improving), SafetyTrend::Improving);

        let declining = vec![point(80, 2), point(50, 0), point(70, 1)];
        assert_eq!(safety_trend(&declining), SafetyTrend::Declining);

        let stable = vec![point(60, 2), point(62, 2), point(65, 2)];
        assert_eq!(safety_trend(&stable), SafetyTrend::Stable);

        // Only the last three points matter.
        let long = vec![point(0, 5), point(100, 5), point(60, 2), point(62, 2), point(65, 2)];
        assert_eq!(safety_trend(&long), SafetyTrend::Stable);
    }

    #[test]
    fn trend_unknown_without_enough_data() {
        assert_eq!(safety_trend(&[point(40, 1), point(90, 1)]), SafetyTrend::Unknown);
        let one_scored = vec![point(50, 0), point(50, 0), point(90, 1)];
        assert_eq!(safety_trend(&one_scored), SafetyTrend::Unknown);
        assert_eq!(safety_trend(&[]), SafetyTrend::Unknown);
    }

    #[test]
    fn trend_report_combines_series_and_direction() {
        let reports = vec![
            report(1, VibeType::Dangerous, now() - Duration::minutes(150)),
            report(2, VibeType::Safe, now() - Duration::minutes(30)),
        ];
        let summary = safety_trend_report_with(&reports, &utc_config(), now());
        assert_eq!(summary.points.len(), 24);
        assert_eq!(summary.trend, SafetyTrend::Improving);
    }

    #[test]
    fn area_summary_uses_nearby_reports_only() {
        let mut near = report(1, VibeType::Safe, now());
        near.latitude = Some(40.7128);
        near.longitude = Some(-74.0060);
        let mut far = report(2, VibeType::Dangerous, now());
        far.latitude = Some(34.0522);
        far.longitude = Some(-118.2437);
        let unlocated = report(3, VibeType::Dangerous, now());

        let summary = area_safety_summary(&[near, far, unlocated], (40.713, -74.006), 2.0);
        assert_eq!(summary.total_reports, 1);
        assert_eq!(summary.score, 100);
        assert_eq!(summary.level.level, SafetyLevel::Safe);
    }

    #[test]
    fn input_is_untouched_and_output_repeatable() {
        let reports = vec![
            report(1, VibeType::Safe, now() - Duration::minutes(10)),
            report(2, VibeType::Noisy, now() - Duration::hours(5)),
        ];
        let snapshot = reports.clone();
        assert_eq!(calculate_safety_score(&reports), calculate_safety_score(&reports));
        let first = calculate_safety_trends_with(&reports, &utc_config(), now());
        let second = calculate_safety_trends_with(&reports, &utc_config(), now());
        assert_eq!(first, second);
        assert_eq!(reports, snapshot);
    }
}
