//! Spatial co-occurrence between vibe categories.
//!
//! Located reports are bucketed into fine grid cells. Every cell with at
//! least `correlation_min_cluster_size` reports is one sample, and for each
//! pair of vibes we count the samples containing both.

use std::collections::BTreeSet;

use hyperapp_analytics_models::VibeCorrelation;
use hyperapp_vibe_models::{Report, VibeType};

use crate::config::{AnalyticsConfig, MarginalEstimate};
use crate::grid::bucket_reports;

/// Estimates vibe co-occurrence using the default thresholds.
///
/// See [`calculate_vibe_correlations_with`].
#[must_use]
pub fn calculate_vibe_correlations(reports: &[Report]) -> Vec<VibeCorrelation> {
    calculate_vibe_correlations_with(reports, &AnalyticsConfig::default())
}

/// Estimates, for every pair of vibes seen in located reports, whether they
/// tend to share grid cells.
///
/// Pairs are ordered so `vibe_a` sorts before `vibe_b` by name. No pair is
/// reported until at least `correlation_min_sample` cells were sampled, and
/// pairs weaker than `correlation_min_strength` are dropped. Results are
/// sorted by absolute coefficient, strongest first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_vibe_correlations_with(
    reports: &[Report],
    config: &AnalyticsConfig,
) -> Vec<VibeCorrelation> {
    let cells = bucket_reports(reports, config.correlation_cell_size);

    let samples: Vec<BTreeSet<VibeType>> = cells
        .values()
        .filter(|cell| cell.len() >= config.correlation_min_cluster_size)
        .map(|cell| cell.reports.iter().map(|r| r.vibe_type).collect())
        .collect();

    let total = samples.len();
    if total < config.correlation_min_sample {
        log::debug!(
            "Skipping vibe correlations: {total} sampled cells (need {})",
            config.correlation_min_sample
        );
        return Vec::new();
    }

    let mut vibes: Vec<VibeType> = reports
        .iter()
        .filter(|r| r.coordinates().is_some())
        .map(|r| r.vibe_type)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    vibes.sort_by_key(ToString::to_string);

    let n = total as f64;
    let share = |count: usize| count as f64 / n;

    let mut correlations = Vec::new();
    for (i, &vibe_a) in vibes.iter().enumerate() {
        for &vibe_b in &vibes[i + 1..] {
            let together = samples
                .iter()
                .filter(|s| s.contains(&vibe_a) && s.contains(&vibe_b))
                .count();
            let p_ab = share(together);

            let (p_a, p_b) = match config.correlation_marginals {
                MarginalEstimate::Joint => (p_ab, p_ab),
                MarginalEstimate::Independent => (
                    share(samples.iter().filter(|s| s.contains(&vibe_a)).count()),
                    share(samples.iter().filter(|s| s.contains(&vibe_b)).count()),
                ),
            };

            let correlation = phi_coefficient(p_ab, p_a, p_b);
            if correlation.abs() < config.correlation_min_strength {
                continue;
            }

            correlations.push(VibeCorrelation {
                vibe_a,
                vibe_b,
                correlation,
                confidence: (n / 10.0).min(1.0),
                sample_size: total,
                description: describe(vibe_a, vibe_b, correlation),
            });
        }
    }

    correlations.sort_by(|a, b| b.correlation.abs().total_cmp(&a.correlation.abs()));

    log::debug!(
        "Found {} vibe correlations across {total} sampled cells",
        correlations.len()
    );

    correlations
}

/// Phi coefficient from joint and marginal probabilities. Zero when either
/// marginal is degenerate (0 or 1).
fn phi_coefficient(p_ab: f64, p_a: f64, p_b: f64) -> f64 {
    let denominator = (p_a * (1.0 - p_a) * p_b * (1.0 - p_b)).sqrt();
    if denominator > 0.0 {
        ((p_ab - p_a * p_b) / denominator).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn describe(vibe_a: VibeType, vibe_b: VibeType, correlation: f64) -> String {
    let strength = correlation.abs();
    let qualifier = if strength >= 0.7 {
        "strongly"
    } else if strength >= 0.4 {
        "moderately"
    } else {
        "weakly"
    };
    let direction = if correlation > 0.0 {
        "tend to appear together"
    } else {
        "rarely appear together"
    };
    format!("{vibe_a} and {vibe_b} {qualifier} {direction}")
}
