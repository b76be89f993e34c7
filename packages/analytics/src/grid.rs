//! Fixed-size lat/lng grid bucketing and distance helpers.
//!
//! Reports are clustered spatially by snapping their coordinates to a
//! grid of square cells measured in degrees, which is enough for the
//! city-scale analyses here without a spatial index.

use std::collections::BTreeMap;

use hyperapp_vibe_models::Report;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Integer grid coordinates of a cell.
///
/// Two points share a cell iff both rounded grid coordinates match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey {
    /// Rounded `latitude / cell_size`.
    pub lat: i64,
    /// Rounded `longitude / cell_size`.
    pub lng: i64,
}

impl GridKey {
    /// Snaps a coordinate pair to its cell.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, cell_size: f64) -> Self {
        Self {
            lat: snap(latitude, cell_size),
            lng: snap(longitude, cell_size),
        }
    }
}

impl std::fmt::Display for GridKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.lat, self.lng)
    }
}

/// Half-up rounding, so cells are `[k - 0.5, k + 0.5)` in grid units on
/// both sides of zero.
#[allow(clippy::cast_possible_truncation)]
fn snap(value: f64, cell_size: f64) -> i64 {
    (value / cell_size + 0.5).floor() as i64
}

/// Reports that fell into one grid cell.
#[derive(Debug, Clone)]
pub struct GridCell<'a> {
    /// The cell's key.
    pub key: GridKey,
    /// Coordinates of the first report bucketed into the cell.
    pub first_point: (f64, f64),
    /// Member reports, in input order.
    pub reports: Vec<&'a Report>,
    lat_sum: f64,
    lng_sum: f64,
}

impl<'a> GridCell<'a> {
    fn new(key: GridKey, report: &'a Report, point: (f64, f64)) -> Self {
        Self {
            key,
            first_point: point,
            reports: vec![report],
            lat_sum: point.0,
            lng_sum: point.1,
        }
    }

    fn push(&mut self, report: &'a Report, point: (f64, f64)) {
        self.reports.push(report);
        self.lat_sum += point.0;
        self.lng_sum += point.1;
    }

    /// Number of reports in the cell.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Always `false`: a cell only exists once a report lands in it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Mean coordinates of every member report.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.reports.len() as f64;
        (self.lat_sum / n, self.lng_sum / n)
    }
}

/// Buckets reports into grid cells of `cell_size` degrees.
///
/// Reports without usable coordinates are skipped.
pub fn bucket_reports<'a, I>(reports: I, cell_size: f64) -> BTreeMap<GridKey, GridCell<'a>>
where
    I: IntoIterator<Item = &'a Report>,
{
    let mut cells: BTreeMap<GridKey, GridCell<'a>> = BTreeMap::new();
    let mut skipped = 0usize;

    for report in reports {
        let Some(point) = report.coordinates() else {
            skipped += 1;
            continue;
        };
        let key = GridKey::new(point.0, point.1, cell_size);
        cells
            .entry(key)
            .and_modify(|cell| cell.push(report, point))
            .or_insert_with(|| GridCell::new(key, report, point));
    }

    if skipped > 0 {
        log::trace!("Skipped {skipped} reports without coordinates while bucketing");
    }

    cells
}

/// Great-circle distance between two `(latitude, longitude)` points in km.
#[must_use]
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lng1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lng2) = (b.0.to_radians(), b.1.to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = lng2 - lng1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Returns the located reports within `radius_km` of `center`.
#[must_use]
pub fn reports_within(reports: &[Report], center: (f64, f64), radius_km: f64) -> Vec<&Report> {
    reports
        .iter()
        .filter(|r| {
            r.coordinates()
                .is_some_and(|point| haversine_km(center, point) <= radius_km)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};
    use hyperapp_vibe_models::VibeType;

    use super::*;

    fn report(id: i64, lat: Option<f64>, lng: Option<f64>) -> Report {
        Report {
            id,
            vibe_type: VibeType::Safe,
            latitude: lat,
            longitude: lng,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            upvotes: 0,
            downvotes: 0,
            user_id: None,
        }
    }

    #[test]
    fn key_rounds_to_nearest_cell() {
        let key = GridKey::new(40.7128, -74.0060, 0.01);
        assert_eq!(key, GridKey { lat: 4071, lng: -7401 });
        assert_eq!(key.to_string(), "4071--7401");
    }

    #[test]
    fn nearby_points_share_a_cell() {
        let a = GridKey::new(40.7101, -74.0049, 0.01);
        let b = GridKey::new(40.7149, -74.0001, 0.01);
        assert_eq!(a, b);

        let c = GridKey::new(40.7151, -74.0049, 0.01);
        assert_ne!(a, c);
    }

    #[test]
    fn finer_cells_split_what_coarse_cells_merge() {
        let a = (40.7101, -74.0049);
        let b = (40.7149, -74.0049);
        assert_eq!(GridKey::new(a.0, a.1, 0.01), GridKey::new(b.0, b.1, 0.01));
        assert_ne!(
            GridKey::new(a.0, a.1, 0.005),
            GridKey::new(b.0, b.1, 0.005)
        );
    }

    #[test]
    fn bucketing_skips_reports_without_coordinates() {
        let reports = vec![
            report(1, Some(40.71), Some(-74.0)),
            report(2, None, Some(-74.0)),
            report(3, Some(40.71), None),
            report(4, None, None),
            report(5, Some(40.7101), Some(-74.0001)),
        ];
        let cells = bucket_reports(&reports, 0.01);
        assert_eq!(cells.len(), 1);
        let cell = cells.values().next().unwrap();
        let ids: Vec<i64> = cell.reports.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 5]);
        assert!(!cells.contains_key(&GridKey { lat: 0, lng: 0 }));
    }

    #[test]
    fn cell_tracks_first_point_and_centroid() {
        let reports = vec![
            report(1, Some(40.710), Some(-74.000)),
            report(2, Some(40.712), Some(-74.002)),
        ];
        let cells = bucket_reports(&reports, 0.01);
        let cell = cells.values().next().unwrap();
        assert_eq!(cell.first_point, (40.710, -74.000));
        let (lat, lng) = cell.centroid();
        assert!((lat - 40.711).abs() < 1e-9);
        assert!((lng + 74.001).abs() < 1e-9);
        assert_eq!(cell.len(), 2);
    }

    #[test]
    fn haversine_known_distance() {
        // One degree of latitude is ~111.19 km.
        let d = haversine_km((0.0, 0.0), (1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "{d}");
        assert!(haversine_km((51.5, -0.12), (51.5, -0.12)).abs() < 1e-12);
    }

    #[test]
    fn reports_within_filters_by_radius() {
        let reports = vec![
            report(1, Some(40.7128), Some(-74.0060)),
            report(2, Some(40.7200), Some(-74.0060)),
            report(3, Some(40.8000), Some(-74.0060)),
            report(4, None, None),
        ];
        let near = reports_within(&reports, (40.7128, -74.0060), 1.0);
        let ids: Vec<i64> = near.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
