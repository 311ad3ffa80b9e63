//! Route metrics and anomaly classification.
//!
//! Metrics are always derived in one pass over a finished point sequence and
//! never patched incrementally. A route is flagged for review when any single
//! consecutive-point jump is longer than the anomaly threshold, which usually
//! means the stitcher bridged a gap between fragments that do not touch.

use serde::{Deserialize, Serialize};

use crate::geo_utils::segment_distances;
use crate::Coordinate;

/// Default threshold for a suspicious straight jump, in meters.
pub const ANOMALY_THRESHOLD_METERS: f64 = 100.0;

/// Distances derived from a stitched route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetrics {
    /// Sum of all consecutive-point distances
    pub total_distance_meters: f64,
    /// Longest consecutive-point distance
    pub max_segment_meters: f64,
    /// Some segment is strictly longer than the anomaly threshold
    pub has_anomalous_segment: bool,
}

impl RouteMetrics {
    /// Fold a sequence of segment lengths into metrics.
    ///
    /// The threshold comparison is strict and uses unrounded values.
    pub fn from_segment_distances(
        segments: impl IntoIterator<Item = f64>,
        anomaly_threshold: f64,
    ) -> Self {
        let mut total = 0.0;
        let mut max = 0.0_f64;
        let mut anomalous = false;

        for d in segments {
            total += d;
            max = max.max(d);
            if d > anomaly_threshold {
                anomalous = true;
            }
        }

        Self {
            total_distance_meters: total,
            max_segment_meters: max,
            has_anomalous_segment: anomalous,
        }
    }

    /// Review classification derived from these metrics.
    pub fn review_flag(&self) -> ReviewFlag {
        if self.has_anomalous_segment {
            ReviewFlag::ReviewRequired
        } else {
            ReviewFlag::Clear
        }
    }

    pub fn requires_review(&self) -> bool {
        self.has_anomalous_segment
    }

    /// Total length rounded to the nearest meter, for display.
    pub fn rounded_total_meters(&self) -> i64 {
        self.total_distance_meters.round() as i64
    }

    /// Longest jump rounded to the nearest meter, for display.
    pub fn rounded_max_segment_meters(&self) -> i64 {
        self.max_segment_meters.round() as i64
    }
}

/// Compute metrics with the default 100 m anomaly threshold.
///
/// # Example
/// ```
/// use track_stitcher::{analyze_route, Coordinate};
///
/// let metrics = analyze_route(&[
///     Coordinate::new(35.0, 139.0),
///     Coordinate::new(35.0005, 139.0),
///     Coordinate::new(35.0025, 139.0),
/// ]);
/// assert!(metrics.total_distance_meters > 270.0);
/// assert!(metrics.has_anomalous_segment); // second jump is ~222 m
/// ```
pub fn analyze_route(points: &[Coordinate]) -> RouteMetrics {
    analyze_route_with_threshold(points, ANOMALY_THRESHOLD_METERS)
}

/// Compute metrics with a custom anomaly threshold.
pub fn analyze_route_with_threshold(
    points: &[Coordinate],
    anomaly_threshold: f64,
) -> RouteMetrics {
    RouteMetrics::from_segment_distances(segment_distances(points), anomaly_threshold)
}

/// Whether a candidate can be approved directly or needs a second look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewFlag {
    Clear,
    ReviewRequired,
}
