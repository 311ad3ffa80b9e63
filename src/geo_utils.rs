//! Geographic utilities.
//!
//! Two distance notions live here and must not be mixed up:
//! - [`haversine_distance`] is the true great-circle distance in meters and
//!   feeds every reported metric.
//! - [`planar_distance`] is a straight difference in degrees, used by the
//!   stitcher only to rank endpoint proximity.

use geo::{Distance, Euclidean};

use crate::Coordinate;

/// Mean Earth radius in meters used by [`haversine_distance`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters.
///
/// # Example
/// ```
/// use track_stitcher::Coordinate;
/// use track_stitcher::geo_utils::haversine_distance;
///
/// let tokyo = Coordinate::new(35.6812, 139.7671);
/// let osaka = Coordinate::new(34.7025, 135.4959);
/// let d = haversine_distance(&tokyo, &osaka);
/// assert!((d - 403_000.0).abs() < 5_000.0);
/// ```
pub fn haversine_distance(p1: &Coordinate, p2: &Coordinate) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let d_lat = (p2.latitude - p1.latitude).to_radians();
    let d_lng = (p2.longitude - p1.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Euclidean distance in degree space (lat/lng treated as a plane).
///
/// Only meaningful as a relative proximity measure between nearby points.
pub fn planar_distance(p1: &Coordinate, p2: &Coordinate) -> f64 {
    Euclidean::distance(geo::Point::from(*p1), geo::Point::from(*p2))
}

/// Haversine distance of every consecutive pair, in order.
pub fn segment_distances(points: &[Coordinate]) -> impl Iterator<Item = f64> + '_ {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
}

/// Total length of a polyline in meters (0 for fewer than two points).
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    segment_distances(points).sum()
}
