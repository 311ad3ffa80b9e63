//! Stitcher properties over many fragment orderings.
//!
//! Run with: `cargo test --test stitching`

use track_stitcher::geo_utils::{haversine_distance, polyline_length};
use track_stitcher::{group_fragments, stitch_group, stitch_groups, Coordinate, Fragment};

/// Split a straight east-west road into `count` non-touching fragments.
///
/// Every other fragment is stored reversed, as OSM ways often are.
fn split_road(name: &str, count: usize, points_per_fragment: usize) -> Vec<Fragment> {
    let step = 0.0002;
    (0..count)
        .map(|i| {
            let base = 138.0 + (i * points_per_fragment) as f64 * step;
            let mut geometry: Vec<Coordinate> = (0..points_per_fragment)
                .map(|j| Coordinate::new(36.0, base + j as f64 * step))
                .collect();
            if i % 2 == 1 {
                geometry.reverse();
            }
            Fragment::named(format!("{}", i), name, geometry)
        })
        .collect()
}

/// Deterministic reordering: stride through the list with a step coprime to its length.
fn reorder(fragments: &[Fragment], stride: usize) -> Vec<Fragment> {
    let n = fragments.len();
    (0..n).map(|i| fragments[(i * stride) % n].clone()).collect()
}

#[test]
fn test_conservation_across_orderings() {
    let road = split_road("Ridge Track", 7, 5);
    let total_points: usize = road.iter().map(|f| f.geometry.len()).sum();

    for stride in [1, 2, 3, 4, 5, 6] {
        let groups = group_fragments(reorder(&road, stride));
        assert_eq!(groups.len(), 1);

        let route = stitch_group(groups.into_iter().next().unwrap());
        assert_eq!(route.points.len(), total_points, "stride {}", stride);
        assert!(route.is_complete());
    }
}

#[test]
fn test_seeded_from_first_fragment_orientation() {
    // Seeding from the middle still recovers the whole road as one traversal
    let road = split_road("Ridge Track", 5, 4);
    let mut ordered = reorder(&road, 3);
    ordered.rotate_left(2);
    let seed = ordered[0].geometry.clone();

    let groups = group_fragments(ordered);
    let route = stitch_group(groups.into_iter().next().unwrap());

    let position = route
        .points
        .windows(seed.len())
        .position(|w| w == seed.as_slice());
    assert!(position.is_some(), "seed fragment kept in original orientation");

    let mut all: Vec<Coordinate> = road.iter().flat_map(|f| f.geometry.clone()).collect();
    all.sort_by(|a, b| a.longitude.partial_cmp(&b.longitude).unwrap());
    let expected = polyline_length(&all);
    assert!((polyline_length(&route.points) - expected).abs() < 1e-6);
}

#[test]
fn test_groups_are_independent() {
    let mut fragments = split_road("North Track", 3, 3);
    fragments.extend(split_road("South Track", 4, 3));
    let routes = stitch_groups(group_fragments(fragments));

    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].name, "North Track");
    assert_eq!(routes[0].points.len(), 9);
    assert_eq!(routes[1].name, "South Track");
    assert_eq!(routes[1].points.len(), 12);
}

#[test]
fn test_haversine_symmetry() {
    let pairs = [
        (Coordinate::new(35.0, 139.0), Coordinate::new(35.001, 139.001)),
        (Coordinate::new(43.06, 141.35), Coordinate::new(26.21, 127.68)),
        (Coordinate::new(-33.87, 151.21), Coordinate::new(51.5, -0.12)),
    ];
    for (a, b) in pairs {
        assert!((haversine_distance(&a, &b) - haversine_distance(&b, &a)).abs() < 1e-6);
        assert_eq!(haversine_distance(&a, &a), 0.0);
    }
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_sequential() {
    use track_stitcher::stitch_groups_parallel;

    let mut fragments = Vec::new();
    for i in 0..40 {
        fragments.extend(reorder(&split_road(&format!("Track {}", i), 5, 3), 2));
    }
    let sequential = stitch_groups(group_fragments(fragments.clone()));
    let parallel = stitch_groups_parallel(group_fragments(fragments));
    assert_eq!(sequential, parallel);
}
