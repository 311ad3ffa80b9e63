//! Import candidates and the bulk-insert record shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metrics::{ReviewFlag, RouteMetrics};
use crate::Coordinate;

/// Description used when none of the detail tags are present.
pub const NO_DETAIL_PLACEHOLDER: &str = "No detail information";

/// Detail tags in the order they appear in a description.
const DETAIL_TAGS: [(&str, &str); 3] = [
    ("surface", "Surface"),
    ("tracktype", "Track type"),
    ("width", "Width"),
];

/// Build a short human description from road tags.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use track_stitcher::describe_tags;
///
/// let mut tags = BTreeMap::new();
/// tags.insert("tracktype".to_string(), "grade3".to_string());
/// tags.insert("surface".to_string(), "dirt".to_string());
/// assert_eq!(describe_tags(&tags), "Surface: dirt, Track type: grade3");
/// assert_eq!(describe_tags(&BTreeMap::new()), "No detail information");
/// ```
pub fn describe_tags(tags: &BTreeMap<String, String>) -> String {
    let parts: Vec<String> = DETAIL_TAGS
        .iter()
        .filter_map(|(key, label)| {
            tags.get(*key)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}: {}", label, v))
        })
        .collect();

    if parts.is_empty() {
        NO_DETAIL_PLACEHOLDER.to_string()
    } else {
        parts.join(", ")
    }
}

/// A filtered route offered for human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCandidate {
    /// Source ids of the stitched fragments joined with `-`
    pub id: String,
    pub display_name: String,
    pub description_text: String,
    /// First point of the stitched route
    pub anchor_latitude: f64,
    pub anchor_longitude: f64,
    /// Full geometry, or `None` for a single-point route
    pub route: Option<Vec<Coordinate>>,
    pub metrics: RouteMetrics,
    /// Merged tags the description was derived from
    pub tags: BTreeMap<String, String>,
}

impl ImportCandidate {
    pub fn review_flag(&self) -> ReviewFlag {
        self.metrics.review_flag()
    }

    pub fn requires_review(&self) -> bool {
        self.metrics.requires_review()
    }

    /// Project into a bulk-insert record with the given overrides.
    pub fn to_record(&self, name: Option<&str>, description: Option<&str>) -> ImportRecord {
        ImportRecord {
            name: name.unwrap_or(&self.display_name).to_string(),
            description: description.unwrap_or(&self.description_text).to_string(),
            latitude: self.anchor_latitude,
            longitude: self.anchor_longitude,
            route: self.route.clone(),
        }
    }
}

/// One row accepted by the bulk-insert boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub route: Option<Vec<Coordinate>>,
}

impl ImportRecord {
    /// A record carries full geometry only with more than one route point;
    /// otherwise it is a point-only entry.
    pub fn has_geometry(&self) -> bool {
        self.route.as_ref().is_some_and(|r| r.len() > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_describe_tags_fixed_order() {
        let t = tags(&[("width", "2.5"), ("surface", "gravel"), ("highway", "track")]);
        assert_eq!(describe_tags(&t), "Surface: gravel, Width: 2.5");

        let t = tags(&[("surface", "dirt"), ("tracktype", "grade3"), ("width", "3")]);
        assert_eq!(
            describe_tags(&t),
            "Surface: dirt, Track type: grade3, Width: 3"
        );
    }

    #[test]
    fn test_describe_tags_placeholder() {
        assert_eq!(describe_tags(&tags(&[("highway", "track")])), NO_DETAIL_PLACEHOLDER);
        assert_eq!(describe_tags(&tags(&[("surface", "")])), NO_DETAIL_PLACEHOLDER);
    }

    #[test]
    fn test_candidate_json_is_camel_case() {
        let candidate = ImportCandidate {
            id: "1-2".to_string(),
            display_name: "Forest Road A".to_string(),
            description_text: NO_DETAIL_PLACEHOLDER.to_string(),
            anchor_latitude: 35.0,
            anchor_longitude: 139.0,
            route: None,
            metrics: RouteMetrics {
                total_distance_meters: 280.0,
                max_segment_meters: 140.0,
                has_anomalous_segment: true,
            },
            tags: BTreeMap::new(),
        };

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["anchorLatitude"], 35.0);
        assert_eq!(json["metrics"]["totalDistanceMeters"], 280.0);
        assert_eq!(json["metrics"]["maxSegmentMeters"], 140.0);
        assert_eq!(json["metrics"]["hasAnomalousSegment"], true);
        assert!(json["metrics"].get("total_distance_meters").is_none());
    }

    #[test]
    fn test_record_geometry() {
        let mut record = ImportRecord {
            name: "A".to_string(),
            description: String::new(),
            latitude: 35.0,
            longitude: 139.0,
            route: None,
        };
        assert!(!record.has_geometry());

        record.route = Some(vec![Coordinate::new(35.0, 139.0)]);
        assert!(!record.has_geometry());

        record.route = Some(vec![Coordinate::new(35.0, 139.0), Coordinate::new(35.1, 139.0)]);
        assert!(record.has_geometry());
    }
}
