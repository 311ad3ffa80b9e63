//! Raw way fragments and the Overpass JSON wire format.
//!
//! A fragment is one OpenStreetMap way returned by `out geom;`. Fragments are
//! never mutated after decoding; the grouper and stitcher only read them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};
use crate::Coordinate;

/// Label used when a fragment has neither a name nor a ref.
pub const GENERIC_ROAD_LABEL: &str = "Forest road";

/// A single raw polyline from the upstream dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Upstream way id
    pub source_id: String,
    /// Points in upstream order
    pub geometry: Vec<Coordinate>,
    /// All upstream tags
    pub tags: BTreeMap<String, String>,
    /// `name` tag, if present
    pub name: Option<String>,
    /// `ref` tag, if present
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

impl Fragment {
    /// Build a fragment from its id, geometry and tag map.
    ///
    /// `name` and `reference` are lifted from the `name` and `ref` tags.
    pub fn new(
        source_id: impl Into<String>,
        geometry: Vec<Coordinate>,
        tags: BTreeMap<String, String>,
    ) -> Self {
        let name = tags.get("name").cloned();
        let reference = tags.get("ref").cloned();
        Self {
            source_id: source_id.into(),
            geometry,
            tags,
            name,
            reference,
        }
    }

    /// Shorthand for a fragment carrying only a `name` tag.
    pub fn named(source_id: impl Into<String>, name: &str, geometry: Vec<Coordinate>) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("name".to_string(), name.to_string());
        Self::new(source_id, geometry, tags)
    }

    /// Add or replace a tag, keeping `name`/`reference` in sync.
    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        match key {
            "name" => self.name = Some(value.to_string()),
            "ref" => self.reference = Some(value.to_string()),
            _ => {}
        }
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    fn name_tag(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    fn ref_tag(&self) -> Option<&str> {
        self.reference.as_deref().filter(|s| !s.is_empty())
    }

    /// Name used to group this fragment: `name`, else `ref`, else a generic
    /// label embedding the source id. Empty strings count as absent.
    pub fn display_name(&self) -> String {
        match self.name_tag().or_else(|| self.ref_tag()) {
            Some(name) => name.to_string(),
            None => format!("{} {}", GENERIC_ROAD_LABEL, self.source_id),
        }
    }

    /// A fragment contributes data only if it has points and a name or ref.
    pub fn is_usable(&self) -> bool {
        !self.geometry.is_empty() && (self.name_tag().is_some() || self.ref_tag().is_some())
    }

    pub fn start(&self) -> Option<&Coordinate> {
        self.geometry.first()
    }

    pub fn end(&self) -> Option<&Coordinate> {
        self.geometry.last()
    }
}

// ============================================================================
// Overpass wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: ElementId,
    #[serde(default)]
    geometry: Option<Vec<Option<OverpassNode>>>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// Overpass emits numeric ids; other producers of the same shape use strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ElementId {
    Number(u64),
    Text(String),
}

impl ElementId {
    fn into_string(self) -> String {
        match self {
            ElementId::Number(n) => n.to_string(),
            ElementId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OverpassNode {
    lat: f64,
    lon: f64,
}

impl From<OverpassElement> for Fragment {
    fn from(el: OverpassElement) -> Self {
        // Null nodes appear for members clipped out of the query area
        let geometry = el
            .geometry
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .map(|n| Coordinate::new(n.lat, n.lon))
            .filter(Coordinate::is_valid)
            .collect();
        Fragment::new(el.id.into_string(), geometry, el.tags)
    }
}

/// Decode an Overpass `out geom;` JSON body into fragments.
///
/// Every element is returned, usable or not; filtering is the grouper's job.
/// Nodes outside WGS84 ranges are dropped from the geometry.
/// A body that is not the expected shape is an upstream failure.
pub fn parse_overpass_response(body: &str) -> Result<Vec<Fragment>> {
    let response: OverpassResponse = serde_json::from_str(body)
        .map_err(|e| ImportError::upstream(format!("Invalid Overpass response: {}", e)))?;

    Ok(response.elements.into_iter().map(Fragment::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_precedence() {
        let geom = vec![Coordinate::new(35.0, 139.0)];

        let f = Fragment::named("1", "Forest Road A", geom.clone()).with_tag("ref", "R7");
        assert_eq!(f.display_name(), "Forest Road A");

        let f = Fragment::new("2", geom.clone(), BTreeMap::new()).with_tag("ref", "R7");
        assert_eq!(f.display_name(), "R7");

        let f = Fragment::new("3", geom.clone(), BTreeMap::new());
        assert_eq!(f.display_name(), "Forest road 3");

        // Empty name falls through to ref
        let f = Fragment::named("4", "", geom).with_tag("ref", "R9");
        assert_eq!(f.display_name(), "R9");
    }

    #[test]
    fn test_usability() {
        let geom = vec![Coordinate::new(35.0, 139.0)];
        assert!(Fragment::named("1", "A", geom.clone()).is_usable());
        assert!(!Fragment::named("2", "A", vec![]).is_usable());
        assert!(!Fragment::new("3", geom.clone(), BTreeMap::new()).is_usable());
        assert!(!Fragment::named("4", "", geom).is_usable());
    }

    #[test]
    fn test_parse_overpass_response() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {
                    "type": "way",
                    "id": 123456,
                    "geometry": [{"lat": 35.0, "lon": 139.0}, {"lat": 35.001, "lon": 139.001}],
                    "tags": {"highway": "track", "name": "Forest Road A", "surface": "dirt"}
                },
                {"type": "way", "id": "w7", "tags": {"ref": "R7"}},
                {"type": "way", "id": 9, "geometry": [null, {"lat": 36.0, "lon": 140.0}]}
            ]
        }"#;

        let fragments = parse_overpass_response(body).unwrap();
        assert_eq!(fragments.len(), 3);

        assert_eq!(fragments[0].source_id, "123456");
        assert_eq!(fragments[0].name.as_deref(), Some("Forest Road A"));
        assert_eq!(fragments[0].geometry.len(), 2);
        assert_eq!(fragments[0].geometry[1], Coordinate::new(35.001, 139.001));
        assert_eq!(fragments[0].tags.get("surface").map(String::as_str), Some("dirt"));

        assert_eq!(fragments[1].source_id, "w7");
        assert_eq!(fragments[1].reference.as_deref(), Some("R7"));
        assert!(fragments[1].geometry.is_empty());
        assert!(!fragments[1].is_usable());

        assert_eq!(fragments[2].geometry, vec![Coordinate::new(36.0, 140.0)]);
        assert!(fragments[2].tags.is_empty());
    }

    #[test]
    fn test_parse_drops_out_of_range_nodes() {
        let body = r#"{"elements": [
            {"id": 5, "tags": {"name": "Rindo"}, "geometry": [
                {"lat": 35.0, "lon": 139.0},
                {"lat": 95.0, "lon": 139.0},
                {"lat": 35.001, "lon": 539.0},
                {"lat": 35.002, "lon": 139.0}
            ]},
            {"id": 6, "tags": {"name": "Rindo"}, "geometry": [{"lat": -91.0, "lon": 0.0}]}
        ]}"#;

        let fragments = parse_overpass_response(body).unwrap();
        assert_eq!(
            fragments[0].geometry,
            vec![Coordinate::new(35.0, 139.0), Coordinate::new(35.002, 139.0)]
        );
        assert!(fragments[1].geometry.is_empty());
        assert!(!fragments[1].is_usable());
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        let err = parse_overpass_response("<html>rate limited</html>").unwrap_err();
        assert!(err.is_upstream());

        let fragments = parse_overpass_response(r#"{"elements": []}"#).unwrap();
        assert!(fragments.is_empty());
    }
}
