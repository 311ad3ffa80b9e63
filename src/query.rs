//! Upstream query construction.
//!
//! Builds Overpass QL selecting unpaved roads (`highway=track`, plus
//! `highway=service` with `surface=unpaved`) either inside a region's
//! bounding box or inside a named city area of that region.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::regions::require_region;
use crate::Bounds;

/// Suffixes tried after a bare city name (city, town, village).
const MUNICIPALITY_SUFFIXES: [&str; 3] = ["市", "町", "村"];

/// Area an import run covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AreaQuery {
    /// Every matching way inside the box
    BoundingBox { region: String, bounds: Bounds },
    /// Ways inside a municipality area of the region
    NamedArea { region: String, city: String },
}

impl AreaQuery {
    /// Build a query for a catalogued region, optionally narrowed to a city.
    ///
    /// A blank city name falls back to the region's bounding box.
    pub fn for_region(region: &str, city: Option<&str>) -> Result<Self> {
        let region = region.trim();
        let bounds = require_region(region)?;

        match city.map(str::trim).filter(|c| !c.is_empty()) {
            Some(city) => Ok(AreaQuery::NamedArea {
                region: region.to_string(),
                city: city.to_string(),
            }),
            None => Ok(AreaQuery::BoundingBox {
                region: region.to_string(),
                bounds,
            }),
        }
    }

    pub fn region(&self) -> &str {
        match self {
            AreaQuery::BoundingBox { region, .. } | AreaQuery::NamedArea { region, .. } => region,
        }
    }

    /// Render as Overpass QL with the given server-side timeout.
    pub fn to_overpass_ql(&self, timeout_secs: u32) -> String {
        let mut ql = format!("[out:json][timeout:{}];\n", timeout_secs);

        match self {
            AreaQuery::BoundingBox { bounds, .. } => {
                let bbox = format!(
                    "({},{},{},{})",
                    bounds.min_lat, bounds.min_lng, bounds.max_lat, bounds.max_lng
                );
                ql.push_str("(\n");
                ql.push_str(&format!("  way[\"highway\"=\"track\"]{};\n", bbox));
                ql.push_str(&format!(
                    "  way[\"highway\"=\"service\"][\"surface\"=\"unpaved\"]{};\n",
                    bbox
                ));
                ql.push_str(");\n");
            }
            AreaQuery::NamedArea { region, city } => {
                let region = escape_ql(region);
                let city = escape_ql(city);
                ql.push_str(&format!(
                    "area[\"name\"=\"{}\"][\"admin_level\"~\"^(3|4)$\"]->.region;\n",
                    region
                ));
                ql.push_str("(\n");
                ql.push_str(&format!("  area[\"name\"=\"{}\"](area.region);\n", city));
                for suffix in MUNICIPALITY_SUFFIXES {
                    ql.push_str(&format!(
                        "  area[\"name\"=\"{}{}\"](area.region);\n",
                        city, suffix
                    ));
                }
                ql.push_str(")->.city;\n");
                ql.push_str("(\n");
                ql.push_str("  way[\"highway\"=\"track\"](area.city);\n");
                ql.push_str(
                    "  way[\"highway\"=\"service\"][\"surface\"=\"unpaved\"](area.city);\n",
                );
                ql.push_str(");\n");
            }
        }

        ql.push_str("out geom;\n");
        ql
    }
}

/// Escape a value for use inside a double-quoted QL string.
fn escape_ql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImportError;

    #[test]
    fn test_bounding_box_query() {
        let query = AreaQuery::for_region("群馬県", None).unwrap();
        assert_eq!(query.region(), "群馬県");

        let ql = query.to_overpass_ql(25);
        assert!(ql.starts_with("[out:json][timeout:25];"));
        assert!(ql.contains("way[\"highway\"=\"track\"](36,138.4,36.7,139.5);"));
        assert!(ql.contains("[\"surface\"=\"unpaved\"](36,138.4,36.7,139.5);"));
        assert!(ql.trim_end().ends_with("out geom;"));
    }

    #[test]
    fn test_named_area_query() {
        let query = AreaQuery::for_region("長野県", Some(" 松本 ")).unwrap();
        assert!(matches!(query, AreaQuery::NamedArea { ref city, .. } if city == "松本"));

        let ql = query.to_overpass_ql(60);
        assert!(ql.contains("area[\"name\"=\"長野県\"]"));
        assert!(ql.contains("area[\"name\"=\"松本\"](area.region);"));
        assert!(ql.contains("area[\"name\"=\"松本市\"](area.region);"));
        assert!(ql.contains("area[\"name\"=\"松本村\"](area.region);"));
        assert!(ql.contains("way[\"highway\"=\"track\"](area.city);"));
    }

    #[test]
    fn test_blank_city_uses_bounding_box() {
        let query = AreaQuery::for_region("長野県", Some("   ")).unwrap();
        assert!(matches!(query, AreaQuery::BoundingBox { .. }));
    }

    #[test]
    fn test_unknown_region_rejected() {
        let err = AreaQuery::for_region("Atlantis", None).unwrap_err();
        assert!(matches!(err, ImportError::UnknownRegion { .. }));
    }

    #[test]
    fn test_city_is_escaped() {
        let query = AreaQuery::NamedArea {
            region: "長野県".to_string(),
            city: "a\"]; out;".to_string(),
        };
        assert!(query.to_overpass_ql(25).contains("a\\\"]; out;"));
    }
}
