//! # Track Stitcher
//!
//! Reconstructs unpaved-road routes from fragmented OpenStreetMap ways and
//! flags suspicious geometry before the roads are imported into a curated
//! dataset.
//!
//! This library provides:
//! - Grouping of raw way fragments by road name
//! - Greedy nearest-endpoint stitching of each group into one route
//! - Haversine route metrics with long-jump detection
//! - Filtering against already-curated roads, with a length floor and a cap
//! - A review session that gates flagged routes behind explicit confirmation
//!
//! ## Features
//!
//! - **`parallel`** - Stitch road groups in parallel with rayon
//! - **`http`** - Enable the Overpass API client
//! - **`cli`** - Build the `track-stitcher` command line tool
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use track_stitcher::{build_candidates, Coordinate, ExistingNames, Fragment, ImportConfig};
//!
//! let fragments = vec![
//!     Fragment::named("1", "Forest Road A", vec![
//!         Coordinate::new(35.0, 139.0),
//!         Coordinate::new(35.001, 139.001),
//!     ]),
//!     Fragment::named("2", "Forest Road A", vec![
//!         Coordinate::new(35.002, 139.002),
//!         Coordinate::new(35.001, 139.001),
//!     ]),
//! ];
//!
//! let output = build_candidates(fragments, &ExistingNames::default(), &ImportConfig::default());
//! let road = &output.candidates[0];
//! assert_eq!(road.display_name, "Forest Road A");
//! assert_eq!(road.route.as_ref().map(|r| r.len()), Some(3));
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{ImportError, OptionExt, Result};

// Geographic utilities (haversine, planar proximity)
pub mod geo_utils;

// Raw input fragments and the Overpass wire format
pub mod fragment;
pub use fragment::{parse_overpass_response, Fragment, GENERIC_ROAD_LABEL};

// Fragment grouping by resolved road name
pub mod grouping;
pub use grouping::{group_fragments, FragmentGroup};

// Greedy nearest-endpoint route stitching
pub mod stitching;
pub use stitching::{stitch_group, stitch_groups, Attachment, StitchedRoute};
#[cfg(feature = "parallel")]
pub use stitching::stitch_groups_parallel;

// Route metrics and anomaly classification
pub mod metrics;
pub use metrics::{analyze_route, ReviewFlag, RouteMetrics, ANOMALY_THRESHOLD_METERS};

// Import candidates and bulk-insert records
pub mod candidate;
pub use candidate::{describe_tags, ImportCandidate, ImportRecord, NO_DETAIL_PLACEHOLDER};

// Result filtering against the curated dataset
pub mod filter;
pub use filter::{normalize_name, AnalyzedRoute, ExistingNames, ResultFilter};

// Region catalogue and upstream query text
pub mod regions;
pub mod query;
pub use query::AreaQuery;

// Overpass API client
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::{BlockingOverpassSource, OverpassClient};

// Curated-dataset boundary
pub mod store;
pub use store::{bulk_import, BulkImportReport, ImportFailure, InMemoryRoadStore, RoadStore};

// Human review of candidates
pub mod review;
pub use review::{Approval, ReviewEntry, ReviewSession, ReviewStatus};

// End-to-end wiring
pub mod pipeline;
pub use pipeline::{build_candidates, run_import, FragmentSource, PipelineOutput, PipelineStats};

// ============================================================================
// Core Types
// ============================================================================

/// A WGS84 coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use track_stitcher::Coordinate;
/// let point = Coordinate::new(35.6812, 139.7671); // Tokyo Station
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Within WGS84 ranges. NaN and infinities are never valid.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.longitude, c.latitude)
    }
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from south/west/north/east edges.
    pub const fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Thresholds applied by the result filter and the anomaly flagger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Maximum number of candidates returned.
    /// Default: 100
    pub max_results: usize,

    /// Routes with a total length at or below this are dropped as noise.
    /// Default: 100.0 meters
    pub min_total_distance_meters: f64,

    /// A consecutive-point jump longer than this marks the route for review.
    /// Default: 100.0 meters
    pub anomaly_threshold_meters: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_results: 100,
            min_total_distance_meters: 100.0,
            anomaly_threshold_meters: ANOMALY_THRESHOLD_METERS,
        }
    }
}

/// Settings for the Overpass boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Overpass interpreter endpoint.
    pub endpoint: String,

    /// Server-side query timeout written into the query text, in seconds.
    /// Default: 25
    pub query_timeout_secs: u32,

    /// Client-side HTTP timeout, in seconds.
    /// Default: 30
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://overpass-api.de/api/interpreter".to_string(),
            query_timeout_secs: 25,
            request_timeout_secs: 30,
        }
    }
}

/// Full import configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub filter: FilterConfig,
    pub upstream: UpstreamConfig,
}

impl ImportConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ImportConfig =
            serde_json::from_str(json).map_err(|e| ImportError::Config {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds that would make every route pass or fail silently.
    pub fn validate(&self) -> Result<()> {
        let f = &self.filter;
        if !f.min_total_distance_meters.is_finite() || f.min_total_distance_meters < 0.0 {
            return Err(ImportError::Config {
                message: format!(
                    "min_total_distance_meters must be a non-negative number, got {}",
                    f.min_total_distance_meters
                ),
            });
        }
        if !f.anomaly_threshold_meters.is_finite() || f.anomaly_threshold_meters <= 0.0 {
            return Err(ImportError::Config {
                message: format!(
                    "anomaly_threshold_meters must be positive, got {}",
                    f.anomaly_threshold_meters
                ),
            });
        }
        if self.upstream.endpoint.trim().is_empty() {
            return Err(ImportError::Config {
                message: "upstream endpoint is empty".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
