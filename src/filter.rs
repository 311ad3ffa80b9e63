//! Result filtering.
//!
//! Turns stitched routes into import candidates, in this order:
//! 1. Drop routes whose normalized name is already in the curated dataset
//! 2. Compute metrics for the survivors
//! 3. Drop routes whose total length is at or below the minimum
//! 4. Keep the first `max_results` in encounter order
//! 5. Build a candidate anchored at each route's first point

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::candidate::{describe_tags, ImportCandidate};
use crate::grouping::FragmentGroup;
use crate::metrics::{analyze_route_with_threshold, RouteMetrics};
use crate::stitching::StitchedRoute;
use crate::FilterConfig;

/// Normalize a road name for duplicate comparison: trim, then lowercase.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalized names of roads already in the curated dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingNames {
    names: HashSet<String>,
}

impl ExistingNames {
    /// Build the set from raw names as stored in the curated dataset.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| normalize_name(n.as_ref())).collect(),
        }
    }

    /// Whether `name` matches an existing road after normalization.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A stitched route with its metrics attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedRoute {
    pub route: StitchedRoute,
    pub metrics: RouteMetrics,
}

impl AnalyzedRoute {
    pub fn new(route: StitchedRoute, anomaly_threshold: f64) -> Self {
        let metrics = analyze_route_with_threshold(&route.points, anomaly_threshold);
        Self { route, metrics }
    }

    /// Build the candidate for this route, or `None` if it has no points.
    pub fn into_candidate(self) -> Option<ImportCandidate> {
        let AnalyzedRoute { route, metrics } = self;
        let anchor = *route.start()?;
        let id = route.id();
        let description_text = describe_tags(&route.merged_tags);
        let geometry = if route.points.len() > 1 {
            Some(route.points)
        } else {
            None
        };

        Some(ImportCandidate {
            id,
            display_name: route.name,
            description_text,
            anchor_latitude: anchor.latitude,
            anchor_longitude: anchor.longitude,
            route: geometry,
            metrics,
            tags: route.merged_tags,
        })
    }
}

/// Counts of routes removed at each filter step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
    pub duplicates_skipped: usize,
    pub too_short: usize,
    pub truncated: usize,
}

/// Filters stitched routes down to import candidates.
#[derive(Debug, Clone)]
pub struct ResultFilter {
    existing: ExistingNames,
    config: FilterConfig,
}

impl ResultFilter {
    pub fn new(existing: ExistingNames, config: FilterConfig) -> Self {
        Self { existing, config }
    }

    /// Drop groups whose key is already curated, so they are never stitched.
    ///
    /// Returns the remaining groups and how many were dropped.
    pub fn skip_existing_groups(
        &self,
        groups: Vec<FragmentGroup>,
    ) -> (Vec<FragmentGroup>, usize) {
        if self.existing.is_empty() {
            return (groups, 0);
        }
        let before = groups.len();
        let remaining: Vec<FragmentGroup> = groups
            .into_iter()
            .filter(|g| !self.existing.contains(&g.key))
            .collect();
        let skipped = before - remaining.len();
        (remaining, skipped)
    }

    /// Run every filter step and build candidates.
    pub fn apply(&self, routes: Vec<StitchedRoute>) -> Vec<ImportCandidate> {
        self.apply_with_stats(routes).0
    }

    /// Like [`ResultFilter::apply`], also reporting what was removed.
    pub fn apply_with_stats(
        &self,
        routes: Vec<StitchedRoute>,
    ) -> (Vec<ImportCandidate>, FilterStats) {
        let before = routes.len();
        let analyzed: Vec<AnalyzedRoute> = routes
            .into_iter()
            .filter(|r| !self.existing.contains(&r.name))
            .map(|r| AnalyzedRoute::new(r, self.config.anomaly_threshold_meters))
            .collect();
        let duplicates_skipped = before - analyzed.len();

        let (candidates, mut stats) = self.select(analyzed);
        stats.duplicates_skipped = duplicates_skipped;

        debug!(
            "[ResultFilter] {} routes in, {} candidates out \
             ({} existing, {} too short, {} over cap)",
            before,
            candidates.len(),
            stats.duplicates_skipped,
            stats.too_short,
            stats.truncated
        );

        (candidates, stats)
    }

    /// Steps 3-5 on routes whose metrics are already known.
    ///
    /// Does not re-check existing names.
    pub fn select(&self, analyzed: Vec<AnalyzedRoute>) -> (Vec<ImportCandidate>, FilterStats) {
        let before = analyzed.len();
        let long_enough: Vec<AnalyzedRoute> = analyzed
            .into_iter()
            .filter(|a| a.metrics.total_distance_meters > self.config.min_total_distance_meters)
            .collect();
        let too_short = before - long_enough.len();
        let truncated = long_enough.len().saturating_sub(self.config.max_results);

        let candidates = long_enough
            .into_iter()
            .take(self.config.max_results)
            .filter_map(AnalyzedRoute::into_candidate)
            .collect();

        (
            candidates,
            FilterStats {
                duplicates_skipped: 0,
                too_short,
                truncated,
            },
        )
    }
}
