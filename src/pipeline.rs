//! End-to-end import pipeline.
//!
//! [`build_candidates`] is the pure core: group → stitch → analyze → filter.
//! [`run_import`] adds the two reads around it, fetching fragments from the
//! upstream source and existing names from the store.

use std::time::Instant;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::candidate::ImportCandidate;
use crate::error::Result;
use crate::filter::{ExistingNames, ResultFilter};
use crate::fragment::Fragment;
use crate::grouping::group_fragments;
use crate::query::AreaQuery;
use crate::store::RoadStore;
use crate::ImportConfig;

#[cfg(not(feature = "parallel"))]
use crate::stitching::stitch_groups;
#[cfg(feature = "parallel")]
use crate::stitching::stitch_groups_parallel;

/// Source of raw fragments for an area.
pub trait FragmentSource {
    fn fetch_fragments(&self, query: &AreaQuery) -> Result<Vec<Fragment>>;
}

/// Counts describing one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub fragments_received: usize,
    pub fragments_usable: usize,
    pub groups: usize,
    /// Fragments left out of their route by the stitcher
    pub fragments_dropped: usize,
    pub duplicates_skipped: usize,
    pub too_short: usize,
    pub truncated: usize,
    pub candidates: usize,
    pub review_required: usize,
}

/// Candidates plus run statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub candidates: Vec<ImportCandidate>,
    pub stats: PipelineStats,
}

/// Run grouping, stitching and filtering over already-fetched fragments.
///
/// Never fails; an empty candidate list is a valid result.
pub fn build_candidates(
    fragments: Vec<Fragment>,
    existing: &ExistingNames,
    config: &ImportConfig,
) -> PipelineOutput {
    let start = Instant::now();
    let fragments_received = fragments.len();

    let groups = group_fragments(fragments);
    let fragments_usable = groups.iter().map(|g| g.fragments.len()).sum();
    let group_count = groups.len();

    let filter = ResultFilter::new(existing.clone(), config.filter.clone());
    let (groups, existing_groups) = filter.skip_existing_groups(groups);

    #[cfg(feature = "parallel")]
    let routes = stitch_groups_parallel(groups);
    #[cfg(not(feature = "parallel"))]
    let routes = stitch_groups(groups);

    let fragments_dropped = routes.iter().map(|r| r.dropped_fragment_ids.len()).sum();

    let (candidates, filter_stats) = filter.apply_with_stats(routes);

    let stats = PipelineStats {
        fragments_received,
        fragments_usable,
        groups: group_count,
        fragments_dropped,
        duplicates_skipped: existing_groups + filter_stats.duplicates_skipped,
        too_short: filter_stats.too_short,
        truncated: filter_stats.truncated,
        candidates: candidates.len(),
        review_required: candidates.iter().filter(|c| c.requires_review()).count(),
    };

    info!(
        "[Pipeline] {} fragments -> {} groups -> {} candidates ({} need review) in {:.1}ms",
        stats.fragments_received,
        stats.groups,
        stats.candidates,
        stats.review_required,
        start.elapsed().as_secs_f64() * 1000.0
    );

    PipelineOutput { candidates, stats }
}

/// Fetch, look up existing names, and build candidates.
///
/// Only an upstream failure aborts the run. If the existing-name lookup
/// fails the run continues without duplicate filtering.
pub fn run_import(
    source: &dyn FragmentSource,
    store: &dyn RoadStore,
    query: &AreaQuery,
    config: &ImportConfig,
) -> Result<PipelineOutput> {
    let fragments = source.fetch_fragments(query)?;

    let existing = match store.existing_road_names() {
        Ok(names) => {
            let existing = ExistingNames::from_names(names);
            debug!("[Pipeline] {} existing road names loaded", existing.len());
            existing
        }
        Err(e) => {
            warn!("[Pipeline] Could not load existing road names: {}", e);
            ExistingNames::default()
        }
    };

    Ok(build_candidates(fragments, &existing, config))
}
