//! Route stitching.
//!
//! Reassembles one continuous route from the fragments of a group by greedy
//! nearest-endpoint chaining:
//!
//! 1. The first fragment seeds the route in its original orientation.
//! 2. Every remaining fragment is scored against both ends of the route in
//!    four ways (see [`Attachment`]) using planar degree distance.
//! 3. The single closest attachment wins; ties go to the earlier fragment,
//!    then to the earlier attachment in [`Attachment::ALL`].
//! 4. Repeat until nothing is left or nothing yields a finite distance.
//!
//! There is no backtracking. A locally wrong choice produces a long straight
//! jump, which the anomaly flag in [`crate::metrics`] exists to catch.

use std::collections::{BTreeMap, VecDeque};

use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::fragment::Fragment;
use crate::geo_utils::planar_distance;
use crate::grouping::FragmentGroup;
use crate::Coordinate;

/// One route reconstructed from a fragment group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StitchedRoute {
    /// Resolved display name of the group
    pub name: String,
    /// Single traversal through the connected fragments
    pub points: Vec<Coordinate>,
    /// Union of fragment tags; earliest fragment wins on conflicts
    pub merged_tags: BTreeMap<String, String>,
    /// Source ids of every fragment in the group, in encounter order
    pub source_ids: Vec<String>,
    /// Fragments that could not be attached, in encounter order
    pub dropped_fragment_ids: Vec<String>,
}

impl StitchedRoute {
    /// Combined identifier: source ids joined with `-`.
    pub fn id(&self) -> String {
        self.source_ids.join("-")
    }

    pub fn start(&self) -> Option<&Coordinate> {
        self.points.first()
    }

    /// True when every fragment made it into `points`.
    pub fn is_complete(&self) -> bool {
        self.dropped_fragment_ids.is_empty()
    }
}

/// How a candidate chain joins the assembled route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attachment {
    /// Route end → chain start
    Append,
    /// Route end → chain end, chain reversed
    AppendReversed,
    /// Chain end → route start
    Prepend,
    /// Chain start → route start, chain reversed
    PrependReversed,
}

impl Attachment {
    /// Evaluation order; earlier entries win ties.
    pub const ALL: [Attachment; 4] = [
        Attachment::Append,
        Attachment::AppendReversed,
        Attachment::Prepend,
        Attachment::PrependReversed,
    ];

    pub fn is_reversed(self) -> bool {
        matches!(self, Attachment::AppendReversed | Attachment::PrependReversed)
    }

    pub fn is_prepend(self) -> bool {
        matches!(self, Attachment::Prepend | Attachment::PrependReversed)
    }

    /// Planar gap between the route end this attachment uses and the chain
    /// endpoint that would touch it.
    pub fn gap(
        self,
        route_start: &Coordinate,
        route_end: &Coordinate,
        chain_start: &Coordinate,
        chain_end: &Coordinate,
    ) -> f64 {
        match self {
            Attachment::Append => planar_distance(route_end, chain_start),
            Attachment::AppendReversed => planar_distance(route_end, chain_end),
            Attachment::Prepend => planar_distance(route_start, chain_end),
            Attachment::PrependReversed => planar_distance(route_start, chain_start),
        }
    }
}

/// A fragment placed in the assembled route.
#[derive(Debug, Clone, Copy)]
struct Placement {
    chain: usize,
    reversed: bool,
}

/// Stitch one group into a route.
///
/// Never fails: fragments that cannot be attached are listed in
/// `dropped_fragment_ids` and left out of `points`.
///
/// # Example
/// ```
/// use track_stitcher::{stitch_group, Coordinate, Fragment, FragmentGroup};
///
/// let mut group = FragmentGroup::new("Forest Road A");
/// group.fragments.push(Fragment::named("1", "Forest Road A", vec![
///     Coordinate::new(35.0, 139.0),
///     Coordinate::new(35.001, 139.001),
/// ]));
/// group.fragments.push(Fragment::named("2", "Forest Road A", vec![
///     Coordinate::new(35.002, 139.002),
///     Coordinate::new(35.001, 139.001),
/// ]));
///
/// let route = stitch_group(group);
/// assert_eq!(route.points, vec![
///     Coordinate::new(35.0, 139.0),
///     Coordinate::new(35.001, 139.001),
///     Coordinate::new(35.002, 139.002),
/// ]);
/// ```
pub fn stitch_group(group: FragmentGroup) -> StitchedRoute {
    let FragmentGroup { key, fragments } = group;

    let (points, dropped) = chain_fragments(&fragments);
    if !dropped.is_empty() {
        debug!(
            "[Stitcher] '{}': {} of {} fragments left unconnected",
            key,
            dropped.len(),
            fragments.len()
        );
    }

    StitchedRoute {
        points,
        merged_tags: merge_tags(&fragments),
        source_ids: fragments.iter().map(|f| f.source_id.clone()).collect(),
        dropped_fragment_ids: dropped
            .into_iter()
            .map(|i| fragments[i].source_id.clone())
            .collect(),
        name: key,
    }
}

/// Stitch every group, preserving group order.
pub fn stitch_groups(groups: Vec<FragmentGroup>) -> Vec<StitchedRoute> {
    groups.into_iter().map(stitch_group).collect()
}

/// Parallel version of [`stitch_groups`].
///
/// Groups share no state, so each is stitched independently. Output order
/// matches input order.
#[cfg(feature = "parallel")]
pub fn stitch_groups_parallel(groups: Vec<FragmentGroup>) -> Vec<StitchedRoute> {
    groups.into_par_iter().map(stitch_group).collect()
}

/// Earliest fragment's value wins for every key.
fn merge_tags(fragments: &[Fragment]) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for fragment in fragments {
        for (key, value) in &fragment.tags {
            merged
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
    merged
}

/// Greedy chaining over an arena of fragments indexed by position.
///
/// Returns the flattened points and the indices of fragments never attached.
fn chain_fragments(fragments: &[Fragment]) -> (Vec<Coordinate>, Vec<usize>) {
    match fragments {
        [] => return (Vec::new(), Vec::new()),
        [only] => return (only.geometry.clone(), Vec::new()),
        _ => {}
    }

    let mut order: VecDeque<Placement> = VecDeque::with_capacity(fragments.len());
    order.push_back(Placement {
        chain: 0,
        reversed: false,
    });
    let mut route_start = fragments[0].start().copied();
    let mut route_end = fragments[0].end().copied();
    let mut remaining: Vec<usize> = (1..fragments.len()).collect();

    while !remaining.is_empty() {
        let (Some(start), Some(end)) = (route_start, route_end) else {
            break;
        };

        // (position in remaining, attachment, gap)
        let mut best: Option<(usize, Attachment, f64)> = None;
        for (pos, &chain) in remaining.iter().enumerate() {
            let fragment = &fragments[chain];
            let (Some(chain_start), Some(chain_end)) = (fragment.start(), fragment.end()) else {
                continue;
            };
            for attachment in Attachment::ALL {
                let gap = attachment.gap(&start, &end, chain_start, chain_end);
                // NaN never compares less, so it can never be chosen
                if gap < best.map_or(f64::INFINITY, |(_, _, g)| g) {
                    best = Some((pos, attachment, gap));
                }
            }
        }

        let Some((pos, attachment, _)) = best else {
            break;
        };

        let chain = remaining.remove(pos);
        let fragment = &fragments[chain];
        let placement = Placement {
            chain,
            reversed: attachment.is_reversed(),
        };

        if attachment.is_prepend() {
            route_start = if placement.reversed {
                fragment.end().copied()
            } else {
                fragment.start().copied()
            };
            order.push_front(placement);
        } else {
            route_end = if placement.reversed {
                fragment.start().copied()
            } else {
                fragment.end().copied()
            };
            order.push_back(placement);
        }
    }

    let total: usize = order.iter().map(|p| fragments[p.chain].geometry.len()).sum();
    let mut points = Vec::with_capacity(total);
    for placement in order {
        let geometry = &fragments[placement.chain].geometry;
        if placement.reversed {
            extend_at_junction(&mut points, geometry.iter().rev());
        } else {
            extend_at_junction(&mut points, geometry.iter());
        }
    }

    (points, remaining)
}

/// Append a chain, emitting a shared junction point only once.
fn extend_at_junction<'a>(
    points: &mut Vec<Coordinate>,
    chain: impl Iterator<Item = &'a Coordinate>,
) {
    let mut chain = chain.peekable();
    if let (Some(last), Some(first)) = (points.last(), chain.peek()) {
        if last == *first {
            chain.next();
        }
    }
    points.extend(chain.copied());
}
