//! Fragment grouping.
//!
//! Collects usable fragments into one group per resolved display name,
//! keeping first-seen group order and encounter order inside each group.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::fragment::Fragment;

/// All fragments sharing one resolved display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentGroup {
    /// Resolved display name shared by every fragment
    pub key: String,
    /// Fragments in encounter order
    pub fragments: Vec<Fragment>,
}

impl FragmentGroup {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fragments: Vec::new(),
        }
    }
}

/// Group fragments by display name.
///
/// Fragments with no points, or with neither a name nor a ref, are dropped.
/// Duplicate source ids are kept as separate fragments.
///
/// # Example
/// ```
/// use track_stitcher::{group_fragments, Coordinate, Fragment};
///
/// let p = vec![Coordinate::new(35.0, 139.0)];
/// let groups = group_fragments(vec![
///     Fragment::named("1", "A", p.clone()),
///     Fragment::named("2", "B", p.clone()),
///     Fragment::named("3", "A", p.clone()),
/// ]);
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].key, "A");
/// assert_eq!(groups[0].fragments.len(), 2);
/// ```
pub fn group_fragments(fragments: impl IntoIterator<Item = Fragment>) -> Vec<FragmentGroup> {
    let mut groups: Vec<FragmentGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut dropped = 0usize;

    for fragment in fragments {
        if !fragment.is_usable() {
            dropped += 1;
            continue;
        }

        let key = fragment.display_name();
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = groups.len();
                groups.push(FragmentGroup::new(key.clone()));
                index.insert(key, slot);
                slot
            }
        };
        groups[slot].fragments.push(fragment);
    }

    debug!(
        "[Grouper] {} groups, {} unusable fragments dropped",
        groups.len(),
        dropped
    );

    groups
}
