//! ## Memory-ceiling rebuild
//!
//! Mirrors `CFTree::Rebuild` in the reference implementation: once the tree
//! grows past its configured memory ceiling, a fresh tree is constructed
//! with a relaxed threshold and every existing leaf entry is reinserted into
//! it as a whole unit (see [`crate::tree::insert::insert_precomputed_entry`]),
//! not replayed point by point. The new threshold is
//! `max(2 * old_threshold, average_nearest_pair_distance^2)`, matching the
//! source's `threshold > new_threshold ? threshold*2 : new_threshold`.

use crate::point::Point;
use crate::summary::{distance, Dist};
use crate::tree::insert::insert_precomputed_entry;
use crate::tree::Tree;

/// Checks the tree's configured memory ceiling and triggers a rebuild if it
/// has been crossed. A `max_memory_entries` of zero disables the ceiling
/// entirely, matching spec.md's "0 disables" convention for the byte-based
/// ceiling this field stands in for (see `TreeConfig::max_memory_entries`).
pub(crate) fn maybe_rebuild(tree: &mut Tree) {
    let ceiling = tree.config.max_memory_entries;
    if ceiling == 0 || tree.leaf_entry_count <= ceiling {
        return;
    }
    rebuild(tree);
}

fn rebuild(tree: &mut Tree) {
    let new_threshold = next_threshold(tree);

    let mut new_config = tree.config;
    new_config.threshold = new_threshold;
    let mut new_tree = Tree::new(new_config);
    new_tree.threshold = new_threshold;

    let leaf_point_sets: Vec<Vec<Point>> = tree
        .leaf_clusters()
        .map(|handle| tree.cluster(handle).points().to_vec())
        .collect();

    for points in leaf_point_sets {
        // A rebuild only ever reorganises points that already live in the
        // tree, so a dimension mismatch here would be an internal bug, not
        // caller error; `expect` matches how the reference implementation
        // treats this as unreachable.
        insert_precomputed_entry(&mut new_tree, points)
            .expect("points already accepted by the old tree must fit the same dimension");
    }

    tree.threshold = new_tree.threshold;
    tree.nodes = new_tree.nodes;
    tree.clusters = new_tree.clusters;
    tree.root = new_tree.root;
    tree.first_leaf = new_tree.first_leaf;
    tree.last_leaf = new_tree.last_leaf;
    tree.leaf_entry_count = new_tree.leaf_entry_count;
}

/// `max(2 * current_threshold, average_nearest_pair_distance^2)` over the
/// tree's current leaf entries, matching
/// `CFTree::AverageDistanceOfClosestPairLeafEntries`.
fn next_threshold(tree: &Tree) -> f64 {
    let avg = average_nearest_pair_distance(tree);
    let squared = avg * avg;
    let doubled = tree.threshold * 2.0;
    doubled.max(squared)
}

/// Average, over every leaf node with at least two entries, of each entry's
/// distance to its nearest sibling entry in the same leaf.
fn average_nearest_pair_distance(tree: &Tree) -> f64 {
    let mut total = 0.0;
    let mut count = 0u64;

    for leaf in tree.leaf_chain() {
        let entries = &tree.node(leaf).entries;
        if entries.len() < 2 {
            continue;
        }
        for i in 0..entries.len() {
            let nearest = (0..entries.len())
                .filter(|&j| j != i)
                .map(|j| distance(Dist::D0, &entries[i].summary, &entries[j].summary))
                .fold(f64::INFINITY, f64::min);
            total += nearest;
            count += 1;
        }
    }

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}
