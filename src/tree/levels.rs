//! ## Height and multilevel RNG snapshots
//!
//! [`compute_height`] mirrors `CFTree::ComputeHeight`: a post-order walk
//! that reports the number of edges from the root to the shallowest point
//! at which every path reaches a leaf. [`create_multilevel_rng`] mirrors
//! `CFTree::CreateMultilevelRNG`: a breadth-first walk that, for every level
//! of the tree, gathers that level's entries and runs the batch RNG engine
//! over their centroids, skipping (but still recording, as empty) any level
//! whose entry count exceeds the iRNG cutoff.
//!
//! [`assign_initial_ids`] and [`create_hierarchical_rng`] are the batch-mode
//! counterparts to the online per-insertion path-string assignment and
//! per-node RNG refresh (`CFTree::AssignInitialID`,
//! `CFTree::CreateHierarchicalRNG`): useful to resynchronize the whole tree
//! in one parallel-friendly pass after a bulk load or a rebuild, instead of
//! touching one node at a time.

use crate::rng::batch;
use crate::rng::graph::Edge;
use crate::tree::entry::Child;
use crate::tree::insert;
use crate::tree::{NodeHandle, Tree};

/// Height of the subtree rooted at `node`: zero for a leaf node, one plus
/// the tallest child subtree otherwise.
pub fn compute_height(tree: &Tree, node: NodeHandle) -> usize {
    if tree.node(node).is_leaf {
        return 0;
    }
    tree.node(node)
        .entries
        .iter()
        .map(|entry| match entry.child {
            Child::Internal(child) => 1 + compute_height(tree, child),
            Child::Leaf(_) => unreachable!("internal node entries always point at another node"),
        })
        .max()
        .unwrap_or(0)
}

/// One level of a [`create_multilevel_rng`] snapshot.
#[derive(Debug, Clone)]
pub struct LevelSnapshot {
    /// Path strings of every entry gathered at this level, in the same
    /// order as the centroids fed to the RNG engine — `edges`' indices
    /// refer into this list.
    pub entry_paths: Vec<String>,
    /// RNG edges over this level's entry centroids. Empty both when the
    /// level genuinely has no edges and when the level was skipped; use
    /// `skipped` to tell the two apart.
    pub edges: Vec<Edge>,
    /// Whether this level was skipped because its entry count exceeded the
    /// configured cutoff (too dense to be visually or computationally
    /// useful, per spec.md section 4.6).
    pub skipped: bool,
}

/// Builds one [`LevelSnapshot`] per tree level, breadth-first from the
/// root down to [`compute_height`]'s edge count. A level whose entry count
/// exceeds `cutoff` is recorded with empty `entry_paths`/`edges` and
/// `skipped: true`, but level enumeration continues into that level's
/// children regardless — only the graph for that one level is skipped.
pub fn create_multilevel_rng(tree: &Tree, cutoff: usize) -> Vec<LevelSnapshot> {
    let height = compute_height(tree, tree.root());
    let mut levels = Vec::with_capacity(height + 1);
    let mut current: Vec<NodeHandle> = vec![tree.root()];

    for _ in 0..=height {
        let mut entry_paths = Vec::new();
        let mut centroids = Vec::new();
        let mut next_level = Vec::new();

        for &node in &current {
            for entry in &tree.node(node).entries {
                entry_paths.push(entry.path.clone());
                centroids.push(
                    entry
                        .summary
                        .centroid()
                        .unwrap_or_else(|| vec![0.0; tree.config().dimension]),
                );
                if let Child::Internal(child) = entry.child {
                    next_level.push(child);
                }
            }
        }

        if entry_paths.len() > cutoff {
            levels.push(LevelSnapshot {
                entry_paths: Vec::new(),
                edges: Vec::new(),
                skipped: true,
            });
        } else {
            let edges = batch::compute_rng_edges(&centroids);
            levels.push(LevelSnapshot {
                entry_paths,
                edges,
                skipped: false,
            });
        }

        current = next_level;
    }

    levels
}

/// Rewrites every path string in the tree from the root down, as a single
/// batch pass. The online path only ever rewrites the subtree a split
/// actually touched; this is the bulk-mode equivalent, useful right after a
/// bulk load built the tree by some means other than one-point-at-a-time
/// insertion.
pub fn assign_initial_ids(tree: &mut Tree) {
    let root = tree.root();
    insert::reassign_paths(tree, root);
}

/// Refreshes every node's per-node RNG, root down, in one pass. The online
/// path refreshes only nodes on an insertion's path; this revisits the
/// whole tree, useful after [`Tree::rebuild`](super::Tree) or a bulk load
/// where touching every node one insertion at a time would be wasteful.
pub fn create_hierarchical_rng(tree: &mut Tree) {
    refresh_subtree_rng(tree, tree.root());
}

fn refresh_subtree_rng(tree: &mut Tree, node: NodeHandle) {
    insert::refresh_node_rng(tree, node);
    let children: Vec<NodeHandle> = tree
        .node(node)
        .entries
        .iter()
        .filter_map(|entry| match entry.child {
            Child::Internal(h) => Some(h),
            Child::Leaf(_) => None,
        })
        .collect();
    for child in children {
        refresh_subtree_rng(tree, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::point::Point;

    fn point(id: u64, values: Vec<f64>) -> Point {
        Point::new(id, values, 1).unwrap()
    }

    #[test]
    fn test_single_point_tree_has_height_zero_at_leaf_and_one_overall() {
        let config = TreeConfig::new(1, 1.0);
        let mut tree = Tree::new(config);
        tree.insert(point(0, vec![0.0])).unwrap();
        assert_eq!(compute_height(&tree, tree.root()), 0);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_multilevel_rng_has_one_level_per_height_step() {
        let config = TreeConfig::new(1, 1.0);
        let mut tree = Tree::new(config);
        tree.insert(point(0, vec![0.0])).unwrap();
        let levels = create_multilevel_rng(&tree, 1000);
        assert_eq!(levels.len(), tree.height());
        assert!(!levels[0].skipped);
        assert_eq!(levels[0].entry_paths.len(), 1);
    }

    #[test]
    fn test_cutoff_skips_a_dense_level() {
        let mut config = TreeConfig::new(1, 0.0);
        config.leaf_node_max_entries = 100;
        let mut tree = Tree::new(config);
        for i in 0..10u64 {
            tree.insert(point(i, vec![i as f64])).unwrap();
        }
        let levels = create_multilevel_rng(&tree, 5);
        assert!(levels[0].skipped, "ten entries at the root must exceed a cutoff of five");
    }

    #[test]
    fn test_assign_initial_ids_and_hierarchical_rng_do_not_panic() {
        let mut config = TreeConfig::new(1, 0.1);
        config.leaf_node_max_entries = 2;
        config.internal_node_max_entries = 2;
        let mut tree = Tree::new(config);
        for i in 0..10u64 {
            tree.insert(point(i, vec![i as f64 * 5.0])).unwrap();
        }
        assign_initial_ids(&mut tree);
        create_hierarchical_rng(&mut tree);
        assert_eq!(tree.node(tree.root()).id, "0");
    }
}
