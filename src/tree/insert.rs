//! ## Insertion, splitting and path-string maintenance
//!
//! The whole mutating surface of a [`super::Tree`] lives here: descending to
//! the closest entry at each level, absorbing or appending at the leaf,
//! splitting a full node and propagating the split upward, and rewriting
//! path strings and leaf-chain pointers whenever a split changes the
//! tree's shape. Everything else (representative refresh, per-node RNG
//! refresh) is triggered from the same call sites because the reference
//! implementation couples them the same way: "every touched node refreshes
//! its representatives and its RNG."

use crate::cluster::Cluster;
use crate::config::RepresentativeConfig;
use crate::errors::BirchResult;
use crate::point::Point;
use crate::representatives::{self, ChildRepresentatives};
use crate::rng::batch;
use crate::summary::{distance, Dist, Summary};
use crate::tree::entry::{Child, Entry, Representative};
use crate::tree::node::Node;
use crate::tree::{ClusterHandle, NodeHandle, Tree};

/// What happened when a point was inserted into a subtree rooted at some
/// node: either it was absorbed without changing that node's entry count,
/// or the node overflowed and had to split into two, whose combined
/// entries the caller must splice into its own parent.
enum Propagate {
    Absorbed,
    Split(Entry, Entry),
}

/// Inserts `point` into the tree, starting at the root.
pub(crate) fn insert(tree: &mut Tree, point: Point) -> BirchResult<()> {
    let summary = Summary::of_point(&point.values);
    let root = tree.root;
    match insert_into_node(tree, root, point, &summary)? {
        Propagate::Absorbed => {}
        Propagate::Split(left, right) => split_root(tree, left, right),
    }
    Ok(())
}

/// Recursively descends from `node`, absorbing, appending, or splitting as
/// needed. See spec.md section 4.4 for the algorithm this mirrors.
fn insert_into_node(
    tree: &mut Tree,
    node: NodeHandle,
    mut point: Point,
    summary: &Summary,
) -> BirchResult<Propagate> {
    let is_leaf = tree.node(node).is_leaf;
    let rep_cfg = tree.config.representatives;
    let rng_cfg = tree.config.rng;
    let dim = tree.config.dimension;

    // Only the very first insertion into a brand-new tree ever sees an
    // empty node: its root, which starts out leaf and entry-less.
    if tree.node(node).entries.is_empty() {
        let node_id = tree.node(node).id.clone();
        let entry_path = format!("{node_id}.0");
        let cluster_handle = tree.alloc_cluster(Cluster::new());
        point.path = Some(format!("{entry_path}.0"));
        tree.cluster_mut(cluster_handle).absorb(point, &rng_cfg);
        let entry = Entry::new_leaf(summary.clone(), cluster_handle, entry_path);
        tree.node_mut(node).entries.push(entry);
        tree.leaf_entry_count += 1;
        refresh_entry_representatives(tree, node, 0, &rep_cfg);
        refresh_node_rng(tree, node);
        return Ok(Propagate::Absorbed);
    }

    let closest = closest_entry_index(&tree.node(node).entries, summary);

    if is_leaf {
        let closest_summary = tree.node(node).entries[closest].summary.clone();
        let dist = distance(Dist::D0, &closest_summary, summary);

        if dist < tree.threshold {
            // Absorb: merge the point into the closest leaf entry's cluster.
            let cluster_handle = match tree.node(node).entries[closest].child {
                Child::Leaf(h) => h,
                Child::Internal(_) => unreachable!("leaf node entries always point at a cluster"),
            };
            let entry_path = tree.node(node).entries[closest].path.clone();
            let point_index = tree.cluster(cluster_handle).len();
            point.path = Some(format!("{entry_path}.{point_index}"));
            tree.cluster_mut(cluster_handle).absorb(point, &rng_cfg);
            tree.node_mut(node).entries[closest].summary.accumulate(summary);
            refresh_entry_representatives(tree, node, closest, &rep_cfg);
            refresh_node_rng(tree, node);
            Ok(Propagate::Absorbed)
        } else if tree.node(node).entries.len() < tree.config.leaf_node_max_entries {
            // Room for a fresh leaf entry holding just this point.
            let node_id = tree.node(node).id.clone();
            let position = tree.node(node).entries.len();
            let entry_path = format!("{node_id}.{position}");
            let cluster_handle = tree.alloc_cluster(Cluster::new());
            point.path = Some(format!("{entry_path}.0"));
            tree.cluster_mut(cluster_handle).absorb(point, &rng_cfg);
            let entry = Entry::new_leaf(summary.clone(), cluster_handle, entry_path);
            tree.node_mut(node).entries.push(entry);
            tree.leaf_entry_count += 1;
            refresh_entry_representatives(tree, node, position, &rep_cfg);
            refresh_node_rng(tree, node);
            Ok(Propagate::Absorbed)
        } else {
            // The leaf node is full: build a pending entry for the new
            // point and split this node, folding it in.
            let cluster_handle = tree.alloc_cluster(Cluster::new());
            tree.cluster_mut(cluster_handle).absorb(point, &rng_cfg);
            let (near, far) = leaf_representatives_for(tree, cluster_handle, &rep_cfg);
            let mut pending = Entry::new_leaf(summary.clone(), cluster_handle, String::new());
            pending.near = near;
            pending.far = far;
            tree.leaf_entry_count += 1;

            let mut combined = std::mem::take(&mut tree.node_mut(node).entries);
            combined.push(pending);
            let (left, right) = split_node(tree, node, combined, dim);
            Ok(Propagate::Split(left, right))
        }
    } else {
        let child = match tree.node(node).entries[closest].child {
            Child::Internal(h) => h,
            Child::Leaf(_) => unreachable!("internal node entries always point at another node"),
        };
        match insert_into_node(tree, child, point, summary)? {
            Propagate::Absorbed => {
                tree.node_mut(node).entries[closest].summary.accumulate(summary);
                refresh_entry_representatives(tree, node, closest, &rep_cfg);
                refresh_node_rng(tree, node);
                Ok(Propagate::Absorbed)
            }
            Propagate::Split(new_left, new_right) => {
                let max = tree.config.internal_node_max_entries;
                let mut entries = std::mem::take(&mut tree.node_mut(node).entries);
                let had_room = entries.len() < max;
                entries[closest] = new_left;
                entries.insert(closest + 1, new_right);

                if had_room {
                    tree.node_mut(node).entries = entries;
                    reassign_paths(tree, node);
                    refresh_first_last(tree, node);
                    refresh_node_rng(tree, node);
                    Ok(Propagate::Absorbed)
                } else {
                    let (left, right) = split_node(tree, node, entries, dim);
                    Ok(Propagate::Split(left, right))
                }
            }
        }
    }
}

/// Splits a full node (`full_node`'s own stored entries have already been
/// replaced with an empty `Vec` by the caller) given `combined`, the
/// `max_entries + 1` entries to redistribute. Returns the two new
/// parent-level entries pointing at the freshly created left/right nodes.
fn split_node(tree: &mut Tree, full_node: NodeHandle, combined: Vec<Entry>, dim: usize) -> (Entry, Entry) {
    let is_leaf = tree.node(full_node).is_leaf;
    let node_first_leaf = tree.node(full_node).first_leaf;
    let node_last_leaf = tree.node(full_node).last_leaf;
    let prev = node_first_leaf.and_then(|fl| tree.node(fl).prev);
    let next = node_last_leaf.and_then(|ll| tree.node(ll).next);

    let (seed_i, seed_j) = farthest_pair(&combined);
    let seed_left_summary = combined[seed_i].summary.clone();
    let seed_right_summary = combined[seed_j].summary.clone();

    let mut left_entries = Vec::new();
    let mut right_entries = Vec::new();
    let mut left_summary = Summary::zero(dim);
    let mut right_summary = Summary::zero(dim);

    for (idx, entry) in combined.into_iter().enumerate() {
        let goes_left = idx == seed_i
            || (idx != seed_j && {
                let d_left = distance(Dist::D0, &entry.summary, &seed_left_summary);
                let d_right = distance(Dist::D0, &entry.summary, &seed_right_summary);
                d_left <= d_right
            });
        if goes_left {
            left_summary.accumulate(&entry.summary);
            left_entries.push(entry);
        } else {
            right_summary.accumulate(&entry.summary);
            right_entries.push(entry);
        }
    }

    let left_handle = tree.alloc_node(Node::new(is_leaf, String::new()));
    let right_handle = tree.alloc_node(Node::new(is_leaf, String::new()));
    tree.node_mut(left_handle).entries = left_entries;
    tree.node_mut(right_handle).entries = right_entries;

    if is_leaf {
        tree.node_mut(left_handle).first_leaf = Some(left_handle);
        tree.node_mut(left_handle).last_leaf = Some(left_handle);
        tree.node_mut(right_handle).first_leaf = Some(right_handle);
        tree.node_mut(right_handle).last_leaf = Some(right_handle);
    } else {
        relink_internal_siblings(tree, left_handle);
        relink_internal_siblings(tree, right_handle);
        refresh_first_last(tree, left_handle);
        refresh_first_last(tree, right_handle);
    }

    refresh_node_rng(tree, left_handle);
    refresh_node_rng(tree, right_handle);

    // Splice the two new subtrees into the leaf chain where full_node's
    // subtree used to sit.
    let left_first = tree.node(left_handle).first_leaf.expect("leaf node has first_leaf");
    let left_last = tree.node(left_handle).last_leaf.expect("leaf node has last_leaf");
    let right_first = tree.node(right_handle).first_leaf.expect("leaf node has first_leaf");
    let right_last = tree.node(right_handle).last_leaf.expect("leaf node has last_leaf");

    tree.node_mut(left_first).prev = prev;
    if let Some(p) = prev {
        tree.node_mut(p).next = Some(left_first);
    }
    tree.node_mut(left_last).next = Some(right_first);
    tree.node_mut(right_first).prev = Some(left_last);
    tree.node_mut(right_last).next = next;
    if let Some(n) = next {
        tree.node_mut(n).prev = Some(right_last);
    }
    if Some(tree.last_leaf) == node_last_leaf {
        tree.last_leaf = right_last;
    }

    let rep_cfg = tree.config.representatives;
    let (left_near, left_far) = internal_representatives_for(tree, left_handle, &rep_cfg);
    let (right_near, right_far) = internal_representatives_for(tree, right_handle, &rep_cfg);

    let mut left_entry = Entry::new_internal(left_summary, left_handle, String::new());
    left_entry.near = left_near;
    left_entry.far = left_far;
    let mut right_entry = Entry::new_internal(right_summary, right_handle, String::new());
    right_entry.near = right_near;
    right_entry.far = right_far;

    (left_entry, right_entry)
}

/// Grows the tree by one level: the old root overflowed and produced
/// `left`/`right`, which become the two entries of a brand-new root.
fn split_root(tree: &mut Tree, left: Entry, right: Entry) {
    let new_root = tree.alloc_node(Node::new_internal("0".to_string()));
    tree.node_mut(new_root).entries = vec![left, right];
    tree.root = new_root;
    refresh_first_last(tree, new_root);
    reassign_paths(tree, new_root);
    refresh_node_rng(tree, new_root);
}

/// Connects the internal child subtrees of `node`'s own entries so that
/// consecutive children's leaf chains join up, then leaves `node`'s own
/// `first_leaf`/`last_leaf` for the caller to set via
/// [`refresh_first_last`].
fn relink_internal_siblings(tree: &mut Tree, node: NodeHandle) {
    let n = tree.node(node).entries.len();
    for i in 0..n.saturating_sub(1) {
        let left_child = match tree.node(node).entries[i].child {
            Child::Internal(h) => h,
            Child::Leaf(_) => unreachable!("internal node entries always point at another node"),
        };
        let right_child = match tree.node(node).entries[i + 1].child {
            Child::Internal(h) => h,
            Child::Leaf(_) => unreachable!("internal node entries always point at another node"),
        };
        let left_last = tree.node(left_child).last_leaf.expect("child subtree has a last leaf");
        let right_first = tree.node(right_child).first_leaf.expect("child subtree has a first leaf");
        tree.node_mut(left_last).next = Some(right_first);
        tree.node_mut(right_first).prev = Some(left_last);
    }
}

/// Recomputes `node`'s own `first_leaf`/`last_leaf` from its entries' child
/// subtrees. No-op for leaf nodes, whose `first_leaf`/`last_leaf` are
/// always themselves, fixed at creation.
fn refresh_first_last(tree: &mut Tree, node: NodeHandle) {
    if tree.node(node).is_leaf {
        return;
    }
    let n = tree.node(node).entries.len();
    let first_child = match tree.node(node).entries[0].child {
        Child::Internal(h) => h,
        Child::Leaf(_) => unreachable!("internal node entries always point at another node"),
    };
    let last_child = match tree.node(node).entries[n - 1].child {
        Child::Internal(h) => h,
        Child::Leaf(_) => unreachable!("internal node entries always point at another node"),
    };
    let first_leaf = tree.node(first_child).first_leaf;
    let last_leaf = tree.node(last_child).last_leaf;
    tree.node_mut(node).first_leaf = first_leaf;
    tree.node_mut(node).last_leaf = last_leaf;
}

/// Rewrites `node`'s own entries' path strings as `"<node.id>.<index>"`,
/// propagating the new prefix into child nodes' `id` (and recursively their
/// own entries) or, for leaf entries, into every point in the cluster.
/// Called on every subtree a split has touched, matching the reference
/// implementation's top-down `ReassignID` walk.
pub(crate) fn reassign_paths(tree: &mut Tree, node: NodeHandle) {
    let node_id = tree.node(node).id.clone();
    let n = tree.node(node).entries.len();
    for i in 0..n {
        let new_path = format!("{node_id}.{i}");
        tree.node_mut(node).entries[i].path = new_path.clone();
        match tree.node(node).entries[i].child {
            Child::Internal(child_node) => {
                tree.node_mut(child_node).id = new_path;
                reassign_paths(tree, child_node);
            }
            Child::Leaf(cluster_handle) => {
                tree.cluster_mut(cluster_handle).reassign_point_paths(&new_path);
            }
        }
    }
}

/// Recomputes every entry's representatives in the subtree rooted at
/// `node`, bottom-up: children are refreshed before the parent draws from
/// their (now current) representative lists.
pub(crate) fn recompute_all_representatives(tree: &mut Tree, node: NodeHandle) {
    let n = tree.node(node).entries.len();
    for i in 0..n {
        if let Child::Internal(child_node) = tree.node(node).entries[i].child {
            recompute_all_representatives(tree, child_node);
        }
    }
    let rep_cfg = tree.config.representatives;
    for i in 0..n {
        refresh_entry_representatives(tree, node, i, &rep_cfg);
    }
}

/// Index of the entry in `entries` whose summary is `D0`-closest to
/// `summary`. Ties go to the lowest index (`Iterator::min_by` keeps the
/// first minimal element).
fn closest_entry_index(entries: &[Entry], summary: &Summary) -> usize {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| (i, distance(Dist::D0, &e.summary, summary)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(i, _)| i)
        .expect("entries is non-empty")
}

/// Index pair of the two entries in `entries` with the largest `D0`
/// distance between them. Ties keep the first pair found.
fn farthest_pair(entries: &[Entry]) -> (usize, usize) {
    let mut best = (0usize, 1usize.min(entries.len().saturating_sub(1)), -1.0f64);
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let d = distance(Dist::D0, &entries[i].summary, &entries[j].summary);
            if d > best.2 {
                best = (i, j, d);
            }
        }
    }
    (best.0, best.1)
}

pub(crate) fn refresh_node_rng(tree: &mut Tree, node: NodeHandle) {
    let dim = tree.config.dimension;
    let centroids: Vec<Vec<f64>> = tree
        .node(node)
        .entries
        .iter()
        .map(|e| e.summary.centroid().unwrap_or_else(|| vec![0.0; dim]))
        .collect();
    let rng = batch::compute_rng(&centroids);
    tree.node_mut(node).rng = rng;
}

fn refresh_entry_representatives(
    tree: &mut Tree,
    node: NodeHandle,
    idx: usize,
    cfg: &RepresentativeConfig,
) {
    let child = tree.node(node).entries[idx].child;
    let (near, far) = match child {
        Child::Leaf(cluster) => leaf_representatives_for(tree, cluster, cfg),
        Child::Internal(child_node) => internal_representatives_for(tree, child_node, cfg),
    };
    let entry = &mut tree.node_mut(node).entries[idx];
    entry.near = near;
    entry.far = far;
}

fn leaf_representatives_for(
    tree: &Tree,
    cluster: ClusterHandle,
    cfg: &RepresentativeConfig,
) -> (Vec<Representative>, Vec<Representative>) {
    let c = tree.cluster(cluster);
    let (near_idx, far_idx) = c.representatives(cfg);
    let build = |idx: usize| Representative {
        cluster,
        point_index: idx,
        values: c.points()[idx].values.clone(),
    };
    (
        near_idx.into_iter().map(build).collect(),
        far_idx.into_iter().map(build).collect(),
    )
}

fn internal_representatives_for(
    tree: &Tree,
    child_node: NodeHandle,
    cfg: &RepresentativeConfig,
) -> (Vec<Representative>, Vec<Representative>) {
    let node = tree.node(child_node);
    if node.entries.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let near_lists: Vec<Vec<Vec<f64>>> = node
        .entries
        .iter()
        .map(|e| e.near.iter().map(|r| r.values.clone()).collect())
        .collect();
    let far_lists: Vec<Vec<Vec<f64>>> = node
        .entries
        .iter()
        .map(|e| e.far.iter().map(|r| r.values.clone()).collect())
        .collect();
    let children: Vec<ChildRepresentatives> = node
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| ChildRepresentatives {
            cardinality: e.summary.n,
            near: &near_lists[i],
            far: &far_lists[i],
        })
        .collect();
    let (near_pairs, far_pairs) = representatives::internal_representatives(&children, cfg);
    let near = near_pairs
        .into_iter()
        .map(|(ci, pos)| node.entries[ci].near[pos].clone())
        .collect();
    let far = far_pairs
        .into_iter()
        .map(|(ci, pos)| node.entries[ci].far[pos].clone())
        .collect();
    (near, far)
}

/// Reinserts a whole leaf cluster's worth of points into `tree` as a single
/// already-summarised unit, instead of replaying them one at a time. This is
/// the counterpart to [`insert`] that [`super::rebuild::maybe_rebuild`] uses:
/// the reference implementation's `CFTree::Rebuild` reinserts whole
/// `CFEntry` objects (`Insert(CFEntry&)`), not individual `Object`s
/// (`InsertAndUpdate`), so a rebuilt tree never replays the absorption
/// history that produced its leaves in the first place.
pub(crate) fn insert_precomputed_entry(tree: &mut Tree, points: Vec<Point>) -> BirchResult<()> {
    let dim = tree.config.dimension;
    let mut summary = Summary::zero(dim);
    for p in &points {
        summary.accumulate(&Summary::of_point(&p.values));
    }
    let root = tree.root;
    match insert_entry_into_node(tree, root, points, &summary)? {
        Propagate::Absorbed => {}
        Propagate::Split(left, right) => split_root(tree, left, right),
    }
    Ok(())
}

fn insert_entry_into_node(
    tree: &mut Tree,
    node: NodeHandle,
    points: Vec<Point>,
    summary: &Summary,
) -> BirchResult<Propagate> {
    let is_leaf = tree.node(node).is_leaf;
    let rep_cfg = tree.config.representatives;
    let dim = tree.config.dimension;

    if tree.node(node).entries.is_empty() {
        let node_id = tree.node(node).id.clone();
        let entry_path = format!("{node_id}.0");
        let cluster_handle = tree.alloc_cluster(Cluster::from_points(points));
        tree.cluster_mut(cluster_handle).reassign_point_paths(&entry_path);
        let entry = Entry::new_leaf(summary.clone(), cluster_handle, entry_path);
        tree.node_mut(node).entries.push(entry);
        tree.leaf_entry_count += 1;
        refresh_entry_representatives(tree, node, 0, &rep_cfg);
        refresh_node_rng(tree, node);
        return Ok(Propagate::Absorbed);
    }

    let closest = closest_entry_index(&tree.node(node).entries, summary);

    if is_leaf {
        let closest_summary = tree.node(node).entries[closest].summary.clone();
        let dist = distance(Dist::D0, &closest_summary, summary);

        if dist < tree.threshold {
            let cluster_handle = match tree.node(node).entries[closest].child {
                Child::Leaf(h) => h,
                Child::Internal(_) => unreachable!("leaf node entries always point at a cluster"),
            };
            let entry_path = tree.node(node).entries[closest].path.clone();
            tree.cluster_mut(cluster_handle).extend_and_rebuild(points);
            tree.cluster_mut(cluster_handle).reassign_point_paths(&entry_path);
            tree.node_mut(node).entries[closest].summary.accumulate(summary);
            refresh_entry_representatives(tree, node, closest, &rep_cfg);
            refresh_node_rng(tree, node);
            Ok(Propagate::Absorbed)
        } else if tree.node(node).entries.len() < tree.config.leaf_node_max_entries {
            let node_id = tree.node(node).id.clone();
            let position = tree.node(node).entries.len();
            let entry_path = format!("{node_id}.{position}");
            let cluster_handle = tree.alloc_cluster(Cluster::from_points(points));
            tree.cluster_mut(cluster_handle).reassign_point_paths(&entry_path);
            let entry = Entry::new_leaf(summary.clone(), cluster_handle, entry_path);
            tree.node_mut(node).entries.push(entry);
            tree.leaf_entry_count += 1;
            refresh_entry_representatives(tree, node, position, &rep_cfg);
            refresh_node_rng(tree, node);
            Ok(Propagate::Absorbed)
        } else {
            let cluster_handle = tree.alloc_cluster(Cluster::from_points(points));
            let (near, far) = leaf_representatives_for(tree, cluster_handle, &rep_cfg);
            let mut pending = Entry::new_leaf(summary.clone(), cluster_handle, String::new());
            pending.near = near;
            pending.far = far;
            tree.leaf_entry_count += 1;

            let mut combined = std::mem::take(&mut tree.node_mut(node).entries);
            combined.push(pending);
            let (left, right) = split_node(tree, node, combined, dim);
            Ok(Propagate::Split(left, right))
        }
    } else {
        let child = match tree.node(node).entries[closest].child {
            Child::Internal(h) => h,
            Child::Leaf(_) => unreachable!("internal node entries always point at another node"),
        };
        match insert_entry_into_node(tree, child, points, summary)? {
            Propagate::Absorbed => {
                tree.node_mut(node).entries[closest].summary.accumulate(summary);
                refresh_entry_representatives(tree, node, closest, &rep_cfg);
                refresh_node_rng(tree, node);
                Ok(Propagate::Absorbed)
            }
            Propagate::Split(new_left, new_right) => {
                let max = tree.config.internal_node_max_entries;
                let mut entries = std::mem::take(&mut tree.node_mut(node).entries);
                let had_room = entries.len() < max;
                entries[closest] = new_left;
                entries.insert(closest + 1, new_right);

                if had_room {
                    tree.node_mut(node).entries = entries;
                    reassign_paths(tree, node);
                    refresh_first_last(tree, node);
                    refresh_node_rng(tree, node);
                    Ok(Propagate::Absorbed)
                } else {
                    let (left, right) = split_node(tree, node, entries, dim);
                    Ok(Propagate::Split(left, right))
                }
            }
        }
    }
}
