//! ## Representative-point selection
//!
//! Every entry in the tree (leaf cluster or internal node) carries a small
//! "near" list and a small "far" list of representative points, each capped
//! at [`crate::config::RepresentativeConfig::max_representatives`] (7 by
//! default). These are what the layout collaborator actually draws — never
//! the full point set — so a node with thousands of points still renders
//! with a handful of stand-ins.
//!
//! Leaf clusters pick representatives directly from their own points.
//! Internal nodes cannot — they don't own points — so they draw from the
//! representative lists their children already computed, sampled
//! proportionally to each child's cardinality.

use crate::config::{FarRepresentativePolicy, RepresentativeConfig};
use crate::summary::euclidean;

/// Index (within a cluster's point vector) of its medoid: the point
/// minimizing the sum of distances to every other point in the cluster.
fn medoid(points: &[Vec<f64>]) -> usize {
    (0..points.len())
        .map(|i| {
            let total: f64 = points.iter().map(|p| euclidean(&points[i], p)).sum();
            (i, total)
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// How many representatives a cluster/node of `n` members gets, capped at
/// `max_representatives`.
fn representative_count(n: usize, max_representatives: usize) -> usize {
    n.min(max_representatives)
}

/// Selects near and far representative point indices for a leaf cluster.
///
/// Returns `(near, far)`, each a list of indices into `points`. For clusters
/// of two points or fewer, every point is both a near and a far
/// representative (there is nothing to rank).
pub fn leaf_representatives(
    points: &[Vec<f64>],
    config: &RepresentativeConfig,
) -> (Vec<usize>, Vec<usize>) {
    let n = points.len();
    if n <= 2 {
        let all: Vec<usize> = (0..n).collect();
        return (all.clone(), all);
    }

    let medoid_idx = medoid(points);
    let count = representative_count(n, config.max_representatives);

    let mut by_distance: Vec<usize> = (0..n).collect();
    by_distance.sort_by(|&a, &b| {
        euclidean(&points[medoid_idx], &points[a])
            .partial_cmp(&euclidean(&points[medoid_idx], &points[b]))
            .unwrap()
    });
    let near: Vec<usize> = by_distance.into_iter().take(count).collect();

    let far = match config.far_policy {
        FarRepresentativePolicy::Reverse => {
            let mut by_distance_desc: Vec<usize> =
                (0..n).filter(|&i| i != medoid_idx).collect();
            by_distance_desc.sort_by(|&a, &b| {
                euclidean(&points[medoid_idx], &points[b])
                    .partial_cmp(&euclidean(&points[medoid_idx], &points[a]))
                    .unwrap()
            });
            let mut far = vec![medoid_idx];
            far.extend(by_distance_desc.into_iter().take(count.saturating_sub(1)));
            far
        }
        FarRepresentativePolicy::Cure => {
            let mut chosen = vec![medoid_idx];
            while chosen.len() < count {
                let next = (0..n)
                    .filter(|i| !chosen.contains(i))
                    .map(|i| {
                        let min_dist_to_chosen = chosen
                            .iter()
                            .map(|&c| euclidean(&points[i], &points[c]))
                            .fold(f64::INFINITY, f64::min);
                        (i, min_dist_to_chosen)
                    })
                    .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
                match next {
                    Some((idx, _)) => chosen.push(idx),
                    None => break,
                }
            }
            chosen
        }
    };

    (near, far)
}

/// A child entry's contribution to its parent's representative selection:
/// its cardinality and its own already-computed near/far representative
/// coordinates.
pub struct ChildRepresentatives<'a> {
    /// Number of points folded into the child's summary.
    pub cardinality: u64,
    /// The child's own near-representative coordinates, nearest first.
    pub near: &'a [Vec<f64>],
    /// The child's own far-representative coordinates, farthest first.
    pub far: &'a [Vec<f64>],
}

/// Selects near and far representatives for an internal entry from its
/// children's already-computed representative lists.
///
/// Returns `(near, far)` as `(child_index, position_within_child_list)`
/// pairs, so the caller can resolve them back to concrete handles.
pub fn internal_representatives(
    children: &[ChildRepresentatives],
    config: &RepresentativeConfig,
) -> (Vec<(usize, usize)>, Vec<(usize, usize)>) {
    let total_n: u64 = children.iter().map(|c| c.cardinality).sum();
    let k = config.max_representatives;

    // Near: proportional draw, largest children first, topping up from the
    // largest children again if smaller ones run out of representatives.
    let mut by_size_desc: Vec<usize> = (0..children.len()).collect();
    by_size_desc.sort_by(|&a, &b| children[b].cardinality.cmp(&children[a].cardinality));

    let mut near = Vec::with_capacity(k);
    if total_n > 0 {
        let mut quota: Vec<usize> = children
            .iter()
            .map(|c| {
                let share = (c.cardinality as f64 / total_n as f64) * k as f64;
                (share.round() as usize).max(1).min(c.near.len())
            })
            .collect();
        let mut taken: Vec<usize> = vec![0; children.len()];
        loop {
            let mut progressed = false;
            for &child_idx in &by_size_desc {
                if near.len() >= k {
                    break;
                }
                if quota[child_idx] > 0 {
                    let pos = taken[child_idx];
                    if pos < children[child_idx].near.len() {
                        near.push((child_idx, pos));
                        taken[child_idx] += 1;
                        quota[child_idx] -= 1;
                        progressed = true;
                    }
                }
            }
            if near.len() >= k || !progressed {
                break;
            }
        }
        // Top up from the largest children if the quota left the list short.
        'topup: for &child_idx in &by_size_desc {
            for pos in 0..children[child_idx].near.len() {
                if near.len() >= k {
                    break 'topup;
                }
                if !near.contains(&(child_idx, pos)) {
                    near.push((child_idx, pos));
                }
            }
        }
    }

    // Far: one representative (the child's own farthest) from each child,
    // smallest children first, up to K entries.
    let mut by_size_asc: Vec<usize> = (0..children.len()).collect();
    by_size_asc.sort_by(|&a, &b| children[a].cardinality.cmp(&children[b].cardinality));
    let mut far = Vec::with_capacity(k);
    for &child_idx in &by_size_asc {
        if far.len() >= k {
            break;
        }
        if !children[child_idx].far.is_empty() {
            far.push((child_idx, 0));
        }
    }

    (near, far)
}
