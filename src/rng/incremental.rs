//! ## Incremental RNG maintenance (iRNG)
//!
//! Wires a single newly inserted point into an already-correct relative
//! neighbourhood graph in roughly `O(n)` time instead of rebuilding the
//! whole graph from scratch. Used once a cluster has grown past
//! [`crate::config::RngConfig::incremental_minimum_objects`] points.
//!
//! The algorithm has four stages, run for every inserted point:
//!
//! 1. **Nearest-neighbour search** over the existing points (parallel
//!    reduction).
//! 2. **Search-radius derivation**: the new point's neighbourhood is
//!    bounded by its nearest neighbour's own RNG extent, inflated by
//!    `search_radius_epsilon`. Two degenerate cases fall back to a fixed
//!    radius: a 3-point graph whose nearest neighbour has no recorded edge
//!    yet uses the direct nearest-neighbour distance instead, and a search
//!    radius that is still zero after that falls back to a constant `2.0`.
//! 3. **Candidate gathering**, switching to a half-radius cutoff once the
//!    full-radius candidate set exceeds `candidate_cutoff` points (keeps
//!    the per-insertion cost bounded even in dense regions).
//! 4. **New-edge proposal** (is the new point an RNG neighbour of each
//!    candidate?) followed by a bounded-hop **edge-revocation walk**: the
//!    new point can make an existing edge between two of its neighbours
//!    invalid by being a closer third point, but only edges within
//!    `revocation_order` hops of the insertion site are ever re-examined.

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::config::RngConfig;
use crate::rng::graph::{AdjacencyMap, Edge};
use crate::summary::euclidean;

/// Index of the nearest point to `query` among `points`, and its distance.
/// Returns `None` if `points` is empty.
pub fn nearest_neighbor(points: &[Vec<f64>], query: &[f64]) -> Option<(usize, f64)> {
    if points.is_empty() {
        return None;
    }
    points
        .par_iter()
        .enumerate()
        .map(|(i, p)| (i, euclidean(query, p)))
        .reduce(
            || (usize::MAX, f64::INFINITY),
            |a, b| if b.1 < a.1 { b } else { a },
        )
        .into()
}

/// Index of the farthest point from `query` among `points`. Returns `None`
/// if `points` is empty.
pub fn farthest(points: &[Vec<f64>], query: &[f64]) -> Option<(usize, f64)> {
    if points.is_empty() {
        return None;
    }
    points
        .par_iter()
        .enumerate()
        .map(|(i, p)| (i, euclidean(query, p)))
        .reduce(
            || (usize::MAX, f64::NEG_INFINITY),
            |a, b| if b.1 > a.1 { b } else { a },
        )
        .into()
}

/// Derives the search radius used to gather candidates for a point being
/// inserted next to `nearest`, whose own graph neighbourhood currently has
/// maximum edge weight `nearest_max_edge` (`0.0` if `nearest` is isolated).
fn search_radius(
    nearest_max_edge: f64,
    existing_point_count: usize,
    nn_distance: f64,
    config: &RngConfig,
) -> f64 {
    let mut sr = (1.0 + config.search_radius_epsilon) * nearest_max_edge;
    if sr == 0.0 && existing_point_count == 3 {
        sr = (1.0 + config.search_radius_epsilon) * nn_distance;
    }
    if sr == 0.0 {
        sr = 2.0;
    }
    sr
}

/// Inserts `new_point` (which will be addressed as index `points.len()`)
/// into the graph described by `points` (its existing neighbours) and
/// `adjacency`, updating `adjacency` in place.
///
/// `points` must not yet contain `new_point` — the caller appends it to its
/// own point storage separately; this function only touches the graph.
pub fn insert_point(
    points: &[Vec<f64>],
    new_point: &[f64],
    adjacency: &mut AdjacencyMap,
    config: &RngConfig,
) {
    let new_index = points.len();
    let Some((nearest, nn_distance)) = nearest_neighbor(points, new_point) else {
        return;
    };

    let nearest_max_edge = adjacency
        .neighbors_of(nearest)
        .map(|(_, w)| w)
        .fold(0.0_f64, f64::max);
    let sr = search_radius(nearest_max_edge, points.len(), nn_distance, config);

    let mut candidates: Vec<usize> = points
        .par_iter()
        .enumerate()
        .filter(|(_, p)| euclidean(new_point, p) <= sr)
        .map(|(i, _)| i)
        .collect();
    if candidates.len() > config.candidate_cutoff {
        let half_sr = sr / 2.0;
        candidates = points
            .par_iter()
            .enumerate()
            .filter(|(_, p)| euclidean(new_point, p) <= half_sr)
            .map(|(i, _)| i)
            .collect();
    }
    if candidates.is_empty() {
        candidates.push(nearest);
    }

    // STEP 1: propose a new edge between the inserted point and each
    // candidate, rejecting it only if some other candidate is strictly
    // closer to both endpoints than they are to each other.
    let mut new_edges = Vec::with_capacity(candidates.len());
    for &c in &candidates {
        let dist_pc = euclidean(new_point, &points[c]);
        let blocked = candidates.iter().any(|&k| {
            if k == c {
                return false;
            }
            let dist_pk = euclidean(new_point, &points[k]);
            let dist_ck = euclidean(&points[c], &points[k]);
            dist_pk > 0.0 && dist_ck > 0.0 && dist_pk < dist_pc && dist_ck < dist_pc
        });
        if !blocked {
            new_edges.push((c, dist_pc));
        }
    }
    for (c, w) in &new_edges {
        adjacency.add_edge(new_index, *c, *w);
    }

    // STEP 2: walk outward from the candidate set, bounded to
    // `revocation_order` hops, collecting existing edges that the new point
    // might invalidate by being a closer third point.
    let mut visited: BTreeSet<usize> = candidates.iter().copied().collect();
    let mut frontier = visited.clone();
    let mut candidate_edges: BTreeSet<Edge> = BTreeSet::new();
    for _ in 0..config.revocation_order {
        if frontier.is_empty() {
            break;
        }
        let mut next_frontier = BTreeSet::new();
        for &node in &frontier {
            for (neighbor, weight) in adjacency.neighbors_of(node) {
                candidate_edges.insert(Edge::new(node, neighbor, weight));
                if !visited.contains(&neighbor) {
                    next_frontier.insert(neighbor);
                }
            }
        }
        visited.extend(next_frontier.iter());
        frontier = next_frontier;
    }

    for edge in candidate_edges {
        let (i, j) = (edge.src, edge.target);
        let dist_ij = edge.weight;
        let dist_ip = euclidean(&points[i], new_point);
        let dist_jp = euclidean(&points[j], new_point);
        let new_point_is_closer_third =
            dist_ip > 0.0 && dist_jp > 0.0 && dist_ip < dist_ij && dist_jp < dist_ij;
        if new_point_is_closer_third && adjacency.degree(i) > 1 && adjacency.degree(j) > 1 {
            adjacency.remove_edge(i, j);
        }
    }
}
