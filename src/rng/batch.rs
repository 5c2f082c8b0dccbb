//! ## Batch RNG construction
//!
//! Builds a relative neighbourhood graph from scratch in `O(n^2 d + n^3)`
//! time: an `O(n^2 d)` parallel distance-matrix fill followed by an
//! `O(n^3)` parallel edge test. This is the entry point used for a leaf
//! cluster's first RNG (before it is large enough to switch to the
//! incremental engine) and for the per-level graphs built over node
//! centroids in [`crate::tree::levels`].
//!
//! The reference implementation protects its shared adjacency map and edge
//! counter with `#pragma omp critical` blocks. Here the edge test instead
//! collects each thread's local matches into its own `Vec<Edge>` (rayon's
//! `collect` on a `par_iter().flat_map(..)` already does this fold/merge),
//! and the adjacency map is only assembled once, single-threaded, from the
//! merged edge list — there is no shared mutable state during the parallel
//! region at all.

use rayon::prelude::*;

use crate::rng::graph::{adjacency_from_edges, AdjacencyMap, Edge};
use crate::summary::euclidean;

/// Fills the full `n x n` Euclidean distance matrix, one row per point,
/// computed in parallel across rows.
pub fn distance_matrix(points: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = points.len();
    (0..n)
        .into_par_iter()
        .map(|i| (0..n).map(|j| euclidean(&points[i], &points[j])).collect())
        .collect()
}

/// Computes the relative neighbourhood graph over `points` from scratch.
///
/// Two points `i` and `j` are adjacent iff no third point `k` is strictly
/// closer to both of them than they are to each other.
pub fn compute_rng(points: &[Vec<f64>]) -> AdjacencyMap {
    adjacency_from_edges(&compute_rng_edges(points))
}

/// Same computation as [`compute_rng`], returned as a flat, sorted edge
/// list instead of an adjacency map — the shape the per-level graphs and
/// the JSON exporter want.
pub fn compute_rng_edges(points: &[Vec<f64>]) -> Vec<Edge> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    let dist = distance_matrix(points);

    let mut edges: Vec<Edge> = (0..n)
        .into_par_iter()
        .flat_map(|i| {
            let dist = &dist;
            (i + 1..n).into_par_iter().filter_map(move |j| {
                let d_ij = dist[i][j];
                let is_relative_neighbor =
                    (0..n).all(|k| k == i || k == j || !(dist[i][k] < d_ij && dist[j][k] < d_ij));
                if is_relative_neighbor {
                    Some(Edge::new(i, j, d_ij))
                } else {
                    None
                }
            })
        })
        .collect();
    edges.sort();
    edges
}
