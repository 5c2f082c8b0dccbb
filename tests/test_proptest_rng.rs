//! Property-based tests for the relative neighbourhood graph engine:
//! batch/incremental equivalence at epsilon=0, over randomly generated
//! point sets, mirroring the teacher's `test_proptest_kdtree.rs` shape of
//! comparing an incremental structure against a brute-force baseline.

use proptest::prelude::*;

use birchrng::config::RngConfig;
use birchrng::rng::batch;

fn arb_coord() -> impl Strategy<Value = f64> {
    -50.0..50.0
}

fn arb_point(dimension: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_coord(), dimension)
}

fn arb_point_set(dimension: usize, min: usize, max: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(arb_point(dimension), min..max)
}

proptest! {
    /// Inserting points one at a time through the incremental engine with
    /// `search_radius_epsilon = 0.0` must produce exactly the adjacency a
    /// from-scratch batch build would, for any point set (spec.md section
    /// 8's "Incremental RNG equivalence" scenario, generalized).
    #[test]
    fn test_incremental_matches_batch_at_zero_epsilon(
        points in arb_point_set(3, 2, 40)
    ) {
        let config = RngConfig {
            search_radius_epsilon: 0.0,
            ..RngConfig::default()
        };

        let mut adjacency = batch::compute_rng(&points[..2]);
        for i in 2..points.len() {
            birchrng::rng::incremental::insert_point(&points[..i], &points[i], &mut adjacency, &config);
        }

        let batch_edges = {
            let mut edges = batch::compute_rng_edges(&points);
            edges.sort();
            edges
        };
        let incremental_edges = {
            let mut edges = adjacency.to_edge_list();
            edges.sort();
            edges
        };

        prop_assert_eq!(incremental_edges.len(), batch_edges.len());
        for (a, b) in incremental_edges.iter().zip(batch_edges.iter()) {
            prop_assert_eq!(a.src, b.src);
            prop_assert_eq!(a.target, b.target);
            prop_assert!((a.weight - b.weight).abs() < 1e-6);
        }
    }

    /// Every batch-built RNG edge's weight is the Euclidean distance
    /// between its two endpoints, and the graph is symmetric: the
    /// adjacency map built from the edge list must agree with the edge
    /// list's own edge count.
    #[test]
    fn test_batch_rng_edge_weights_match_euclidean_distance(
        points in arb_point_set(2, 1, 25)
    ) {
        let edges = batch::compute_rng_edges(&points);
        for edge in &edges {
            let expected: f64 = points[edge.src]
                .iter()
                .zip(points[edge.target].iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt();
            prop_assert!((edge.weight - expected).abs() < 1e-6);
            prop_assert!(edge.src < edge.target);
        }
        let adjacency = batch::compute_rng(&points);
        prop_assert_eq!(adjacency.edge_count(), edges.len());
    }

    /// No RNG edge may ever be "blocked" by a third point: for every edge
    /// (i, j), no other point k in the same set may be strictly closer to
    /// both i and j than i and j are to each other.
    #[test]
    fn test_no_batch_rng_edge_is_blocked_by_a_third_point(
        points in arb_point_set(2, 3, 20)
    ) {
        let edges = batch::compute_rng_edges(&points);
        for edge in &edges {
            let d_ij = edge.weight;
            for (k, p) in points.iter().enumerate() {
                if k == edge.src || k == edge.target {
                    continue;
                }
                let d_ik: f64 = points[edge.src]
                    .iter()
                    .zip(p.iter())
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f64>()
                    .sqrt();
                let d_jk: f64 = points[edge.target]
                    .iter()
                    .zip(p.iter())
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f64>()
                    .sqrt();
                prop_assert!(!(d_ik < d_ij && d_jk < d_ij));
            }
        }
    }
}
