//! ## Leaf clusters
//!
//! A [`Cluster`] is the payload a leaf entry points at: the raw points that
//! were absorbed into it, plus the relative neighbourhood graph over those
//! points. Internal entries never own points directly — only clusters do.

use crate::config::{RepresentativeConfig, RngConfig};
use crate::point::Point;
use crate::representatives;
use crate::rng::graph::{AdjacencyMap, Edge};
use crate::rng::{batch, incremental};
use crate::summary::{Dist, Summary};

/// A leaf cluster: the points absorbed into one CF entry, together with
/// their relative neighbourhood graph.
#[derive(Debug, Clone)]
pub struct Cluster {
    points: Vec<Point>,
    rng: AdjacencyMap,
}

impl Cluster {
    /// An empty cluster.
    pub fn new() -> Self {
        Cluster {
            points: Vec::new(),
            rng: AdjacencyMap::new(),
        }
    }

    /// A cluster containing a single point, with no edges yet.
    pub fn singleton(point: Point) -> Self {
        Cluster {
            points: vec![point],
            rng: AdjacencyMap::new(),
        }
    }

    /// Builds a cluster directly from an already-collected point list,
    /// computing its RNG once from scratch. Used when a tree rebuild
    /// reinserts a whole leaf cluster as one unit instead of replaying its
    /// absorption history one point at a time.
    pub fn from_points(points: Vec<Point>) -> Self {
        let mut cluster = Cluster {
            points,
            rng: AdjacencyMap::new(),
        };
        cluster.rebuild_rng();
        cluster
    }

    /// Appends every point in `points` and recomputes the RNG from scratch
    /// over the whole, now-larger point set. Used by the rebuild path,
    /// where rebuilding once per merged leaf entry is simpler (and no more
    /// expensive) than replaying each point through [`Cluster::absorb`].
    pub fn extend_and_rebuild(&mut self, points: Vec<Point>) {
        self.points.extend(points);
        self.rebuild_rng();
    }

    /// The points absorbed into this cluster, in absorption order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points in this cluster.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether this cluster holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The cluster's relative neighbourhood graph.
    pub fn rng(&self) -> &AdjacencyMap {
        &self.rng
    }

    /// Number of RNG edges currently recorded for this cluster.
    pub fn rng_edge_count(&self) -> usize {
        self.rng.edge_count()
    }

    /// The `(n, LS, SS)` summary of every point in the cluster.
    pub fn summary(&self, dimension: usize) -> Summary {
        let mut summary = Summary::zero(dimension);
        for point in &self.points {
            summary.accumulate(&Summary::of_point(&point.values));
        }
        summary
    }

    /// Raw coordinate vectors, in absorption order — the shape the RNG
    /// engine and representative selection both want.
    fn coordinate_vectors(&self) -> Vec<Vec<f64>> {
        self.points.iter().map(|p| p.values.clone()).collect()
    }

    /// Absorbs a new point into the cluster and updates its RNG in place:
    /// the incremental engine once the cluster has grown past
    /// `rng_config.incremental_minimum_objects`, otherwise a full batch
    /// rebuild (cheap while the cluster is still small, and avoids drifting
    /// from the O(n^3) ground truth before there is enough data for the
    /// incremental approximation to be worthwhile).
    pub fn absorb(&mut self, point: Point, rng_config: &RngConfig) {
        if self.points.len() >= rng_config.incremental_minimum_objects {
            let existing = self.coordinate_vectors();
            incremental::insert_point(&existing, &point.values, &mut self.rng, rng_config);
        }
        self.points.push(point);
        if self.points.len() < rng_config.incremental_minimum_objects {
            self.rebuild_rng();
        }
    }

    /// Recomputes the cluster's RNG from scratch over every current point.
    pub fn rebuild_rng(&mut self) {
        let coords = self.coordinate_vectors();
        self.rng = batch::compute_rng(&coords);
    }

    /// The cluster's RNG as a flat, sorted edge list (point indices are
    /// positions within [`Cluster::points`]).
    pub fn rng_edges(&self) -> Vec<Edge> {
        self.rng.to_edge_list()
    }

    /// Near/far representative point indices (positions within
    /// [`Cluster::points`]) for this cluster.
    pub fn representatives(&self, config: &RepresentativeConfig) -> (Vec<usize>, Vec<usize>) {
        let coords = self.coordinate_vectors();
        representatives::leaf_representatives(&coords, config)
    }

    /// Rewrites every point's stored tree-path to `"<entry_path>.<index>"`,
    /// called whenever a split changes the owning entry's path.
    pub fn reassign_point_paths(&mut self, entry_path: &str) {
        for (idx, point) in self.points.iter_mut().enumerate() {
            point.path = Some(format!("{entry_path}.{idx}"));
        }
    }

    /// `D0` distance between this cluster's centroid and a raw point —
    /// what a tree uses to decide whether a new point descends toward this
    /// cluster.
    pub fn distance_to_point(&self, dimension: usize, values: &[f64]) -> f64 {
        let summary = self.summary(dimension);
        let point_summary = Summary::of_point(values);
        crate::summary::distance(Dist::D0, &summary, &point_summary)
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Cluster::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RngConfig;

    fn point(id: u64, values: Vec<f64>) -> Point {
        Point::new(id, values, 2).unwrap()
    }

    #[test]
    fn test_singleton_has_no_edges() {
        let cluster = Cluster::singleton(point(0, vec![0.0, 0.0]));
        assert_eq!(cluster.len(), 1);
        assert_eq!(cluster.rng_edge_count(), 0);
    }

    #[test]
    fn test_absorb_builds_rng_for_small_cluster() {
        let mut cluster = Cluster::singleton(point(0, vec![0.0, 0.0]));
        let rng_config = RngConfig::default();
        cluster.absorb(point(1, vec![1.0, 0.0]), &rng_config);
        cluster.absorb(point(2, vec![1.0, 1.0]), &rng_config);
        cluster.absorb(point(3, vec![0.0, 1.0]), &rng_config);
        assert_eq!(cluster.len(), 4);
        assert_eq!(cluster.rng_edge_count(), 4, "square has four RNG edges, no diagonals");
    }

    #[test]
    fn test_summary_tracks_point_count() {
        let mut cluster = Cluster::singleton(point(0, vec![1.0, 1.0]));
        cluster.absorb(point(1, vec![3.0, 3.0]), &RngConfig::default());
        let summary = cluster.summary(2);
        assert_eq!(summary.n, 2);
        assert_eq!(summary.ls, vec![4.0, 4.0]);
    }
}
