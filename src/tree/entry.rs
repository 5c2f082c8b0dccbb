//! ## Entries
//!
//! One [`Entry`] per child of a node: the child's clustering-feature
//! summary, a handle to the child itself (a cluster if the owning node is a
//! leaf, another node otherwise), and the entry's own near/far
//! representative points.

use crate::tree::arena::{ClusterHandle, NodeHandle};
use crate::summary::Summary;

/// What an entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    /// A leaf entry: the points live in this cluster.
    Leaf(ClusterHandle),
    /// An internal entry: descend into this node.
    Internal(NodeHandle),
}

/// A representative point resolved all the way down to the leaf cluster
/// that owns it. Cached by value (not just by handle) because the
/// reference implementation's representative lists hold direct object
/// pointers, not indices to re-resolve later.
#[derive(Debug, Clone, PartialEq)]
pub struct Representative {
    /// The leaf cluster the represented point was absorbed into.
    pub cluster: ClusterHandle,
    /// Position of the point within that cluster's point vector.
    pub point_index: usize,
    /// The point's coordinates, cached at selection time.
    pub values: Vec<f64>,
}

/// One child slot of a node.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Clustering feature summary of every point beneath this entry.
    pub summary: Summary,
    /// What this entry points at.
    pub child: Child,
    /// Dotted tree-path string identifying this entry (`"0.3"`, `"0.3.1"`,
    /// ...). Rewritten whenever a split renumbers siblings.
    pub path: String,
    /// Near representatives, nearest first.
    pub near: Vec<Representative>,
    /// Far representatives, farthest first.
    pub far: Vec<Representative>,
}

impl Entry {
    /// Builds a fresh leaf entry around a brand-new singleton cluster.
    pub fn new_leaf(summary: Summary, cluster: ClusterHandle, path: String) -> Self {
        Entry {
            summary,
            child: Child::Leaf(cluster),
            path,
            near: Vec::new(),
            far: Vec::new(),
        }
    }

    /// Builds a fresh internal entry pointing at `node`.
    pub fn new_internal(summary: Summary, node: NodeHandle, path: String) -> Self {
        Entry {
            summary,
            child: Child::Internal(node),
            path,
            near: Vec::new(),
            far: Vec::new(),
        }
    }

    /// Cardinality of this entry (number of points beneath it).
    pub fn cardinality(&self) -> u64 {
        self.summary.n
    }
}
