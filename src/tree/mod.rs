//! ## The CF-Tree
//!
//! A height-balanced tree of clustering-feature entries. Internal nodes
//! fan out to other nodes; leaf nodes fan out to [`crate::cluster::Cluster`]s
//! and are additionally threaded together in a doubly linked chain so the
//! whole data set can be walked in absorption order without touching the
//! tree's internal structure.
//!
//! Only [`Tree::insert`] mutates tree shape, and it does so one point at a
//! time via a single top-down traversal — see the module-level
//! concurrency note in the crate root. The only parallel regions live
//! inside [`crate::rng`], invoked from [`cluster::Cluster::absorb`] and
//! from [`levels::create_multilevel_rng`].

pub mod arena;
pub mod entry;
pub mod insert;
pub mod leaf_chain;
pub mod levels;
pub mod node;
pub mod rebuild;

pub use arena::{ClusterHandle, NodeHandle};
pub use entry::{Child, Entry, Representative};
pub use node::Node;

use crate::cluster::Cluster;
use crate::config::TreeConfig;
use crate::errors::{BirchError, BirchResult};
use crate::point::Point;
use crate::tree::arena::Arena;

/// A height-balanced clustering-feature tree with a relative neighbourhood
/// graph attached to every node and every leaf cluster.
pub struct Tree {
    pub(crate) config: TreeConfig,
    /// Current absorption threshold. Starts at `config.threshold` but can
    /// grow when [`Tree::maybe_rebuild`] fires.
    pub(crate) threshold: f64,
    pub(crate) nodes: Arena<Node>,
    pub(crate) clusters: Arena<Cluster>,
    pub(crate) root: NodeHandle,
    /// Dummy sentinel at the head of the leaf chain. Never holds entries.
    pub(crate) first_leaf: NodeHandle,
    pub(crate) last_leaf: NodeHandle,
    /// Running count of leaf entries (== number of leaf clusters) across
    /// the whole tree, tracked incrementally so [`Tree::maybe_rebuild`]
    /// doesn't need to walk the chain on every insertion.
    pub(crate) leaf_entry_count: usize,
}

impl Tree {
    /// Builds an empty tree: a dummy sentinel leaf followed by one real,
    /// empty leaf node which is also the root.
    pub fn new(config: TreeConfig) -> Self {
        let mut nodes = Arena::new();
        let dummy_index = nodes.insert(Node::new_leaf("dummy".to_string()));
        let root_index = nodes.insert(Node::new_leaf("0".to_string()));
        nodes.get_mut(dummy_index).next = Some(NodeHandle(root_index));
        nodes.get_mut(root_index).prev = Some(NodeHandle(dummy_index));
        nodes.get_mut(root_index).first_leaf = Some(NodeHandle(root_index));
        nodes.get_mut(root_index).last_leaf = Some(NodeHandle(root_index));

        Tree {
            threshold: config.threshold,
            config,
            nodes,
            clusters: Arena::new(),
            root: NodeHandle(root_index),
            first_leaf: NodeHandle(dummy_index),
            last_leaf: NodeHandle(root_index),
            leaf_entry_count: 0,
        }
    }

    /// The tree's configuration (immutable fields; `threshold` may have
    /// grown past `config.threshold` — see [`Tree::current_threshold`]).
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The threshold currently in effect (may exceed `config().threshold`
    /// after a rebuild).
    pub fn current_threshold(&self) -> f64 {
        self.threshold
    }

    /// Handle to the root node.
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Handle to the dummy sentinel leading the leaf chain.
    pub fn first_leaf_sentinel(&self) -> NodeHandle {
        self.first_leaf
    }

    /// Handle to the last leaf node in the chain.
    pub fn last_leaf(&self) -> NodeHandle {
        self.last_leaf
    }

    /// Borrows the node at `handle`.
    pub fn node(&self, handle: NodeHandle) -> &Node {
        self.nodes.get(handle.0)
    }

    /// Mutably borrows the node at `handle`.
    pub(crate) fn node_mut(&mut self, handle: NodeHandle) -> &mut Node {
        self.nodes.get_mut(handle.0)
    }

    /// Borrows the cluster at `handle`.
    pub fn cluster(&self, handle: ClusterHandle) -> &Cluster {
        self.clusters.get(handle.0)
    }

    /// Mutably borrows the cluster at `handle`.
    pub(crate) fn cluster_mut(&mut self, handle: ClusterHandle) -> &mut Cluster {
        self.clusters.get_mut(handle.0)
    }

    /// Allocates a fresh node in the node arena, returning its handle.
    pub(crate) fn alloc_node(&mut self, node: Node) -> NodeHandle {
        NodeHandle(self.nodes.insert(node))
    }

    /// Allocates a fresh cluster in the cluster arena, returning its handle.
    pub(crate) fn alloc_cluster(&mut self, cluster: Cluster) -> ClusterHandle {
        ClusterHandle(self.clusters.insert(cluster))
    }

    /// Total number of points absorbed into the tree.
    pub fn len(&self) -> u64 {
        self.root_summary().n
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The clustering-feature summary over the whole tree (the sum of the
    /// root node's entries).
    pub fn root_summary(&self) -> crate::summary::Summary {
        let root = self.node(self.root);
        let mut total = crate::summary::Summary::zero(self.config.dimension);
        for entry in &root.entries {
            total.accumulate(&entry.summary);
        }
        total
    }

    /// Height of the tree in levels: one for a tree whose root is itself a
    /// leaf node, growing by one for every additional level of internal
    /// nodes above the leaves. This is [`levels::compute_height`]'s edge
    /// count plus one.
    pub fn height(&self) -> usize {
        levels::compute_height(self, self.root) + 1
    }

    /// Inserts one point into the tree, descending to the closest leaf
    /// cluster, absorbing or appending as needed, splitting nodes bottom-up
    /// when they overflow, and triggering a rebuild if the configured
    /// memory ceiling has been crossed.
    pub fn insert(&mut self, point: Point) -> BirchResult<()> {
        if point.dimension() != self.config.dimension {
            return Err(BirchError::DimensionMismatch {
                expected: self.config.dimension,
                found: point.dimension(),
            });
        }
        insert::insert(self, point)?;
        self.leaf_chain_invariant_check();
        rebuild::maybe_rebuild(self);
        Ok(())
    }

    /// Ingests every point yielded by `points` in order, stopping (but
    /// keeping everything absorbed so far) at the first error.
    pub fn insert_all<I: IntoIterator<Item = Point>>(&mut self, points: I) -> BirchResult<()> {
        for point in points {
            self.insert(point)?;
        }
        Ok(())
    }

    /// Iterates over every leaf node's handle, in chain order, skipping the
    /// dummy sentinel.
    pub fn leaf_chain(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        leaf_chain::iter(self)
    }

    /// Iterates over every leaf cluster in the tree, in chain order.
    pub fn leaf_clusters(&self) -> impl Iterator<Item = ClusterHandle> + '_ {
        self.leaf_chain().flat_map(move |handle| {
            self.node(handle).entries.iter().filter_map(|e| match e.child {
                Child::Leaf(cluster) => Some(cluster),
                Child::Internal(_) => None,
            })
        })
    }

    /// Leaf clusters with more than one point — the reference
    /// implementation's "pruned clusters" view, which drops singleton
    /// outliers without touching the tree itself.
    pub fn pruned_leaf_entries(&self) -> impl Iterator<Item = ClusterHandle> + '_ {
        self.leaf_clusters().filter(|&h| self.cluster(h).len() > 1)
    }

    /// Recomputes near/far representatives for every entry in the tree,
    /// bottom-up. The online path refreshes only the entries on the
    /// insertion path; call this after a bulk load or before an export if
    /// representative freshness matters more than insertion cost.
    pub fn recompute_all_representatives(&mut self) {
        insert::recompute_all_representatives(self, self.root);
    }

    fn leaf_chain_invariant_check(&self) {
        debug_assert!(
            self.node(self.first_leaf).is_dummy(),
            "leaf chain head must remain the dummy sentinel"
        );
    }
}
