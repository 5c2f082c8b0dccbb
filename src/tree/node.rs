//! ## Nodes
//!
//! A node is a page of entries: either every entry is a [`Child::Leaf`]
//! pointing at a cluster, or every entry is a [`Child::Internal`] pointing
//! at another node — the two are never mixed within one node. Leaf nodes
//! additionally sit in the tree-wide doubly linked leaf chain.

use crate::rng::graph::AdjacencyMap;
use crate::tree::arena::NodeHandle;
use crate::tree::entry::Entry;

/// One page of the tree: a bounded list of entries, plus (for leaf nodes)
/// its place in the leaf chain.
#[derive(Debug, Clone)]
pub struct Node {
    /// Dotted path-string identifier (`"0"`, `"0.3"`, `"0.3.1"`, ...),
    /// reassigned whenever the tree's shape changes.
    pub id: String,
    /// Whether every entry in this node is a [`super::entry::Child::Leaf`].
    pub is_leaf: bool,
    /// This node's entries.
    pub entries: Vec<Entry>,
    /// Previous node in the leaf chain. Only meaningful for leaf nodes.
    pub prev: Option<NodeHandle>,
    /// Next node in the leaf chain. Only meaningful for leaf nodes.
    pub next: Option<NodeHandle>,
    /// First leaf (in chain order) of this node's subtree. For a leaf node
    /// this is always its own handle.
    pub first_leaf: Option<NodeHandle>,
    /// Last leaf (in chain order) of this node's subtree. For a leaf node
    /// this is always its own handle.
    pub last_leaf: Option<NodeHandle>,
    /// Relative neighbourhood graph over this node's own entries (indexed
    /// by position within [`Node::entries`]), i.e. the hierarchical RNG
    /// connecting this node's siblings at this level of the tree.
    pub rng: AdjacencyMap,
}

impl Node {
    /// A new, empty leaf node with the given path-string id.
    pub fn new_leaf(id: String) -> Self {
        Node {
            id,
            is_leaf: true,
            entries: Vec::new(),
            prev: None,
            next: None,
            first_leaf: None,
            last_leaf: None,
            rng: AdjacencyMap::new(),
        }
    }

    /// A new, empty internal node with the given path-string id.
    pub fn new_internal(id: String) -> Self {
        Node {
            id,
            is_leaf: false,
            entries: Vec::new(),
            prev: None,
            next: None,
            first_leaf: None,
            last_leaf: None,
            rng: AdjacencyMap::new(),
        }
    }

    /// A new, empty node matching `is_leaf`'s flavor.
    pub fn new(is_leaf: bool, id: String) -> Self {
        if is_leaf {
            Node::new_leaf(id)
        } else {
            Node::new_internal(id)
        }
    }

    /// Whether the dummy sentinel chain head (holds no entries and is never
    /// a real leaf the caller inserted into).
    pub fn is_dummy(&self) -> bool {
        self.is_leaf && self.id == "dummy"
    }

    /// Whether this node currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries in this node.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this node has reached `max_entries` and must split before
    /// accepting another entry.
    pub fn is_full(&self, max_entries: usize) -> bool {
        self.entries.len() >= max_entries
    }
}
