//! ## The leaf chain
//!
//! Leaf nodes are threaded together in creation order by `prev`/`next`
//! handles on [`crate::tree::node::Node`], headed by a dummy sentinel that
//! holds no entries. Walking the chain never descends through the tree, so
//! consumers (the JSON exporter, [`super::levels`]) can stream every leaf
//! cluster in one linear pass regardless of tree shape.

use crate::tree::{NodeHandle, Tree};

/// Iterates every real leaf node's handle, in chain order, starting after
/// the dummy sentinel.
pub fn iter(tree: &Tree) -> impl Iterator<Item = NodeHandle> + '_ {
    let mut current = tree.node(tree.first_leaf_sentinel()).next;
    std::iter::from_fn(move || {
        let handle = current?;
        current = tree.node(handle).next;
        Some(handle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::point::Point;

    #[test]
    fn test_empty_tree_has_no_real_leaves_in_iteration_but_root_exists() {
        let tree = Tree::new(TreeConfig::new(2, 1.0));
        // The root is the dummy's next even when empty, so the chain yields
        // exactly the (empty) root leaf.
        let leaves: Vec<NodeHandle> = iter(&tree).collect();
        assert_eq!(leaves, vec![tree.root()]);
    }

    #[test]
    fn test_chain_after_a_split_has_two_leaves_in_order() {
        let mut config = TreeConfig::new(2, 0.1);
        config.leaf_node_max_entries = 2;
        let mut tree = Tree::new(config);
        tree.insert(Point::new(0, vec![0.0, 0.0], 2).unwrap()).unwrap();
        tree.insert(Point::new(1, vec![0.0, 0.05], 2).unwrap()).unwrap();
        tree.insert(Point::new(2, vec![10.0, 10.0], 2).unwrap()).unwrap();
        let leaves: Vec<NodeHandle> = iter(&tree).collect();
        assert_eq!(leaves.len(), 2);
    }
}
