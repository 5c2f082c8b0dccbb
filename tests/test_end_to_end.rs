
use birchrng::tree::Child;
use birchrng::{Tree, TreeConfig};
use shared::{build_tree, point};

/// Scenario 1: four-point square, T=0.5, B=L=4. One leaf with four entries;
/// the root-level RNG is the 4-cycle of unit edges, no diagonals.
#[test]
fn test_four_point_square_yields_one_leaf_with_a_four_cycle_rng() {
    let points = vec![
        point(0, vec![0.0, 0.0]),
        point(1, vec![1.0, 0.0]),
        point(2, vec![0.0, 1.0]),
        point(3, vec![1.0, 1.0]),
    ];
    let tree = build_tree(2, 0.5, 4, points);

    assert_eq!(tree.height(), 1);
    let root = tree.node(tree.root());
    assert_eq!(root.entries.len(), 4);
    let edges = root.rng.to_edge_list();
    assert_eq!(edges.len(), 4, "the 4-cycle has four edges and no diagonals");
    for edge in &edges {
        assert!((edge.weight - 1.0).abs() < 1e-9, "every edge in the square's RNG is unit length");
    }
}

/// Scenario 2: collinear triple, T=0.5, B=L=4. Three leaf entries; cluster
/// RNG after CreateRNG has edges (0,1) and (1,2) only.
#[test]
fn test_collinear_triple_yields_three_entries_and_excludes_the_long_edge() {
    let points = vec![point(0, vec![0.0, 0.0]), point(1, vec![1.0, 0.0]), point(2, vec![2.0, 0.0])];
    let tree = build_tree(2, 0.5, 4, points);

    let root = tree.node(tree.root());
    assert_eq!(root.entries.len(), 3);
    for entry in &root.entries {
        assert!(matches!(entry.child, Child::Leaf(_)));
    }
    let edges = root.rng.to_edge_list();
    assert_eq!(edges.len(), 2);
    assert!(root.rng.has_edge(0, 1));
    assert!(root.rng.has_edge(1, 2));
    assert!(!root.rng.has_edge(0, 2), "point 1 sits strictly between 0 and 2");
}

/// Scenario 3: absorption. Three points close enough to merge into a single
/// leaf entry whose summary and medoid match the expected clustering
/// feature.
#[test]
fn test_three_close_points_absorb_into_one_entry() {
    let points = vec![point(0, vec![0.0, 0.0]), point(1, vec![0.1, 0.0]), point(2, vec![0.2, 0.0])];
    let tree = build_tree(2, 1.0, 50, points);

    let root = tree.node(tree.root());
    assert_eq!(root.entries.len(), 1);
    let entry = &root.entries[0];
    assert_eq!(entry.cardinality(), 3);
    assert!((entry.summary.ls[0] - 0.3).abs() < 1e-9);
    assert!((entry.summary.ls[1] - 0.0).abs() < 1e-9);
    assert!((entry.summary.ss - (0.0 + 0.01 + 0.04)).abs() < 1e-9);

    let cluster = match entry.child {
        Child::Leaf(cluster) => cluster,
        Child::Internal(_) => panic!("a single absorbing entry must be a leaf"),
    };
    assert_eq!(tree.cluster(cluster).len(), 3);
    let medoid_index = entry.near.first().map(|r| r.point_index);
    assert_eq!(medoid_index, Some(1), "the medoid of three collinear points is the middle one");
}

/// Scenario 4: split. L=2, T=0.1: the first two points absorb, the third
/// triggers a leaf split, leaving a root with two leaf-child entries whose
/// leaves are linked prev/next.
#[test]
fn test_split_leaves_two_linked_leaves() {
    let points = vec![point(0, vec![0.0, 0.0]), point(1, vec![0.0, 0.05]), point(2, vec![10.0, 10.0])];
    let mut config = TreeConfig::new(2, 0.1);
    config.leaf_node_max_entries = 2;
    config.internal_node_max_entries = 2;
    let mut tree = Tree::new(config);
    tree.insert_all(points).unwrap();

    let root = tree.node(tree.root());
    assert_eq!(root.entries.len(), 2, "the overflowing leaf must split into two leaf-child entries");
    for entry in &root.entries {
        assert!(matches!(entry.child, Child::Leaf(_)), "both children of the split root are leaves");
    }

    let leaves: Vec<_> = tree.leaf_chain().collect();
    assert_eq!(leaves.len(), 2);
    assert_eq!(tree.node(leaves[0]).next, Some(leaves[1]));
    assert_eq!(tree.node(leaves[1]).prev, Some(leaves[0]));
}

/// Scenario 6: rebuild. A memory ceiling trips partway through a batch of
/// insertions; afterwards every point is still present exactly once, and
/// the threshold strictly increased.
#[test]
fn test_rebuild_under_a_memory_ceiling_preserves_every_point() {
    let mut config = TreeConfig::new(1, 0.5);
    config.leaf_node_max_entries = 3;
    config.internal_node_max_entries = 3;
    config.max_memory_entries = 100;
    let mut tree = Tree::new(config);

    for i in 0..200u64 {
        tree.insert(point(i, vec![i as f64])).unwrap();
    }

    assert!(tree.current_threshold() > 0.5, "the memory ceiling must have triggered at least one rebuild");

    let mut seen: Vec<f64> = tree
        .leaf_clusters()
        .flat_map(|c| tree.cluster(c).points().iter().map(|p| p.values[0]))
        .collect();
    seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(seen.len(), 200, "every inserted point must survive the rebuild exactly once");

    let total: u64 = tree.leaf_chain().flat_map(|h| tree.node(h).entries.iter().map(|e| e.cardinality())).sum();
    assert_eq!(total, tree.root_summary().n, "every entry's cardinality must still sum to the tree total");
}
