//! ## JSON tree exporter
//!
//! Mirrors `GraphExporter.cpp`'s `ExportTree_JSON`/`ExportNode_JSON`/
//! `ExportCluster_JSON`: a recursive walk of the tree that produces, at the
//! root, `{directed, multigraph, graph, nodes, edges}`, where every entry of
//! a node becomes one exported node carrying its own nested `children`
//! payload — either another node's entries, or (at a leaf) the raw points
//! of its cluster.

use std::path::Path;

use serde::Serialize;

use crate::errors::BirchResult;
use crate::point::Point;
use crate::tree::entry::{Child, Entry, Representative};
use crate::tree::{ClusterHandle, NodeHandle, Tree};

/// One entry (internal or leaf) rendered as a JSON node, recursively
/// nesting its children.
#[derive(Debug, Serialize)]
pub struct ExportedNode {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub size: u32,
    pub color: String,
    pub nb_images: u64,
    pub representative: String,
    pub near_representatives: String,
    pub far_representatives: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_leaf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_leaf: Option<String>,
    pub children: Children,
}

/// A single raw point, rendered inside a leaf cluster's `children.nodes`
/// list. Reduced field set relative to [`ExportedNode`]: a point has no
/// children, cardinality, or representative lists of its own.
#[derive(Debug, Serialize)]
pub struct ExportedPoint {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub size: u32,
    pub representative: String,
}

/// One RNG edge rendered for export.
#[derive(Debug, Serialize)]
pub struct ExportedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// `nodes`/`edges` pair shared by every level of the recursive export,
/// whether it sits at the document root or nested under a `children` field.
#[derive(Debug, Serialize)]
pub struct NodesAndEdges {
    pub nodes: Vec<ExportedNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<ExportedEdge>,
}

/// A leaf cluster's raw points, rendered under a leaf entry's `children`.
#[derive(Debug, Serialize)]
pub struct PointsAndEdges {
    pub nodes: Vec<ExportedPoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<ExportedEdge>,
}

/// What an exported node's `children` field holds: either payload inlined
/// at export time, or (after [`crate::io::splitter`] has run) a filename
/// reference to a sidecar file holding the same payload.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Children {
    Nodes(NodesAndEdges),
    Points(PointsAndEdges),
    FileRef(String),
}

/// The root export artifact: spec.md's `{directed:false, multigraph:false,
/// graph:[], nodes:[...], edges:[...]}`.
#[derive(Debug, Serialize)]
pub struct ExportedGraph {
    pub directed: bool,
    pub multigraph: bool,
    pub graph: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub payload: NodesAndEdges,
}

/// Builds the full export artifact for `tree`, with every `children` field
/// inlined. Call [`crate::io::splitter::split_large_children`] afterwards
/// if the result needs to be broken up across files before writing.
pub fn export_tree(tree: &Tree) -> ExportedGraph {
    ExportedGraph {
        directed: false,
        multigraph: false,
        graph: Vec::new(),
        payload: export_node(tree, tree.root()),
    }
}

/// Serializes and writes the result of [`export_tree`] to `path`.
pub fn write_tree_json(tree: &Tree, path: impl AsRef<Path>) -> BirchResult<()> {
    let graph = export_tree(tree);
    let serialized = serde_json::to_string_pretty(&graph)?;
    std::fs::write(path, serialized)?;
    Ok(())
}

/// The persisted leaf-chain artifact: every leaf entry in chain order,
/// carrying the same attributes an entry gets in [`export_tree`] minus the
/// purely hierarchical ones (position, children, leaf-span pointers).
#[derive(Debug, Serialize)]
pub struct LeafChainEntry {
    pub id: String,
    pub label: String,
    pub nb_images: u64,
    pub representative: String,
    pub near_representatives: String,
    pub far_representatives: String,
}

#[derive(Debug, Serialize)]
pub struct LeafChainArtifact {
    pub leaves: Vec<LeafChainEntry>,
}

/// Walks the leaf chain (not the tree) and builds the persisted leaf-chain
/// artifact.
pub fn export_leaf_chain(tree: &Tree) -> LeafChainArtifact {
    let mut leaves = Vec::new();
    for node in tree.leaf_chain() {
        for entry in &tree.node(node).entries {
            leaves.push(LeafChainEntry {
                id: format!("n{}", entry.path),
                label: format!("n{}", entry.path),
                nb_images: entry.cardinality(),
                representative: resolve_one(tree, entry.near.first()),
                near_representatives: join_representatives(tree, &entry.near),
                far_representatives: join_representatives(tree, &entry.far),
            });
        }
    }
    LeafChainArtifact { leaves }
}

/// Serializes and writes the result of [`export_leaf_chain`] to `path`.
pub fn write_leaf_chain_json(tree: &Tree, path: impl AsRef<Path>) -> BirchResult<()> {
    let artifact = export_leaf_chain(tree);
    let serialized = serde_json::to_string_pretty(&artifact)?;
    std::fs::write(path, serialized)?;
    Ok(())
}

fn export_node(tree: &Tree, node: NodeHandle) -> NodesAndEdges {
    let inner = tree.node(node);
    let layout_divisor = grid_divisor(inner.entries.len());

    let nodes = inner
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| export_entry(tree, entry, i, layout_divisor))
        .collect();

    let edges = inner
        .rng
        .to_edge_list()
        .iter()
        .enumerate()
        .map(|(k, edge)| ExportedEdge {
            id: format!("e{}.{k}", inner.id),
            source: format!("n{}", inner.entries[edge.src].path),
            target: format!("n{}", inner.entries[edge.target].path),
            weight: edge.weight,
        })
        .collect();

    NodesAndEdges { nodes, edges }
}

fn export_entry(tree: &Tree, entry: &Entry, position: usize, layout_divisor: usize) -> ExportedNode {
    let (x, y) = grid_position(position, layout_divisor);

    let (first_leaf, last_leaf, children) = match entry.child {
        Child::Internal(child_node) => {
            let child = tree.node(child_node);
            let first = child.first_leaf.and_then(|h| first_entry_path(tree, h));
            let last = child.last_leaf.and_then(|h| first_entry_path(tree, h));
            (
                first.map(|p| format!("n{p}")),
                last.map(|p| format!("n{p}")),
                Children::Nodes(export_node(tree, child_node)),
            )
        }
        Child::Leaf(cluster) => (None, None, Children::Points(export_cluster(tree, cluster))),
    };

    ExportedNode {
        id: format!("n{}", entry.path),
        label: format!("n{}", entry.path),
        x,
        y,
        size: 1,
        color: "#3366CC".to_string(),
        nb_images: entry.cardinality(),
        representative: resolve_one(tree, entry.near.first()),
        near_representatives: join_representatives(tree, &entry.near),
        far_representatives: join_representatives(tree, &entry.far),
        first_leaf,
        last_leaf,
        children,
    }
}

fn export_cluster(tree: &Tree, cluster: ClusterHandle) -> PointsAndEdges {
    let points = tree.cluster(cluster).points();
    let layout_divisor = grid_divisor(points.len());

    let nodes = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let (x, y) = grid_position(i, layout_divisor);
            let path = point.path.clone().unwrap_or_else(|| point.id.to_string());
            ExportedPoint {
                id: format!("n{path}"),
                label: format!("n{path}"),
                x,
                y,
                size: 1,
                representative: point_label(point),
            }
        })
        .collect();

    let edges = tree
        .cluster(cluster)
        .rng_edges()
        .iter()
        .enumerate()
        .map(|(k, edge)| ExportedEdge {
            id: format!("e{}.{k}", cluster_id(tree, cluster)),
            source: format!("n{}", point_path(&points[edge.src])),
            target: format!("n{}", point_path(&points[edge.target])),
            weight: edge.weight,
        })
        .collect();

    PointsAndEdges { nodes, edges }
}

fn cluster_id(tree: &Tree, cluster: ClusterHandle) -> String {
    tree.cluster(cluster)
        .points()
        .first()
        .map(point_path)
        .unwrap_or_default()
}

fn point_path(point: &Point) -> String {
    point.path.clone().unwrap_or_else(|| point.id.to_string())
}

fn point_label(point: &Point) -> String {
    point.asset_path.clone().unwrap_or_else(|| point_path(point))
}

fn first_entry_path(tree: &Tree, leaf_node: NodeHandle) -> Option<String> {
    tree.node(leaf_node).entries.first().map(|e| e.path.clone())
}

fn resolve_one(tree: &Tree, representative: Option<&Representative>) -> String {
    representative
        .map(|rep| resolve_representative(tree, rep))
        .unwrap_or_default()
}

fn resolve_representative(tree: &Tree, rep: &Representative) -> String {
    tree.cluster(rep.cluster)
        .points()
        .get(rep.point_index)
        .map(point_label)
        .unwrap_or_default()
}

fn join_representatives(tree: &Tree, representatives: &[Representative]) -> String {
    representatives
        .iter()
        .map(|rep| resolve_representative(tree, rep))
        .collect::<Vec<_>>()
        .join(",")
}

/// Heuristic default-layout grid width, matching the source's
/// `ceil(size / 2)`.
fn grid_divisor(size: usize) -> usize {
    ((size as f64) / 2.0).ceil().max(1.0) as usize
}

fn grid_position(index: usize, divisor: usize) -> (f64, f64) {
    ((index % divisor) as f64, (index / divisor) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::point::Point as RawPoint;

    fn point(id: u64, values: Vec<f64>) -> RawPoint {
        RawPoint::new(id, values, 2).unwrap()
    }

    #[test]
    fn test_export_single_point_tree_has_one_node_at_root() {
        let mut tree = Tree::new(TreeConfig::new(2, 1.0));
        tree.insert(point(0, vec![0.0, 0.0])).unwrap();
        let graph = export_tree(&tree);
        assert!(!graph.directed);
        assert!(!graph.multigraph);
        assert_eq!(graph.payload.nodes.len(), 1);
        assert_eq!(graph.payload.nodes[0].id, "n0.0");
        match &graph.payload.nodes[0].children {
            Children::Points(payload) => assert_eq!(payload.nodes.len(), 1),
            _ => panic!("a leaf entry must export a points payload"),
        }
    }

    #[test]
    fn test_export_reflects_a_split_with_two_entries_at_root() {
        let mut config = TreeConfig::new(2, 0.1);
        config.leaf_node_max_entries = 2;
        let mut tree = Tree::new(config);
        tree.insert(point(0, vec![0.0, 0.0])).unwrap();
        tree.insert(point(1, vec![0.0, 0.05])).unwrap();
        tree.insert(point(2, vec![10.0, 10.0])).unwrap();
        let graph = export_tree(&tree);
        assert_eq!(graph.payload.nodes.len(), 2);
    }

    #[test]
    fn test_leaf_chain_export_lists_every_leaf_entry() {
        let mut config = TreeConfig::new(2, 0.1);
        config.leaf_node_max_entries = 2;
        let mut tree = Tree::new(config);
        for i in 0..5u64 {
            tree.insert(point(i, vec![i as f64 * 5.0, 0.0])).unwrap();
        }
        let artifact = export_leaf_chain(&tree);
        let total_images: u64 = artifact.leaves.iter().map(|l| l.nb_images).sum();
        assert_eq!(total_images, 5);
    }
}
