//! ## Export splitter
//!
//! The file-splitting collaborator named in spec.md section 1: once a
//! node's inlined `children` payload would serialize past a configurable
//! byte threshold, write that payload to its own sidecar file next to the
//! root export and replace the inline object with a filename reference, per
//! spec.md section 6 ("When a node is exported through the split-file path,
//! `children` becomes a filename reference rather than an inline object").

use std::path::Path;

use crate::errors::BirchResult;
use crate::io::export::{Children, ExportedNode};

/// Default byte threshold above which a node's children are split out to
/// their own file.
pub const DEFAULT_SPLIT_THRESHOLD_BYTES: usize = 1_000_000;

/// Walks every node in `nodes` depth-first, splitting out any inlined
/// children payload whose serialized size exceeds `threshold_bytes` into
/// `"<node id>.json"` inside `output_dir`. Children are split bottom-up, so
/// a parent's own size check sees the already-shrunk (filename-referencing)
/// size of any child that was itself split.
pub fn split_large_children(
    nodes: &mut [ExportedNode],
    output_dir: &Path,
    threshold_bytes: usize,
) -> BirchResult<()> {
    for node in nodes.iter_mut() {
        split_node(node, output_dir, threshold_bytes)?;
    }
    Ok(())
}

fn split_node(node: &mut ExportedNode, output_dir: &Path, threshold_bytes: usize) -> BirchResult<()> {
    // Recurse first, so a parent's own size check sees the already-shrunk
    // (filename-referencing) size of any child that was itself split.
    if let Children::Nodes(payload) = &mut node.children {
        split_large_children(&mut payload.nodes, output_dir, threshold_bytes)?;
    }

    let serialized = match &node.children {
        Children::Nodes(payload) => serde_json::to_string(payload)?,
        Children::Points(payload) => serde_json::to_string(payload)?,
        Children::FileRef(_) => return Ok(()),
    };
    if serialized.len() <= threshold_bytes {
        return Ok(());
    }

    let file_name = format!("{}.json", node.id);
    std::fs::write(output_dir.join(&file_name), serialized)?;
    node.children = Children::FileRef(file_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::export::{ExportedPoint, PointsAndEdges};
    use tempfile::tempdir;

    fn leaf_node(id: &str, point_count: usize) -> ExportedNode {
        let nodes = (0..point_count)
            .map(|i| ExportedPoint {
                id: format!("n{id}.{i}"),
                label: format!("n{id}.{i}"),
                x: i as f64,
                y: 0.0,
                size: 1,
                representative: format!("point-{i}-with-a-fairly-long-representative-label-value"),
            })
            .collect();
        ExportedNode {
            id: id.to_string(),
            label: id.to_string(),
            x: 0.0,
            y: 0.0,
            size: 1,
            color: "#3366CC".to_string(),
            nb_images: point_count as u64,
            representative: String::new(),
            near_representatives: String::new(),
            far_representatives: String::new(),
            first_leaf: None,
            last_leaf: None,
            children: Children::Points(PointsAndEdges { nodes, edges: Vec::new() }),
        }
    }

    #[test]
    fn test_small_payload_stays_inline() {
        let dir = tempdir().unwrap();
        let mut nodes = vec![leaf_node("n0.0", 2)];
        split_large_children(&mut nodes, dir.path(), DEFAULT_SPLIT_THRESHOLD_BYTES).unwrap();
        assert!(matches!(nodes[0].children, Children::Points(_)));
    }

    #[test]
    fn test_large_payload_is_split_to_a_file() {
        let dir = tempdir().unwrap();
        let mut nodes = vec![leaf_node("n0.0", 50)];
        split_large_children(&mut nodes, dir.path(), 256).unwrap();
        match &nodes[0].children {
            Children::FileRef(name) => {
                assert_eq!(name, "n0.0.json");
                assert!(dir.path().join(name).exists());
            }
            _ => panic!("a payload past the threshold must be split out"),
        }
    }
}
