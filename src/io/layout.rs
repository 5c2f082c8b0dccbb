//! ## Stress-majorization graph layout
//!
//! A fixed-iteration port of `StressMajorization.cpp`'s majorization loop
//! ["Graph Drawing by Stress Majorization", Gansner, Koren, North (2003)]:
//! take an already-exported graph's node list and edge list, treat edge
//! weights as desired pairwise distances, and iteratively relax every
//! node's `(x, y)` toward those distances. Uniform weights only (the
//! source's distance-squared weighting is commented out in the original and
//! never shipped). This is a pure post-processing pass over exported JSON
//! structures — it never touches the tree.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::io::export::{ExportedEdge, ExportedNode};

const MAX_ITERATIONS: usize = 1000;
const CONVERGENCE_EPSILON: f64 = 0.0001;

/// Lays `nodes` out in place, using `edges`' weights as the graph distance
/// between endpoints and shortest-path distance (via Dijkstra) between
/// everything else. Nodes with no path to the rest of the graph keep their
/// existing `x`/`y`.
pub fn layout(nodes: &mut [ExportedNode], edges: &[ExportedEdge]) {
    let n = nodes.len();
    if n < 2 {
        return;
    }

    let index_of: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for edge in edges {
        if let (Some(&a), Some(&b)) = (index_of.get(edge.source.as_str()), index_of.get(edge.target.as_str()))
        {
            let weight = edge.weight.max(f64::EPSILON);
            adjacency[a].push((b, weight));
            adjacency[b].push((a, weight));
        }
    }

    let shortest: Vec<Vec<f64>> = (0..n).map(|source| dijkstra(source, &adjacency)).collect();

    let mut x: Vec<f64> = nodes.iter().map(|node| node.x).collect();
    let mut y: Vec<f64> = nodes.iter().map(|node| node.y).collect();

    let mut previous_stress = stress(&x, &y, &shortest);
    for _ in 0..MAX_ITERATIONS {
        majorize_step(&mut x, &mut y, &shortest);
        let current_stress = stress(&x, &y, &shortest);
        let converged = previous_stress > 0.0
            && (previous_stress - current_stress) / previous_stress <= CONVERGENCE_EPSILON;
        previous_stress = current_stress;
        if converged {
            break;
        }
    }

    for (i, node) in nodes.iter_mut().enumerate() {
        node.x = x[i];
        node.y = y[i];
    }
}

#[derive(PartialEq)]
struct HeapEntry {
    cost: f64,
    node: usize,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the smallest cost first.
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(source: usize, adjacency: &[Vec<(usize, f64)>]) -> Vec<f64> {
    let n = adjacency.len();
    let mut dist = vec![f64::INFINITY; n];
    dist[source] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(HeapEntry { cost: 0.0, node: source });

    while let Some(HeapEntry { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }
        for &(next, weight) in &adjacency[node] {
            let next_cost = cost + weight;
            if next_cost < dist[next] {
                dist[next] = next_cost;
                heap.push(HeapEntry { cost: next_cost, node: next });
            }
        }
    }

    dist
}

fn majorize_step(x: &mut [f64], y: &mut [f64], shortest: &[Vec<f64>]) {
    let old_x = x.to_vec();
    let old_y = y.to_vec();
    let n = x.len();

    for i in 0..n {
        let mut new_x = 0.0;
        let mut new_y = 0.0;
        let mut total_weight = 0.0;

        for j in 0..n {
            if i == j || !shortest[i][j].is_finite() {
                continue;
            }
            let dist = ((old_x[i] - old_x[j]).powi(2) + (old_y[i] - old_y[j]).powi(2))
                .sqrt()
                .max(f64::EPSILON);
            new_x += old_x[j] + shortest[i][j] * (old_x[i] - old_x[j]) / dist;
            new_y += old_y[j] + shortest[i][j] * (old_y[i] - old_y[j]) / dist;
            total_weight += 1.0;
        }

        if total_weight > 0.0 {
            x[i] = new_x / total_weight;
            y[i] = new_y / total_weight;
        }
    }
}

fn stress(x: &[f64], y: &[f64], shortest: &[Vec<f64>]) -> f64 {
    let n = x.len();
    let mut total = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            if !shortest[i][j].is_finite() {
                continue;
            }
            let dist = ((x[i] - x[j]).powi(2) + (y[i] - y[j]).powi(2)).sqrt();
            let diff = dist - shortest[i][j];
            total += diff * diff;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f64, y: f64) -> ExportedNode {
        ExportedNode {
            id: id.to_string(),
            label: id.to_string(),
            x,
            y,
            size: 1,
            color: "#3366CC".to_string(),
            nb_images: 1,
            representative: String::new(),
            near_representatives: String::new(),
            far_representatives: String::new(),
            first_leaf: None,
            last_leaf: None,
            children: crate::io::export::Children::Nodes(crate::io::export::NodesAndEdges {
                nodes: Vec::new(),
                edges: Vec::new(),
            }),
        }
    }

    fn edge(source: &str, target: &str, weight: f64) -> ExportedEdge {
        ExportedEdge {
            id: format!("e{source}{target}"),
            source: source.to_string(),
            target: target.to_string(),
            weight,
        }
    }

    #[test]
    fn test_single_node_is_left_untouched() {
        let mut nodes = vec![node("a", 1.0, 2.0)];
        layout(&mut nodes, &[]);
        assert_eq!((nodes[0].x, nodes[0].y), (1.0, 2.0));
    }

    #[test]
    fn test_two_connected_nodes_move_apart_to_match_edge_weight() {
        let mut nodes = vec![node("a", 0.0, 0.0), node("b", 0.001, 0.0)];
        let edges = vec![edge("a", "b", 5.0)];
        layout(&mut nodes, &edges);
        let dist = ((nodes[0].x - nodes[1].x).powi(2) + (nodes[0].y - nodes[1].y).powi(2)).sqrt();
        assert!((dist - 5.0).abs() < 1e-3, "expected distance near 5.0, got {dist}");
    }

    #[test]
    fn test_disconnected_node_keeps_its_position() {
        let mut nodes = vec![node("a", 0.0, 0.0), node("b", 1.0, 0.0), node("c", 9.0, 9.0)];
        let edges = vec![edge("a", "b", 1.0)];
        layout(&mut nodes, &edges);
        assert_eq!((nodes[2].x, nodes[2].y), (9.0, 9.0));
    }
}
