//! The DocumentGraph arena.
//!
//! Nodes and edges live in vectors owned by the graph; identity checks are
//! index equality. Adjacency is maintained as per-node from/to lists so
//! neighbour enumeration is O(degree).

use smallvec::SmallVec;

use crate::geom::{Rect, get_bound};

use super::edge::Edge;
use super::node::Node;

/// Stable index of a node within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Stable index of an edge within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

type EdgeList = SmallVec<[EdgeId; 4]>;

/// An owned set of nodes and edges with O(1) adjacency lookup.
///
/// Cloning is a deep copy; wrapper graphs are cloned per match invocation
/// so that match-N edge fusion never corrupts the caller's template.
#[derive(Debug, Clone, Default)]
pub struct DocumentGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Edges leaving each node.
    from_lists: Vec<EdgeList>,
    /// Edges arriving at each node.
    to_lists: Vec<EdgeList>,
}

impl DocumentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.from_lists.push(SmallVec::new());
        self.to_lists.push(SmallVec::new());
        id
    }

    /// Adds an edge; endpoints must already be in the graph.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        debug_assert!(edge.from.0 < self.nodes.len());
        debug_assert!(edge.to.0 < self.nodes.len());
        let id = EdgeId(self.edges.len());
        self.from_lists[edge.from.0].push(id);
        self.to_lists[edge.to.0].push(id);
        self.edges.push(edge);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    /// Edges leaving the node.
    pub fn edges_from(&self, id: NodeId) -> &[EdgeId] {
        &self.from_lists[id.0]
    }

    /// Edges arriving at the node.
    pub fn edges_to(&self, id: NodeId) -> &[EdgeId] {
        &self.to_lists[id.0]
    }

    /// Bounding box of a set of nodes.
    pub fn bound_of(&self, ids: &[NodeId]) -> Rect {
        get_bound(ids.iter().map(|id| {
            let s = &self.node(*id).seg;
            (s.x0, s.y0, s.x1, s.y1)
        }))
    }

    /// Checks whether the enabled part of the graph is connected.
    ///
    /// Edges are treated as undirected. A single enabled node with no edges
    /// is connected; an empty graph is trivially connected. Any enabled
    /// node unreachable from the first enabled node makes the graph
    /// disconnected, including nodes with no enabled incident edge.
    pub fn is_connected(&self) -> bool {
        let enabled: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.disabled)
            .map(|(i, _)| i)
            .collect();
        if enabled.len() <= 1 {
            return true;
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![enabled[0]];
        seen[enabled[0]] = true;
        while let Some(i) = stack.pop() {
            let mut visit = |other: usize| {
                if !seen[other] && !self.nodes[other].disabled {
                    seen[other] = true;
                    stack.push(other);
                }
            };
            for eid in &self.from_lists[i] {
                let e = &self.edges[eid.0];
                if !e.disabled {
                    visit(e.to.0);
                }
            }
            for eid in &self.to_lists[i] {
                let e = &self.edges[eid.0];
                if !e.disabled {
                    visit(e.from.0);
                }
            }
        }

        enabled.into_iter().all(|i| seen[i])
    }

    /// Produces a new graph containing only the enabled nodes and the
    /// enabled edges whose endpoints both survive. Indices are compacted.
    pub fn retain_enabled(&self) -> DocumentGraph {
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut out = DocumentGraph::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.disabled {
                remap[i] = Some(out.add_node(node.clone()));
            }
        }
        for edge in &self.edges {
            if edge.disabled {
                continue;
            }
            if let (Some(from), Some(to)) = (remap[edge.from.0], remap[edge.to.0]) {
                let mut e = edge.clone();
                e.from = from;
                e.to = to;
                out.add_edge(e);
            }
        }
        out
    }

    /// Induced subgraph over the given nodes. Returns the subgraph and the
    /// mapping from its node indices back to this graph's.
    pub fn induced(&self, ids: &[NodeId]) -> (DocumentGraph, Vec<NodeId>) {
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut out = DocumentGraph::new();
        let mut back = Vec::with_capacity(ids.len());
        for id in ids {
            if remap[id.0].is_none() {
                remap[id.0] = Some(out.add_node(self.node(*id).clone()));
                back.push(*id);
            }
        }
        for edge in &self.edges {
            if let (Some(from), Some(to)) = (remap[edge.from.0], remap[edge.to.0]) {
                let mut e = edge.clone();
                e.from = from;
                e.to = to;
                out.add_edge(e);
            }
        }
        (out, back)
    }
}
