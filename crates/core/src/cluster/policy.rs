//! Merge policies for the segmentation engine.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::graph::{DocumentGraph, Edge};

use super::cluster::Cluster;
use super::params::SegParams;

/// Outcome of a merge decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    Merge,
    Reject,
    /// Undecided: retried in a later pass under resort semantics.
    Defer,
}

/// Caller-supplied segmentation policy: edge priority, merge decisions and
/// cluster validity.
pub trait MergePolicy {
    /// Priority comparator. Edges are sorted ascending, so the strongest
    /// evidence must compare smallest.
    fn compare(&self, graph: &DocumentGraph, a: &Edge, b: &Edge) -> Ordering;

    /// Decides whether the edge's endpoints (or their clusters, when
    /// already clustered) should fuse.
    fn decide(
        &self,
        graph: &DocumentGraph,
        edge: &Edge,
        a: Option<&Cluster>,
        b: Option<&Cluster>,
    ) -> MergeDecision;

    /// Validates a candidate cluster before it is installed.
    fn is_valid(&self, _graph: &DocumentGraph, cluster: &Cluster) -> bool {
        !cluster.is_empty()
    }
}

/// Default policy fusing lines into blocks: closest gaps first, merge when
/// the gap stays within the line spacing for the pair's font size and the
/// sizes agree.
#[derive(Debug, Clone)]
pub struct BlockPolicy {
    pub params: SegParams,
}

impl BlockPolicy {
    pub fn new(params: SegParams) -> Self {
        Self { params }
    }

    fn side_size(&self, graph: &DocumentGraph, edge_end: crate::graph::NodeId, cluster: Option<&Cluster>) -> f64 {
        match cluster {
            Some(c) if c.font_size() > 0.0 => c.font_size(),
            _ => graph.node(edge_end).seg.size(),
        }
    }
}

impl MergePolicy for BlockPolicy {
    fn compare(&self, _graph: &DocumentGraph, a: &Edge, b: &Edge) -> Ordering {
        OrderedFloat(a.weight)
            .cmp(&OrderedFloat(b.weight))
            .then(a.from.cmp(&b.from))
            .then(a.to.cmp(&b.to))
    }

    fn decide(
        &self,
        graph: &DocumentGraph,
        edge: &Edge,
        a: Option<&Cluster>,
        b: Option<&Cluster>,
    ) -> MergeDecision {
        let size_a = self.side_size(graph, edge.from, a);
        let size_b = self.side_size(graph, edge.to, b);

        if size_a > 0.0 && size_b > 0.0 && (size_a - size_b).abs() > self.params.size_tolerance {
            return MergeDecision::Reject;
        }

        let size = match (size_a > 0.0, size_b > 0.0) {
            (true, true) => size_a.min(size_b),
            (true, false) => size_a,
            (false, true) => size_b,
            (false, false) => 10.0,
        };

        let limit = self.params.line_spacing * size;
        if edge.weight <= limit {
            MergeDecision::Merge
        } else if edge.weight <= 2.0 * limit {
            // Borderline gap: the dominant sizes may still settle as the
            // clusters grow, so leave the call for a later pass.
            MergeDecision::Defer
        } else {
            MergeDecision::Reject
        }
    }

    fn is_valid(&self, _graph: &DocumentGraph, cluster: &Cluster) -> bool {
        let (x0, y0, x1, y1) = cluster.bbox();
        !cluster.is_empty() && x0 <= x1 && y0 <= y1
    }
}
