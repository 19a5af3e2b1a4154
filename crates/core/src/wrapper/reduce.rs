//! Match-N chain fusion.
//!
//! The search algorithm reasons about a single hop per matrix cell, so a
//! chain "A -(matchN)-> B -(matchN)-> C" is collapsed into one logical
//! edge "A -(matchN)-> C" before matching. This is a pure transformation:
//! the caller's template graph is never touched.

use crate::graph::{DocumentGraph, EdgeId, NodeId, Relation};

/// Produces the reduced wrapper graph: disabled nodes/edges stripped and
/// every chain of match-N edges fused into a single edge spanning the
/// chain's extremes. Intermediate chain nodes and edges are removed.
pub fn reduce_wrapper_graph(graph: &DocumentGraph) -> DocumentGraph {
    let mut g = graph.retain_enabled();

    let mut processed = vec![false; g.edge_count()];
    for i in 0..g.edge_count() {
        if processed[i] {
            continue;
        }
        let (mode, relation, mut from, mut to) = {
            let e = g.edge(EdgeId(i));
            (e.mode, e.relation, e.from, e.to)
        };
        if !mode.is_multi() {
            continue;
        }
        processed[i] = true;

        // Extend forward through continuations of the chain.
        while let Some((next, far)) = chain_step(&g, &processed, i, relation, to, true) {
            processed[next.0] = true;
            g.edge_mut(next).disabled = true;
            g.node_mut(to).disabled = true;
            to = far;
        }

        // And backward through predecessors.
        while let Some((prev, far)) = chain_step(&g, &processed, i, relation, from, false) {
            processed[prev.0] = true;
            g.edge_mut(prev).disabled = true;
            g.node_mut(from).disabled = true;
            from = far;
        }

        let e = g.edge_mut(EdgeId(i));
        e.from = from;
        e.to = to;
    }

    // Adjacency lists are stale after the endpoint redirects; rebuilding
    // through retain_enabled also drops the fused intermediates.
    g.retain_enabled()
}

/// Finds the next match-N edge continuing the chain at `pivot`, following
/// the same relation or its inverse written in the opposite direction.
/// Returns the edge and the chain's new far endpoint.
fn chain_step(
    g: &DocumentGraph,
    processed: &[bool],
    origin: usize,
    relation: Relation,
    pivot: NodeId,
    forward: bool,
) -> Option<(EdgeId, NodeId)> {
    for j in 0..g.edge_count() {
        if j == origin || processed[j] {
            continue;
        }
        let c = g.edge(EdgeId(j));
        if c.disabled || !c.mode.is_multi() {
            continue;
        }
        let hit = if forward {
            if c.from == pivot && c.relation == relation {
                Some(c.to)
            } else if c.to == pivot && c.relation == relation.inverse() {
                Some(c.from)
            } else {
                None
            }
        } else if c.to == pivot && c.relation == relation {
            Some(c.from)
        } else if c.from == pivot && c.relation == relation.inverse() {
            Some(c.to)
        } else {
            None
        };
        if let Some(far) = hit {
            return Some((EdgeId(j), far));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, MatchMode, Node};
    use crate::segment::{Segment, SegmentKind};

    fn text_node(text: &str) -> Node {
        Node::new(Segment::text(
            SegmentKind::Line,
            (0.0, 0.0, 10.0, 10.0),
            text,
            "F1",
            10.0,
        ))
    }

    fn multi_edge(from: NodeId, to: NodeId) -> Edge {
        let mut e = Edge::new(from, to, Relation::RightOf, 0.0);
        e.mode = MatchMode::NAny;
        e
    }

    #[test]
    fn test_fuses_three_node_chain() {
        let mut g = DocumentGraph::new();
        let a = g.add_node(text_node("a"));
        let b = g.add_node(text_node("b"));
        let c = g.add_node(text_node("c"));
        g.add_edge(multi_edge(a, b));
        g.add_edge(multi_edge(b, c));

        let reduced = reduce_wrapper_graph(&g);
        assert_eq!(reduced.node_count(), 2);
        assert_eq!(reduced.edge_count(), 1);
        let (_, e) = reduced.edges().next().unwrap();
        assert_eq!(e.mode, MatchMode::NAny);
        assert_eq!(
            (
                reduced.node(e.from).seg.text_str(),
                reduced.node(e.to).seg.text_str()
            ),
            ("a", "c")
        );
    }

    #[test]
    fn test_reduce_does_not_touch_template() {
        let mut g = DocumentGraph::new();
        let a = g.add_node(text_node("a"));
        let b = g.add_node(text_node("b"));
        let c = g.add_node(text_node("c"));
        g.add_edge(multi_edge(a, b));
        g.add_edge(multi_edge(b, c));

        let _ = reduce_wrapper_graph(&g);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert!(!g.node(b).disabled);
        assert_eq!(g.edge(EdgeId(0)).to, b);
    }

    #[test]
    fn test_single_match_edges_unfused() {
        let mut g = DocumentGraph::new();
        let a = g.add_node(text_node("a"));
        let b = g.add_node(text_node("b"));
        let c = g.add_node(text_node("c"));
        g.add_edge(Edge::new(a, b, Relation::RightOf, 0.0));
        g.add_edge(Edge::new(b, c, Relation::RightOf, 0.0));

        let reduced = reduce_wrapper_graph(&g);
        assert_eq!(reduced.node_count(), 3);
        assert_eq!(reduced.edge_count(), 2);
    }
}
