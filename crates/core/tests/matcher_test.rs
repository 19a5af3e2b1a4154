//! Tests for the subgraph isomorphism matcher.

use itertools::Itertools;
use trellis_core::graph::{
    ContentMatch, DocumentGraph, Edge, MatchMode, Node, NodeId, Relation,
};
use trellis_core::matcher::{SearchBudget, compare_edges, compare_nodes, find_embeddings};
use trellis_core::segment::{Segment, SegmentKind};

fn text_node(text: &str) -> Node {
    Node::new(Segment::text(
        SegmentKind::Line,
        (0.0, 0.0, 10.0, 10.0),
        text,
        "F1",
        10.0,
    ))
}

fn exact(text: &str) -> Node {
    let mut n = text_node("");
    n.content = ContentMatch::Exact(text.to_string());
    n
}

fn regex_node(pattern: &str) -> Node {
    let mut n = text_node("");
    n.content = ContentMatch::Regex(regex::Regex::new(&format!("^(?:{pattern})$")).unwrap());
    n
}

fn right(from: NodeId, to: NodeId, weight: f64) -> Edge {
    Edge::new(from, to, Relation::RightOf, weight)
}

fn chain_doc(texts: &[&str]) -> (DocumentGraph, Vec<NodeId>) {
    let mut doc = DocumentGraph::new();
    let ids: Vec<NodeId> = texts.iter().map(|t| doc.add_node(text_node(t))).collect();
    for pair in ids.windows(2) {
        doc.add_edge(right(pair[0], pair[1], 2.0));
    }
    (doc, ids)
}

/// Every returned mapping must satisfy compare_nodes for each mapped pair
/// and compare_edges for each pattern edge and its image.
#[test]
fn test_soundness_of_returned_mappings() {
    let mut pattern = DocumentGraph::new();
    let pa = pattern.add_node(regex_node("[a-z]+"));
    let pb = pattern.add_node(regex_node("[0-9]+"));
    pattern.add_edge(right(pa, pb, 0.0));

    let (doc, _) = chain_doc(&["alpha", "12", "beta", "34", "x9"]);

    let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
    assert!(!sols.is_empty());
    for sol in &sols {
        // Injective.
        assert!(sol.mapping.iter().all_unique());
        for (i, docid) in sol.mapping.iter().enumerate() {
            assert!(compare_nodes(pattern.node(NodeId(i)), doc.node(*docid)));
        }
        for (_, pe) in pattern.edges() {
            let from = sol.mapping[pe.from.0];
            let to = sol.mapping[pe.to.0];
            let witness = doc.edges_from(from).iter().any(|eid| {
                let de = doc.edge(*eid);
                de.to == to && compare_edges(pe, &pattern, de, &doc)
            });
            assert!(witness, "pattern edge has no compatible image");
        }
    }
}

/// For small graphs, brute-force enumeration of all injective mappings
/// must yield exactly the same solution set as the optimized search.
#[test]
fn test_completeness_against_brute_force() {
    let mut pattern = DocumentGraph::new();
    let pa = pattern.add_node(text_node(""));
    let pb = pattern.add_node(text_node(""));
    let pc = pattern.add_node(text_node(""));
    pattern.add_edge(right(pa, pb, 0.0));
    pattern.add_edge(Edge::new(pb, pc, Relation::Below, 0.0));

    // A 2x2 grid of words plus one stray node.
    let mut doc = DocumentGraph::new();
    let ids: Vec<NodeId> = (0..5).map(|i| doc.add_node(text_node(&format!("w{i}")))).collect();
    doc.add_edge(right(ids[0], ids[1], 1.0));
    doc.add_edge(right(ids[2], ids[3], 1.0));
    doc.add_edge(Edge::new(ids[0], ids[2], Relation::Below, 1.0));
    doc.add_edge(Edge::new(ids[1], ids[3], Relation::Below, 1.0));
    doc.add_edge(right(ids[3], ids[4], 1.0));

    let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
    let mut found: Vec<Vec<NodeId>> = sols.into_iter().map(|s| s.mapping).collect();
    found.sort();

    let p = pattern.node_count();
    let mut expected: Vec<Vec<NodeId>> = Vec::new();
    for perm in (0..doc.node_count()).permutations(p) {
        let mapping: Vec<NodeId> = perm.into_iter().map(NodeId).collect();
        let nodes_ok = (0..p).all(|i| compare_nodes(pattern.node(NodeId(i)), doc.node(mapping[i])));
        let edges_ok = pattern.edges().all(|(_, pe)| {
            doc.edges_from(mapping[pe.from.0]).iter().any(|eid| {
                let de = doc.edge(*eid);
                de.to == mapping[pe.to.0] && compare_edges(pe, &pattern, de, &doc)
            })
        });
        if nodes_ok && edges_ok {
            expected.push(mapping);
        }
    }
    expected.sort();

    assert_eq!(found, expected);
}

#[test]
fn test_match_n_any_accepts_single_hop_and_chain() {
    let mut pattern = DocumentGraph::new();
    let pa = pattern.add_node(exact("start"));
    let pb = pattern.add_node(exact("end"));
    let mut e = right(pa, pb, 0.0);
    e.mode = MatchMode::NAny;
    pattern.add_edge(e);

    // Single hop.
    let (doc, ids) = chain_doc(&["start", "end"]);
    let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
    assert_eq!(sols.len(), 1);
    assert_eq!(sols[0].mapping, vec![ids[0], ids[1]]);

    // Three hops through unconstrained interiors.
    let (doc, ids) = chain_doc(&["start", "mid1", "mid2", "end"]);
    let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
    assert_eq!(sols.len(), 1);
    assert_eq!(sols[0].mapping, vec![ids[0], ids[3]]);
}

#[test]
fn test_match_n_til_first_stops_at_first_eligible() {
    let mut pattern = DocumentGraph::new();
    let pa = pattern.add_node(exact("x1"));
    let pb = pattern.add_node(regex_node("v[0-9]"));
    let mut e = right(pa, pb, 0.0);
    e.mode = MatchMode::NTilFirst;
    pattern.add_edge(e);

    let (doc, ids) = chain_doc(&["x1", "v1", "v2", "x2"]);
    let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
    assert_eq!(sols.len(), 1);
    assert_eq!(sols[0].mapping, vec![ids[0], ids[1]]);
}

#[test]
fn test_match_n_til_last_requires_extremal_target() {
    let mut pattern = DocumentGraph::new();
    let pa = pattern.add_node(exact("x1"));
    let pb = pattern.add_node(regex_node("v[0-9]"));
    let mut e = right(pa, pb, 0.0);
    e.mode = MatchMode::NTilLast;
    pattern.add_edge(e);

    let (doc, ids) = chain_doc(&["x1", "v1", "v2", "x2"]);
    let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
    assert_eq!(sols.len(), 1);
    assert_eq!(sols[0].mapping, vec![ids[0], ids[2]]);
}

#[test]
fn test_edge_constraints_prune_candidates() {
    let mut pattern = DocumentGraph::new();
    let pa = pattern.add_node(text_node(""));
    let pb = pattern.add_node(text_node(""));
    let mut e = right(pa, pb, 0.0);
    e.max_weight = Some(1.5);
    pattern.add_edge(e);

    let mut doc = DocumentGraph::new();
    let a = doc.add_node(text_node("a"));
    let b = doc.add_node(text_node("b"));
    let c = doc.add_node(text_node("c"));
    doc.add_edge(right(a, b, 1.0));
    doc.add_edge(right(b, c, 3.0));

    let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
    assert_eq!(sols.len(), 1);
    assert_eq!(sols[0].mapping, vec![a, b]);
}

#[test]
fn test_no_match_is_empty_not_error() {
    let mut pattern = DocumentGraph::new();
    let pa = pattern.add_node(exact("absent"));
    let pb = pattern.add_node(exact("also-absent"));
    pattern.add_edge(right(pa, pb, 0.0));

    let (doc, _) = chain_doc(&["alpha", "beta"]);
    let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
    assert!(sols.is_empty());
}
