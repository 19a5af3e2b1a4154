//! Ullmann backtracking search.
//!
//! Classic depth-first assignment over pattern rows with per-depth saved
//! matrices, a tried-column bitmap and a backtrack stack. Enumerates every
//! isomorphism witness, not just the first. Worst case is exponential in
//! the pattern size, so every invocation carries an explicit budget.

use tracing::{debug, trace};

use crate::error::{ExtractError, Result};
use crate::graph::{DocumentGraph, NodeId};

use super::compare::compare_nodes;
use super::matrix::Matrix;
use super::refine::refine;

/// Cost bound for one search invocation, counted in committed column
/// assignments. Exhaustion is a recoverable error, not a silent truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    pub max_steps: usize,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self { max_steps: 200_000 }
    }
}

/// One complete embedding: pattern node index -> document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSolution {
    pub mapping: Vec<NodeId>,
}

/// Builds the initial correspondence matrix from node compatibility.
fn initial_matrix(pattern: &DocumentGraph, doc: &DocumentGraph) -> Matrix {
    let mut m = Matrix::new(pattern.node_count(), doc.node_count());
    for (i, pnode) in pattern.nodes() {
        for (j, dnode) in doc.nodes() {
            if pnode.is_text() && dnode.is_text() && compare_nodes(pnode, dnode) {
                m.set(i.0, j.0, true);
            }
        }
    }
    m
}

/// Enumerates every embedding of the pattern graph into the document graph
/// consistent with all node and edge constraints.
///
/// An unsatisfiable matrix is "no matches", not an error; only budget
/// exhaustion fails.
pub fn find_embeddings(
    pattern: &DocumentGraph,
    doc: &DocumentGraph,
    budget: &SearchBudget,
) -> Result<Vec<MatchSolution>> {
    let p = pattern.node_count();
    let d = doc.node_count();
    debug!(pattern_nodes = p, doc_nodes = d, "starting embedding search");

    if p == 0 || d == 0 {
        return Ok(Vec::new());
    }

    let mut m = initial_matrix(pattern, doc);
    if !refine(pattern, doc, &mut m) {
        debug!("initial refinement unsatisfiable");
        return Ok(Vec::new());
    }

    let mut solutions: Vec<MatchSolution> = Vec::new();
    let mut steps = 0usize;

    // Per-depth saved matrices, tried-column bitmap and chosen columns.
    let mut saved: Vec<Matrix> = vec![Matrix::new(0, 0); p];
    let mut tried = vec![false; d];
    let mut chosen: Vec<Option<usize>> = vec![None; p];
    let mut scan: Vec<usize> = vec![0; p];

    let mut depth = 0usize;
    saved[0] = m.clone();

    loop {
        // Next untried candidate column in this depth's saved matrix.
        let mut candidate = None;
        while scan[depth] < d {
            let k = scan[depth];
            if !tried[k] && saved[depth].get(depth, k) {
                candidate = Some(k);
                break;
            }
            scan[depth] += 1;
        }

        match candidate {
            Some(k) => {
                steps += 1;
                if steps > budget.max_steps {
                    debug!(steps, "search budget exhausted");
                    return Err(ExtractError::BudgetExceeded { steps });
                }

                m = saved[depth].clone();
                m.clear_row_except(depth, k);
                tried[k] = true;
                chosen[depth] = Some(k);

                if refine(pattern, doc, &mut m) {
                    if depth + 1 == p {
                        let mapping = (0..p)
                            .map(|row| NodeId(m.single_col(row).expect("committed row")))
                            .collect();
                        trace!(?mapping, "embedding found");
                        solutions.push(MatchSolution { mapping });
                        tried[k] = false;
                        chosen[depth] = None;
                        scan[depth] += 1;
                    } else {
                        depth += 1;
                        saved[depth] = m.clone();
                        scan[depth] = 0;
                    }
                } else {
                    tried[k] = false;
                    chosen[depth] = None;
                    scan[depth] += 1;
                }
            }
            None => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                if let Some(k) = chosen[depth].take() {
                    tried[k] = false;
                }
                scan[depth] += 1;
            }
        }
    }

    debug!(found = solutions.len(), steps, "embedding search finished");
    Ok(solutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ContentMatch, Edge, Node, Relation};
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

    fn exact(text: &str) -> Node {
        let mut n = text_node("");
        n.content = ContentMatch::Exact(text.to_string());
        n
    }

    #[test]
    fn test_single_edge_pattern_matches_once() {
        let mut pattern = DocumentGraph::new();
        let pa = pattern.add_node(exact("Name:"));
        let pb = pattern.add_node(exact("Alice"));
        pattern.add_edge(Edge::new(pa, pb, Relation::RightOf, 0.0));

        let mut doc = DocumentGraph::new();
        let da = doc.add_node(text_node("Name:"));
        let db = doc.add_node(text_node("Alice"));
        let dc = doc.add_node(text_node("Bob"));
        doc.add_edge(Edge::new(da, db, Relation::RightOf, 2.0));
        doc.add_edge(Edge::new(db, dc, Relation::RightOf, 2.0));

        let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
        assert_eq!(sols.len(), 1);
        assert_eq!(sols[0].mapping, vec![da, db]);
    }

    #[test]
    fn test_unsatisfiable_matrix_is_empty_result() {
        let mut pattern = DocumentGraph::new();
        pattern.add_node(exact("missing"));

        let mut doc = DocumentGraph::new();
        doc.add_node(text_node("present"));

        let sols = find_embeddings(&pattern, &doc, &SearchBudget::default()).unwrap();
        assert!(sols.is_empty());
    }

    #[test]
    fn test_budget_exhaustion_is_an_error() {
        let mut pattern = DocumentGraph::new();
        let pa = pattern.add_node(text_node(""));
        let pb = pattern.add_node(text_node(""));
        pattern.add_edge(Edge::new(pa, pb, Relation::RightOf, 0.0));

        let mut doc = DocumentGraph::new();
        let mut prev = doc.add_node(text_node("w0"));
        for i in 1..8 {
            let next = doc.add_node(text_node(&format!("w{i}")));
            doc.add_edge(Edge::new(prev, next, Relation::RightOf, 1.0));
            prev = next;
        }

        let result = find_embeddings(&pattern, &doc, &SearchBudget { max_steps: 2 });
        assert!(matches!(
            result,
            Err(ExtractError::BudgetExceeded { .. })
        ));
    }
}
