//! Arc-consistency refinement of the correspondence matrix.
//!
//! Every surviving cell must be supported by every pattern neighbour: for
//! a single-match edge some compatible document edge must lead to a
//! surviving counterpart; for a match-N edge a compatible chain of
//! document edges must exist. Refinement repeats until it stabilizes; an
//! empty row makes the whole matrix unsatisfiable.

use crate::graph::{DocumentGraph, Edge, MatchMode, NodeId};

use super::compare::{compare_edges, compare_nodes};
use super::matrix::Matrix;

/// Refines the matrix in place. Returns false if any pattern row becomes
/// entirely false (global failure).
pub(crate) fn refine(pattern: &DocumentGraph, doc: &DocumentGraph, m: &mut Matrix) -> bool {
    loop {
        let mut changed = false;

        for i in 0..pattern.node_count() {
            for j in 0..doc.node_count() {
                if !m.get(i, j) {
                    continue;
                }
                if !supported(pattern, doc, m, NodeId(i), NodeId(j)) {
                    m.set(i, j, false);
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    (0..pattern.node_count()).all(|i| m.row_any(i))
}

/// Checks that the tentative correspondence `pattern i -> doc j` is
/// consistent with every edge incident to the pattern node.
fn supported(
    pattern: &DocumentGraph,
    doc: &DocumentGraph,
    m: &Matrix,
    i: NodeId,
    j: NodeId,
) -> bool {
    for eid in pattern.edges_from(i) {
        let pe = pattern.edge(*eid);
        let neighbour = pe.to;
        let ok = if pe.mode.is_multi() {
            (0..doc.node_count()).any(|dn| {
                m.get(neighbour.0, dn)
                    && dn != j.0
                    && match_n_path(pattern, doc, pe, j, NodeId(dn))
            })
        } else {
            doc.edges_from(j).iter().any(|de| {
                let d = doc.edge(*de);
                compare_edges(pe, pattern, d, doc) && m.get(neighbour.0, d.to.0)
            })
        };
        if !ok {
            return false;
        }
    }

    for eid in pattern.edges_to(i) {
        let pe = pattern.edge(*eid);
        let neighbour = pe.from;
        let ok = if pe.mode.is_multi() {
            (0..doc.node_count()).any(|dn| {
                m.get(neighbour.0, dn)
                    && dn != j.0
                    && match_n_path(pattern, doc, pe, NodeId(dn), j)
            })
        } else {
            doc.edges_to(j).iter().any(|de| {
                let d = doc.edge(*de);
                compare_edges(pe, pattern, d, doc) && m.get(neighbour.0, d.from.0)
            })
        };
        if !ok {
            return false;
        }
    }

    true
}

/// Decides whether the match-N pattern edge is realizable from `doc_from`
/// to `doc_to` through a chain of compatible document edges.
///
/// The walk moves forward only; hops that still match the pattern's source
/// node keep the walk in its source run without terminating it. Interior
/// nodes never revisit `doc_from` or `doc_to`. `TilFirst` requires the
/// target to be the first eligible node after the walk has switched away
/// from the source; `TilLast` requires both endpoints to be extremal in
/// the chain.
pub(crate) fn match_n_path(
    pattern: &DocumentGraph,
    doc: &DocumentGraph,
    pe: &Edge,
    doc_from: NodeId,
    doc_to: NodeId,
) -> bool {
    if doc_from == doc_to {
        return false;
    }
    let ins_from = pattern.node(pe.from);
    let ins_to = pattern.node(pe.to);

    let mut visited = vec![false; doc.node_count()];
    visited[doc_from.0] = true;

    if !walk(pattern, doc, pe, doc_to, doc_from, false, &mut visited) {
        return false;
    }

    if pe.mode == MatchMode::NTilLast {
        // The matched endpoints must be the extremal nodes of the chain:
        // nothing past doc_to may still match the target pattern, nothing
        // before doc_from may still match the source pattern.
        if reaches_match(pattern, doc, pe, doc_to, true, ins_to) {
            return false;
        }
        if reaches_match(pattern, doc, pe, doc_from, false, ins_from) {
            return false;
        }
    }

    true
}

fn walk(
    pattern: &DocumentGraph,
    doc: &DocumentGraph,
    pe: &Edge,
    doc_to: NodeId,
    current: NodeId,
    switched: bool,
    visited: &mut Vec<bool>,
) -> bool {
    let ins_from = pattern.node(pe.from);
    let ins_to = pattern.node(pe.to);

    for de in doc.edges_from(current) {
        let d = doc.edge(*de);
        if !compare_edges(pe, pattern, d, doc) {
            continue;
        }
        let t = d.to;
        if visited[t.0] {
            continue;
        }
        if t == doc_to {
            return true;
        }

        let t_node = doc.node(t);
        let matches_source = compare_nodes(ins_from, t_node);
        let now_switched = switched || !matches_source;

        if pe.mode == MatchMode::NTilFirst
            && now_switched
            && (compare_nodes(ins_to, t_node) || matches_source)
        {
            // An eligible node before the target, or a relapse into the
            // source pattern, disqualifies this branch.
            continue;
        }

        visited[t.0] = true;
        if walk(pattern, doc, pe, doc_to, t, now_switched, visited) {
            return true;
        }
        visited[t.0] = false;
    }

    false
}

/// Follows compatible edges transitively (forward or backward) from
/// `start` and reports whether any reached node matches the pattern node.
fn reaches_match(
    pattern: &DocumentGraph,
    doc: &DocumentGraph,
    pe: &Edge,
    start: NodeId,
    forward: bool,
    target: &crate::graph::Node,
) -> bool {
    let mut seen = vec![false; doc.node_count()];
    seen[start.0] = true;
    let mut stack = vec![start];
    while let Some(cur) = stack.pop() {
        let edges = if forward {
            doc.edges_from(cur)
        } else {
            doc.edges_to(cur)
        };
        for de in edges {
            let d = doc.edge(*de);
            if !compare_edges(pe, pattern, d, doc) {
                continue;
            }
            let next = if forward { d.to } else { d.from };
            if seen[next.0] {
                continue;
            }
            seen[next.0] = true;
            if compare_nodes(target, doc.node(next)) {
                return true;
            }
            stack.push(next);
        }
    }
    false
}
