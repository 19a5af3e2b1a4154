//! Node and edge compatibility predicates.

use crate::graph::{ContentMatch, DocumentGraph, Edge, LengthClass, Node};
use crate::segment::font_sizes_equal;

/// Decides whether a document node may stand in for a pattern node.
///
/// Both must be text segments; every typographic attribute the pattern
/// flags as must-match has to be reproduced, the content constraint is
/// evaluated per mode against the candidate's trimmed text, and the length
/// bounds are inclusive.
pub fn compare_nodes(pattern: &Node, candidate: &Node) -> bool {
    if !pattern.is_text() || !candidate.is_text() {
        return false;
    }
    if pattern.match_font_name && pattern.seg.font_name != candidate.seg.font_name {
        return false;
    }
    if pattern.match_font_size
        && !font_sizes_equal(pattern.seg.font_size, candidate.seg.font_size)
    {
        return false;
    }
    if pattern.match_bold && pattern.seg.bold != candidate.seg.bold {
        return false;
    }
    if pattern.match_italic && pattern.seg.italic != candidate.seg.italic {
        return false;
    }

    let text = candidate.trimmed_text();
    match &pattern.content {
        ContentMatch::None => {}
        ContentMatch::Exact(s) => {
            if text != s.trim() {
                return false;
            }
        }
        ContentMatch::Substring(s) => {
            if !text.contains(s.as_str()) {
                return false;
            }
        }
        ContentMatch::Regex(re) => {
            if !re.is_match(text) {
                return false;
            }
        }
    }

    let len = text.chars().count();
    if let Some(min) = pattern.min_length {
        if len < min {
            return false;
        }
    }
    if let Some(max) = pattern.max_length {
        if len > max {
            return false;
        }
    }
    true
}

/// Decides whether a document edge may realize a pattern edge.
///
/// Endpoint text-ness and relation labels must agree; the remaining
/// observations only constrain the candidate when the pattern explicitly
/// requests that check.
pub fn compare_edges(
    pattern: &Edge,
    pattern_graph: &DocumentGraph,
    candidate: &Edge,
    candidate_graph: &DocumentGraph,
) -> bool {
    let p_from = pattern_graph.node(pattern.from).is_text();
    let p_to = pattern_graph.node(pattern.to).is_text();
    let c_from = candidate_graph.node(candidate.from).is_text();
    let c_to = candidate_graph.node(candidate.to).is_text();
    if p_from != c_from || p_to != c_to {
        return false;
    }

    if pattern.relation != candidate.relation {
        return false;
    }

    if pattern.length_class != LengthClass::Unspecified
        && pattern.length_class != candidate.length_class
    {
        return false;
    }

    if let Some(min) = pattern.min_weight {
        if candidate.weight < min {
            return false;
        }
    }
    if let Some(max) = pattern.max_weight {
        if candidate.weight > max {
            return false;
        }
    }

    if pattern.require_align_top_left && pattern.align_top_left != candidate.align_top_left {
        return false;
    }
    if pattern.require_align_centre && pattern.align_centre != candidate.align_centre {
        return false;
    }
    if pattern.require_align_bottom_right
        && pattern.align_bottom_right != candidate.align_bottom_right
    {
        return false;
    }

    if pattern.match_crosses_ruling && pattern.crosses_ruling != candidate.crosses_ruling {
        return false;
    }
    if pattern.match_reading_order && pattern.reading_order != candidate.reading_order {
        return false;
    }
    if pattern.match_superior && pattern.superior != candidate.superior {
        return false;
    }

    true
}
