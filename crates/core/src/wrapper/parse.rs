//! Wrapper XML parsing.
//!
//! A wrapper definition is an XML element tree rooted at `pdf-wrapper`
//! with `node` and `edge` children and nested `pdf-wrapper` sub-wrappers:
//!
//! ```xml
//! <pdf-wrapper granularity="block" output="person" area-based="true">
//!   <node id="label" content-match="exact" pattern="Name:"/>
//!   <node id="value" extract="true" tag="name" min-length="1"/>
//!   <edge from="label" to="value" relation="right-of" match-mode="one"/>
//! </pdf-wrapper>
//! ```
//!
//! Node attributes: `font-name`, `font-size`, `bold`, `italic` with their
//! `match-*` flags, `content-match` (none|exact|substring|regex) with
//! `pattern`, `min-length`/`max-length`, `extract`, `tag`, `disabled`.
//! Edge attributes: `from`, `to`, `relation` (above|below|left-of|
//! right-of), `match-mode` (one|any|til-first|til-last), `length-class`,
//! `min-weight`/`max-weight`, the alignment observation/require pairs,
//! `crosses-ruling`, `reading-order`, `superior` with their `match-*`
//! flags, `disabled`.

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::{ExtractError, Result};
use crate::graph::{
    ContentMatch, DocumentGraph, Edge, LengthClass, MatchMode, Node, NodeId, Relation,
};
use crate::segment::{Segment, SegmentKind};

use super::{Granularity, Wrapper};

/// Parses a wrapper definition document.
pub fn parse_wrapper(xml: &str) -> Result<Wrapper> {
    let doc =
        roxmltree::Document::parse(xml).map_err(|e| ExtractError::WrapperXml(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "pdf-wrapper" {
        return Err(ExtractError::WrapperXml(format!(
            "expected pdf-wrapper root element, got {}",
            root.tag_name().name()
        )));
    }
    parse_element(root)
}

fn parse_element(el: roxmltree::Node) -> Result<Wrapper> {
    let granularity = match el.attribute("granularity").unwrap_or("block") {
        "raw-line" => Granularity::RawLine,
        "line" => Granularity::Line,
        "block" => Granularity::Block,
        other => {
            return Err(ExtractError::WrapperXml(format!(
                "unknown granularity: {other}"
            )));
        }
    };

    let mut graph = DocumentGraph::new();
    let mut ids: FxHashMap<String, NodeId> = FxHashMap::default();
    let mut children = Vec::new();

    for child in el.children().filter(|c| c.is_element()) {
        match child.tag_name().name() {
            "node" => {
                let id = child
                    .attribute("id")
                    .ok_or_else(|| ExtractError::WrapperXml("node without id".to_string()))?;
                if ids.contains_key(id) {
                    return Err(ExtractError::WrapperXml(format!("duplicate node id: {id}")));
                }
                let node = parse_node(child)?;
                let nid = graph.add_node(node);
                ids.insert(id.to_string(), nid);
            }
            "edge" => {}
            "pdf-wrapper" => children.push(parse_element(child)?),
            other => {
                return Err(ExtractError::WrapperXml(format!(
                    "unexpected element: {other}"
                )));
            }
        }
    }

    // Edges in a second pass so forward references work.
    for child in el.children().filter(|c| c.is_element()) {
        if child.tag_name().name() == "edge" {
            let edge = parse_edge(child, &ids)?;
            graph.add_edge(edge);
        }
    }

    let mut wrapper = Wrapper::new(el.attribute("output").unwrap_or("wrapper"), graph);
    wrapper.granularity = granularity;
    wrapper.process_spaces = bool_attr(el, "process-spaces", false)?;
    wrapper.process_ruling_lines = bool_attr(el, "process-ruling-lines", true)?;
    wrapper.area_based = bool_attr(el, "area-based", false)?;
    wrapper.whole_page = bool_attr(el, "whole-page", false)?;
    wrapper.children = children;
    Ok(wrapper)
}

fn parse_node(el: roxmltree::Node) -> Result<Node> {
    let mut seg = Segment::new(SegmentKind::Line, (0.0, 0.0, 0.0, 0.0));
    seg.text = Some(String::new());
    seg.font_name = el.attribute("font-name").map(str::to_string);
    seg.font_size = float_opt(el, "font-size")?;
    seg.bold = bool_attr(el, "bold", false)?;
    seg.italic = bool_attr(el, "italic", false)?;

    let mut node = Node::new(seg);
    node.match_font_name = bool_attr(el, "match-font-name", false)?;
    node.match_font_size = bool_attr(el, "match-font-size", false)?;
    node.match_bold = bool_attr(el, "match-bold", false)?;
    node.match_italic = bool_attr(el, "match-italic", false)?;
    node.min_length = usize_opt(el, "min-length")?;
    node.max_length = usize_opt(el, "max-length")?;
    node.extract = bool_attr(el, "extract", false)?;
    node.tag = el.attribute("tag").unwrap_or("").to_string();
    node.disabled = bool_attr(el, "disabled", false)?;

    let pattern = el.attribute("pattern").unwrap_or("");
    node.content = match el.attribute("content-match").unwrap_or("none") {
        "none" => ContentMatch::None,
        "exact" => ContentMatch::Exact(pattern.to_string()),
        "substring" => ContentMatch::Substring(pattern.to_string()),
        "regex" => {
            // Anchored so the constraint is a full match of the trimmed text.
            let re = Regex::new(&format!("^(?:{pattern})$"))
                .map_err(|e| ExtractError::WrapperXml(format!("bad pattern regex: {e}")))?;
            ContentMatch::Regex(re)
        }
        other => {
            return Err(ExtractError::WrapperXml(format!(
                "unknown content-match mode: {other}"
            )));
        }
    };

    Ok(node)
}

fn parse_edge(el: roxmltree::Node, ids: &FxHashMap<String, NodeId>) -> Result<Edge> {
    let resolve = |attr: &str| -> Result<NodeId> {
        let name = el
            .attribute(attr)
            .ok_or_else(|| ExtractError::WrapperXml(format!("edge without {attr}")))?;
        ids.get(name)
            .copied()
            .ok_or_else(|| ExtractError::WrapperXml(format!("edge references unknown node: {name}")))
    };
    let from = resolve("from")?;
    let to = resolve("to")?;

    let relation = match el.attribute("relation").unwrap_or("below") {
        "above" => Relation::Above,
        "below" => Relation::Below,
        "left-of" => Relation::LeftOf,
        "right-of" => Relation::RightOf,
        other => {
            return Err(ExtractError::WrapperXml(format!(
                "unknown relation: {other}"
            )));
        }
    };

    let mut edge = Edge::new(from, to, relation, float_opt(el, "weight")?.unwrap_or(0.0));
    edge.length_class = match el.attribute("length-class") {
        None => LengthClass::Unspecified,
        Some("block") => LengthClass::Block,
        Some("column") => LengthClass::Column,
        Some("greater") => LengthClass::Greater,
        Some(other) => {
            return Err(ExtractError::WrapperXml(format!(
                "unknown length-class: {other}"
            )));
        }
    };
    edge.min_weight = float_opt(el, "min-weight")?;
    edge.max_weight = float_opt(el, "max-weight")?;

    edge.align_top_left = bool_attr(el, "align-top-left", false)?;
    edge.require_align_top_left = bool_attr(el, "require-align-top-left", false)?;
    edge.align_centre = bool_attr(el, "align-centre", false)?;
    edge.require_align_centre = bool_attr(el, "require-align-centre", false)?;
    edge.align_bottom_right = bool_attr(el, "align-bottom-right", false)?;
    edge.require_align_bottom_right = bool_attr(el, "require-align-bottom-right", false)?;

    edge.crosses_ruling = bool_attr(el, "crosses-ruling", false)?;
    edge.match_crosses_ruling = bool_attr(el, "match-crosses-ruling", false)?;
    edge.reading_order = int_attr(el, "reading-order", 1)? as i8;
    edge.match_reading_order = bool_attr(el, "match-reading-order", false)?;
    edge.superior = bool_attr(el, "superior", true)?;
    edge.match_superior = bool_attr(el, "match-superior", false)?;

    edge.mode = match el.attribute("match-mode").unwrap_or("one") {
        "one" => MatchMode::One,
        "any" => MatchMode::NAny,
        "til-first" => MatchMode::NTilFirst,
        "til-last" => MatchMode::NTilLast,
        other => {
            return Err(ExtractError::WrapperXml(format!(
                "unknown match-mode: {other}"
            )));
        }
    };
    edge.disabled = bool_attr(el, "disabled", false)?;

    Ok(edge)
}

fn bool_attr(el: roxmltree::Node, name: &str, default: bool) -> Result<bool> {
    match el.attribute(name) {
        None => Ok(default),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(ExtractError::WrapperXml(format!(
            "attribute {name} expects a boolean, got {other}"
        ))),
    }
}

fn float_opt(el: roxmltree::Node, name: &str) -> Result<Option<f64>> {
    match el.attribute(name) {
        None => Ok(None),
        Some(v) => v.parse::<f64>().map(Some).map_err(|_| {
            ExtractError::WrapperXml(format!("attribute {name} expects a number, got {v}"))
        }),
    }
}

fn usize_opt(el: roxmltree::Node, name: &str) -> Result<Option<usize>> {
    match el.attribute(name) {
        None => Ok(None),
        Some(v) => v.parse::<usize>().map(Some).map_err(|_| {
            ExtractError::WrapperXml(format!("attribute {name} expects an integer, got {v}"))
        }),
    }
}

fn int_attr(el: roxmltree::Node, name: &str, default: i32) -> Result<i32> {
    match el.attribute(name) {
        None => Ok(default),
        Some(v) => v.parse::<i32>().map_err(|_| {
            ExtractError::WrapperXml(format!("attribute {name} expects an integer, got {v}"))
        }),
    }
}
