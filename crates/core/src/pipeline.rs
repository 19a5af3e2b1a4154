//! Page processing pipeline.
//!
//! The segmentation driver: chooses the wrapper's granularity, prepares
//! segments (raw lines, merged lines or clustered blocks), builds the
//! document graph and applies the wrapper. Pages are independent units of
//! work and are processed in parallel; the backtracking search itself
//! stays sequential.

use rayon::prelude::*;
use tracing::debug;

use crate::cluster::{BlockPolicy, SegParams, cluster_graph};
use crate::error::Result;
use crate::facade::{DocumentInput, PageInput};
use crate::geom::{HasBBox, Rect, hdistance, voverlap};
use crate::graph::{DocumentGraph, GraphParams, build_document_graph};
use crate::matcher::SearchBudget;
use crate::segment::{Segment, SegmentKind};
use crate::wrapper::{Granularity, Instance, Wrapper, apply_wrapper};

/// Options for a document run.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// 1-indexed page numbers to process. None means all pages.
    pub pages: Option<Vec<usize>>,
    pub seg_params: SegParams,
    pub graph_params: GraphParams,
    pub budget: SearchBudget,
}

/// All instances extracted from one page.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub page: usize,
    pub bbox: Rect,
    pub instances: Vec<Instance>,
}

/// Merges raw text segments into logical lines.
///
/// Segments are taken in reading order; a segment joins the current line
/// when it overlaps it vertically and the horizontal gap stays within the
/// merge margin for its font size.
pub fn merge_lines(segments: &[Segment], params: &SegParams) -> Vec<Segment> {
    let mut sorted: Vec<&Segment> = segments.iter().filter(|s| s.is_text()).collect();
    sorted.sort_by(|a, b| {
        b.y1.partial_cmp(&a.y1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<Segment> = Vec::new();
    for seg in sorted {
        let size = if seg.size() > 0.0 { seg.size() } else { 10.0 };
        let joined = lines.iter_mut().find(|line| {
            let min_height = line.height().min(seg.height());
            voverlap(line.bbox(), seg.bbox()) > params.line_overlap * min_height
                && hdistance(line.bbox(), seg.bbox()) <= params.merge_gap * size
        });
        match joined {
            Some(line) => {
                let gap = hdistance(line.bbox(), seg.bbox());
                let mut text = line.text.take().unwrap_or_default();
                if gap > 0.25 * size && !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(seg.text_str());
                line.text = Some(text);
                line.grow(seg);
            }
            None => {
                let mut line = seg.clone();
                line.kind = SegmentKind::MergedLine;
                lines.push(line);
            }
        }
    }
    lines
}

/// Clusters line segments into block segments.
pub fn build_blocks(
    lines: &[Segment],
    rulings: &[Segment],
    seg_params: &SegParams,
    graph_params: &GraphParams,
) -> Vec<Segment> {
    let mut input: Vec<Segment> = lines.to_vec();
    input.extend_from_slice(rulings);
    let graph = build_document_graph(&input, graph_params);
    let policy = BlockPolicy::new(seg_params.clone());
    let clusters = cluster_graph(&graph, &policy, seg_params);

    clusters
        .iter()
        .map(|cluster| {
            let mut seg = Segment::new(SegmentKind::Block, cluster.bbox());
            seg.text = Some(cluster.text(&graph));
            seg.font_size = (cluster.font_size() > 0.0).then_some(cluster.font_size());
            // Typography of the first member stands for the block.
            if let Some(first) = cluster.items().first() {
                let member = &graph.node(*first).seg;
                seg.font_name = member.font_name.clone();
                seg.bold = member.bold;
                seg.italic = member.italic;
            }
            seg
        })
        .collect()
}

/// Prepares a page's segments at the wrapper's granularity and builds the
/// document graph.
pub fn build_page_graph(
    page: &PageInput,
    wrapper: &Wrapper,
    opts: &ExtractOptions,
) -> DocumentGraph {
    let page = page.clone().normalized();
    let mut segments: Vec<Segment> = page.segments;

    if !wrapper.process_spaces {
        segments.retain(|s| !s.is_text() || !s.text_str().trim().is_empty());
    }
    if !wrapper.process_ruling_lines {
        segments.retain(|s| s.kind != SegmentKind::RulingLine);
    }

    let rulings: Vec<Segment> = segments
        .iter()
        .filter(|s| s.kind == SegmentKind::RulingLine)
        .cloned()
        .collect();

    let prepared: Vec<Segment> = match wrapper.granularity {
        Granularity::RawLine => segments,
        Granularity::Line => {
            let mut lines = merge_lines(&segments, &opts.seg_params);
            lines.extend(rulings);
            lines
        }
        Granularity::Block => {
            let lines = merge_lines(&segments, &opts.seg_params);
            let mut blocks = build_blocks(&lines, &rulings, &opts.seg_params, &opts.graph_params);
            blocks.extend(rulings);
            blocks
        }
    };

    build_document_graph(&prepared, &opts.graph_params)
}

/// Processes one page: segmentation, graph construction and matching.
pub fn process_page(
    page: &PageInput,
    wrapper: &Wrapper,
    opts: &ExtractOptions,
) -> Result<PageResult> {
    let graph = build_page_graph(page, wrapper, opts);
    debug!(
        page = page.page,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "page graph built"
    );
    let instances = apply_wrapper(wrapper, &graph, &opts.budget)?;
    Ok(PageResult {
        page: page.page,
        bbox: page.bbox,
        instances,
    })
}

/// Processes a whole segment document, pages in parallel.
pub fn process_document(
    input: &DocumentInput,
    wrapper: &Wrapper,
    opts: &ExtractOptions,
) -> Result<Vec<PageResult>> {
    let selected: Vec<&PageInput> = input
        .pages
        .iter()
        .filter(|p| {
            opts.pages
                .as_ref()
                .is_none_or(|wanted| wanted.contains(&p.page))
        })
        .collect();

    selected
        .par_iter()
        .map(|page| process_page(page, wrapper, opts))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(bbox: Rect, text: &str) -> Segment {
        Segment::text(SegmentKind::Fragment, bbox, text, "F1", 10.0)
    }

    #[test]
    fn test_merge_lines_joins_adjacent_fragments() {
        let segs = vec![
            frag((0.0, 0.0, 30.0, 10.0), "Name:"),
            frag((34.0, 0.0, 60.0, 10.0), "Alice"),
            frag((0.0, 20.0, 30.0, 30.0), "Header"),
        ];
        let lines = merge_lines(&segs, &SegParams::default());
        assert_eq!(lines.len(), 2);
        // Reading order: the upper line first.
        assert_eq!(lines[0].text_str(), "Header");
        assert_eq!(lines[1].text_str(), "Name: Alice");
        assert_eq!(lines[1].bbox(), (0.0, 0.0, 60.0, 10.0));
        assert_eq!(lines[1].kind, SegmentKind::MergedLine);
    }

    #[test]
    fn test_merge_lines_respects_gap_limit() {
        let segs = vec![
            frag((0.0, 0.0, 30.0, 10.0), "left"),
            frag((80.0, 0.0, 110.0, 10.0), "right"),
        ];
        let lines = merge_lines(&segs, &SegParams::default());
        assert_eq!(lines.len(), 2);
    }
}
