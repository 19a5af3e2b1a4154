//! Adjacency graph builder.
//!
//! Derives the weighted, directed neighbour edges of a page's document
//! graph from segment geometry: for every text segment the nearest
//! neighbour below and to the right, with alignment, ruling-line crossing
//! and reading-order observations recorded on each edge. Symmetric inverse
//! edges are emitted so wrappers can be authored in either direction.

use crate::geom::{EPSILON, HasBBox, Plane, Rect, hoverlap, rects_intersect, voverlap};
use crate::segment::{Segment, SegmentKind};

use super::document::{DocumentGraph, NodeId};
use super::edge::{Edge, LengthClass, Relation};
use super::node::Node;

/// Parameters controlling edge derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphParams {
    /// Absolute tolerance for alignment observations.
    pub align_tolerance: f64,

    /// Gap threshold for the Block length class, relative to the smaller
    /// font size of the two endpoints.
    pub block_gap_factor: f64,

    /// Gap threshold for the Column length class, relative to the smaller
    /// font size of the two endpoints.
    pub column_gap_factor: f64,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            align_tolerance: 2.0,
            block_gap_factor: 1.4,
            column_gap_factor: 3.0,
        }
    }
}

struct SegRef {
    bbox: Rect,
}

impl HasBBox for SegRef {
    fn x0(&self) -> f64 {
        self.bbox.0
    }
    fn y0(&self) -> f64 {
        self.bbox.1
    }
    fn x1(&self) -> f64 {
        self.bbox.2
    }
    fn y1(&self) -> f64 {
        self.bbox.3
    }
}

fn finite_bbox(seg: &Segment) -> bool {
    seg.x0.is_finite() && seg.y0.is_finite() && seg.x1.is_finite() && seg.y1.is_finite()
}

fn length_class(gap: f64, a: &Segment, b: &Segment, params: &GraphParams) -> LengthClass {
    let size = match (a.font_size, b.font_size) {
        (Some(x), Some(y)) => x.min(y),
        (Some(x), None) | (None, Some(x)) => x,
        (None, None) => 10.0,
    };
    if gap <= params.block_gap_factor * size {
        LengthClass::Block
    } else if gap <= params.column_gap_factor * size {
        LengthClass::Column
    } else {
        LengthClass::Greater
    }
}

/// Builds a document graph from page segments.
///
/// Text segments become nodes in input order; ruling lines contribute only
/// to the crosses-ruling observation. Segments with a non-finite bounding
/// box are skipped so garbage never enters the node arena.
pub fn build_document_graph(segments: &[Segment], params: &GraphParams) -> DocumentGraph {
    let mut graph = DocumentGraph::new();
    let mut plane: Plane<SegRef> = Plane::new();
    let mut bboxes: Vec<Rect> = Vec::new();

    for seg in segments {
        if !seg.is_text() || !finite_bbox(seg) {
            continue;
        }
        let mut seg = seg.clone();
        seg.normalize();
        let bbox = seg.bbox();
        graph.add_node(Node::new(seg));
        plane.add(SegRef { bbox });
        bboxes.push(bbox);
    }

    let rulings: Vec<Rect> = segments
        .iter()
        .filter(|s| matches!(s.kind, SegmentKind::RulingLine) && finite_bbox(s))
        .map(|s| s.bbox())
        .collect();

    if graph.node_count() < 2 {
        return graph;
    }

    let page_bound = crate::geom::get_bound(bboxes.iter().copied());

    for i in 0..graph.node_count() {
        let bbox = bboxes[i];

        // Nearest neighbour below: horizontal overlap, smallest gap.
        let band = (bbox.0, page_bound.1 - 1.0, bbox.2, bbox.1 + EPSILON);
        let mut below: Option<(usize, f64)> = None;
        for (j, _) in plane.find_with_indices(band) {
            if j == i {
                continue;
            }
            let other = bboxes[j];
            if other.3 > bbox.1 + EPSILON || hoverlap(bbox, other) <= 0.0 {
                continue;
            }
            let gap = (bbox.1 - other.3).max(0.0);
            if below.is_none_or(|(_, g)| gap < g) {
                below = Some((j, gap));
            }
        }
        if let Some((j, gap)) = below {
            add_vertical_pair(&mut graph, &rulings, params, NodeId(i), NodeId(j), gap);
        }

        // Nearest neighbour to the right: vertical overlap, smallest gap.
        let band = (bbox.2 - EPSILON, bbox.1, page_bound.2 + 1.0, bbox.3);
        let mut right: Option<(usize, f64)> = None;
        for (j, _) in plane.find_with_indices(band) {
            if j == i {
                continue;
            }
            let other = bboxes[j];
            if other.0 < bbox.2 - EPSILON || voverlap(bbox, other) <= 0.0 {
                continue;
            }
            let gap = (other.0 - bbox.2).max(0.0);
            if right.is_none_or(|(_, g)| gap < g) {
                right = Some((j, gap));
            }
        }
        if let Some((j, gap)) = right {
            add_horizontal_pair(&mut graph, &rulings, params, NodeId(i), NodeId(j), gap);
        }
    }

    graph
}

fn crosses_any_ruling(gap_rect: Rect, rulings: &[Rect]) -> bool {
    rulings.iter().any(|r| rects_intersect(*r, gap_rect))
}

fn add_vertical_pair(
    graph: &mut DocumentGraph,
    rulings: &[Rect],
    params: &GraphParams,
    upper: NodeId,
    lower: NodeId,
    gap: f64,
) {
    let a = graph.node(upper).seg.clone();
    let b = graph.node(lower).seg.clone();
    let tol = params.align_tolerance;

    let gap_rect = (a.x0.max(b.x0), b.y1, a.x1.min(b.x1), a.y0);
    let crosses = crosses_any_ruling(gap_rect, rulings);

    let mut edge = Edge::new(upper, lower, Relation::Below, gap);
    edge.length_class = length_class(gap, &a, &b, params);
    edge.align_top_left = (a.x0 - b.x0).abs() <= tol;
    edge.align_centre = ((a.x0 + a.x1) / 2.0 - (b.x0 + b.x1) / 2.0).abs() <= tol;
    edge.align_bottom_right = (a.x1 - b.x1).abs() <= tol;
    edge.crosses_ruling = crosses;
    edge.reading_order = 1;
    edge.superior = true;

    let mut inverse = edge.clone();
    inverse.from = lower;
    inverse.to = upper;
    inverse.relation = Relation::Above;
    inverse.reading_order = -1;
    inverse.superior = false;

    graph.add_edge(edge);
    graph.add_edge(inverse);
}

fn add_horizontal_pair(
    graph: &mut DocumentGraph,
    rulings: &[Rect],
    params: &GraphParams,
    left: NodeId,
    right: NodeId,
    gap: f64,
) {
    let a = graph.node(left).seg.clone();
    let b = graph.node(right).seg.clone();
    let tol = params.align_tolerance;

    let gap_rect = (a.x1, a.y0.max(b.y0), b.x0, a.y1.min(b.y1));
    let crosses = crosses_any_ruling(gap_rect, rulings);

    let mut edge = Edge::new(left, right, Relation::RightOf, gap);
    edge.length_class = length_class(gap, &a, &b, params);
    edge.align_top_left = (a.y1 - b.y1).abs() <= tol;
    edge.align_centre = ((a.y0 + a.y1) / 2.0 - (b.y0 + b.y1) / 2.0).abs() <= tol;
    edge.align_bottom_right = (a.y0 - b.y0).abs() <= tol;
    edge.crosses_ruling = crosses;
    edge.reading_order = 1;
    edge.superior = true;

    let mut inverse = edge.clone();
    inverse.from = right;
    inverse.to = left;
    inverse.relation = Relation::LeftOf;
    inverse.reading_order = -1;
    inverse.superior = false;

    graph.add_edge(edge);
    graph.add_edge(inverse);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(bbox: Rect, text: &str) -> Segment {
        Segment::text(SegmentKind::Line, bbox, text, "F1", 10.0)
    }

    #[test]
    fn test_builder_links_vertical_neighbours() {
        let segs = vec![
            line((0.0, 40.0, 50.0, 50.0), "top"),
            line((0.0, 25.0, 50.0, 35.0), "middle"),
            line((0.0, 0.0, 50.0, 10.0), "bottom"),
        ];
        let graph = build_document_graph(&segs, &GraphParams::default());
        assert_eq!(graph.node_count(), 3);

        // top -> middle, middle -> bottom, plus inverses.
        let below: Vec<(NodeId, NodeId)> = graph
            .edges()
            .filter(|(_, e)| e.relation == Relation::Below)
            .map(|(_, e)| (e.from, e.to))
            .collect();
        assert!(below.contains(&(NodeId(0), NodeId(1))));
        assert!(below.contains(&(NodeId(1), NodeId(2))));
        // Nearest-neighbour only: no direct top -> bottom edge.
        assert!(!below.contains(&(NodeId(0), NodeId(2))));
    }

    #[test]
    fn test_builder_observes_crossing_ruling() {
        let mut segs = vec![
            line((0.0, 20.0, 50.0, 30.0), "header"),
            line((0.0, 0.0, 50.0, 10.0), "body"),
        ];
        segs.push(Segment::new(SegmentKind::RulingLine, (0.0, 15.0, 50.0, 15.0)));
        let graph = build_document_graph(&segs, &GraphParams::default());
        let (_, edge) = graph
            .edges()
            .find(|(_, e)| e.relation == Relation::Below)
            .unwrap();
        assert!(edge.crosses_ruling);
        assert!(edge.align_top_left);
    }

    #[test]
    fn test_builder_skips_non_finite_segments() {
        let segs = vec![
            line((0.0, 0.0, 50.0, 10.0), "ok"),
            line((f64::NAN, 0.0, 50.0, 10.0), "bad"),
        ];
        let graph = build_document_graph(&segs, &GraphParams::default());
        assert_eq!(graph.node_count(), 1);
    }
}
