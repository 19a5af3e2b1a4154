//! Candidate clusters produced by the segmentation engine.

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::geom::{Rect, voverlap};
use crate::graph::{DocumentGraph, NodeId};

/// An ordered collection of nodes with derived bounding box and dominant
/// font size.
#[derive(Debug, Clone)]
pub struct Cluster {
    items: Vec<NodeId>,
    bbox: Rect,
    font_size: f64,
}

impl Cluster {
    /// Builds a cluster from its member nodes, deriving bounding box and
    /// dominant font size.
    pub fn from_items(graph: &DocumentGraph, items: Vec<NodeId>) -> Self {
        let bbox = graph.bound_of(&items);
        let font_size = dominant_font_size(graph, &items);
        Self {
            items,
            bbox,
            font_size,
        }
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// The most frequent font size among the member segments.
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Decomposes the cluster into row-ordered found lines: members are
    /// grouped by vertical overlap, rows ordered top to bottom and members
    /// within a row left to right. Used for downstream gap analysis.
    pub fn found_lines(&self, graph: &DocumentGraph) -> Vec<Vec<NodeId>> {
        let mut sorted = self.items.clone();
        sorted.sort_by(|a, b| {
            let sa = &graph.node(*a).seg;
            let sb = &graph.node(*b).seg;
            sb.y1
                .partial_cmp(&sa.y1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(b))
        });

        let mut rows: Vec<(Rect, Vec<NodeId>)> = Vec::new();
        for id in sorted {
            let bbox = {
                let s = &graph.node(id).seg;
                (s.x0, s.y0, s.x1, s.y1)
            };
            let height = (bbox.3 - bbox.1).max(0.0);
            let joined = rows.iter_mut().find(|(row_bbox, _)| {
                let row_height = (row_bbox.3 - row_bbox.1).max(0.0);
                let min_height = height.min(row_height);
                voverlap(*row_bbox, bbox) >= 0.5 * min_height && min_height > 0.0
            });
            match joined {
                Some((row_bbox, members)) => {
                    *row_bbox = crate::geom::rect_union(*row_bbox, bbox);
                    members.push(id);
                }
                None => rows.push((bbox, vec![id])),
            }
        }

        rows.into_iter()
            .map(|(_, mut members)| {
                members.sort_by(|a, b| {
                    let sa = &graph.node(*a).seg;
                    let sb = &graph.node(*b).seg;
                    sa.x0
                        .partial_cmp(&sb.x0)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(a.cmp(b))
                });
                members
            })
            .collect()
    }

    /// Concatenates member text row by row.
    pub fn text(&self, graph: &DocumentGraph) -> String {
        self.found_lines(graph)
            .iter()
            .map(|row| {
                row.iter()
                    .map(|id| graph.node(*id).seg.text_str())
                    .join(" ")
            })
            .join("\n")
    }
}

fn dominant_font_size(graph: &DocumentGraph, items: &[NodeId]) -> f64 {
    let mut counts: FxHashMap<i64, usize> = FxHashMap::default();
    for id in items {
        if let Some(size) = graph.node(*id).seg.font_size {
            *counts.entry((size * 10.0).round() as i64).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(key, _)| key as f64 / 10.0)
        .unwrap_or(0.0)
}
