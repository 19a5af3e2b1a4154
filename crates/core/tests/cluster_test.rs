//! Tests for the page segmentation engine.

use trellis_core::cluster::{
    BlockPolicy, Cluster, MergeDecision, MergePolicy, SegParams, SwallowMode, cluster_graph,
};
use trellis_core::geom::Rect;
use trellis_core::graph::{DocumentGraph, Edge, GraphParams, build_document_graph};
use trellis_core::segment::{Segment, SegmentKind};

fn line(bbox: Rect, text: &str, size: f64) -> Segment {
    Segment::text(SegmentKind::MergedLine, bbox, text, "F1", size)
}

fn page_graph(segments: &[Segment]) -> DocumentGraph {
    build_document_graph(segments, &GraphParams::default())
}

#[test]
fn test_close_lines_fuse_into_one_block() {
    // Three lines with 2pt gaps at 10pt type: one paragraph.
    let graph = page_graph(&[
        line((0.0, 24.0, 100.0, 34.0), "first", 10.0),
        line((0.0, 12.0, 100.0, 22.0), "second", 10.0),
        line((0.0, 0.0, 100.0, 10.0), "third", 10.0),
    ]);
    let policy = BlockPolicy::new(SegParams::default());
    let clusters = cluster_graph(&graph, &policy, &SegParams::default());
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 3);
    assert_eq!(clusters[0].bbox(), (0.0, 0.0, 100.0, 34.0));
}

#[test]
fn test_distant_lines_stay_separate() {
    // A 40pt gap at 10pt type separates the paragraphs.
    let graph = page_graph(&[
        line((0.0, 62.0, 100.0, 72.0), "para1 line1", 10.0),
        line((0.0, 50.0, 100.0, 60.0), "para1 line2", 10.0),
        line((0.0, 0.0, 100.0, 10.0), "para2", 10.0),
    ]);
    let policy = BlockPolicy::new(SegParams::default());
    let clusters = cluster_graph(&graph, &policy, &SegParams::default());
    assert_eq!(clusters.len(), 2);
    let mut sizes: Vec<usize> = clusters.iter().map(Cluster::len).collect();
    sizes.sort();
    assert_eq!(sizes, vec![1, 2]);
}

#[test]
fn test_font_size_mismatch_rejects_merge() {
    let graph = page_graph(&[
        line((0.0, 12.0, 100.0, 30.0), "headline", 18.0),
        line((0.0, 0.0, 100.0, 10.0), "body", 10.0),
    ]);
    let policy = BlockPolicy::new(SegParams::default());
    let clusters = cluster_graph(&graph, &policy, &SegParams::default());
    assert_eq!(clusters.len(), 2);
}

/// Full swallowing absorbs a segment whose box sits inside the union of a
/// forming cluster even when no edge reaches it.
#[test]
fn test_swallow_absorbs_contained_segment() {
    let graph = page_graph(&[
        line((0.0, 24.0, 100.0, 34.0), "first", 10.0),
        line((0.0, 0.0, 100.0, 10.0), "third", 10.0),
        // Narrow fragment between the two, overlapped by their union.
        line((40.0, 13.0, 60.0, 21.0), "mid", 8.0),
    ]);
    let policy = BlockPolicy::new(SegParams::default());
    let params = SegParams {
        size_tolerance: 3.0,
        ..SegParams::default()
    };
    let clusters = cluster_graph(&graph, &policy, &params);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 3);
}

/// The swallow set only grows and converges: re-running segmentation on
/// the same input is stable, and the cluster covers every absorbed item's
/// box.
#[test]
fn test_swallow_monotone_and_convergent() {
    let segments: Vec<Segment> = (0..12)
        .map(|i| {
            let y = i as f64 * 12.0;
            line((0.0, y, 100.0, y + 10.0), "row", 10.0)
        })
        .collect();
    let graph = page_graph(&segments);
    let policy = BlockPolicy::new(SegParams::default());
    let params = SegParams::default();

    let first = cluster_graph(&graph, &policy, &params);
    let second = cluster_graph(&graph, &policy, &params);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.items(), b.items());
        assert_eq!(a.bbox(), b.bbox());
    }
    // All twelve rows end up covered by the clusters exactly once.
    let total: usize = first.iter().map(Cluster::len).sum();
    assert_eq!(total, 12);
}

#[test]
fn test_unclustered_nodes_become_singletons() {
    let graph = page_graph(&[
        line((0.0, 0.0, 40.0, 10.0), "lonely", 10.0),
        line((200.0, 300.0, 240.0, 310.0), "also lonely", 10.0),
    ]);
    let policy = BlockPolicy::new(SegParams::default());
    let clusters = cluster_graph(&graph, &policy, &SegParams::default());
    assert_eq!(clusters.len(), 2);
    assert!(clusters.iter().all(|c| c.len() == 1));
}

#[test]
fn test_max_iterations_caps_processed_edges() {
    let graph = page_graph(&[
        line((0.0, 24.0, 100.0, 34.0), "a", 10.0),
        line((0.0, 12.0, 100.0, 22.0), "b", 10.0),
        line((0.0, 0.0, 100.0, 10.0), "c", 10.0),
    ]);
    let policy = BlockPolicy::new(SegParams::default());
    let params = SegParams {
        max_iterations: Some(0),
        swallow: SwallowMode::None,
        ..SegParams::default()
    };
    let clusters = cluster_graph(&graph, &policy, &params);
    // No edges processed: every line is its own trivial cluster.
    assert_eq!(clusters.len(), 3);
}

/// A policy that defers everything merges nothing but loses nothing.
struct DeferAll;

impl MergePolicy for DeferAll {
    fn compare(&self, _graph: &DocumentGraph, a: &Edge, b: &Edge) -> std::cmp::Ordering {
        a.weight.total_cmp(&b.weight)
    }

    fn decide(
        &self,
        _graph: &DocumentGraph,
        _edge: &Edge,
        _a: Option<&Cluster>,
        _b: Option<&Cluster>,
    ) -> MergeDecision {
        MergeDecision::Defer
    }
}

#[test]
fn test_deferred_edges_never_silently_merge() {
    let graph = page_graph(&[
        line((0.0, 12.0, 100.0, 22.0), "a", 10.0),
        line((0.0, 0.0, 100.0, 10.0), "b", 10.0),
    ]);
    let clusters = cluster_graph(&graph, &DeferAll, &SegParams::default());
    assert_eq!(clusters.len(), 2);
}

#[test]
fn test_found_lines_of_final_cluster() {
    let graph = page_graph(&[
        line((0.0, 12.0, 45.0, 22.0), "cell-a", 10.0),
        line((55.0, 12.0, 100.0, 22.0), "cell-b", 10.0),
        line((0.0, 0.0, 100.0, 10.0), "footer", 10.0),
    ]);
    let policy = BlockPolicy::new(SegParams::default());
    let clusters = cluster_graph(&graph, &policy, &SegParams::default());
    assert_eq!(clusters.len(), 1);
    let rows = clusters[0].found_lines(&graph);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[1].len(), 1);
}
