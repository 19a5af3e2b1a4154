use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use trellis_core::cluster::{BlockPolicy, SegParams, cluster_graph};
use trellis_core::graph::{GraphParams, build_document_graph};
use trellis_core::segment::{Segment, SegmentKind};

/// Two columns of body lines with paragraph breaks every five lines.
fn generate_page(lines: usize) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(lines);
    for i in 0..lines {
        let col = (i % 2) as f64;
        let row = (i / 2) as f64;
        let para_gap = (row as usize / 5) as f64 * 14.0;
        let x0 = 36.0 + col * 300.0;
        let y1 = 760.0 - row * 12.0 - para_gap;
        segments.push(Segment::text(
            SegmentKind::MergedLine,
            (x0, y1 - 10.0, x0 + 260.0, y1),
            "body line",
            "Helvetica",
            10.0,
        ));
    }
    segments
}

fn bench_cluster_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_graph");
    for &n in &[60usize, 240, 960] {
        let segments = generate_page(n);
        let graph = build_document_graph(&segments, &GraphParams::default());
        let policy = BlockPolicy::new(SegParams::default());
        group.bench_with_input(BenchmarkId::new("blocks", n), &graph, |b, graph| {
            b.iter(|| {
                let clusters = cluster_graph(graph, &policy, &SegParams::default());
                black_box(clusters.len());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cluster_graph);
criterion_main!(benches);
