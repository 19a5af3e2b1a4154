//! Best-first greedy segmentation engine.
//!
//! Processes the vertical edges of an adjacency graph in priority order,
//! fusing the strongest-evidence pairs into clusters first. Each accepted
//! merge computes the swallow set of the participating nodes before the
//! cluster is validated and installed.

use rustc_hash::FxHashSet;

use crate::geom::{HasBBox, Plane, Rect};
use crate::graph::{DocumentGraph, EdgeId, NodeId};

use super::cluster::Cluster;
use super::params::{SegParams, SwallowMode};
use super::policy::{MergeDecision, MergePolicy};

struct NodeRef {
    bbox: Rect,
}

impl HasBBox for NodeRef {
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

struct EngineState {
    /// Node -> currently installed cluster slot.
    clust_of: Vec<Option<usize>>,
    clusters: Vec<Option<Cluster>>,
    plane: Plane<NodeRef>,
}

impl EngineState {
    fn new(graph: &DocumentGraph) -> Self {
        let mut plane = Plane::new();
        for (_, node) in graph.nodes() {
            let s = &node.seg;
            plane.add(NodeRef {
                bbox: (s.x0, s.y0, s.x1, s.y1),
            });
        }
        Self {
            clust_of: vec![None; graph.node_count()],
            clusters: Vec::new(),
            plane,
        }
    }

    fn install(&mut self, cand: Cluster, absorbed: &FxHashSet<usize>) {
        for slot in absorbed {
            if let Some(old) = self.clusters[*slot].take() {
                for item in old.items() {
                    self.clust_of[item.0] = None;
                }
            }
        }
        let slot = self.clusters.len();
        for item in cand.items() {
            self.clust_of[item.0] = Some(slot);
        }
        self.clusters.push(Some(cand));
    }
}

/// Computes the swallow set of the seed nodes under the given mode.
///
/// Returns the item set and the slots of clusters absorbed along the way.
/// Nothing is mutated here: the engine applies the result only after the
/// candidate passes validation.
fn swallow(
    graph: &DocumentGraph,
    state: &EngineState,
    seeds: &[NodeId],
    mode: SwallowMode,
) -> (Vec<NodeId>, FxHashSet<usize>) {
    let mut in_set = vec![false; graph.node_count()];
    let mut items: Vec<NodeId> = Vec::new();
    let mut absorbed: FxHashSet<usize> = FxHashSet::default();

    let mut push = |id: NodeId, items: &mut Vec<NodeId>| {
        if !in_set[id.0] {
            in_set[id.0] = true;
            items.push(id);
            true
        } else {
            false
        }
    };

    for seed in seeds {
        push(*seed, &mut items);
    }

    match mode {
        SwallowMode::None => {}
        SwallowMode::Grow => {
            // Grow pulls in overlapping segments without disturbing other
            // clusters: only unclustered nodes are absorbed.
            loop {
                let before = items.len();
                let bbox = graph.bound_of(&items);
                for (j, _) in state.plane.find_with_indices(bbox) {
                    if state.clust_of[j].is_none() {
                        push(NodeId(j), &mut items);
                    }
                }
                if items.len() == before {
                    break;
                }
            }
        }
        SwallowMode::Full => loop {
            let before = items.len();
            let bbox = graph.bound_of(&items);
            let mut queued: Vec<NodeId> = Vec::new();
            for (j, _) in state.plane.find_with_indices(bbox) {
                queued.push(NodeId(j));
            }
            for id in queued {
                if push(id, &mut items) {
                    if let Some(slot) = state.clust_of[id.0] {
                        absorbed.insert(slot);
                        if let Some(cl) = &state.clusters[slot] {
                            for member in cl.items() {
                                push(*member, &mut items);
                            }
                        }
                    }
                }
            }
            if items.len() == before {
                break;
            }
        },
    }

    (items, absorbed)
}

fn process_pass<P: MergePolicy>(
    graph: &DocumentGraph,
    policy: &P,
    params: &SegParams,
    state: &mut EngineState,
    queue: &[EdgeId],
) -> (Vec<EdgeId>, usize) {
    let mut remaining = Vec::new();
    let mut merges = 0usize;

    for &eid in queue {
        let edge = graph.edge(eid);
        let ca = state.clust_of[edge.from.0];
        let cb = state.clust_of[edge.to.0];

        // Seed nodes, source cluster slots and the decision for this edge.
        let (decision, seeds, sources) = match (ca, cb) {
            (None, None) => {
                let d = policy.decide(graph, edge, None, None);
                (d, vec![edge.from, edge.to], Vec::new())
            }
            (Some(ci), None) => {
                let cluster = state.clusters[ci].as_ref().expect("live cluster slot");
                let d = policy.decide(graph, edge, Some(cluster), None);
                let mut seeds = cluster.items().to_vec();
                seeds.push(edge.to);
                (d, seeds, vec![ci])
            }
            (None, Some(cj)) => {
                let cluster = state.clusters[cj].as_ref().expect("live cluster slot");
                let d = policy.decide(graph, edge, None, Some(cluster));
                let mut seeds = cluster.items().to_vec();
                seeds.push(edge.from);
                (d, seeds, vec![cj])
            }
            (Some(ci), Some(cj)) if ci == cj => {
                // Already joined: the edge is redundant and leaves the
                // active set.
                continue;
            }
            (Some(ci), Some(cj)) => {
                let a = state.clusters[ci].as_ref().expect("live cluster slot");
                let b = state.clusters[cj].as_ref().expect("live cluster slot");
                let d = policy.decide(graph, edge, Some(a), Some(b));
                let mut seeds = a.items().to_vec();
                seeds.extend_from_slice(b.items());
                (d, seeds, vec![ci, cj])
            }
        };

        match decision {
            MergeDecision::Merge => {
                let (items, mut absorbed) = swallow(graph, state, &seeds, params.swallow);
                absorbed.extend(sources);
                let cand = Cluster::from_items(graph, items);
                if policy.is_valid(graph, &cand) {
                    state.install(cand, &absorbed);
                    merges += 1;
                } else {
                    // The merge is off but the edge is not consumed: the
                    // nodes stay as they were and the edge may be revisited.
                    remaining.push(eid);
                }
            }
            MergeDecision::Reject | MergeDecision::Defer => {
                remaining.push(eid);
            }
        }
    }

    (remaining, merges)
}

/// Turns an adjacency graph into clusters by greedily fusing the
/// strongest-evidence vertical edges first.
///
/// Edges are filtered to vertical ones, deduplicated against their
/// inverses, sorted ascending by the policy comparator and optionally
/// capped to `max_iterations`. Under resort semantics the remaining edges
/// are re-sorted and reprocessed until a pass makes no progress. Nodes
/// never clustered end up as trivial singleton clusters.
pub fn cluster_graph<P: MergePolicy>(
    graph: &DocumentGraph,
    policy: &P,
    params: &SegParams,
) -> Vec<Cluster> {
    let mut seen_pairs: FxHashSet<(NodeId, NodeId)> = FxHashSet::default();
    let mut queue: Vec<EdgeId> = Vec::new();
    for (eid, edge) in graph.edges() {
        if !edge.relation.is_vertical() || edge.disabled {
            continue;
        }
        let key = if edge.from <= edge.to {
            (edge.from, edge.to)
        } else {
            (edge.to, edge.from)
        };
        if seen_pairs.insert(key) {
            queue.push(eid);
        }
    }

    queue.sort_by(|a, b| policy.compare(graph, graph.edge(*a), graph.edge(*b)));
    if let Some(cap) = params.max_iterations {
        queue.truncate(cap);
    }

    let mut state = EngineState::new(graph);
    let (mut remaining, mut merges) = process_pass(graph, policy, params, &mut state, &queue);

    if params.resort {
        while merges > 0 && !remaining.is_empty() {
            remaining.sort_by(|a, b| policy.compare(graph, graph.edge(*a), graph.edge(*b)));
            let pass = std::mem::take(&mut remaining);
            let (next_remaining, next_merges) =
                process_pass(graph, policy, params, &mut state, &pass);
            remaining = next_remaining;
            merges = next_merges;
        }
    }

    let mut result: Vec<Cluster> = state.clusters.into_iter().flatten().collect();
    for (i, slot) in state.clust_of.iter().enumerate() {
        if slot.is_none() {
            result.push(Cluster::from_items(graph, vec![NodeId(i)]));
        }
    }
    result
}
