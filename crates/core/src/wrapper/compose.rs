//! Wrapper composition: matching, field extraction and recursion.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::geom::{Rect, rects_intersect};
use crate::graph::{DocumentGraph, NodeId};
use crate::matcher::{SearchBudget, find_embeddings};

use super::Wrapper;
use super::reduce::reduce_wrapper_graph;

/// One extraction instance: the matched document nodes, their bounding
/// box, the extracted field values and any sub-wrapper results.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Name of the wrapper that produced this instance.
    pub wrapper: String,
    pub bbox: Rect,
    pub items: Vec<NodeId>,
    pub fields: IndexMap<String, String>,
    pub children: Vec<Instance>,
}

/// Applies a wrapper to a document graph, returning every instance.
///
/// The wrapper graph is reduced (cloned, stripped, match-N chains fused)
/// before matching; the document graph is never cloned. A disconnected
/// pattern is rejected up front since neighbour-based refinement is
/// ill-defined for it.
pub fn apply_wrapper(
    wrapper: &Wrapper,
    doc: &DocumentGraph,
    budget: &SearchBudget,
) -> Result<Vec<Instance>> {
    let reduced = reduce_wrapper_graph(&wrapper.graph);
    if reduced.node_count() == 0 {
        return Err(ExtractError::EmptyPattern);
    }
    if !reduced.is_connected() {
        return Err(ExtractError::DisconnectedWrapper);
    }

    let solutions = find_embeddings(&reduced, doc, budget)?;
    debug!(
        wrapper = wrapper.name.as_str(),
        instances = solutions.len(),
        "wrapper matched"
    );

    let mut instances: Vec<Instance> = Vec::with_capacity(solutions.len());
    for sol in &solutions {
        let items = sol.mapping.clone();
        let bbox = doc.bound_of(&items);
        let mut fields: IndexMap<String, String> = IndexMap::new();
        for (i, pnode) in reduced.nodes() {
            if !pnode.extract {
                continue;
            }
            let name = if pnode.tag.is_empty() {
                format!("field-{}", i.0)
            } else {
                pnode.tag.clone()
            };
            let value = doc.node(sol.mapping[i.0]).trimmed_text().to_string();
            fields.insert(name, value);
        }
        instances.push(Instance {
            wrapper: wrapper.name.clone(),
            bbox,
            items,
            fields,
            children: Vec::new(),
        });
    }

    if !wrapper.children.is_empty() {
        if wrapper.whole_page {
            // Sub-wrappers run once over the entire page; results attach to
            // every instance whose area they intersect.
            for child in &wrapper.children {
                for sub in apply_wrapper(child, doc, budget)? {
                    for inst in &mut instances {
                        if rects_intersect(inst.bbox, sub.bbox) {
                            inst.children.push(sub.clone());
                        }
                    }
                }
            }
        } else {
            for inst in &mut instances {
                let area_items: Vec<NodeId> = if wrapper.area_based {
                    doc.nodes()
                        .filter(|(_, n)| {
                            let s = &n.seg;
                            rects_intersect(inst.bbox, (s.x0, s.y0, s.x1, s.y1))
                        })
                        .map(|(id, _)| id)
                        .collect()
                } else {
                    inst.items.clone()
                };
                let (sub_graph, back) = doc.induced(&area_items);
                for child in &wrapper.children {
                    for mut sub in apply_wrapper(child, &sub_graph, budget)? {
                        remap_items(&mut sub, &back);
                        inst.children.push(sub);
                    }
                }
            }
        }
    }

    Ok(instances)
}

/// Translates sub-graph node ids back into the parent graph's space.
fn remap_items(inst: &mut Instance, back: &[NodeId]) {
    for item in &mut inst.items {
        *item = back[item.0];
    }
    for child in &mut inst.children {
        remap_items(child, back);
    }
}
