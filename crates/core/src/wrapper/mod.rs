//! Wrapper model and composition.
//!
//! A wrapper is a small pattern graph with match constraints, authored as
//! XML, describing one repeating structural motif to extract. This module
//! contains:
//! - The wrapper model and its XML parser
//! - Match-N chain fusion (wrapper preparation)
//! - The composer running the matcher and recursing into sub-wrappers

pub mod compose;
pub mod parse;
pub mod reduce;

pub use compose::{Instance, apply_wrapper};
pub use parse::parse_wrapper;
pub use reduce::reduce_wrapper_graph;

use crate::graph::DocumentGraph;

/// Segment granularity a wrapper is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// Raw text segments as delivered by the facade.
    RawLine,
    /// Raw segments merged into logical lines.
    Line,
    /// Lines clustered into blocks.
    #[default]
    Block,
}

/// A user-authored extraction pattern.
#[derive(Debug, Clone)]
pub struct Wrapper {
    /// Result name, from the `output` attribute.
    pub name: String,
    pub granularity: Granularity,
    /// Keep whitespace-only segments.
    pub process_spaces: bool,
    /// Keep ruling lines (enables crossing observations).
    pub process_ruling_lines: bool,
    /// Expand each instance to everything intersecting its area before
    /// applying sub-wrappers.
    pub area_based: bool,
    /// Run sub-wrappers once over the whole page and associate results by
    /// bounding-box intersection.
    pub whole_page: bool,
    pub graph: DocumentGraph,
    /// Nested sub-wrappers applied within each instance.
    pub children: Vec<Wrapper>,
}

impl Wrapper {
    pub fn new(name: &str, graph: DocumentGraph) -> Self {
        Self {
            name: name.to_string(),
            granularity: Granularity::default(),
            process_spaces: false,
            process_ruling_lines: true,
            area_based: false,
            whole_page: false,
            graph,
            children: Vec::new(),
        }
    }
}
