//! Segmentation parameters.
//!
//! Contains SegParams for controlling segmentation behavior.

/// How a forming cluster absorbs geometrically related segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwallowMode {
    /// The merged set is exactly the input nodes.
    None,
    /// Grow to include nodes overlapping the union bounding box, iterated
    /// to a fixed point, without absorbing their clusters.
    Grow,
    /// Absorb every intersecting node and, recursively, the existing
    /// cluster of any newly absorbed node.
    #[default]
    Full,
}

/// Parameters for page segmentation.
///
/// Controls how lines are fused into blocks and how clusters swallow
/// contained segments.
#[derive(Debug, Clone, PartialEq)]
pub struct SegParams {
    /// Maximum vertical gap for two lines to belong to the same block.
    /// Specified relative to the smaller font size of the pair.
    pub line_spacing: f64,

    /// Maximum font-size difference between members of one block.
    pub size_tolerance: f64,

    /// If two line fragments have more vertical overlap than this they are
    /// considered to be on the same line. Specified relative to the
    /// minimum height of both fragments.
    pub line_overlap: f64,

    /// Maximum horizontal gap when merging raw lines, relative to the
    /// font size.
    pub merge_gap: f64,

    /// Caps the number of edges processed per pass (bounded-cost mode).
    pub max_iterations: Option<usize>,

    /// Re-sort remaining edges and reprocess until no pass merges.
    pub resort: bool,

    pub swallow: SwallowMode,
}

impl Default for SegParams {
    fn default() -> Self {
        Self {
            line_spacing: 1.25,
            size_tolerance: 1.0,
            line_overlap: 0.5,
            merge_gap: 1.0,
            max_iterations: None,
            resort: true,
            swallow: SwallowMode::Full,
        }
    }
}
