//! Geometric segment model.
//!
//! A page is decomposed into atomic segments: text at several granularities
//! plus graphic elements. The original's class hierarchy over segment
//! variants is expressed as a tagged kind plus shared geometry fields; the
//! matcher only ever queries a handful of capability predicates.

use serde::{Deserialize, Serialize};

use crate::geom::{HasBBox, Rect, normalize_rect, rect_contains, rect_union, rects_intersect};

/// Tolerance for font-size equality comparisons.
pub const FONT_SIZE_EPSILON: f64 = 0.05;

/// The kind of a page segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    /// A single glyph.
    Char,
    /// A run of glyphs from one text-showing operation.
    Fragment,
    /// A physical text line.
    Line,
    /// Adjacent raw lines merged into one logical line.
    MergedLine,
    /// A clustered text block.
    Block,
    /// A ruling (separator) line.
    RulingLine,
    /// A filled or stroked rectangle.
    Rect,
    /// An embedded image.
    Image,
}

impl SegmentKind {
    /// Returns true for the text-carrying segment kinds.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            SegmentKind::Char
                | SegmentKind::Fragment
                | SegmentKind::Line
                | SegmentKind::MergedLine
                | SegmentKind::Block
        )
    }
}

/// A rectangular page segment with optional text and typographic attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub font_name: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Segment {
    pub fn new(kind: SegmentKind, bbox: Rect) -> Self {
        let (x0, y0, x1, y1) = bbox;
        Self {
            kind,
            x0,
            y0,
            x1,
            y1,
            text: None,
            font_name: None,
            font_size: None,
            bold: false,
            italic: false,
        }
    }

    /// Creates a text segment with content and typographic attributes.
    pub fn text(kind: SegmentKind, bbox: Rect, text: &str, font_name: &str, font_size: f64) -> Self {
        let mut seg = Self::new(kind, bbox);
        seg.text = Some(text.to_string());
        seg.font_name = Some(font_name.to_string());
        seg.font_size = Some(font_size);
        seg
    }

    /// Returns true if this segment carries text.
    pub fn is_text(&self) -> bool {
        self.kind.is_text()
    }

    /// The text content, or the empty string for non-text segments.
    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Font size with a zero default for segments without one.
    pub fn size(&self) -> f64 {
        self.font_size.unwrap_or(0.0)
    }

    /// Fixes up a negative-dimension bounding box in place.
    pub fn normalize(&mut self) {
        let (x0, y0, x1, y1) = normalize_rect(self.bbox());
        self.x0 = x0;
        self.y0 = y0;
        self.x1 = x1;
        self.y1 = y1;
    }

    /// Returns true if this segment's bounding box fully contains the other.
    pub fn contains(&self, other: &Segment) -> bool {
        rect_contains(self.bbox(), other.bbox())
    }

    /// Returns true if the two bounding boxes intersect.
    pub fn intersects(&self, other: &Segment) -> bool {
        rects_intersect(self.bbox(), other.bbox())
    }

    /// Expands this segment's bounding box to cover the other.
    pub fn grow(&mut self, other: &Segment) {
        let (x0, y0, x1, y1) = rect_union(self.bbox(), other.bbox());
        self.x0 = x0;
        self.y0 = y0;
        self.x1 = x1;
        self.y1 = y1;
    }
}

impl HasBBox for Segment {
    fn x0(&self) -> f64 {
        self.x0
    }
    fn y0(&self) -> f64 {
        self.y0
    }
    fn x1(&self) -> f64 {
        self.x1
    }
    fn y1(&self) -> f64 {
        self.y1
    }
}

/// Compares two optional font sizes for equality within tolerance.
pub fn font_sizes_equal(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() < FONT_SIZE_EPSILON,
        (None, None) => true,
        _ => false,
    }
}
