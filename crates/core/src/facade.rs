//! Segment document input model.
//!
//! The extraction facade (an external content-stream interpreter) supplies
//! per-page raw geometric segments. This module defines the serde shape of
//! that hand-off so the pipeline can be driven without the decoder itself.

use serde::{Deserialize, Serialize};

use crate::geom::Rect;
use crate::segment::Segment;

/// One page of raw segments from the extraction facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInput {
    /// 1-indexed page number.
    pub page: usize,
    /// Page bounding box.
    pub bbox: Rect,
    /// Page rotation in degrees.
    #[serde(default)]
    pub rotation: i32,
    pub segments: Vec<Segment>,
}

impl PageInput {
    /// Applies the bounding-box corrections the facade may leave behind:
    /// negative-dimension fixup on every segment.
    pub fn normalized(mut self) -> Self {
        for seg in &mut self.segments {
            seg.normalize();
        }
        self
    }
}

/// A whole segment document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub pages: Vec<PageInput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentKind;

    #[test]
    fn test_segment_document_deserializes() {
        let json = r#"{
            "pages": [{
                "page": 1,
                "bbox": [0.0, 0.0, 612.0, 792.0],
                "segments": [
                    {"kind": "line", "x0": 10.0, "y0": 700.0, "x1": 90.0, "y1": 712.0,
                     "text": "Name:", "font_name": "Helvetica", "font_size": 10.0},
                    {"kind": "ruling-line", "x0": 0.0, "y0": 690.0, "x1": 612.0, "y1": 690.0}
                ]
            }]
        }"#;
        let input: DocumentInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.pages.len(), 1);
        let page = &input.pages[0];
        assert_eq!(page.rotation, 0);
        assert_eq!(page.segments[0].kind, SegmentKind::Line);
        assert_eq!(page.segments[0].text_str(), "Name:");
        assert_eq!(page.segments[1].kind, SegmentKind::RulingLine);
        assert!(page.segments[1].text.is_none());
    }

    #[test]
    fn test_normalized_fixes_segment_boxes() {
        let json = r#"{
            "page": 2,
            "bbox": [0.0, 0.0, 612.0, 792.0],
            "rotation": 90,
            "segments": [
                {"kind": "fragment", "x0": 90.0, "y0": 712.0, "x1": 10.0, "y1": 700.0, "text": "x"}
            ]
        }"#;
        let page: PageInput = serde_json::from_str(json).unwrap();
        let page = page.normalized();
        assert_eq!(page.segments[0].x0, 10.0);
        assert_eq!(page.segments[0].y1, 712.0);
    }
}
