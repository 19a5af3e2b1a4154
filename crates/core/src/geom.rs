//! Geometric primitives and the Plane spatial index.
//!
//! Provides the Rect/Point aliases used throughout the crate, the HasBBox
//! trait, rectangle predicates (containment, intersection, union) and a
//! Plane structure for efficient lookup of objects by area.

use rstar::{AABB, RTree, RTreeObject};

/// Floating-point infinity stand-in for bounding box calculations.
pub const INF_F64: f64 = f64::MAX;

/// Small epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// A rectangle defined by (x0, y0, x1, y1) where (x0, y0) is bottom-left
/// and (x1, y1) is top-right.
pub type Rect = (f64, f64, f64, f64);

/// Trait for objects that have a bounding box.
pub trait HasBBox {
    fn x0(&self) -> f64;
    fn y0(&self) -> f64;
    fn x1(&self) -> f64;
    fn y1(&self) -> f64;

    fn bbox(&self) -> Rect {
        (self.x0(), self.y0(), self.x1(), self.y1())
    }

    fn width(&self) -> f64 {
        self.x1() - self.x0()
    }

    fn height(&self) -> f64 {
        self.y1() - self.y0()
    }
}

/// Fixes up a rectangle with negative width or height by swapping the
/// offending coordinates. Degenerate (zero-area) rectangles are left as-is.
pub fn normalize_rect(rect: Rect) -> Rect {
    let (mut x0, mut y0, mut x1, mut y1) = rect;
    if x1 < x0 {
        std::mem::swap(&mut x0, &mut x1);
    }
    if y1 < y0 {
        std::mem::swap(&mut y0, &mut y1);
    }
    (x0, y0, x1, y1)
}

/// Returns true if `outer` fully contains `inner` (closed comparison).
pub fn rect_contains(outer: Rect, inner: Rect) -> bool {
    outer.0 <= inner.0 && outer.1 <= inner.1 && inner.2 <= outer.2 && inner.3 <= outer.3
}

/// Returns true if the two rectangles intersect (strict, shared edges do
/// not count).
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    !(b.2 <= a.0 || a.2 <= b.0 || b.3 <= a.1 || a.3 <= b.1)
}

/// Bounding-box union of two rectangles.
pub fn rect_union(a: Rect, b: Rect) -> Rect {
    (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3))
}

/// Computes a minimal rectangle that covers all the rectangles.
pub fn get_bound<I: IntoIterator<Item = Rect>>(rects: I) -> Rect {
    let mut x0 = INF_F64;
    let mut y0 = INF_F64;
    let mut x1 = -INF_F64;
    let mut y1 = -INF_F64;
    for (rx0, ry0, rx1, ry1) in rects {
        x0 = x0.min(rx0);
        y0 = y0.min(ry0);
        x1 = x1.max(rx1);
        y1 = y1.max(ry1);
    }
    (x0, y0, x1, y1)
}

/// Horizontal overlap length of two rectangles (0 if disjoint).
pub fn hoverlap(a: Rect, b: Rect) -> f64 {
    let lo = a.0.max(b.0);
    let hi = a.2.min(b.2);
    (hi - lo).max(0.0)
}

/// Vertical overlap length of two rectangles (0 if disjoint).
pub fn voverlap(a: Rect, b: Rect) -> f64 {
    let lo = a.1.max(b.1);
    let hi = a.3.min(b.3);
    (hi - lo).max(0.0)
}

/// Horizontal gap between two rectangles (0 if they overlap).
pub fn hdistance(a: Rect, b: Rect) -> f64 {
    if a.0 <= b.2 && b.0 <= a.2 {
        0.0
    } else {
        (a.0 - b.2).abs().min((a.2 - b.0).abs())
    }
}

/// Vertical gap between two rectangles (0 if they overlap).
pub fn vdistance(a: Rect, b: Rect) -> f64 {
    if a.1 <= b.3 && b.1 <= a.3 {
        0.0
    } else {
        (a.1 - b.3).abs().min((a.3 - b.1).abs())
    }
}

/// Formats a bounding box as a comma-separated string.
pub fn bbox2str(bbox: Rect) -> String {
    let (x0, y0, x1, y1) = bbox;
    format!("{:.3},{:.3},{:.3},{:.3}", x0, y0, x1, y1)
}

#[derive(Clone)]
struct PlaneNode {
    id: usize,
    bbox: Rect,
}

impl PartialEq for PlaneNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl RTreeObject for PlaneNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.bbox.0, self.bbox.1], [self.bbox.2, self.bbox.3])
    }
}

/// A set-like structure for objects placed on a plane.
///
/// Items are stored in insertion order and ids are stable (id == seq
/// index); an R-tree backs the area queries.
pub struct Plane<T> {
    seq: Vec<T>,
    bboxes: Vec<Rect>,
    tree: RTree<PlaneNode>,
}

impl<T: HasBBox> Plane<T> {
    pub fn new() -> Self {
        Self {
            seq: Vec::new(),
            bboxes: Vec::new(),
            tree: RTree::new(),
        }
    }

    /// Adds multiple objects to the plane.
    pub fn extend(&mut self, objs: impl IntoIterator<Item = T>) {
        for obj in objs {
            self.add(obj);
        }
    }

    /// Adds an object to the plane (indexed immediately).
    pub fn add(&mut self, obj: T) {
        let id = self.seq.len();
        let bbox = obj.bbox();
        self.seq.push(obj);
        self.bboxes.push(bbox);
        self.tree.insert(PlaneNode { id, bbox });
    }

    /// Finds objects that strictly intersect the given bounding box,
    /// returning (index, object) pairs.
    pub fn find_with_indices(&self, bbox: Rect) -> Vec<(usize, &T)> {
        let (x0, y0, x1, y1) = bbox;
        let env = AABB::from_corners([x0, y0], [x1, y1]);
        let mut result = Vec::with_capacity(16);
        for node in self.tree.locate_in_envelope_intersecting(&env) {
            if rects_intersect(self.bboxes[node.id], bbox) {
                result.push((node.id, &self.seq[node.id]));
            }
        }
        result.sort_by_key(|(id, _)| *id);
        result
    }

    /// Returns the number of objects in the plane.
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// Returns true if the plane is empty.
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Returns an iterator over all objects with their indices.
    pub fn iter_with_indices(&self) -> impl Iterator<Item = (usize, &T)> {
        self.seq.iter().enumerate()
    }

    /// Returns the object with the given id.
    pub fn get(&self, id: usize) -> Option<&T> {
        self.seq.get(id)
    }
}

impl<T: HasBBox> Default for Plane<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rect_swaps_negative_dimensions() {
        assert_eq!(normalize_rect((10.0, 5.0, 0.0, 1.0)), (0.0, 1.0, 10.0, 5.0));
        assert_eq!(normalize_rect((0.0, 0.0, 4.0, 4.0)), (0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn test_rect_contains_degenerate() {
        // Zero-width rectangles are still containable.
        assert!(rect_contains((0.0, 0.0, 10.0, 10.0), (5.0, 2.0, 5.0, 8.0)));
        assert!(!rect_contains((0.0, 0.0, 10.0, 10.0), (5.0, 2.0, 11.0, 8.0)));
    }

    #[test]
    fn test_rects_intersect_shared_edge() {
        // Touching edges do not count as intersection.
        assert!(!rects_intersect((0.0, 0.0, 5.0, 5.0), (5.0, 0.0, 10.0, 5.0)));
        assert!(rects_intersect((0.0, 0.0, 5.0, 5.0), (4.0, 4.0, 10.0, 10.0)));
    }

    struct BoxItem(Rect);

    impl HasBBox for BoxItem {
        fn x0(&self) -> f64 {
            self.0.0
        }
        fn y0(&self) -> f64 {
            self.0.1
        }
        fn x1(&self) -> f64 {
            self.0.2
        }
        fn y1(&self) -> f64 {
            self.0.3
        }
    }

    #[test]
    fn test_plane_find() {
        let mut plane = Plane::new();
        plane.extend(vec![
            BoxItem((0.0, 0.0, 10.0, 10.0)),
            BoxItem((20.0, 0.0, 30.0, 10.0)),
            BoxItem((5.0, 5.0, 15.0, 15.0)),
        ]);
        let hits = plane.find_with_indices((0.0, 0.0, 12.0, 12.0));
        let ids: Vec<usize> = hits.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0, 2]);
    }
}
