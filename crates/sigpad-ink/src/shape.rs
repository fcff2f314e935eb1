//! Stroke Shapes
//!
//! Closed segment shapes and the stroke path built from them.
//!
//! Every shape is wound the same way (negative signed area in y-up terms),
//! so filling a whole [`StrokePath`] with the nonzero rule unions the
//! overlapping shapes instead of punching holes where they meet.

use crate::point::Point;

/// Cubic bezier circle approximation constant
const KAPPA: f32 = 0.552_284_8;

/// A closed piece of a stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentShape {
    /// Tapered quadrilateral between two distinct stroke points.
    ///
    /// Corners in path order: start1, end1, end2, start2.
    Quad { corners: [Point; 4] },
    /// Round cap, used for degenerate segments and joins
    Dot { center: Point, radius: f32 },
}

impl SegmentShape {
    /// Axis-aligned bounds of the shape
    pub fn bounds(&self) -> Bounds {
        match self {
            SegmentShape::Quad { corners } => {
                let mut bounds = Bounds::at(corners[0]);
                for c in &corners[1..] {
                    bounds.include(*c);
                }
                bounds
            }
            SegmentShape::Dot { center, radius } => Bounds {
                min_x: center.x - radius,
                min_y: center.y - radius,
                max_x: center.x + radius,
                max_y: center.y + radius,
            },
        }
    }

    pub fn is_dot(&self) -> bool {
        matches!(self, SegmentShape::Dot { .. })
    }

    /// Append this shape as a closed contour
    pub fn append_to(&self, pb: &mut tiny_skia::PathBuilder) {
        match *self {
            SegmentShape::Quad { corners } => {
                let [start1, end1, end2, start2] = corners;
                pb.move_to(start1.x, start1.y);
                pb.line_to(end1.x, end1.y);
                pb.line_to(end2.x, end2.y);
                pb.line_to(start2.x, start2.y);
                pb.close();
            }
            SegmentShape::Dot { center, radius } => {
                let (cx, cy, r) = (center.x, center.y, radius);
                let k = KAPPA * r;
                // Quarter arcs right -> top -> left -> bottom, matching the quad winding
                pb.move_to(cx + r, cy);
                pb.cubic_to(cx + r, cy - k, cx + k, cy - r, cx, cy - r);
                pb.cubic_to(cx - k, cy - r, cx - r, cy - k, cx - r, cy);
                pb.cubic_to(cx - r, cy + k, cx - k, cy + r, cx, cy + r);
                pb.cubic_to(cx + k, cy + r, cx + r, cy + k, cx + r, cy);
                pb.close();
            }
        }
    }

    /// Convert to a standalone tiny-skia path
    pub fn to_path(&self) -> Option<tiny_skia::Path> {
        let mut pb = tiny_skia::PathBuilder::new();
        self.append_to(&mut pb);
        pb.finish()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    fn at(p: Point) -> Self {
        Self { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y }
    }

    fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// One pen-down to pen-up gesture as an ordered list of closed shapes.
///
/// Append-only while the gesture is in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokePath {
    shapes: Vec<SegmentShape>,
    bounds: Option<Bounds>,
}

impl StrokePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a shape
    pub fn push(&mut self, shape: SegmentShape) {
        let b = shape.bounds();
        self.bounds = Some(match self.bounds {
            Some(existing) => existing.union(&b),
            None => b,
        });
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> &[SegmentShape] {
        &self.shapes
    }

    /// Shapes appended at or after `index`
    pub fn shapes_since(&self, index: usize) -> &[SegmentShape] {
        &self.shapes[index.min(self.shapes.len())..]
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Number of quad segments (joins and caps excluded)
    pub fn segment_count(&self) -> usize {
        self.shapes.iter().filter(|s| !s.is_dot()).count()
    }

    /// Bounds of all shapes, `None` when empty
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Build one tiny-skia path holding every shape as its own contour.
    ///
    /// Fill with `FillRule::Winding` to get the union.
    pub fn to_path(&self) -> Option<tiny_skia::Path> {
        if self.shapes.is_empty() {
            return None;
        }
        let mut pb = tiny_skia::PathBuilder::with_capacity(self.shapes.len() * 6, self.shapes.len() * 6);
        for shape in &self.shapes {
            shape.append_to(&mut pb);
        }
        pb.finish()
    }
}
