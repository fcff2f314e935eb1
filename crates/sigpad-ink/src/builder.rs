//! Weighted-Point Curve Builder
//!
//! Pure functions from raw samples to weighted points and from pairs of
//! weighted points to closed segment shapes.

use crate::point::{Point, WeightedPoint};
use crate::shape::SegmentShape;
use crate::weight::WeightCurve;

/// Segments shorter than this are treated as a single point
pub const DEGENERATE_LENGTH: f32 = 1.0e-3;

/// Curve builder
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveBuilder {
    curve: WeightCurve,
}

impl CurveBuilder {
    /// Create a builder; invalid curve settings are repaired
    pub fn new(curve: WeightCurve) -> Self {
        Self { curve: curve.normalized() }
    }

    pub fn curve(&self) -> &WeightCurve {
        &self.curve
    }

    /// Weigh a full sequence of raw points.
    ///
    /// The output has one weighted point per input point.
    pub fn weighted_points(&self, raw: &[Point]) -> Vec<WeightedPoint> {
        let mut out: Vec<WeightedPoint> = Vec::with_capacity(raw.len());
        for &point in raw {
            let next = self.next_point(out.last(), point);
            out.push(next);
        }
        out
    }

    /// Weigh one sample given the previous weighted point of the stroke
    pub fn next_point(&self, previous: Option<&WeightedPoint>, point: Point) -> WeightedPoint {
        let weight = match previous {
            None => self.curve.min_weight,
            Some(prev) => {
                let target = self.curve.weight_for_distance(prev.position.distance(point));
                self.curve.smooth(prev.weight, target)
            }
        };
        WeightedPoint::new(point, weight)
    }

    /// Closed shape covering the stroke between `a` and `b`.
    ///
    /// Coincident points give a round cap instead of a zero-area quad.
    pub fn segment(&self, a: &WeightedPoint, b: &WeightedPoint) -> SegmentShape {
        let Some(normal) = (b.position - a.position).unit_perpendicular(DEGENERATE_LENGTH) else {
            tracing::trace!("degenerate segment at ({}, {})", a.position.x, a.position.y);
            return SegmentShape::Dot {
                center: a.position,
                radius: a.half_weight().max(b.half_weight()),
            };
        };

        let start_offset = normal * a.half_weight();
        let end_offset = normal * b.half_weight();

        // start1 -> end1 -> end2 -> start2: the far edge runs end to start,
        // so the two offset edges never cross.
        SegmentShape::Quad {
            corners: [
                a.position + start_offset,
                b.position + end_offset,
                b.position - end_offset,
                a.position - start_offset,
            ],
        }
    }

    /// Round join covering the corner at a shared stroke point
    pub fn joint(&self, p: &WeightedPoint) -> SegmentShape {
        SegmentShape::Dot {
            center: p.position,
            radius: p.half_weight(),
        }
    }
}
