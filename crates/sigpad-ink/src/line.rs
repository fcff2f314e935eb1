//! Continuous Line
//!
//! Accumulates the stroke in progress. Each appended sample adds only the
//! shapes for its new segment, so update cost follows new input rather than
//! total stroke length.

use crate::builder::CurveBuilder;
use crate::point::{Point, WeightedPoint};
use crate::shape::{SegmentShape, StrokePath};
use crate::weight::WeightCurve;

/// Accumulator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// No gesture in progress
    Idle,
    /// At least one sample received
    Accumulating,
}

/// The in-progress stroke
#[derive(Debug, Clone)]
pub struct ContinuousLine {
    builder: CurveBuilder,
    round_joins: bool,
    last: Option<WeightedPoint>,
    point_count: usize,
    path: StrokePath,
    /// Index of the first shape not yet handed out by `take_tail`
    tail_start: usize,
}

impl Default for ContinuousLine {
    fn default() -> Self {
        Self::new(WeightCurve::default(), true)
    }
}

impl ContinuousLine {
    /// Create an idle accumulator
    pub fn new(curve: WeightCurve, round_joins: bool) -> Self {
        Self {
            builder: CurveBuilder::new(curve),
            round_joins,
            last: None,
            point_count: 0,
            path: StrokePath::new(),
            tail_start: 0,
        }
    }

    pub fn state(&self) -> LineState {
        if self.point_count == 0 {
            LineState::Idle
        } else {
            LineState::Accumulating
        }
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Most recent accepted sample
    pub fn last_point(&self) -> Option<WeightedPoint> {
        self.last
    }

    /// Append a raw sample.
    ///
    /// Returns how many shapes were added to the path.
    pub fn append(&mut self, point: Point) -> usize {
        if !point.is_finite() {
            tracing::warn!("Dropping non-finite sample ({}, {})", point.x, point.y);
            return 0;
        }

        // Repeated samples mid-stroke would only add a cap at full weight
        if self.point_count >= 2 && self.last.is_some_and(|last| last.position == point) {
            tracing::trace!("Skipping repeated sample");
            return 0;
        }

        let weighted = self.builder.next_point(self.last.as_ref(), point);
        let before = self.path.len();

        if let Some(prev) = self.last {
            // Round join at the shared point, only between two segments
            if self.round_joins && self.point_count >= 2 {
                self.path.push(self.builder.joint(&prev));
            }
            self.path.push(self.builder.segment(&prev, &weighted));
        }

        self.last = Some(weighted);
        self.point_count += 1;

        let added = self.path.len() - before;
        tracing::trace!(points = self.point_count, added, "line append");
        added
    }

    /// Live path, `None` until the first segment exists
    pub fn path(&self) -> Option<&StrokePath> {
        if self.path.is_empty() {
            None
        } else {
            Some(&self.path)
        }
    }

    /// Shapes appended since the previous call
    pub fn take_tail(&mut self) -> &[SegmentShape] {
        let start = self.tail_start;
        self.tail_start = self.path.len();
        self.path.shapes_since(start)
    }

    /// Finish the gesture.
    ///
    /// Returns `None` when fewer than two samples were appended.
    pub fn end_line(&mut self) -> Option<StrokePath> {
        let point_count = self.point_count;
        let path = std::mem::take(&mut self.path);
        self.discard();

        if point_count < 2 || path.is_empty() {
            tracing::debug!(points = point_count, "line ended without a mark");
            return None;
        }
        tracing::debug!(points = point_count, shapes = path.len(), "line ended");
        Some(path)
    }

    /// Drop the gesture without returning it
    pub fn discard(&mut self) {
        self.last = None;
        self.point_count = 0;
        self.path = StrokePath::new();
        self.tail_start = 0;
    }
}
