//! sigpad Ink - Stroke Geometry
//!
//! Turns raw pointer samples into variable-width stroke geometry.
//!
//! This crate provides:
//! - Points and weighted points
//! - Distance-to-weight curve (pen feel configuration)
//! - Curve builder producing tapered segment shapes
//! - Stroke paths convertible to tiny-skia paths
//! - Continuous-line accumulator for the stroke in progress

mod point;
mod weight;
mod builder;
mod shape;
mod line;

pub use point::{Point, WeightedPoint};
pub use weight::WeightCurve;
pub use builder::{CurveBuilder, DEGENERATE_LENGTH};
pub use shape::{Bounds, SegmentShape, StrokePath};
pub use line::{ContinuousLine, LineState};
