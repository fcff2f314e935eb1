//! Points
//!
//! Raw pointer samples and weighted stroke points.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// 2D point in canvas coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f32 {
        (other - *self).length()
    }

    /// Vector length when the point is read as a vector
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector rotated 90 degrees from this one.
    ///
    /// Returns `None` for vectors too short to have a direction.
    pub fn unit_perpendicular(&self, min_length: f32) -> Option<Point> {
        let len = self.length();
        if !len.is_finite() || len < min_length {
            return None;
        }
        Some(Point::new(-self.y / len, self.x / len))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// A stroke point carrying the local stroke thickness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoint {
    pub position: Point,
    /// Full stroke width at this point
    pub weight: f32,
}

impl WeightedPoint {
    pub const fn new(position: Point, weight: f32) -> Self {
        Self { position, weight }
    }

    /// Half the stroke width, the offset used for the segment edges
    pub fn half_weight(&self) -> f32 {
        self.weight * 0.5
    }
}
