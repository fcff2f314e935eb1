//! Weight Curve
//!
//! Maps the distance between consecutive samples to a stroke weight.
//! Slow movement (short distance) draws thick, fast movement draws thin.

use serde::{Deserialize, Serialize};

/// Pen feel configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightCurve {
    /// Thinnest stroke width (fast movement)
    pub min_weight: f32,
    /// Thickest stroke width (slow movement)
    pub max_weight: f32,
    /// Distance at which the weight is halfway between max and min
    pub falloff_distance: f32,
    /// Share of the previous weight kept for the next point (0 = none)
    pub smoothing: f32,
}

impl Default for WeightCurve {
    fn default() -> Self {
        Self {
            min_weight: 1.5,
            max_weight: 4.5,
            falloff_distance: 8.0,
            smoothing: 0.35,
        }
    }
}

impl WeightCurve {
    /// Create a curve with the given bounds and default shape
    pub fn new(min_weight: f32, max_weight: f32) -> Self {
        Self {
            min_weight,
            max_weight,
            ..Self::default()
        }
    }

    /// Copy with invalid settings repaired.
    ///
    /// Non-finite or negative values fall back to the defaults, swapped
    /// bounds are put back in order and smoothing is kept below 1.
    pub fn normalized(&self) -> Self {
        let defaults = Self::default();
        let valid = |v: f32| v.is_finite() && v >= 0.0;

        let mut min = if valid(self.min_weight) { self.min_weight } else { defaults.min_weight };
        let mut max = if valid(self.max_weight) { self.max_weight } else { defaults.max_weight };
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }

        let falloff = if valid(self.falloff_distance) && self.falloff_distance > 0.0 {
            self.falloff_distance
        } else {
            defaults.falloff_distance
        };
        let smoothing = if valid(self.smoothing) { self.smoothing.min(0.95) } else { defaults.smoothing };

        Self {
            min_weight: min,
            max_weight: max,
            falloff_distance: falloff,
            smoothing,
        }
    }

    /// Clamp a weight into `[min_weight, max_weight]`
    pub fn clamp(&self, weight: f32) -> f32 {
        if !weight.is_finite() {
            return self.min_weight;
        }
        weight.clamp(self.min_weight, self.max_weight)
    }

    /// Target weight for a sample `distance` away from the previous one
    pub fn weight_for_distance(&self, distance: f32) -> f32 {
        if !distance.is_finite() {
            return self.min_weight;
        }
        let d = distance.max(0.0);
        let t = d / (d + self.falloff_distance);
        self.clamp(self.max_weight - (self.max_weight - self.min_weight) * t)
    }

    /// Blend a target weight with the previous point's weight
    pub fn smooth(&self, previous: f32, target: f32) -> f32 {
        self.clamp(previous * self.smoothing + target * (1.0 - self.smoothing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_decreases_with_distance() {
        let curve = WeightCurve::default();
        let mut last = f32::MAX;
        for d in [0.0, 0.5, 1.0, 4.0, 8.0, 20.0, 100.0, 1000.0] {
            let w = curve.weight_for_distance(d);
            assert!(w <= last, "weight grew at distance {}", d);
            last = w;
        }
    }

    #[test]
    fn test_weight_endpoints() {
        let curve = WeightCurve::default();
        assert_eq!(curve.weight_for_distance(0.0), curve.max_weight);

        let half = curve.weight_for_distance(curve.falloff_distance);
        assert!((half - (curve.min_weight + curve.max_weight) / 2.0).abs() < 1e-5);

        let far = curve.weight_for_distance(1.0e9);
        assert!(far >= curve.min_weight && far - curve.min_weight < 1e-3);
    }

    #[test]
    fn test_weight_non_finite_distance() {
        let curve = WeightCurve::default();
        assert_eq!(curve.weight_for_distance(f32::NAN), curve.min_weight);
        assert_eq!(curve.weight_for_distance(f32::INFINITY), curve.min_weight);
    }

    #[test]
    fn test_normalized_swaps_bounds() {
        let curve = WeightCurve::new(6.0, 2.0).normalized();
        assert_eq!(curve.min_weight, 2.0);
        assert_eq!(curve.max_weight, 6.0);
    }

    #[test]
    fn test_normalized_repairs_garbage() {
        let curve = WeightCurve {
            min_weight: f32::NAN,
            max_weight: -3.0,
            falloff_distance: 0.0,
            smoothing: 4.0,
        }
        .normalized();
        let defaults = WeightCurve::default();
        assert_eq!(curve.min_weight, defaults.min_weight);
        assert_eq!(curve.max_weight, defaults.max_weight);
        assert_eq!(curve.falloff_distance, defaults.falloff_distance);
        assert!(curve.smoothing < 1.0);
    }

    #[test]
    fn test_smooth_stays_in_bounds() {
        let curve = WeightCurve::default();
        let w = curve.smooth(curve.max_weight, curve.min_weight);
        assert!(w >= curve.min_weight && w <= curve.max_weight);
        assert!(w > curve.min_weight);
    }
}
