//! Signature configuration

use serde::{Deserialize, Serialize};
use sigpad_ink::WeightCurve;
use sigpad_raster::Color;

/// Model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// Pen feel: stroke width as a function of sample spacing
    pub weight: WeightCurve,
    /// Initial stroke color
    pub color: Color,
    /// Insert round joins between consecutive segments
    pub round_joins: bool,
    /// Name of the raster worker thread
    pub worker_name: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            weight: WeightCurve::default(),
            color: Color::BLACK,
            round_joins: true,
            worker_name: "sigpad-raster".to_string(),
        }
    }
}
