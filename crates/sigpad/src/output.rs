//! Signature output
//!
//! Snapshots handed to callbacks: committed pixels plus the live stroke.

use std::sync::Arc;

use sigpad_ink::StrokePath;
use sigpad_raster::{Color, RasterError, RasterImage, fill_stroke};
use tiny_skia::Pixmap;

use crate::SignatureError;

/// Canvas size in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const ZERO: Self = Self { width: 0, height: 0 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero
    pub fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Snapshot of the signature at one point in the worker's timeline
#[derive(Debug, Clone)]
pub struct SignatureOutput {
    /// Committed pixels, `None` when nothing is committed
    pub raster: Option<Arc<RasterImage>>,
    /// Stroke in progress, `None` when no gesture is active
    pub live_path: Option<StrokePath>,
    /// Color for drawing the live path
    pub color: Color,
    /// Canvas size the raster belongs to
    pub size: CanvasSize,
}

impl SignatureOutput {
    /// Nothing committed and nothing live
    pub fn is_empty(&self) -> bool {
        self.raster.is_none() && self.live_path.is_none()
    }

    /// Raster and live stroke merged into one image.
    ///
    /// Fails with `Unsized` when the canvas has no size and with `Export`
    /// when a canvas-sized pixmap cannot be allocated.
    pub fn flatten(&self) -> Result<RasterImage, SignatureError> {
        let CanvasSize { width, height } = self.size;
        if self.size.is_zero() {
            return Err(SignatureError::Unsized);
        }

        let mut pixmap = match &self.raster {
            Some(raster) => raster.pixmap().clone(),
            None => Pixmap::new(width, height)
                .ok_or(SignatureError::Export(RasterError::TooLarge(width, height)))?,
        };
        if let Some(path) = &self.live_path {
            fill_stroke(&mut pixmap, path, self.color);
        }
        Ok(RasterImage::from_pixmap(pixmap))
    }
}
