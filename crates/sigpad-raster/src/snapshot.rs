//! Raster snapshots
//!
//! Immutable copies of the committed pixels handed to callers.

use image::RgbaImage;
use tiny_skia::{ColorU8, Pixmap};

use crate::{Color, RasterError};

/// Premultiplied RGBA image with a transparent background
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixmap: Pixmap,
}

impl RasterImage {
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// Premultiply a straight-alpha image
    pub fn from_rgba(image: &RgbaImage) -> Result<Self, RasterError> {
        let mut pixmap = Pixmap::new(image.width(), image.height()).ok_or(RasterError::ZeroSize)?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha color at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(c.red(), c.green(), c.blue(), c.alpha()))
    }

    /// Number of pixels with any coverage
    pub fn covered_pixels(&self) -> usize {
        self.pixmap.pixels().iter().filter(|p| p.alpha() > 0).count()
    }

    pub fn is_transparent(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Demultiply into a straight-alpha image
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width(), self.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Encode as PNG
    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))
    }
}
