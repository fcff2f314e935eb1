//! Raster Buffer
//!
//! The persistent bitmap holding every committed stroke and imported image.

use image::RgbaImage;
use image::imageops::FilterType;
use sigpad_ink::StrokePath;
use tiny_skia::{FillRule, FilterQuality, Paint, Pixmap, PixmapPaint, Transform};

use crate::placement::{ImagePosition, contain};
use crate::snapshot::RasterImage;
use crate::{Color, RasterError};

/// Fill a stroke path into a pixmap with anti-aliasing.
///
/// Returns `false` when the path has nothing to draw.
pub fn fill_stroke(pixmap: &mut Pixmap, path: &StrokePath, color: Color) -> bool {
    let Some(skia_path) = path.to_path() else {
        return false;
    };

    let mut paint = Paint::default();
    paint.set_color(color.to_tiny_skia());
    paint.anti_alias = true;

    pixmap.fill_path(&skia_path, &paint, FillRule::Winding, Transform::identity(), None);
    true
}

/// Committed signature pixels
#[derive(Debug, Clone)]
pub struct RasterBuffer {
    pixmap: Pixmap,
    /// Set once anything has been composited since the last clear
    committed: bool,
}

impl RasterBuffer {
    /// Allocate a transparent buffer
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroSize);
        }
        let pixmap = Pixmap::new(width, height).ok_or(RasterError::TooLarge(width, height))?;
        tracing::debug!("Allocated raster buffer {}x{}", width, height);
        Ok(Self { pixmap, committed: false })
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

    /// True once a stroke or image has been merged in
    pub fn has_content(&self) -> bool {
        self.committed
    }

    /// Merge a finished stroke
    pub fn composite_stroke(&mut self, path: &StrokePath, color: Color) -> bool {
        let drawn = fill_stroke(&mut self.pixmap, path, color);
        if drawn {
            self.committed = true;
            tracing::debug!(shapes = path.len(), "Composited stroke");
        }
        drawn
    }

    /// Merge an external image, scaled to fit and centered
    pub fn composite_image(&mut self, image: &RgbaImage) -> Result<(), RasterError> {
        let fit = contain(
            image.width() as f32,
            image.height() as f32,
            self.width() as f32,
            self.height() as f32,
            ImagePosition::CENTER,
        )
        .ok_or(RasterError::EmptyImage)?;

        let (w, h) = fit.pixel_size();
        let scaled = if (w, h) == image.dimensions() {
            image.clone()
        } else {
            image::imageops::resize(image, w, h, FilterType::Triangle)
        };
        let source = RasterImage::from_rgba(&scaled)?;

        self.pixmap.draw_pixmap(
            fit.x.round() as i32,
            fit.y.round() as i32,
            source.pixmap().as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        self.committed = true;

        tracing::debug!(
            "Composited image {}x{} at ({}, {}) as {}x{}",
            image.width(), image.height(), fit.x, fit.y, w, h
        );
        Ok(())
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.committed = false;
    }

    /// New buffer of another size with the committed pixels rescaled.
    ///
    /// Scaling is uniform so strokes keep their shape; the old content is
    /// centered in the new bounds.
    pub fn resized(&self, width: u32, height: u32) -> Result<RasterBuffer, RasterError> {
        let mut out = RasterBuffer::new(width, height)?;
        if !self.committed {
            return Ok(out);
        }

        let fit = contain(
            self.width() as f32,
            self.height() as f32,
            width as f32,
            height as f32,
            ImagePosition::CENTER,
        )
        .ok_or(RasterError::ZeroSize)?;

        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..PixmapPaint::default()
        };
        out.pixmap.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &paint,
            Transform::from_row(fit.scale, 0.0, 0.0, fit.scale, fit.x, fit.y),
            None,
        );
        out.committed = true;

        tracing::debug!(
            "Rescaled raster {}x{} -> {}x{} (scale {})",
            self.width(), self.height(), width, height, fit.scale
        );
        Ok(out)
    }

    /// Snapshot of the committed pixels, `None` when nothing is committed
    pub fn snapshot(&self) -> Option<RasterImage> {
        self.committed.then(|| RasterImage::from_pixmap(self.pixmap.clone()))
    }
}
