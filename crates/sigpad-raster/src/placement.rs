//! Placement
//!
//! Aspect-ratio preserving fit of a source size inside a destination box.

/// Image position anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePosition {
    /// Horizontal position (0.0 = left, 0.5 = center, 1.0 = right)
    pub x: f32,
    /// Vertical position (0.0 = top, 0.5 = center, 1.0 = bottom)
    pub y: f32,
}

impl ImagePosition {
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
    pub const TOP_LEFT: Self = Self { x: 0.0, y: 0.0 };
}

impl Default for ImagePosition {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Destination rectangle plus the uniform scale that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl FitRect {
    /// Pixel size of the placed image, never zero
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }
}

/// Scale to fit, preserving aspect ratio (may letterbox).
///
/// Returns `None` when either size is empty.
pub fn contain(src_w: f32, src_h: f32, dst_w: f32, dst_h: f32, position: ImagePosition) -> Option<FitRect> {
    if !(src_w > 0.0 && src_h > 0.0 && dst_w > 0.0 && dst_h > 0.0) {
        return None;
    }

    let scale = (dst_w / src_w).min(dst_h / src_h);
    let width = src_w * scale;
    let height = src_h * scale;

    Some(FitRect {
        x: (dst_w - width) * position.x,
        y: (dst_h - height) * position.y,
        width,
        height,
        scale,
    })
}
