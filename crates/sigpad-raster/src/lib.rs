//! sigpad Raster - Committed Signature Pixels
//!
//! CPU compositing of finished strokes and imported images using tiny-skia.
//!
//! This crate provides:
//! - Raster buffer backed by a premultiplied tiny-skia Pixmap
//! - Stroke path filling in a single foreground color
//! - Image decoding and aspect-fit placement (image crate)
//! - Rescaling of committed pixels on canvas resize
//! - Immutable snapshots with PNG export

mod buffer;
mod decode;
mod placement;
mod snapshot;

pub use buffer::{RasterBuffer, fill_stroke};
pub use decode::{ImageFormat, decode_image};
pub use placement::{FitRect, ImagePosition, contain};
pub use snapshot::RasterImage;

use serde::{Deserialize, Serialize};

/// Raster errors
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Raster size is zero")]
    ZeroSize,

    #[error("Cannot allocate a {0}x{1} raster")]
    TooLarge(u32, u32),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Color (RGBA, straight alpha)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create from hex string (e.g., "#1a237e")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Color::rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::rgb(r, g, b))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color::rgba(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Convert to a tiny-skia color
    pub fn to_tiny_skia(&self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}
