//! Image decoding
//!
//! Decodes externally supplied images via the image crate.

use image::RgbaImage;

use crate::RasterError;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        Self::Unknown
    }

    fn to_image_format(self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Unknown => None,
        }
    }
}

/// Decode PNG or JPEG bytes into straight-alpha RGBA
pub fn decode_image(data: &[u8]) -> Result<RgbaImage, RasterError> {
    let format = ImageFormat::from_bytes(data)
        .to_image_format()
        .ok_or(RasterError::UnsupportedFormat)?;

    let img = image::load_from_memory_with_format(data, format)?;
    let rgba = img.into_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(RasterError::EmptyImage);
    }

    tracing::debug!("Decoded {:?} image {}x{}", format, rgba.width(), rgba.height());
    Ok(rgba)
}
