//! Color-model normalization ahead of JPEG encoding.
//!
//! JPEG has no alpha channel and no palette, so those images are flattened to
//! opaque RGB once, before the ladder runs. Alpha is dropped, not composited.

use crate::constants::JPEG_MEDIA_TYPE;
use crate::formats::ImageKind;
use image::DynamicImage;

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
const PNG_COLOR_TYPE_OFFSET: usize = 25;
const PNG_COLOR_TYPE_INDEXED: u8 = 3;

#[derive(Debug)]
pub struct Normalized {
    pub image: DynamicImage,
    /// Set when the source could not be carried as-is into a JPEG.
    pub media_type_override: Option<&'static str>,
}

/// True when the encoded source stores pixels through a palette.
///
/// The decoder expands palettes to RGB(A), so this has to be read from the
/// container itself.
pub fn is_palette_source(data: &[u8], kind: Option<ImageKind>) -> bool {
    match kind {
        Some(ImageKind::Gif) => true,
        Some(ImageKind::Png) => {
            data.len() > PNG_COLOR_TYPE_OFFSET
                && data.starts_with(PNG_SIGNATURE)
                && data[PNG_COLOR_TYPE_OFFSET] == PNG_COLOR_TYPE_INDEXED
        }
        _ => false,
    }
}

pub fn has_alpha(image: &DynamicImage) -> bool {
    image.color().has_alpha()
}

pub fn normalize(image: DynamicImage, palette_source: bool) -> Normalized {
    if has_alpha(&image) || palette_source {
        return Normalized {
            image: DynamicImage::ImageRgb8(image.to_rgb8()),
            media_type_override: Some(JPEG_MEDIA_TYPE),
        };
    }

    Normalized {
        image,
        media_type_override: None,
    }
}
