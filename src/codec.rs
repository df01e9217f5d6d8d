use crate::error::{CompressionError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType};
use std::io::Cursor;

/// JPEG encoding capability used by the recompressor.
///
/// Implementations must be deterministic: identical pixels and quality give
/// identical bytes.
pub trait JpegCodec: Send + Sync {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>>;
}

/// Baseline JPEG encoder from the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageJpegCodec;

impl JpegCodec for ImageJpegCodec {
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality);

            match image {
                DynamicImage::ImageLuma8(gray) => encoder
                    .encode(gray.as_raw(), gray.width(), gray.height(), ExtendedColorType::L8)
                    .map_err(CompressionError::Encode)?,
                DynamicImage::ImageRgb8(rgb) => encoder
                    .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                    .map_err(CompressionError::Encode)?,
                // 16-bit and float layouts are narrowed here; alpha was removed earlier.
                other => {
                    let rgb = other.to_rgb8();
                    encoder
                        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                        .map_err(CompressionError::Encode)?
                }
            }
        }

        Ok(buffer)
    }
}
