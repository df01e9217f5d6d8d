/// Media type handling for payloads.
///
/// Requests carry a declared media type string; files carry an extension.
/// Both map onto `ImageKind`, which in turn maps onto the `image` crate's
/// `ImageFormat` for decoding.

use crate::error::{CompressionError, Result};
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
    Bmp,
    Tiff,
    Gif,
}

impl ImageKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "webp" => Some(ImageKind::WebP),
            "bmp" => Some(ImageKind::Bmp),
            "tiff" | "tif" => Some(ImageKind::Tiff),
            "gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    /// Parses a declared media type, ignoring parameters such as `; charset=`.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::WebP),
            "image/bmp" | "image/x-bmp" => Some(ImageKind::Bmp),
            "image/tiff" => Some(ImageKind::Tiff),
            "image/gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Png => Some(ImageKind::Png),
            ImageFormat::WebP => Some(ImageKind::WebP),
            ImageFormat::Bmp => Some(ImageKind::Bmp),
            ImageFormat::Tiff => Some(ImageKind::Tiff),
            ImageFormat::Gif => Some(ImageKind::Gif),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::WebP => "webp",
            ImageKind::Bmp => "bmp",
            ImageKind::Tiff => "tiff",
            ImageKind::Gif => "gif",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::WebP => "image/webp",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Tiff => "image/tiff",
            ImageKind::Gif => "image/gif",
        }
    }

    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Png => ImageFormat::Png,
            ImageKind::WebP => ImageFormat::WebP,
            ImageKind::Bmp => ImageFormat::Bmp,
            ImageKind::Tiff => ImageFormat::Tiff,
            ImageKind::Gif => ImageFormat::Gif,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
            ImageKind::WebP => "WebP",
            ImageKind::Bmp => "BMP",
            ImageKind::Tiff => "TIFF",
            ImageKind::Gif => "GIF",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ImageKind {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        ImageKind::from_media_type(s)
            .or_else(|| ImageKind::from_extension(s))
            .ok_or_else(|| CompressionError::UnsupportedFormat(s.to_string()))
    }
}

/// Media type for a file on disk, judged by its extension.
pub fn media_type_for_path(path: &Path) -> Result<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageKind::from_extension)
        .map(|kind| kind.media_type())
        .ok_or_else(|| CompressionError::UnsupportedFormat(path.display().to_string()))
}

/// File extension for an output media type. Unknown types keep a neutral `bin`.
pub fn extension_for_media_type(media_type: &str) -> &'static str {
    ImageKind::from_media_type(media_type)
        .map(|kind| kind.extension())
        .unwrap_or("bin")
}
