use crate::codec::{ImageJpegCodec, JpegCodec};
use crate::constants::{JPEG_MEDIA_TYPE, LADDER_QUALITIES};
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use crate::ladder::{CompressionLadder, FallbackStep, LadderStep};
use crate::normalize::{is_palette_source, normalize};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

/// How the search ended. Both variants are successes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchOutcome {
    /// A ladder step met the target.
    Fitted { step: LadderStep, attempts: usize },
    /// No ladder step fit; the forced fallback was used.
    Fallback { step: FallbackStep, attempts: usize },
}

impl SearchOutcome {
    pub fn attempts(&self) -> usize {
        match self {
            SearchOutcome::Fitted { attempts, .. } | SearchOutcome::Fallback { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SearchOutcome::Fallback { .. })
    }

    pub fn quality(&self) -> u8 {
        match self {
            SearchOutcome::Fitted { step, .. } => step.quality,
            SearchOutcome::Fallback { step, .. } => step.quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressionResult {
    pub data: Vec<u8>,
    pub media_type: String,
    pub outcome: SearchOutcome,
    /// Set when the source had alpha or a palette and was flattened.
    pub media_type_override: Option<&'static str>,
}

/// Decodes an in-memory image.
///
/// Magic bytes win over the declared media type, which is only consulted when
/// sniffing cannot tell the format.
///
/// # Returns
/// * `Ok((image, kind))` - The decoded image and the container it came from
/// * `Err(CompressionError::Decode)` - If the bytes are not a decodable image
pub fn load_image(
    data: &[u8],
    declared_media_type: &str,
) -> Result<(DynamicImage, Option<ImageKind>)> {
    let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    if reader.format().is_none() {
        if let Some(kind) = ImageKind::from_media_type(declared_media_type) {
            reader.set_format(kind.to_image_format());
        }
    }
    let kind = reader.format().and_then(ImageKind::from_image_format);

    let img = reader.decode().map_err(CompressionError::Decode)?;
    Ok((img, kind))
}

/// Lanczos resize; a no-op when the dimensions already match.
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Re-encodes one image so its bytes fit in `target_bytes`, using the default codec.
pub fn recompress(
    data: &[u8],
    declared_media_type: &str,
    target_bytes: u64,
) -> Result<CompressionResult> {
    recompress_with(&ImageJpegCodec, data, declared_media_type, target_bytes)
}

/// Greedy first-fit search over the compression ladder.
///
/// Quality is swept at full size before any downscaling, so the first step
/// that fits is also the highest-fidelity one the ladder offers. When nothing
/// fits, the forced fallback is returned without a size check; the search
/// therefore ends after at most 21 encodes.
pub fn recompress_with<C: JpegCodec + ?Sized>(
    codec: &C,
    data: &[u8],
    declared_media_type: &str,
    target_bytes: u64,
) -> Result<CompressionResult> {
    let (img, kind) = load_image(data, declared_media_type)?;
    let palette = is_palette_source(data, kind);
    let normalized = normalize(img, palette);
    if let Some(forced) = normalized.media_type_override {
        crate::verbose!(
            "Flattened {} source to opaque RGB, output as {}",
            declared_media_type,
            forced
        );
    }
    let img = normalized.image;
    let (width, height) = img.dimensions();
    let ladder = CompressionLadder::for_dimensions(width, height);

    let mut attempts = 0;
    for (scale, scaled_width, scaled_height) in ladder.retained_scales() {
        let resized;
        let candidate = if scale < 1.0 {
            resized = resize_image(&img, scaled_width, scaled_height);
            &resized
        } else {
            &img
        };

        for &quality in LADDER_QUALITIES.iter() {
            let step = LadderStep {
                scale,
                quality,
                width: scaled_width,
                height: scaled_height,
            };
            attempts += 1;
            let encoded = codec.encode(candidate, step.quality)?;
            crate::verbose!(
                "scale {:.2} ({}x{}) quality {} -> {} bytes (target {})",
                step.scale,
                step.width,
                step.height,
                step.quality,
                encoded.len(),
                target_bytes
            );
            if encoded.len() as u64 <= target_bytes {
                return Ok(CompressionResult {
                    data: encoded,
                    media_type: JPEG_MEDIA_TYPE.to_string(),
                    outcome: SearchOutcome::Fitted { step, attempts },
                    media_type_override: normalized.media_type_override,
                });
            }
        }
    }

    let fallback = ladder.fallback();
    let resized = resize_image(&img, fallback.width, fallback.height);
    let encoded = codec.encode(&resized, fallback.quality)?;
    attempts += 1;
    crate::verbose!(
        "ladder exhausted, fallback {}x{} quality {} -> {} bytes",
        fallback.width,
        fallback.height,
        fallback.quality,
        encoded.len()
    );

    Ok(CompressionResult {
        data: encoded,
        media_type: JPEG_MEDIA_TYPE.to_string(),
        outcome: SearchOutcome::Fallback {
            step: fallback,
            attempts,
        },
        media_type_override: normalized.media_type_override,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_ENCODE_ATTEMPTS;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCodec {
        calls: AtomicUsize,
    }

    impl JpegCodec for CountingCodec {
        fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ImageJpegCodec.encode(image, quality)
        }
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn encode_as(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_load_image_rejects_garbage() {
        let result = load_image(b"definitely not an image", "image/png");
        assert!(matches!(result, Err(CompressionError::Decode(_))));
    }

    #[test]
    fn test_load_image_sniffs_despite_wrong_media_type() {
        let png = encode_as(&gradient(20, 10), ImageFormat::Png);
        let (img, kind) = load_image(&png, "image/jpeg").unwrap();
        assert_eq!(img.dimensions(), (20, 10));
        assert_eq!(kind, Some(ImageKind::Png));
    }

    #[test]
    fn test_generous_target_fits_on_first_step() {
        let png = encode_as(&gradient(300, 200), ImageFormat::Png);
        let result = recompress(&png, "image/png", u64::MAX).unwrap();

        assert_eq!(result.media_type, "image/jpeg");
        match result.outcome {
            SearchOutcome::Fitted { step, attempts } => {
                assert_eq!((step.scale, step.quality), (1.0, 85));
                assert_eq!(attempts, 1);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let decoded = image::load_from_memory(&result.data).unwrap();
        assert_eq!(decoded.dimensions(), (300, 200));
    }

    #[test]
    fn test_impossible_target_uses_fallback_after_full_ladder() {
        let png = encode_as(&gradient(400, 400), ImageFormat::Png);
        let codec = CountingCodec {
            calls: AtomicUsize::new(0),
        };
        let result = recompress_with(&codec, &png, "image/png", 1).unwrap();

        assert_eq!(codec.calls.load(Ordering::SeqCst), MAX_ENCODE_ATTEMPTS);
        assert_eq!(result.outcome.attempts(), MAX_ENCODE_ATTEMPTS);
        assert!(result.outcome.is_fallback());
        assert_eq!(result.outcome.quality(), 20);
        let decoded = image::load_from_memory(&result.data).unwrap();
        assert_eq!(decoded.dimensions(), (400, 400));
    }

    #[test]
    fn test_tiny_image_goes_straight_to_fallback() {
        let png = encode_as(&gradient(50, 50), ImageFormat::Png);
        let codec = CountingCodec {
            calls: AtomicUsize::new(0),
        };
        let result = recompress_with(&codec, &png, "image/png", 1).unwrap();
        assert_eq!(codec.calls.load(Ordering::SeqCst), 1);
        assert!(result.outcome.is_fallback());
    }

    #[test]
    fn test_alpha_source_is_flattened() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_fn(160, 120, |x, y| {
            Rgba([x as u8, y as u8, 50, (x % 2 * 255) as u8])
        }));
        let png = encode_as(&rgba, ImageFormat::Png);
        let result = recompress(&png, "image/png", u64::MAX).unwrap();

        assert_eq!(result.media_type_override, Some("image/jpeg"));
        assert_eq!(result.media_type, "image/jpeg");
        let decoded = image::load_from_memory(&result.data).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_gif_source_counts_as_palette() {
        let gif = encode_as(&gradient(120, 120), ImageFormat::Gif);
        let result = recompress(&gif, "image/gif", u64::MAX).unwrap();
        assert_eq!(result.media_type_override, Some("image/jpeg"));
    }

    #[test]
    fn test_recompress_is_deterministic() {
        let png = encode_as(&gradient(256, 256), ImageFormat::Png);
        let first = recompress(&png, "image/png", 4_000).unwrap();
        let second = recompress(&png, "image/png", 4_000).unwrap();
        assert_eq!(first.data, second.data);
        assert_eq!(first.outcome, second.outcome);
    }

    #[test]
    fn test_result_respects_target_or_is_fallback_sized() {
        let png = encode_as(&gradient(512, 384), ImageFormat::Png);
        for target in [1, 6_000, 40_000] {
            let result = recompress(&png, "image/png", target).unwrap();
            let decoded = image::load_from_memory(&result.data).unwrap();
            match result.outcome {
                SearchOutcome::Fitted { step, .. } => {
                    assert!(result.data.len() as u64 <= target);
                    assert_eq!(decoded.dimensions(), (step.width, step.height));
                }
                SearchOutcome::Fallback { step, .. } => {
                    assert_eq!(step, FallbackStep::for_dimensions(512, 384));
                    assert_eq!(decoded.dimensions(), (400, 300));
                }
            }
        }
    }

    #[test]
    fn test_wide_strip_is_recompressed() {
        let png = encode_as(&gradient(17_000, 120), ImageFormat::Png);
        let result = recompress(&png, "image/png", 1_000).unwrap();
        assert_eq!(result.media_type, "image/jpeg");
        assert!(image::load_from_memory(&result.data).is_ok());
    }

    #[test]
    fn test_very_tall_image_fallback_still_encodes() {
        let png = encode_as(&gradient(2, 4000), ImageFormat::Png);
        let result = recompress(&png, "image/png", 1).unwrap();
        match result.outcome {
            SearchOutcome::Fallback { step, attempts } => {
                assert_eq!((step.width, step.height), (400, 65_535));
                assert_eq!(attempts, 1);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
        let decoded = image::load_from_memory(&result.data).unwrap();
        assert_eq!(decoded.dimensions(), (400, 65_535));
    }
}
