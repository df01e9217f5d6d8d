use crate::constants::{
    FALLBACK_QUALITY, FALLBACK_WIDTH, LADDER_QUALITIES, LADDER_SCALES, MAX_JPEG_DIMENSION,
    MIN_LADDER_DIMENSION,
};

/// One (scale, quality) candidate with the dimensions it resizes to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderStep {
    pub scale: f64,
    pub quality: u8,
    pub width: u32,
    pub height: u32,
}

/// Last-resort encoding: fixed width, proportional height, fixed quality.
///
/// The height is clamped into what a JPEG can hold, so the fallback always encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackStep {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl FallbackStep {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        let scaled = FALLBACK_WIDTH as u64 * height as u64 / width.max(1) as u64;
        Self {
            width: FALLBACK_WIDTH,
            height: (scaled.min(MAX_JPEG_DIMENSION as u64) as u32).max(1),
            quality: FALLBACK_QUALITY,
        }
    }
}

/// Truncating resize, matching how the scale floor is checked.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    (
        (width as f64 * scale) as u32,
        (height as f64 * scale) as u32,
    )
}

/// Ordered candidates for an image of the given size.
///
/// Qualities are swept at full size before any downscaling; scales that would
/// push either side under the pixel floor are skipped entirely.
#[derive(Debug, Clone)]
pub struct CompressionLadder {
    width: u32,
    height: u32,
}

impl CompressionLadder {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn retained_scales(&self) -> impl Iterator<Item = (f64, u32, u32)> + '_ {
        LADDER_SCALES.iter().filter_map(move |&scale| {
            let (w, h) = scaled_dimensions(self.width, self.height, scale);
            if w < MIN_LADDER_DIMENSION
                || h < MIN_LADDER_DIMENSION
                || w > MAX_JPEG_DIMENSION
                || h > MAX_JPEG_DIMENSION
            {
                None
            } else {
                Some((scale, w, h))
            }
        })
    }

    pub fn steps(&self) -> impl Iterator<Item = LadderStep> + '_ {
        self.retained_scales().flat_map(|(scale, width, height)| {
            LADDER_QUALITIES.iter().map(move |&quality| LadderStep {
                scale,
                quality,
                width,
                height,
            })
        })
    }

    pub fn fallback(&self) -> FallbackStep {
        FallbackStep::for_dimensions(self.width, self.height)
    }
}
