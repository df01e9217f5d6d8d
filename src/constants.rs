/// Aggregate ceiling used when a request does not name one.
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 8_000_000;

/// Share of the ceiling handed out to images; the rest is kept in reserve.
pub const BUDGET_HEADROOM_PERCENT: u64 = 90;

// base64 turns every 3 raw bytes into 4 transport bytes.
pub const BASE64_RAW_GROUP: u64 = 3;
pub const BASE64_ENCODED_GROUP: u64 = 4;

pub const LADDER_SCALES: [f64; 5] = [1.0, 0.75, 0.5, 0.35, 0.25];
pub const LADDER_QUALITIES: [u8; 4] = [85, 60, 40, 25];

/// Smallest width or height a ladder step may produce.
pub const MIN_LADDER_DIMENSION: u32 = 100;

pub const FALLBACK_WIDTH: u32 = 400;
pub const FALLBACK_QUALITY: u8 = 20;

/// Upper bound on encode attempts for a single image.
pub const MAX_ENCODE_ATTEMPTS: usize = LADDER_SCALES.len() * LADDER_QUALITIES.len() + 1;

/// Largest side a baseline JPEG can store.
pub const MAX_JPEG_DIMENSION: u32 = u16::MAX as u32;

pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif"];

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
