//! Size arithmetic and small helpers shared across modules.
//!
//! The batch ceiling is measured in base64 transport bytes while the codec
//! produces raw bytes. The two units never mix implicitly: every crossing
//! goes through `encoded_len` or `raw_budget`.

use crate::constants::{BASE64_ENCODED_GROUP, BASE64_RAW_GROUP, PROGRESS_BAR_TEMPLATE};
use indicatif::{ProgressBar, ProgressStyle};

/// Padded base64 length of `raw_len` bytes.
pub fn encoded_len(raw_len: u64) -> u64 {
    raw_len.div_ceil(BASE64_RAW_GROUP) * BASE64_ENCODED_GROUP
}

/// Largest raw length whose padded base64 form fits in `encoded_budget`.
pub fn raw_budget(encoded_budget: u64) -> u64 {
    encoded_budget / BASE64_ENCODED_GROUP * BASE64_RAW_GROUP
}

/// Create a progress bar with consistent styling. Hidden when `visible` is false.
pub fn create_progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 KB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Reduction as a percentage; negative means the output grew.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}
