use crate::batch::ProcessedBatch;
use crate::constants::SUPPORTED_IMAGE_EXTENSIONS;
use crate::error::{CompressionError, Result};
use crate::formats::{extension_for_media_type, media_type_for_path};
use crate::payload::{Batch, ImagePayload};
use glob::glob;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Collects image files from a single file, a directory or a glob pattern.
///
/// Hidden entries are skipped when walking directories. The result is sorted
/// so the batch order does not depend on directory iteration order.
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path)
        } else {
            WalkDir::new(input_path).max_depth(1)
        };

        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else if let Ok(glob_pattern) = glob(input) {
        for entry in glob_pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    } else {
        return Err(CompressionError::NoImageFilesFound(input.to_string()));
    }

    image_files.sort();
    Ok(image_files)
}

/// Reads every file into a payload, with the media type taken from its extension.
pub fn load_batch(paths: &[PathBuf], max_total_bytes: u64) -> Result<Batch> {
    let images = paths
        .iter()
        .map(|path| {
            if !path.exists() {
                return Err(CompressionError::FileNotFound(path.clone()));
            }
            let media_type = media_type_for_path(path)?;
            Ok(ImagePayload::new(fs::read(path)?, media_type))
        })
        .collect::<Result<Vec<_>>>()?;
    Batch::new(images, max_total_bytes)
}

/// `<output_dir>/<stem>.<ext>`, where the extension follows the output media type.
///
/// `taken` holds names already handed out; clashes get a numeric suffix.
pub fn generate_output_path(
    input_path: &Path,
    output_dir: &Path,
    media_type: &str,
    taken: &mut HashSet<PathBuf>,
) -> Result<PathBuf> {
    let file_stem = input_path
        .file_stem()
        .ok_or_else(|| CompressionError::UnsupportedFormat("Invalid file name".to_string()))?
        .to_string_lossy();
    let extension = extension_for_media_type(media_type);

    let mut candidate = output_dir.join(format!("{}.{}", file_stem, extension));
    let mut suffix = 1;
    while taken.contains(&candidate) {
        candidate = output_dir.join(format!("{}-{}.{}", file_stem, suffix, extension));
        suffix += 1;
    }
    taken.insert(candidate.clone());
    Ok(candidate)
}

/// Writes each processed image next to its siblings in `output_dir`.
///
/// `sources` must be the paths the batch was loaded from, in the same order.
pub fn write_batch(
    processed: &ProcessedBatch,
    sources: &[PathBuf],
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .map_err(|_| CompressionError::DirectoryCreationFailed(output_dir.to_path_buf()))?;

    let mut taken = HashSet::new();
    let mut written = Vec::with_capacity(sources.len());
    for (source, payload) in sources.iter().zip(processed.payloads()) {
        let output_path = generate_output_path(source, output_dir, &payload.media_type, &mut taken)?;
        fs::write(&output_path, &payload.data)?;
        written.push(output_path);
    }
    Ok(written)
}
