use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Invalid byte ceiling: {0}. Must be greater than zero")]
    InvalidCeiling(u64),

    #[error("Malformed request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image {index} failed: {source}")]
    Image {
        index: usize,
        #[source]
        source: Box<CompressionError>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

/// Coarse classification used by callers that only care about the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Encode,
    Configuration,
    Io,
}

impl CompressionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompressionError::Decode(_) => ErrorKind::Decode,
            CompressionError::Encode(_) => ErrorKind::Encode,
            CompressionError::InvalidCeiling(_)
            | CompressionError::InvalidRequest(_)
            | CompressionError::UnsupportedFormat(_) => ErrorKind::Configuration,
            CompressionError::Image { source, .. } => source.kind(),
            CompressionError::Io(_)
            | CompressionError::FileNotFound(_)
            | CompressionError::DirectoryCreationFailed(_)
            | CompressionError::NoImageFilesFound(_)
            | CompressionError::WalkdirError(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn at_index(self, index: usize) -> Self {
        CompressionError::Image {
            index,
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for CompressionError {
    fn from(err: serde_json::Error) -> Self {
        CompressionError::InvalidRequest(err.to_string())
    }
}

impl From<base64::DecodeError> for CompressionError {
    fn from(err: base64::DecodeError) -> Self {
        CompressionError::InvalidRequest(format!("image data is not valid base64: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
