use crate::constants::DEFAULT_MAX_TOTAL_BYTES;
use crate::error::{CompressionError, Result};
use crate::utils::encoded_len;

/// One image as it travels through the pipeline: raw bytes plus the media
/// type the caller declared for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: Vec<u8>,
    pub media_type: String,
}

impl ImagePayload {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
        }
    }

    pub fn raw_len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Size in transport (base64) bytes, the unit the batch ceiling is expressed in.
    pub fn encoded_len(&self) -> u64 {
        encoded_len(self.raw_len())
    }
}

/// An ordered set of images sharing one byte ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    images: Vec<ImagePayload>,
    max_total_bytes: u64,
}

impl Batch {
    pub fn new(images: Vec<ImagePayload>, max_total_bytes: u64) -> Result<Self> {
        if max_total_bytes == 0 {
            return Err(CompressionError::InvalidCeiling(max_total_bytes));
        }
        Ok(Self {
            images,
            max_total_bytes,
        })
    }

    pub fn with_default_ceiling(images: Vec<ImagePayload>) -> Self {
        Self {
            images,
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
        }
    }

    pub fn images(&self) -> &[ImagePayload] {
        &self.images
    }

    pub fn max_total_bytes(&self) -> u64 {
        self.max_total_bytes
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn total_encoded_len(&self) -> u64 {
        self.images.iter().map(ImagePayload::encoded_len).sum()
    }

    pub fn into_images(self) -> Vec<ImagePayload> {
        self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_rejects_zero_ceiling() {
        let result = Batch::new(vec![], 0);
        assert!(matches!(result, Err(CompressionError::InvalidCeiling(0))));
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let batch = Batch::new(vec![], 10).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.total_encoded_len(), 0);
    }

    #[test]
    fn test_total_encoded_len_sums_base64_sizes() {
        let batch = Batch::with_default_ceiling(vec![
            ImagePayload::new(vec![0; 3], "image/png"),
            ImagePayload::new(vec![0; 4], "image/png"),
        ]);
        assert_eq!(batch.total_encoded_len(), 4 + 8);
        assert_eq!(batch.max_total_bytes(), DEFAULT_MAX_TOTAL_BYTES);
    }
}
