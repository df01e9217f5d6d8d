//! JSON request/response with base64 payloads.
//!
//! Request:  `{"images": [{"data": "...", "media_type": "image/png"}], "max_total_bytes": 8000000}`
//! Response: `{"images": [{"data": "...", "media_type": "image/jpeg"}]}`

use crate::batch::{process_batch, ImageOutcome, ProcessedBatch};
use crate::config::BudgetOptions;
use crate::error::Result;
use crate::payload::{Batch, ImagePayload};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireImage {
    pub data: String,
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub images: Vec<WireImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub images: Vec<WireImage>,
}

impl BatchRequest {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_payloads(payloads: &[ImagePayload], max_total_bytes: Option<u64>) -> Self {
        Self {
            images: payloads.iter().map(WireImage::from_payload).collect(),
            max_total_bytes,
        }
    }

    /// Decodes every payload and validates the ceiling before any image work starts.
    pub fn into_batch(self, options: &BudgetOptions) -> Result<Batch> {
        let ceiling = options.resolve_ceiling(self.max_total_bytes);
        let images = self
            .images
            .into_iter()
            .enumerate()
            .map(|(index, image)| image.into_payload().map_err(|err| err.at_index(index)))
            .collect::<Result<Vec<_>>>()?;
        Batch::new(images, ceiling)
    }
}

impl WireImage {
    pub fn from_payload(payload: &ImagePayload) -> Self {
        Self {
            data: STANDARD.encode(&payload.data),
            media_type: payload.media_type.clone(),
            error: None,
        }
    }

    /// Line-wrapped or space-padded base64 is accepted; whitespace is ignored.
    pub fn into_payload(self) -> Result<ImagePayload> {
        let compact: Vec<u8> = self
            .data
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let data = STANDARD.decode(&compact)?;
        Ok(ImagePayload::new(data, self.media_type))
    }
}

impl BatchResponse {
    pub fn from_processed(processed: &ProcessedBatch) -> Self {
        let images = processed
            .images
            .iter()
            .map(|image| {
                let mut wire = WireImage::from_payload(&image.payload);
                if let ImageOutcome::Failed(message) = &image.outcome {
                    wire.error = Some(message.clone());
                }
                wire
            })
            .collect();
        Self { images }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Full request-to-response pass over JSON text.
pub fn process_json(input: &str, options: &BudgetOptions) -> Result<String> {
    let batch = BatchRequest::from_json(input)?.into_batch(options)?;
    let processed = process_batch(batch, options)?;
    BatchResponse::from_processed(&processed).to_json()
}
