pub mod batch;
pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod files;
pub mod formats;
pub mod ladder;
pub mod logger;
pub mod normalize;
pub mod payload;
pub mod planner;
pub mod processing;
pub mod utils;
pub mod wire;

pub use batch::{
    process_batch, process_batch_with, BatchReport, ImageOutcome, ProcessedBatch, ProcessedImage,
};
pub use codec::{ImageJpegCodec, JpegCodec};
pub use config::{BudgetOptions, ErrorPolicy};
pub use error::{CompressionError, ErrorKind, Result};
pub use files::{collect_image_files, load_batch, write_batch};
pub use ladder::{CompressionLadder, FallbackStep, LadderStep};
pub use payload::{Batch, ImagePayload};
pub use planner::{plan, BudgetPlan, Disposition, TargetSize};
pub use processing::{recompress, recompress_with, CompressionResult, SearchOutcome};
pub use wire::{process_json, BatchRequest, BatchResponse, WireImage};
