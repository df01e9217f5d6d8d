use crate::error::{CompressionError, Result};

/// What to do when one image of a batch cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// First failure aborts the batch; no partial output.
    #[default]
    AbortBatch,
    /// Keep going and report the failure on that image's entry.
    Isolate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BudgetOptions {
    /// Overrides the ceiling carried by the request.
    pub max_total_bytes: Option<u64>,
    /// Recompress scheduled images on the rayon pool.
    pub parallel: bool,
    pub error_policy: ErrorPolicy,
    pub show_progress: bool,
}

impl BudgetOptions {
    pub fn new(
        max_total_bytes: Option<u64>,
        parallel: bool,
        keep_going: bool,
        show_progress: bool,
    ) -> Result<Self> {
        if let Some(0) = max_total_bytes {
            return Err(CompressionError::InvalidCeiling(0));
        }

        Ok(Self {
            max_total_bytes,
            parallel,
            error_policy: if keep_going {
                ErrorPolicy::Isolate
            } else {
                ErrorPolicy::AbortBatch
            },
            show_progress,
        })
    }

    /// The ceiling to use for a batch whose request named `requested` (if anything).
    pub fn resolve_ceiling(&self, requested: Option<u64>) -> u64 {
        self.max_total_bytes
            .or(requested)
            .unwrap_or(crate::constants::DEFAULT_MAX_TOTAL_BYTES)
    }
}
