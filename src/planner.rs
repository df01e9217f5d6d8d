use crate::constants::BUDGET_HEADROOM_PERCENT;
use crate::payload::Batch;
use crate::utils::raw_budget;

/// Per-image byte budget, kept in both units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    /// Allowance in transport (base64) bytes.
    pub encoded: u64,
    /// Largest raw encoder output whose base64 form still fits `encoded`.
    pub raw: u64,
}

impl TargetSize {
    pub fn from_encoded(encoded: u64) -> Self {
        Self {
            encoded,
            raw: raw_budget(encoded),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    PassThrough,
    Recompress(TargetSize),
}

/// Decision for every image of a batch, indexed like the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetPlan {
    pub total_encoded: u64,
    pub ceiling: u64,
    /// `None` when the whole batch already fits.
    pub allowance: Option<u64>,
    pub entries: Vec<Disposition>,
}

impl BudgetPlan {
    pub fn fits_already(&self) -> bool {
        self.allowance.is_none()
    }

    pub fn scheduled(&self) -> impl Iterator<Item = (usize, TargetSize)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry {
                Disposition::Recompress(target) => Some((index, *target)),
                Disposition::PassThrough => None,
            })
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled().count()
    }
}

/// Uniform share of `ceiling` for `count` images after the reserve is taken off.
pub fn per_image_allowance(ceiling: u64, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    let share = ceiling as u128 * BUDGET_HEADROOM_PERCENT as u128 / 100 / count as u128;
    share as u64
}

/// Decide which images must be recompressed and to what size.
///
/// When the batch already fits nothing is touched. Otherwise every image gets
/// the same allowance and only those above it are scheduled.
pub fn plan(batch: &Batch) -> BudgetPlan {
    let ceiling = batch.max_total_bytes();
    let total_encoded = batch.total_encoded_len();

    if total_encoded <= ceiling {
        return BudgetPlan {
            total_encoded,
            ceiling,
            allowance: None,
            entries: vec![Disposition::PassThrough; batch.len()],
        };
    }

    let allowance = per_image_allowance(ceiling, batch.len());
    let target = TargetSize::from_encoded(allowance);
    let entries = batch
        .images()
        .iter()
        .map(|image| {
            if image.encoded_len() <= allowance {
                Disposition::PassThrough
            } else {
                Disposition::Recompress(target)
            }
        })
        .collect();

    BudgetPlan {
        total_encoded,
        ceiling,
        allowance: Some(allowance),
        entries,
    }
}
