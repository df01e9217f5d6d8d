use crate::codec::{ImageJpegCodec, JpegCodec};
use crate::config::{BudgetOptions, ErrorPolicy};
use crate::error::Result;
use crate::logger::is_quiet;
use crate::payload::{Batch, ImagePayload};
use crate::planner::{plan, BudgetPlan, Disposition};
use crate::processing::{recompress_with, SearchOutcome};
use crate::utils::{calculate_compression_ratio, create_progress_bar, format_file_size};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// What happened to one image of the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    PassThrough,
    Recompressed(SearchOutcome),
    /// Only produced under `ErrorPolicy::Isolate`; the payload is the original.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub payload: ImagePayload,
    pub outcome: ImageOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub pass_through: usize,
    pub recompressed: usize,
    pub fallback: usize,
    pub failed: usize,
    /// Encoded (base64) size of the input batch.
    pub total_before: u64,
    /// Encoded (base64) size of the output batch.
    pub total_after: u64,
    pub elapsed: Duration,
}

impl BatchReport {
    fn from_images(images: &[ProcessedImage], total_before: u64, elapsed: Duration) -> Self {
        let mut report = BatchReport {
            total_before,
            elapsed,
            ..Default::default()
        };
        for image in images {
            report.total_after += image.payload.encoded_len();
            match &image.outcome {
                ImageOutcome::PassThrough => report.pass_through += 1,
                ImageOutcome::Recompressed(outcome) => {
                    report.recompressed += 1;
                    if outcome.is_fallback() {
                        report.fallback += 1;
                    }
                }
                ImageOutcome::Failed(_) => report.failed += 1,
            }
        }
        report
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedBatch {
    pub images: Vec<ProcessedImage>,
    pub plan: BudgetPlan,
    pub report: BatchReport,
}

impl ProcessedBatch {
    pub fn payloads(&self) -> impl Iterator<Item = &ImagePayload> {
        self.images.iter().map(|image| &image.payload)
    }

    pub fn into_payloads(self) -> Vec<ImagePayload> {
        self.images.into_iter().map(|image| image.payload).collect()
    }

    pub fn total_encoded_len(&self) -> u64 {
        self.payloads().map(ImagePayload::encoded_len).sum()
    }
}

/// Fit `batch` under its ceiling with the default JPEG codec.
pub fn process_batch(batch: Batch, options: &BudgetOptions) -> Result<ProcessedBatch> {
    process_batch_with(&ImageJpegCodec, batch, options)
}

/// Plans the batch once, then recompresses the scheduled images.
///
/// The output has exactly one entry per input image, in input order, whether
/// or not `options.parallel` is set. Under `ErrorPolicy::AbortBatch` the
/// lowest-indexed failure is returned and nothing else.
pub fn process_batch_with<C: JpegCodec + ?Sized>(
    codec: &C,
    batch: Batch,
    options: &BudgetOptions,
) -> Result<ProcessedBatch> {
    let start_time = Instant::now();
    let plan = plan(&batch);
    let scheduled = plan.scheduled_count();

    match plan.allowance {
        None => crate::verbose!(
            "Batch of {} images fits ({} <= {} bytes), passing through",
            batch.len(),
            plan.total_encoded,
            plan.ceiling
        ),
        Some(allowance) => crate::info!(
            "📊 {} of {} images exceed the per-image allowance of {} ({} total vs {} ceiling)",
            scheduled,
            batch.len(),
            format_file_size(allowance),
            format_file_size(plan.total_encoded),
            format_file_size(plan.ceiling)
        ),
    }

    let progress = create_progress_bar(
        scheduled as u64,
        options.show_progress && scheduled > 0 && !is_quiet(),
    );

    let work: Vec<(ImagePayload, Disposition)> = batch
        .into_images()
        .into_iter()
        .zip(plan.entries.iter().copied())
        .collect();

    let images: Vec<ProcessedImage> = if options.parallel {
        let results: Vec<Result<ProcessedImage>> = work
            .into_par_iter()
            .enumerate()
            .map(|(index, (payload, disposition))| {
                process_entry(codec, index, payload, disposition, options.error_policy, &progress)
            })
            .collect();
        results.into_iter().collect::<Result<_>>()?
    } else {
        work.into_iter()
            .enumerate()
            .map(|(index, (payload, disposition))| {
                process_entry(codec, index, payload, disposition, options.error_policy, &progress)
            })
            .collect::<Result<_>>()?
    };

    progress.finish_and_clear();

    let report = BatchReport::from_images(&images, plan.total_encoded, start_time.elapsed());
    if scheduled > 0 {
        print_summary(&report);
    }

    Ok(ProcessedBatch {
        images,
        plan,
        report,
    })
}

fn process_entry<C: JpegCodec + ?Sized>(
    codec: &C,
    index: usize,
    payload: ImagePayload,
    disposition: Disposition,
    policy: ErrorPolicy,
    progress: &ProgressBar,
) -> Result<ProcessedImage> {
    let target = match disposition {
        Disposition::PassThrough => {
            return Ok(ProcessedImage {
                payload,
                outcome: ImageOutcome::PassThrough,
            })
        }
        Disposition::Recompress(target) => target,
    };

    let result = recompress_with(codec, &payload.data, &payload.media_type, target.raw);
    progress.inc(1);

    match result {
        Ok(compressed) => {
            crate::verbose!(
                "Image {}: {} -> {} bytes ({} attempts{})",
                index,
                payload.data.len(),
                compressed.data.len(),
                compressed.outcome.attempts(),
                if compressed.outcome.is_fallback() {
                    ", fallback"
                } else {
                    ""
                }
            );
            Ok(ProcessedImage {
                payload: ImagePayload::new(compressed.data, compressed.media_type),
                outcome: ImageOutcome::Recompressed(compressed.outcome),
            })
        }
        Err(err) => match policy {
            ErrorPolicy::AbortBatch => Err(err.at_index(index)),
            ErrorPolicy::Isolate => {
                crate::warn!("Image {} left unchanged: {}", index, err);
                Ok(ProcessedImage {
                    payload,
                    outcome: ImageOutcome::Failed(err.to_string()),
                })
            }
        },
    }
}

fn print_summary(report: &BatchReport) {
    crate::info!("\n📊 Batch Budget Summary:");
    crate::info!("  📁 Passed through: {}", report.pass_through);
    crate::info!(
        "  🗜️  Recompressed: {} ({} via fallback)",
        report.recompressed,
        report.fallback
    );
    crate::info!("  📊 Total before: {}", format_file_size(report.total_before));
    crate::info!("  📊 Total after: {}", format_file_size(report.total_after));
    crate::info!(
        "  🎯 Overall reduction: {:.1}%",
        calculate_compression_ratio(report.total_before, report.total_after)
    );
    crate::info!("  ⏱️  Total time: {:.2?}", report.elapsed);
    if report.failed > 0 {
        crate::warn!("Failed images: {}", report.failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompressionError, ErrorKind};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_payload(width: u32, height: u32) -> ImagePayload {
        // hashed pixels so PNG cannot shrink the payload below the allowance
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let h = (x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503))
                .wrapping_mul(2_246_822_519);
            Rgb([(h >> 24) as u8, (h >> 16) as u8, (h >> 8) as u8])
        }));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImagePayload::new(bytes, "image/png")
    }

    fn opaque_blob(raw_len: usize) -> ImagePayload {
        ImagePayload::new(vec![7u8; raw_len], "image/jpeg")
    }

    #[test]
    fn test_empty_batch_passes_through() {
        let batch = Batch::new(vec![], 1).unwrap();
        let processed = process_batch(batch, &BudgetOptions::default()).unwrap();
        assert!(processed.images.is_empty());
        assert_eq!(processed.report, BatchReport {
            elapsed: processed.report.elapsed,
            ..Default::default()
        });
    }

    #[test]
    fn test_fitting_batch_is_untouched_even_if_not_decodable() {
        let images = vec![opaque_blob(2_250_000), opaque_blob(2_250_000)];
        let batch = Batch::new(images.clone(), 8_000_000).unwrap();
        let processed = process_batch(batch, &BudgetOptions::default()).unwrap();

        assert!(processed
            .images
            .iter()
            .all(|image| image.outcome == ImageOutcome::PassThrough));
        assert_eq!(processed.into_payloads(), images);
    }

    #[test]
    fn test_only_oversized_images_are_recompressed() {
        let small = opaque_blob(30);
        let large = png_payload(300, 300);
        let ceiling = 2 * (large.encoded_len() / 4);
        let batch = Batch::new(vec![small.clone(), large], ceiling).unwrap();

        let processed = process_batch(batch, &BudgetOptions::default()).unwrap();
        assert_eq!(processed.images[0].payload, small);
        assert_eq!(processed.images[0].outcome, ImageOutcome::PassThrough);
        assert!(matches!(
            processed.images[1].outcome,
            ImageOutcome::Recompressed(_)
        ));
        assert_eq!(processed.images[1].payload.media_type, "image/jpeg");
        assert_eq!(processed.report.pass_through, 1);
        assert_eq!(processed.report.recompressed, 1);
    }

    #[test]
    fn test_corrupt_image_aborts_batch_with_index() {
        let batch = Batch::new(
            vec![png_payload(200, 200), opaque_blob(10_000), png_payload(200, 200)],
            3_000,
        )
        .unwrap();
        let err = process_batch(batch, &BudgetOptions::default()).unwrap_err();
        assert!(matches!(err, CompressionError::Image { index: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_isolate_policy_reports_failure_and_continues() {
        let corrupt = opaque_blob(10_000);
        let batch = Batch::new(
            vec![png_payload(200, 200), corrupt.clone(), png_payload(200, 200)],
            3_000,
        )
        .unwrap();
        let options = BudgetOptions::new(None, false, true, false).unwrap();
        let processed = process_batch(batch, &options).unwrap();

        assert_eq!(processed.images.len(), 3);
        assert!(matches!(processed.images[1].outcome, ImageOutcome::Failed(_)));
        assert_eq!(processed.images[1].payload, corrupt);
        assert!(matches!(
            processed.images[2].outcome,
            ImageOutcome::Recompressed(_)
        ));
        assert_eq!(processed.report.failed, 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let images: Vec<ImagePayload> = (0..4)
            .map(|i| png_payload(150 + i * 40, 120 + i * 30))
            .collect();
        let ceiling = 20_000;

        let sequential = process_batch(
            Batch::new(images.clone(), ceiling).unwrap(),
            &BudgetOptions::default(),
        )
        .unwrap();
        let parallel = process_batch(
            Batch::new(images, ceiling).unwrap(),
            &BudgetOptions::new(None, true, false, false).unwrap(),
        )
        .unwrap();

        assert_eq!(sequential.images, parallel.images);
    }
}
