use anyhow::{Context, Result};
use clap::Parser;
use img_budget::cli::{Args, BudgetArgs, Commands};
use img_budget::logger::{set_log_level, LogLevel};
use img_budget::{
    collect_image_files, load_batch, process_batch, write_batch, BatchRequest, BatchResponse,
    BudgetOptions,
};
use rayon::ThreadPoolBuilder;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    set_log_level(LogLevel::from_flags(args.quiet, args.verbose));

    match args.command {
        Commands::Compress {
            input,
            output,
            budget,
        } => {
            setup_thread_pool(&budget);
            run_compress(input.as_deref(), output.as_deref(), &budget)
        }
        Commands::Files {
            input,
            output,
            recursive,
            budget,
        } => {
            setup_thread_pool(&budget);
            run_files(&input, &output, recursive, &budget)
        }
    }
}

fn setup_thread_pool(budget: &BudgetArgs) {
    if !budget.parallel {
        return;
    }
    let num_threads = budget.threads.unwrap_or_else(num_cpus::get);
    img_budget::verbose!("Using {} threads", num_threads);
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .unwrap_or_else(|e| {
            img_budget::warn!("Failed to set thread pool size: {}", e);
        });
}

fn budget_options(budget: &BudgetArgs) -> Result<BudgetOptions> {
    Ok(BudgetOptions::new(
        budget.max_total_bytes,
        budget.parallel,
        budget.keep_going,
        true,
    )?)
}

fn run_compress(input: Option<&Path>, output: Option<&Path>, budget: &BudgetArgs) -> Result<()> {
    let options = budget_options(budget)?;

    let request_text = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {:?}", path))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read request from stdin")?;
            text
        }
    };

    let batch = BatchRequest::from_json(&request_text)?.into_batch(&options)?;
    img_budget::verbose!(
        "Request: {} images, ceiling {} bytes",
        batch.len(),
        batch.max_total_bytes()
    );
    let processed = process_batch(batch, &options)?;
    let response = BatchResponse::from_processed(&processed).to_json()?;

    match output {
        Some(path) => fs::write(path, response)
            .with_context(|| format!("Failed to write response to {:?}", path))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(response.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn run_files(input: &str, output: &PathBuf, recursive: bool, budget: &BudgetArgs) -> Result<()> {
    let options = budget_options(budget)?;

    img_budget::info!("🚀 Collecting images from {}", input);
    let sources = collect_image_files(input, recursive)?;
    if sources.is_empty() {
        img_budget::warn!("No image files found in the input path");
        return Ok(());
    }

    let batch = load_batch(&sources, options.resolve_ceiling(None))?;
    img_budget::info!(
        "📊 Found {} image files ({} bytes encoded, ceiling {})",
        batch.len(),
        batch.total_encoded_len(),
        batch.max_total_bytes()
    );

    let processed = process_batch(batch, &options)?;
    let written = write_batch(&processed, &sources, output)
        .with_context(|| format!("Failed to write results to {:?}", output))?;

    img_budget::info!("✅ Wrote {} files to {:?}", written.len(), output);
    Ok(())
}
