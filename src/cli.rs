use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-budget",
    about = "Fit a batch of images under a shared byte budget",
    long_about = "img-budget recompresses a batch of images so that their combined size stays under \
                  one byte ceiling. Images that already fit are left untouched; the rest are searched \
                  over a fixed ladder of JPEG quality and scale settings, with a small forced fallback \
                  that always terminates.",
    version,
    after_help = "EXAMPLES:\n  \
    img-budget compress < request.json > response.json\n  \
    img-budget compress -i request.json -o response.json --max-total-bytes 4000000\n  \
    img-budget files ./screenshots ./out --max-total-bytes 2000000 -r\n  \
    img-budget files \"./shots/*.png\" ./out --parallel -j 4"
)]
pub struct Args {
    #[arg(short = 'q', long, global = true, help = "Suppress progress and summary output")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Log every ladder attempt")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand that processes a batch.
#[derive(ClapArgs, Debug, Clone)]
pub struct BudgetArgs {
    #[arg(
        short = 'm',
        long,
        help = "Aggregate byte ceiling (default: request value, else 8000000)",
        long_help = "Aggregate ceiling in base64 transport bytes. Overrides max_total_bytes \
                     from the request. Must be greater than zero."
    )]
    pub max_total_bytes: Option<u64>,

    #[arg(
        short = 'p',
        long,
        help = "Recompress images in parallel",
        long_help = "Recompress oversized images on a thread pool. Output order is unchanged."
    )]
    pub parallel: bool,

    #[arg(
        short = 'j',
        long,
        help = "Number of parallel threads (default: auto)",
        long_help = "Number of threads used with --parallel. \
                     If not specified, uses number of CPU cores."
    )]
    pub threads: Option<usize>,

    #[arg(
        short = 'k',
        long,
        help = "Report failing images instead of aborting the batch",
        long_help = "By default one undecodable image aborts the whole batch. With --keep-going \
                     the image is returned unchanged and flagged with an error."
    )]
    pub keep_going: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Process a JSON request",
        long_about = "Read a JSON request of base64 images and write the JSON response. \
                      Reads stdin and writes stdout unless files are given."
    )]
    Compress {
        #[arg(short = 'i', long, help = "Request file (default: stdin)")]
        input: Option<PathBuf>,

        #[arg(short = 'o', long, help = "Response file (default: stdout)")]
        output: Option<PathBuf>,

        #[command(flatten)]
        budget: BudgetArgs,
    },

    #[command(
        about = "Process image files as one batch",
        long_about = "Collect image files from a file, directory or glob, fit them under the \
                      ceiling as one batch, and write the results to an output directory."
    )]
    Files {
        #[arg(
            help = "Input directory, file pattern, or glob",
            long_help = "Input can be a directory path, file pattern, or glob expression. \
                         Examples: './images', '*.jpg', '/path/to/images/*.png'"
        )]
        input: String,

        #[arg(help = "Output directory path")]
        output: PathBuf,

        #[arg(
            short = 'r',
            long,
            help = "Process subdirectories recursively"
        )]
        recursive: bool,

        #[command(flatten)]
        budget: BudgetArgs,
    },
}
