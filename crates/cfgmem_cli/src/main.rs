//! cfgmem: inspect, compare and combine Xilinx configuration memory images.
//!
//! Images are read either from raw readback dumps (big-endian words, first
//! frame is the pipeline frame) or from JSON command streams (`*.json`).
//! The device is chosen with `--part` for a built-in profile or `--profile`
//! for a TOML profile file.

#![warn(missing_docs)]

mod contents;
mod diff;
mod frames;
mod image;
mod info;
mod mask;
mod writes;

use std::process;

use cfgmem_frames::FrameOperation;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::image::parse_far;

/// cfgmem: Xilinx configuration memory tool.
#[derive(Parser, Debug)]
#[command(name = "cfgmem", version, about = "Xilinx configuration memory tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML device profile.
    #[arg(long, global = true, conflicts_with = "part")]
    pub profile: Option<String>,

    /// Built-in part name (e.g. `xc4vfx12`).
    #[arg(long, global = true)]
    pub part: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Describe the device, or an image of it.
    Info(InfoArgs),
    /// Dump frame contents.
    Contents(ContentsArgs),
    /// List runs of empty and non-empty frames.
    Frames(FramesArgs),
    /// List frames that differ between two images.
    Diff(DiffArgs),
    /// Combine two images bitwise and write the result.
    Mask(MaskArgs),
    /// Show which frames an FDRI write lands on.
    Writes(WritesArgs),
}

/// Arguments for `cfgmem info`.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Image to summarize. Without it only the device is described.
    pub image: Option<String>,

    /// FAR that readback data starts at.
    #[arg(long, value_parser = parse_far, default_value = "0")]
    pub start_far: u32,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `cfgmem contents`.
#[derive(Parser, Debug)]
pub struct ContentsArgs {
    /// Image to dump.
    pub image: String,

    /// FAR that readback data starts at.
    #[arg(long, value_parser = parse_far, default_value = "0")]
    pub start_far: u32,

    /// First frame to print.
    #[arg(long, value_parser = parse_far, default_value = "0")]
    pub from: u32,

    /// Number of frames to print (default: to the end of the device).
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

/// Arguments for `cfgmem frames`.
#[derive(Parser, Debug)]
pub struct FramesArgs {
    /// Image to scan.
    pub image: String,

    /// FAR that readback data starts at.
    #[arg(long, value_parser = parse_far, default_value = "0")]
    pub start_far: u32,

    /// Print every non-empty frame, not just the runs.
    #[arg(short, long)]
    pub detail: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `cfgmem diff`.
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// First image.
    pub left: String,

    /// Second image.
    pub right: String,

    /// FAR that readback data starts at.
    #[arg(long, value_parser = parse_far, default_value = "0")]
    pub start_far: u32,

    /// Only compare frames configured in both images.
    #[arg(long)]
    pub ignore_unconfigured: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `cfgmem mask`.
#[derive(Parser, Debug)]
pub struct MaskArgs {
    /// Image to operate on.
    pub left: String,

    /// Second operand; not used by `not`.
    pub right: Option<String>,

    /// Operation to apply.
    #[arg(long, value_enum)]
    pub op: OperationArg,

    /// Where to write the resulting command stream (JSON).
    #[arg(short, long)]
    pub output: String,

    /// FAR that readback data starts at.
    #[arg(long, value_parser = parse_far, default_value = "0")]
    pub start_far: u32,
}

/// Arguments for `cfgmem writes`.
#[derive(Parser, Debug)]
pub struct WritesArgs {
    /// FAR loaded before the write.
    #[arg(value_parser = parse_far)]
    pub far: u32,

    /// FDRI payload length in words.
    pub words: usize,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Bitwise image operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OperationArg {
    /// Bits that differ.
    Xor,
    /// Bits set in both.
    And,
    /// Bits set in either.
    Or,
    /// Bits of the first image not set in the second.
    Mask,
    /// Inverted first image.
    Not,
}

impl From<OperationArg> for FrameOperation {
    fn from(op: OperationArg) -> Self {
        match op {
            OperationArg::Xor => FrameOperation::Xor,
            OperationArg::And => FrameOperation::And,
            OperationArg::Or => FrameOperation::Or,
            OperationArg::Mask => FrameOperation::Mask,
            OperationArg::Not => FrameOperation::Not,
        }
    }
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional TOML profile path.
    pub profile: Option<String>,
    /// Optional built-in part name.
    pub part: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        profile: cli.profile,
        part: cli.part,
    };

    let result = match cli.command {
        Command::Info(ref args) => info::run(args, &global),
        Command::Contents(ref args) => contents::run(args, &global),
        Command::Frames(ref args) => frames::run(args, &global),
        Command::Diff(ref args) => diff::run(args, &global),
        Command::Mask(ref args) => mask::run(args, &global),
        Command::Writes(ref args) => writes::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flag-derived level.
fn init_tracing(quiet: bool, verbose: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
