//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Snapprobe: screenshot visual regression with SSIM scoring
#[derive(Parser, Debug)]
#[command(name = "snapprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit log events as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Result format
    #[arg(long, default_value = "text", global = true)]
    pub format: FormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare an output image against a reference image
    Compare(CompareArgs),

    /// Check a capture against the stored reference for an identity
    ///
    /// Creates the reference on first use (or with --refresh-references)
    /// and reports the run as skipped.
    Check(CheckArgs),
}

/// Arguments for the compare command
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Newly captured image
    pub output: PathBuf,

    /// Accepted reference image
    pub reference: PathBuf,

    /// Maximum accepted difference percentage
    #[arg(short, long, default_value = "0")]
    pub threshold: f64,

    /// Write the failure artifact (diff overlay or raw output) here
    #[arg(long)]
    pub diff: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Snapshot identity; names the reference file
    pub identity: String,

    /// Captured PNG to check
    pub capture: PathBuf,

    /// Maximum accepted difference percentage
    #[arg(short, long, default_value = "0")]
    pub threshold: f64,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reference directory
    #[arg(long)]
    pub reference_dir: Option<PathBuf>,

    /// Artifact directory
    #[arg(long)]
    pub artifact_dir: Option<PathBuf>,

    /// Overwrite the reference with the capture
    #[arg(long, env = "SNAPPROBE_REFRESH_REFERENCES")]
    pub refresh_references: bool,

    /// Keep the capture in the artifact directory even when the check passes
    #[arg(long, env = "SNAPPROBE_KEEP_OUTPUT")]
    pub keep_output: bool,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Result format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per result
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
