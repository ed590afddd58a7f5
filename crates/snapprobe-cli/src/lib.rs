//! Snapprobe CLI Library
//!
//! Command-line front end for snapshot comparison: `compare` scores two
//! image files against each other, `check` runs a capture file through a
//! snapshot session backed by the reference directory.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod capture;
mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use capture::FileCapture;
pub use commands::{CheckArgs, Cli, ColorArg, Commands, CompareArgs, FormatArg};
pub use config::{CliConfig, ColorChoice, Verbosity, ENV_LOG};
pub use error::{CliError, CliResult};
pub use handlers::{
    execute_check, execute_compare, resolve_config, Completed, EXIT_COMPARISON_FAILED,
    EXIT_ERROR, EXIT_SUCCESS,
};
pub use logging::{filter_directive, init_logging};
pub use output::{OutputFormat, Reporter, ResultSummary};
