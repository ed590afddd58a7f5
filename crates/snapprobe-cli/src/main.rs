//! Snapprobe CLI: screenshot visual regression from the command line
//!
//! ## Usage
//!
//! ```bash
//! snapprobe compare out.png ref.png --threshold 0.5 --diff diff.png
//! snapprobe check login_page capture.png --reference-dir snap_references
//! snapprobe check login_page capture.png --refresh-references
//! ```
//!
//! Exit status: 0 for pass or skip, 1 for a failed comparison, 2 for errors.

use clap::Parser;
use snapprobe_cli::{
    execute_check, execute_compare, init_logging, Cli, CliConfig, CliResult, ColorChoice,
    Commands, Completed, Reporter, Verbosity, EXIT_ERROR,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(&config);

    match run(cli.command, &config) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(command: Commands, config: &CliConfig) -> CliResult<u8> {
    let completed: Completed = match command {
        Commands::Compare(args) => execute_compare(&args)?,
        Commands::Check(args) => execute_check(&args)?,
    };

    let reporter = Reporter::new(
        config.format,
        config.color.should_color(),
        config.verbosity.is_quiet(),
    );
    reporter.report(&completed.summary)?;
    Ok(completed.exit_code())
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_format(cli.format.into())
        .with_log_json(cli.log_json)
}
