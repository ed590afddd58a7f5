//! Tracing subscriber setup

use crate::config::{CliConfig, ENV_LOG};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive: `SNAPPROBE_LOG` when set and non-empty, otherwise the verbosity default
#[must_use]
pub fn filter_directive(config: &CliConfig, env_value: Option<String>) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.verbosity.log_directive().to_string())
}

/// Install the global subscriber writing to stderr
///
/// Stdout stays reserved for results. Calling this twice keeps the first subscriber.
pub fn init_logging(config: &CliConfig) {
    let directive = filter_directive(config, std::env::var(ENV_LOG).ok());
    let filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_directive()));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(config.color.should_color()),
            )
            .try_init()
    };

    if installed.is_ok() {
        tracing::debug!(filter = %directive, json = config.log_json, "logging initialized");
    }
}
