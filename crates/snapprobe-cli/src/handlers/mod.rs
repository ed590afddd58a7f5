//! Command handlers - extracted from main.rs for testability

pub mod check;
pub mod compare;

pub use check::{execute_check, resolve_config};
pub use compare::execute_compare;

use crate::error::{CliError, CliResult};
use crate::output::ResultSummary;
use snapprobe::{FailureKind, Outcome};

/// Exit code of a passing or skipped run
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code of a size mismatch or exceeded difference
pub const EXIT_COMPARISON_FAILED: u8 = 1;
/// Exit code of configuration, capture, decode or I/O errors
pub const EXIT_ERROR: u8 = 2;

/// Finished command: what happened and how to report it
#[derive(Debug, Clone)]
pub struct Completed {
    /// Outcome of the comparison
    pub outcome: Outcome,
    /// Summary printed for the user
    pub summary: ResultSummary,
}

impl Completed {
    /// Process exit code for the outcome
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match &self.outcome {
            Outcome::Success | Outcome::Skip { .. } => EXIT_SUCCESS,
            Outcome::Failure {
                kind: FailureKind::Error,
                ..
            } => EXIT_ERROR,
            Outcome::Failure { .. } => EXIT_COMPARISON_FAILED,
        }
    }
}

/// Reject thresholds that cannot be compared against
pub fn validate_threshold(threshold: f64) -> CliResult<()> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(())
    } else {
        Err(CliError::invalid_argument(format!(
            "threshold must be a non-negative number, got {threshold}"
        )))
    }
}
