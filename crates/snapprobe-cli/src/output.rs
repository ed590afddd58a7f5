//! Result reporting

use console::{style, Term};
use serde::{Deserialize, Serialize};
use snapprobe::{FailureKind, Outcome};
use std::path::PathBuf;

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Machine-readable summary of one comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    /// What was compared (identity or output path)
    pub subject: String,
    /// PASS, SKIP or FAIL
    pub status: String,
    /// Failure category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    /// Measured difference percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
    /// Configured threshold
    pub threshold: f64,
    /// Skip or failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Artifact written for this result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

impl ResultSummary {
    /// Summarize an outcome
    #[must_use]
    pub fn new(subject: impl Into<String>, outcome: &Outcome, threshold: f64) -> Self {
        let (kind, message) = match outcome {
            Outcome::Success => (None, None),
            Outcome::Skip { message } => (None, Some(message.clone())),
            Outcome::Failure { kind, message, .. } => (Some(*kind), Some(message.clone())),
        };
        Self {
            subject: subject.into(),
            status: outcome.label().to_string(),
            kind,
            difference: None,
            threshold,
            message,
            artifact: None,
        }
    }

    /// Attach the measured difference
    #[must_use]
    pub const fn with_difference(mut self, difference: Option<f64>) -> Self {
        self.difference = difference;
        self
    }

    /// Attach the written artifact path
    #[must_use]
    pub fn with_artifact(mut self, artifact: Option<PathBuf>) -> Self {
        self.artifact = artifact;
        self
    }
}

/// Prints results to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    format: OutputFormat,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            format,
            use_color,
            quiet,
        }
    }

    /// Render a summary as one text line
    #[must_use]
    pub fn render_text(&self, summary: &ResultSummary) -> String {
        let prefix = match (summary.status.as_str(), self.use_color) {
            ("PASS", true) => style("✓").green().bold().to_string(),
            ("SKIP", true) => style("○").yellow().bold().to_string(),
            (_, true) => style("✗").red().bold().to_string(),
            (status, false) => status.to_string(),
        };

        let mut line = format!("{prefix} {}", summary.subject);
        if let Some(difference) = summary.difference {
            line.push_str(&format!(
                " difference {difference}% (threshold {}%)",
                summary.threshold
            ));
        }
        if let Some(ref message) = summary.message {
            line.push_str(&format!(": {message}"));
        }
        if let Some(ref artifact) = summary.artifact {
            line.push_str(&format!(" [artifact: {}]", artifact.display()));
        }
        line
    }

    /// Print a summary
    ///
    /// Failures are printed even in quiet mode.
    ///
    /// # Errors
    ///
    /// Returns error if JSON rendering fails
    pub fn report(&self, summary: &ResultSummary) -> Result<(), serde_json::Error> {
        if self.quiet && summary.status != "FAIL" {
            return Ok(());
        }
        let line = match self.format {
            OutputFormat::Text => self.render_text(summary),
            OutputFormat::Json => serde_json::to_string(summary)?,
        };
        let _ = self.term.write_line(&line);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn failure() -> Outcome {
        Outcome::Failure {
            kind: FailureKind::DifferenceExceeded,
            message: "too different".to_string(),
            artifact: None,
        }
    }

    #[test]
    fn test_default_format() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_summary_of_success() {
        let summary = ResultSummary::new("home", &Outcome::Success, 1.5).with_difference(Some(0.25));
        assert_eq!(summary.status, "PASS");
        assert!(summary.kind.is_none());
        assert!(summary.message.is_none());
    }

    #[test]
    fn test_summary_of_failure() {
        let summary = ResultSummary::new("home", &failure(), 0.0)
            .with_artifact(Some(PathBuf::from("target/snapprobe/home.png")));
        assert_eq!(summary.status, "FAIL");
        assert_eq!(summary.kind, Some(FailureKind::DifferenceExceeded));
        assert_eq!(summary.message.as_deref(), Some("too different"));
    }

    #[test]
    fn test_plain_text_rendering() {
        let reporter = Reporter::new(OutputFormat::Text, false, false);
        let summary = ResultSummary::new("home", &Outcome::Success, 1.5).with_difference(Some(0.25));
        assert_eq!(
            reporter.render_text(&summary),
            "PASS home difference 0.25% (threshold 1.5%)"
        );

        let failed = ResultSummary::new("home", &failure(), 0.0)
            .with_artifact(Some(PathBuf::from("out/home.png")));
        assert_eq!(
            reporter.render_text(&failed),
            "FAIL home: too different [artifact: out/home.png]"
        );
    }

    #[test]
    fn test_json_skips_empty_fields() {
        let summary = ResultSummary::new("home", &Outcome::Success, 0.0);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains(r#""status":"PASS""#));
        assert!(!json.contains("artifact"));
        assert!(!json.contains("message"));
    }

    #[test]
    fn test_quiet_reporter_still_reports_failures() {
        let reporter = Reporter::new(OutputFormat::Text, false, true);
        assert!(reporter.quiet);
        reporter
            .report(&ResultSummary::new("home", &failure(), 0.0))
            .unwrap();
        reporter
            .report(&ResultSummary::new("home", &Outcome::Success, 0.0))
            .unwrap();
    }
}
