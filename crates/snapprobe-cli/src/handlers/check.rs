//! Check command handler

use super::{validate_threshold, Completed};
use crate::capture::FileCapture;
use crate::commands::CheckArgs;
use crate::error::CliResult;
use crate::output::ResultSummary;
use snapprobe::{ArtifactWriter, Outcome, ProbeConfig, ProbeError, SnapshotSession, Verdict};

/// Effective configuration: file (or defaults), then environment, then flags
pub fn resolve_config(
    args: &CheckArgs,
    lookup: impl Fn(&str) -> Option<String>,
) -> CliResult<ProbeConfig> {
    let base = match args.config {
        Some(ref path) => ProbeConfig::load(path)?,
        None => ProbeConfig::default(),
    };
    let mut config = base.with_env_overrides(lookup);

    if let Some(ref dir) = args.reference_dir {
        config = config.with_reference_dir(dir);
    }
    if let Some(ref dir) = args.artifact_dir {
        config = config.with_artifact_dir(dir);
    }
    if args.refresh_references {
        config = config.with_refresh_references(true);
    }
    if args.keep_output {
        config = config.with_keep_output(true);
    }
    Ok(config)
}

/// Execute the check command
///
/// The capture file plays the part of a full-page screenshot. Comparison
/// and capture errors become failed outcomes; only configuration problems
/// are returned as errors.
pub fn execute_check(args: &CheckArgs) -> CliResult<Completed> {
    validate_threshold(args.threshold)?;
    let config = resolve_config(args, |key| std::env::var(key).ok())?;
    tracing::debug!(?config, identity = %args.identity, "resolved configuration");

    let writer = ArtifactWriter::from_config(&config);
    let mut session = SnapshotSession::new(FileCapture::new(&args.capture), config)?;
    session.set_identity(args.identity.as_str());

    let result = session.assert_snapshots(args.threshold);
    let difference = match &result {
        Ok(Verdict::Passed { difference })
        | Err(ProbeError::DifferenceExceeded { difference, .. }) => Some(*difference),
        _ => None,
    };
    let outcome = Outcome::from_comparison(&result, &session);
    let artifact = writer.persist(&session, &outcome)?;

    let summary = ResultSummary::new(args.identity.as_str(), &outcome, args.threshold)
        .with_difference(difference)
        .with_artifact(artifact);
    Ok(Completed { outcome, summary })
}
