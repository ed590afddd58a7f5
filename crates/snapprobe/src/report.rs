//! Outcomes handed to test reporting, and the artifacts kept alongside them.

use crate::config::ProbeConfig;
use crate::driver::CaptureDriver;
use crate::result::{ProbeError, ProbeResult};
use crate::session::{SnapshotSession, Verdict};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Category of a failed comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Output and reference differ in size
    SizeMismatch,
    /// Difference percentage above the threshold
    DifferenceExceeded,
    /// Configuration, capture, decode or I/O error
    Error,
}

/// Reportable result of one comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Comparison passed
    Success,
    /// Comparison was inconclusive
    Skip {
        /// Reason shown to the user
        message: String,
    },
    /// Comparison failed
    Failure {
        /// Failure category
        kind: FailureKind,
        /// Error message
        message: String,
        /// PNG attached to the failure, if any
        artifact: Option<Vec<u8>>,
    },
}

impl Outcome {
    /// Map a session result to an outcome
    ///
    /// Failures pick up the session's difference image as their artifact.
    #[must_use]
    pub fn from_comparison<D: CaptureDriver>(
        result: &ProbeResult<Verdict>,
        session: &SnapshotSession<D>,
    ) -> Self {
        match result {
            Ok(Verdict::Passed { .. }) => Self::Success,
            Ok(Verdict::ReferenceEstablished { message, .. }) => Self::Skip {
                message: (*message).to_string(),
            },
            Err(e) => Self::Failure {
                kind: FailureKind::of(e),
                message: e.to_string(),
                artifact: session.difference_image().map(<[u8]>::to_vec),
            },
        }
    }

    /// Check if outcome is a success
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Check if outcome is a failure
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Attached artifact, if any
    #[must_use]
    pub fn artifact(&self) -> Option<&[u8]> {
        match self {
            Self::Failure { artifact, .. } => artifact.as_deref(),
            _ => None,
        }
    }

    /// Short status label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success => "PASS",
            Self::Skip { .. } => "SKIP",
            Self::Failure { .. } => "FAIL",
        }
    }
}

impl FailureKind {
    /// Classify an error
    #[must_use]
    pub fn of(error: &ProbeError) -> Self {
        match error {
            ProbeError::SizeMismatch { .. } => Self::SizeMismatch,
            ProbeError::DifferenceExceeded { .. } => Self::DifferenceExceeded,
            _ => Self::Error,
        }
    }
}

/// Writes snapshot artifacts to the artifact directory
///
/// Failures are always persisted; other outcomes only with `keep_output`.
/// The difference image is preferred over the raw capture.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
    keep_output: bool,
}

impl ArtifactWriter {
    /// Create a writer
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, keep_output: bool) -> Self {
        Self {
            dir: dir.into(),
            keep_output,
        }
    }

    /// Writer using `artifact_dir` and `keep_output` from a config
    #[must_use]
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.artifact_dir.clone(), config.keep_output)
    }

    /// Artifact directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the session's artifact for `outcome`, returning the written path
    ///
    /// # Errors
    ///
    /// Returns error if the artifact cannot be written
    pub fn persist<D: CaptureDriver>(
        &self,
        session: &SnapshotSession<D>,
        outcome: &Outcome,
    ) -> ProbeResult<Option<PathBuf>> {
        if !outcome.is_failure() && !self.keep_output {
            return Ok(None);
        }
        let Some(identity) = session.identity() else {
            return Ok(None);
        };
        let Some(bytes) = session
            .difference_image()
            .or_else(|| session.output_capture())
        else {
            return Ok(None);
        };

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{identity}.png"));
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), outcome = outcome.label(), "artifact written");
        Ok(Some(path))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::image_source::encode_png;
    use crate::result::Dimensions;
    use image::{Rgb, RgbImage};

    fn session(refs: &Path, capture: Vec<u8>) -> SnapshotSession<MockDriver> {
        let config = ProbeConfig::default().with_reference_dir(refs);
        let mut session =
            SnapshotSession::new(MockDriver::new().with_page_capture(capture), config).unwrap();
        session.set_identity("checkout");
        session
    }

    #[test]
    fn test_failure_kinds() {
        let size = ProbeError::SizeMismatch {
            output: Dimensions::new(1, 1),
            reference: Dimensions::new(2, 2),
        };
        let diff = ProbeError::DifferenceExceeded {
            difference: 3.0,
            threshold: 1.0,
        };
        assert_eq!(FailureKind::of(&size), FailureKind::SizeMismatch);
        assert_eq!(FailureKind::of(&diff), FailureKind::DifferenceExceeded);
        assert_eq!(
            FailureKind::of(&ProbeError::NoCaptureTargetConfigured),
            FailureKind::Error
        );
    }

    #[test]
    fn test_establish_maps_to_skip() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), b"x".to_vec());
        let result = session.assert_snapshots(0.0);
        let outcome = Outcome::from_comparison(&result, &session);
        assert_eq!(
            outcome,
            Outcome::Skip {
                message: crate::session::REFERENCE_ESTABLISHED_MESSAGE.to_string()
            }
        );
        assert_eq!(outcome.label(), "SKIP");
        assert!(outcome.artifact().is_none());
    }

    #[test]
    fn test_size_mismatch_failure_carries_capture() {
        let dir = tempfile::tempdir().unwrap();
        let small = encode_png(&RgbImage::from_pixel(20, 20, Rgb([1, 2, 3]))).unwrap();
        let large = encode_png(&RgbImage::from_pixel(20, 21, Rgb([1, 2, 3]))).unwrap();
        let mut session = session(dir.path(), large);
        session.assert_snapshots(0.0).unwrap();
        session.driver_mut().set_page_capture(small.clone());

        let result = session.assert_snapshots(0.0);
        let outcome = Outcome::from_comparison(&result, &session);
        match &outcome {
            Outcome::Failure { kind, message, .. } => {
                assert_eq!(*kind, FailureKind::SizeMismatch);
                assert!(message.contains("20x20"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(outcome.artifact(), Some(small.as_slice()));
    }

    #[test]
    fn test_writer_persists_failures_only_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = dir.path().join("artifacts");
        let bytes = encode_png(&RgbImage::from_pixel(16, 16, Rgb([5, 5, 5]))).unwrap();
        let mut session = session(&dir.path().join("refs"), bytes);
        session.assert_snapshots(0.0).unwrap();
        let result = session.assert_snapshots(0.0);
        let outcome = Outcome::from_comparison(&result, &session);
        assert!(outcome.is_success());

        let writer = ArtifactWriter::new(&artifacts, false);
        assert_eq!(writer.persist(&session, &outcome).unwrap(), None);
        assert!(!artifacts.exists());

        let keeping = ArtifactWriter::new(&artifacts, true);
        let path = keeping.persist(&session, &outcome).unwrap().unwrap();
        assert_eq!(path, artifacts.join("checkout.png"));
        assert_eq!(
            std::fs::read(path).unwrap(),
            session.output_capture().unwrap()
        );
    }

    #[test]
    fn test_writer_prefers_difference_image() {
        let dir = tempfile::tempdir().unwrap();
        let reference = RgbImage::from_pixel(30, 30, Rgb([255, 255, 255]));
        let mut changed = reference.clone();
        for y in 5..25 {
            for x in 5..25 {
                changed.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let mut session = session(&dir.path().join("refs"), encode_png(&reference).unwrap());
        session.assert_snapshots(0.0).unwrap();
        session
            .driver_mut()
            .set_page_capture(encode_png(&changed).unwrap());
        let result = session.assert_snapshots(0.0);
        let outcome = Outcome::from_comparison(&result, &session);
        assert!(outcome.is_failure());

        let writer = ArtifactWriter::from_config(
            &ProbeConfig::default().with_artifact_dir(dir.path().join("out")),
        );
        let path = writer.persist(&session, &outcome).unwrap().unwrap();
        let written = std::fs::read(path).unwrap();
        assert_eq!(written, session.difference_image().unwrap());
        assert_ne!(written, session.output_capture().unwrap());
        assert!(session.store().exists("checkout"));
    }
}
