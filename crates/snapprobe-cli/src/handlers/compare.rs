//! Compare command handler

use super::{validate_threshold, Completed};
use crate::commands::CompareArgs;
use crate::error::CliResult;
use crate::output::ResultSummary;
use snapprobe::{Asserter, FailureKind, ImageSource, Outcome, ProbeError};
use std::path::Path;

/// Execute the compare command
///
/// Size mismatches attach the raw output image, exceeded differences the
/// highlighted overlay. With `--diff` the attachment is written to disk.
pub fn execute_compare(args: &CompareArgs) -> CliResult<Completed> {
    validate_threshold(args.threshold)?;

    let asserter = Asserter::new(
        &ImageSource::Path(args.output.clone()),
        &ImageSource::Path(args.reference.clone()),
        args.threshold,
    )?;

    let (outcome, difference) = match asserter.assert_snap() {
        Ok(difference) => (Outcome::Success, Some(difference)),
        Err(e) if e.is_comparison_failure() => {
            let (difference, artifact) = match e {
                ProbeError::DifferenceExceeded { difference, .. } => {
                    (Some(difference), asserter.difference_image()?)
                }
                _ => (None, std::fs::read(&args.output)?),
            };
            let outcome = Outcome::Failure {
                kind: FailureKind::of(&e),
                message: e.to_string(),
                artifact: Some(artifact),
            };
            (outcome, difference)
        }
        Err(e) => return Err(e.into()),
    };

    let written = match (outcome.artifact(), args.diff.as_deref()) {
        (Some(bytes), Some(path)) => Some(write_artifact(path, bytes)?),
        _ => None,
    };

    tracing::info!(
        output = %args.output.display(),
        reference = %args.reference.display(),
        status = outcome.label(),
        "comparison finished"
    );

    let summary = ResultSummary::new(args.output.display().to_string(), &outcome, args.threshold)
        .with_difference(difference)
        .with_artifact(written);
    Ok(Completed { outcome, summary })
}

fn write_artifact(path: &Path, bytes: &[u8]) -> CliResult<std::path::PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::handlers::{EXIT_COMPARISON_FAILED, EXIT_SUCCESS};
    use image::{Rgb, RgbImage};
    use snapprobe::encode_png;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, image: &RgbImage) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, encode_png(image).unwrap()).unwrap();
        path
    }

    fn flat(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([200, 200, 200]))
    }

    fn checkerboard(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    fn args(output: PathBuf, reference: PathBuf, diff: Option<PathBuf>) -> CompareArgs {
        CompareArgs {
            output,
            reference,
            threshold: 0.0,
            diff,
        }
    }

    #[test]
    fn test_identical_images_pass() {
        let dir = TempDir::new().unwrap();
        let output = write_png(&dir, "out.png", &checkerboard(32, 32));
        let reference = write_png(&dir, "ref.png", &checkerboard(32, 32));

        let completed = execute_compare(&args(output, reference, None)).unwrap();
        assert!(completed.outcome.is_success());
        assert_eq!(completed.summary.difference, Some(0.0));
        assert_eq!(completed.exit_code(), EXIT_SUCCESS);
    }

    #[test]
    fn test_difference_writes_overlay() {
        let dir = TempDir::new().unwrap();
        let output = write_png(&dir, "out.png", &checkerboard(32, 32));
        let reference = write_png(&dir, "ref.png", &flat(32, 32));
        let diff = dir.path().join("nested").join("diff.png");

        let completed = execute_compare(&args(output, reference, Some(diff.clone()))).unwrap();
        assert_eq!(completed.exit_code(), EXIT_COMPARISON_FAILED);
        assert!(matches!(
            completed.outcome,
            Outcome::Failure {
                kind: FailureKind::DifferenceExceeded,
                ..
            }
        ));
        assert!(completed.summary.difference.unwrap() > 0.0);
        assert_eq!(completed.summary.artifact, Some(diff.clone()));

        let overlay = image::open(&diff).unwrap().to_rgb8();
        assert_eq!(overlay.dimensions(), (32, 32));
    }

    #[test]
    fn test_size_mismatch_writes_raw_output() {
        let dir = TempDir::new().unwrap();
        let output = write_png(&dir, "out.png", &flat(40, 30));
        let reference = write_png(&dir, "ref.png", &flat(30, 40));
        let diff = dir.path().join("diff.png");

        let completed =
            execute_compare(&args(output.clone(), reference, Some(diff.clone()))).unwrap();
        assert!(matches!(
            completed.outcome,
            Outcome::Failure {
                kind: FailureKind::SizeMismatch,
                ..
            }
        ));
        assert!(completed.summary.difference.is_none());
        assert_eq!(std::fs::read(&diff).unwrap(), std::fs::read(&output).unwrap());
    }

    #[test]
    fn test_no_diff_path_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = write_png(&dir, "out.png", &checkerboard(32, 32));
        let reference = write_png(&dir, "ref.png", &flat(32, 32));

        let completed = execute_compare(&args(output, reference, None)).unwrap();
        assert!(completed.outcome.is_failure());
        assert!(completed.summary.artifact.is_none());
    }

    #[test]
    fn test_threshold_above_difference_passes() {
        let dir = TempDir::new().unwrap();
        let output = write_png(&dir, "out.png", &checkerboard(32, 32));
        let reference = write_png(&dir, "ref.png", &flat(32, 32));

        let mut compare = args(output, reference, None);
        compare.threshold = 100.0;
        assert!(execute_compare(&compare).unwrap().outcome.is_success());
    }

    #[test]
    fn test_missing_reference_is_error() {
        let dir = TempDir::new().unwrap();
        let output = write_png(&dir, "out.png", &flat(16, 16));
        let err = execute_compare(&args(output, dir.path().join("absent.png"), None)).unwrap_err();
        assert!(matches!(err, crate::error::CliError::Probe(_)));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut compare = args(PathBuf::from("a.png"), PathBuf::from("b.png"), None);
        compare.threshold = -1.0;
        assert!(matches!(
            execute_compare(&compare),
            Err(crate::error::CliError::InvalidArgument { .. })
        ));
    }
}
