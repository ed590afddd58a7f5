//! Smoke tests for the snapprobe CLI
//!
//! These tests run the compiled binary against images in temporary directories.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command for the snapprobe binary
fn snapprobe() -> Command {
    let mut cmd = Command::cargo_bin("snapprobe").expect("snapprobe binary should exist");
    cmd.env_remove("SNAPPROBE_REFRESH_REFERENCES")
        .env_remove("SNAPPROBE_KEEP_OUTPUT")
        .env_remove("SNAPPROBE_REFERENCE_DIR")
        .env_remove("SNAPPROBE_ARTIFACT_DIR")
        .env_remove("SNAPPROBE_LOG");
    cmd
}

fn write_png(path: &Path, image: &RgbImage) {
    image.save(path).expect("png should be written");
}

fn pattern(width: u32, height: u32, shift: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 7 + y * 5) as u8).wrapping_add(shift);
        Rgb([v, 255 - v, v / 3])
    })
}

fn write_pair(dir: &TempDir, output: &RgbImage, reference: &RgbImage) -> (PathBuf, PathBuf) {
    let out = dir.path().join("out.png");
    let reference_path = dir.path().join("ref.png");
    write_png(&out, output);
    write_png(&reference_path, reference);
    (out, reference_path)
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    snapprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    snapprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compare"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_no_args_fails() {
    snapprobe().assert().failure();
}

#[test]
fn test_check_subcommand_help() {
    snapprobe()
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--refresh-references"))
        .stdout(predicate::str::contains("--keep-output"));
}

// ============================================================================
// Compare Tests
// ============================================================================

#[test]
fn test_compare_identical_images_pass() {
    let dir = TempDir::new().unwrap();
    let (out, reference) = write_pair(&dir, &pattern(32, 32, 0), &pattern(32, 32, 0));

    snapprobe()
        .args(["--color", "never", "compare"])
        .arg(&out)
        .arg(&reference)
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("PASS"))
        .stdout(predicate::str::contains("difference 0%"));
}

#[test]
fn test_compare_different_images_fail_with_diff() {
    let dir = TempDir::new().unwrap();
    let (out, reference) = write_pair(&dir, &pattern(32, 32, 0), &pattern(32, 32, 120));
    let diff = dir.path().join("diff.png");

    snapprobe()
        .args(["--color", "never", "compare"])
        .arg(&out)
        .arg(&reference)
        .arg("--diff")
        .arg(&diff)
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("FAIL"))
        .stdout(predicate::str::contains("exceeds the acceptable limit"));

    let overlay = image::open(&diff).unwrap();
    assert_eq!((overlay.width(), overlay.height()), (32, 32));
}

#[test]
fn test_compare_size_mismatch_writes_output_as_artifact() {
    let dir = TempDir::new().unwrap();
    let (out, reference) = write_pair(&dir, &pattern(40, 20, 0), &pattern(20, 40, 0));
    let diff = dir.path().join("diff.png");

    snapprobe()
        .args(["--color", "never", "compare"])
        .arg(&out)
        .arg(&reference)
        .arg("--diff")
        .arg(&diff)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("sizes do not match"));

    assert_eq!(fs::read(&diff).unwrap(), fs::read(&out).unwrap());
}

#[test]
fn test_compare_json_format() {
    let dir = TempDir::new().unwrap();
    let (out, reference) = write_pair(&dir, &pattern(32, 32, 0), &pattern(32, 32, 0));

    let assert = snapprobe()
        .args(["--format", "json", "compare"])
        .arg(&out)
        .arg(&reference)
        .assert()
        .code(0);
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["status"], "PASS");
    assert_eq!(value["difference"], 0.0);
}

#[test]
fn test_compare_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.png");
    write_png(&out, &pattern(16, 16, 0));

    snapprobe()
        .arg("compare")
        .arg(&out)
        .arg(dir.path().join("absent.png"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_compare_too_small_is_error() {
    let dir = TempDir::new().unwrap();
    let (out, reference) = write_pair(&dir, &pattern(8, 8, 0), &pattern(8, 8, 0));

    snapprobe()
        .arg("compare")
        .arg(&out)
        .arg(&reference)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("similarity window"));
}

// ============================================================================
// Check Tests
// ============================================================================

fn check(dir: &TempDir, capture: &Path) -> Command {
    let mut cmd = snapprobe();
    cmd.current_dir(dir.path())
        .args(["--color", "never", "check", "home"])
        .arg(capture)
        .arg("--artifact-dir")
        .arg(dir.path().join("artifacts"));
    cmd
}

#[test]
fn test_check_first_run_creates_reference() {
    let dir = TempDir::new().unwrap();
    let capture = dir.path().join("capture.png");
    write_png(&capture, &pattern(24, 24, 0));

    check(&dir, &capture)
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("SKIP"));

    let reference = dir.path().join("snap_references").join("home.png");
    assert_eq!(fs::read(reference).unwrap(), fs::read(&capture).unwrap());
}

#[test]
fn test_check_second_run_passes() {
    let dir = TempDir::new().unwrap();
    let capture = dir.path().join("capture.png");
    write_png(&capture, &pattern(24, 24, 0));

    check(&dir, &capture).assert().code(0);
    check(&dir, &capture)
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("PASS"));
}

#[test]
fn test_check_changed_capture_fails_and_keeps_diff() {
    let dir = TempDir::new().unwrap();
    let capture = dir.path().join("capture.png");
    write_png(&capture, &pattern(24, 24, 0));
    check(&dir, &capture).assert().code(0);

    write_png(&capture, &pattern(24, 24, 100));
    check(&dir, &capture)
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("FAIL"));
    assert!(dir.path().join("artifacts").join("home.png").exists());
}

#[test]
fn test_check_refresh_references_flag() {
    let dir = TempDir::new().unwrap();
    let capture = dir.path().join("capture.png");
    write_png(&capture, &pattern(24, 24, 0));
    check(&dir, &capture).assert().code(0);

    write_png(&capture, &pattern(24, 24, 100));
    check(&dir, &capture)
        .arg("--refresh-references")
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("SKIP"));
    check(&dir, &capture).assert().code(0);
}

#[test]
fn test_check_refresh_from_environment() {
    let dir = TempDir::new().unwrap();
    let capture = dir.path().join("capture.png");
    write_png(&capture, &pattern(24, 24, 0));
    check(&dir, &capture).assert().code(0);

    check(&dir, &capture)
        .env("SNAPPROBE_REFRESH_REFERENCES", "true")
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("SKIP"));
}

#[test]
fn test_check_keep_output() {
    let dir = TempDir::new().unwrap();
    let capture = dir.path().join("capture.png");
    write_png(&capture, &pattern(24, 24, 0));
    check(&dir, &capture).assert().code(0);

    check(&dir, &capture).arg("--keep-output").assert().code(0);
    assert_eq!(
        fs::read(dir.path().join("artifacts").join("home.png")).unwrap(),
        fs::read(&capture).unwrap()
    );
}

#[test]
fn test_check_missing_capture_is_error() {
    let dir = TempDir::new().unwrap();
    check(&dir, &dir.path().join("absent.png"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Capture failed"));
}

#[test]
fn test_quiet_suppresses_pass_output() {
    let dir = TempDir::new().unwrap();
    let (out, reference) = write_pair(&dir, &pattern(32, 32, 0), &pattern(32, 32, 0));

    snapprobe()
        .args(["-q", "compare"])
        .arg(&out)
        .arg(&reference)
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}
