//! Snapshot Session Demo
//!
//! Walks one identity through the reference lifecycle with a scripted driver:
//! - First run stores the reference and is reported as skipped
//! - Matching capture passes
//! - Changed capture fails with a highlighted difference image
//! - Masked elements and the full-page command sequence
//!
//! Run with: cargo run --example snapshot_demo -p snapprobe

use image::{Rgb, RgbImage};
use snapprobe::prelude::*;
use snapprobe::{encode_png, Outcome};

fn main() {
    println!("=== Snapshot Session Demo ===\n");

    let workspace = tempfile::TempDir::new().expect("temp dir");
    let config = ProbeConfig::default()
        .with_reference_dir(workspace.path().join("snap_references"))
        .with_artifact_dir(workspace.path().join("artifacts"));

    // Demo 1: Direct comparison
    println!("1. Asserter");
    println!("   --------");
    let page = render_page(0);
    let asserter = Asserter::from_buffers(
        PixelBuffer::from_rgb(page.clone()),
        PixelBuffer::from_rgb(render_page(40)),
        1.0,
    );
    let difference = asserter.difference().expect("comparable images");
    println!("   Difference against shifted page: {difference}%");
    println!("   Within 1%: {}\n", asserter.assert_snap().is_ok());

    // Demo 2: Reference lifecycle
    println!("2. Reference Lifecycle");
    println!("   -------------------");
    let driver = MockDriver::new().with_page_capture(encode_png(&page).expect("png"));
    let mut session = SnapshotSession::new(driver, config.clone()).expect("session");
    session.set_identity("dashboard");

    let first = session.assert_snapshots(0.0);
    println!("   First run:  {}", Outcome::from_comparison(&first, &session).label());
    let second = session.assert_snapshots(0.0);
    println!("   Second run: {}", Outcome::from_comparison(&second, &session).label());

    session
        .driver_mut()
        .set_page_capture(encode_png(&render_page(90)).expect("png"));
    let third = session.assert_snapshots(0.0);
    let outcome = Outcome::from_comparison(&third, &session);
    println!("   Changed:    {}", outcome.label());
    if let Err(e) = &third {
        println!("   Reason:     {e}");
    }
    let written = ArtifactWriter::from_config(&config)
        .persist(&session, &outcome)
        .expect("artifact");
    if let Some(path) = written {
        println!("   Artifact:   {}\n", path.display());
    }

    // Demo 3: Masking and full-page protocol
    println!("3. Masking");
    println!("   -------");
    let clock = Locator::css(".clock");
    let driver = MockDriver::new()
        .with_page_capture(encode_png(&page).expect("png"))
        .with_elements(clock.clone(), 2);
    let mut session = SnapshotSession::new(driver, config).expect("session");
    session
        .set_identity("masked_dashboard")
        .set_mask_locators(LocatorSet::new().with(clock));
    session.assert_snapshots(0.0).expect("reference stored");
    for call in session.driver().history() {
        println!("   {call}");
    }

    println!("\n=== Demo Complete ===");
}

fn render_page(shift: u8) -> RgbImage {
    RgbImage::from_fn(64, 48, |x, y| {
        let band = ((x / 8 + y / 6) as u8).wrapping_mul(23).wrapping_add(shift);
        Rgb([band, 255 - band, band / 2])
    })
}
