//! Snapprobe: screenshot visual regression for browser tests
//!
//! A snapshot session captures a page (or one element), then either stores the
//! capture as the reference for its identity or compares it against the stored
//! reference with a Gaussian-windowed SSIM score.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SNAPPROBE Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────────┐    │
//! │   │ Snapshot   │───►│ Capture    │───►│ Chromium (CDP)     │    │
//! │   │ Session    │    │ Driver     │    │ or MockDriver      │    │
//! │   └─────┬──────┘    └────────────┘    └────────────────────┘    │
//! │         │                                                       │
//! │         ├──► ReferenceStore   snap_references/<identity>.png    │
//! │         │                                                       │
//! │         └──► Asserter ──► SimilarityEngine (SSIM)               │
//! │                       └─► DiffVisualizer (Otsu + contours)      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use snapprobe::prelude::*;
//!
//! # fn main() -> ProbeResult<()> {
//! let driver = MockDriver::new().with_page_capture(std::fs::read("page.png")?);
//! let mut session = SnapshotSession::new(driver, ProbeConfig::from_env())?;
//! session.set_identity("login_page");
//! match session.assert_snapshots(0.5) {
//!     Ok(Verdict::Passed { difference }) => println!("{difference}% different"),
//!     Ok(Verdict::ReferenceEstablished { message, .. }) => println!("{message}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::float_cmp))]

#[allow(clippy::module_name_repetitions)]
mod asserter;
mod config;
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::many_single_char_names
)]
pub mod contour;
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
mod diff;
pub mod driver;
mod image_source;
mod locator;
mod report;
mod result;
mod session;
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::many_single_char_names,
    clippy::suboptimal_flops
)]
mod similarity;
mod store;

pub use asserter::Asserter;
pub use config::{
    ProbeConfig, DEFAULT_ARTIFACT_DIR, DEFAULT_REFERENCE_DIR, ENV_ARTIFACT_DIR, ENV_KEEP_OUTPUT,
    ENV_REFERENCE_DIR, ENV_REFRESH_REFERENCES,
};
pub use diff::{DiffOverlay, DiffVisualizer, HIGHLIGHT_COLOR, OVERLAY_OPACITY};
pub use driver::{CaptureDriver, DevToolsProtocol, MockDriver, PageMetrics, MASK_STYLE};
pub use image_source::{decode, encode_png, ImageSource, PixelBuffer};
pub use locator::{Locator, LocatorSet};
pub use report::{ArtifactWriter, FailureKind, Outcome};
pub use result::{Dimensions, ProbeError, ProbeResult};
pub use session::{SessionState, SnapshotSession, Verdict, REFERENCE_ESTABLISHED_MESSAGE};
pub use similarity::{
    difference_percent, SimilarityEngine, SimilarityMap, SimilarityResult, SsimParams,
};
pub use store::ReferenceStore;

#[cfg(feature = "browser")]
pub use driver::{BrowserSettings, CdpDriver};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        Asserter, ArtifactWriter, CaptureDriver, ImageSource, Locator, LocatorSet, MockDriver,
        Outcome, PixelBuffer, ProbeConfig, ProbeError, ProbeResult, ReferenceStore,
        SnapshotSession, Verdict,
    };

    #[cfg(feature = "browser")]
    pub use super::{BrowserSettings, CdpDriver};
}
