//! Capture drivers: the boundary between snapshot sessions and a live browser.
//!
//! ```text
//! ┌──────────────────┐   find / style / screenshot   ┌──────────────────┐
//! │ SnapshotSession  │──────────────────────────────►│  CaptureDriver   │
//! └──────────────────┘                               ├──────────────────┤
//!                                                    │ CdpDriver        │ (feature `browser`)
//!                                                    │ MockDriver       │ (scripted, offline)
//!                                                    └──────────────────┘
//! ```
//!
//! Full-page capture is expressed over the lower-level [`DevToolsProtocol`]
//! commands so that every driver shares the same override/capture/clear
//! sequence (see [`fullpage`]).

use crate::locator::Locator;
use crate::result::ProbeResult;

pub mod fullpage;
pub mod mock;

#[cfg(feature = "browser")]
#[allow(
    clippy::missing_errors_doc,
    clippy::significant_drop_tightening,
    clippy::cast_possible_truncation
)]
pub mod cdp;

pub use fullpage::{capture_full_page, PageMetrics, PAGE_METRICS_SCRIPT};
pub use mock::{MockDriver, MockElement};

#[cfg(feature = "browser")]
pub use cdp::{BrowserSettings, CdpDriver};

/// Inline style applied to masked elements
pub const MASK_STYLE: &str = "opacity:0;";

/// Browser operations needed to capture snapshots
pub trait CaptureDriver {
    /// Handle to a located page element
    type Element;

    /// All elements matching `locator`, in document order
    ///
    /// # Errors
    ///
    /// Returns error if the lookup cannot be performed
    fn find_elements(&mut self, locator: &Locator) -> ProbeResult<Vec<Self::Element>>;

    /// Replace the inline style of `element`
    ///
    /// # Errors
    ///
    /// Returns error if the style cannot be applied
    fn set_element_style(&mut self, element: &Self::Element, css: &str) -> ProbeResult<()>;

    /// PNG screenshot clipped to `element`
    ///
    /// # Errors
    ///
    /// Returns error if the screenshot fails
    fn element_screenshot(&mut self, element: &Self::Element) -> ProbeResult<Vec<u8>>;

    /// PNG screenshot of the entire scrollable document
    ///
    /// # Errors
    ///
    /// Returns error if any step of the capture fails
    fn capture_full_page(&mut self) -> ProbeResult<Vec<u8>>;

    /// Maximize the browser window
    ///
    /// # Errors
    ///
    /// Returns error if the window cannot be resized
    fn maximize_window(&mut self) -> ProbeResult<()>;
}

/// Raw `DevTools` commands behind full-page capture
pub trait DevToolsProtocol {
    /// `Runtime.evaluate` of [`PAGE_METRICS_SCRIPT`]
    ///
    /// # Errors
    ///
    /// Returns error if evaluation fails or the result is malformed
    fn evaluate_page_metrics(&mut self) -> ProbeResult<PageMetrics>;

    /// `Emulation.setDeviceMetricsOverride`
    ///
    /// # Errors
    ///
    /// Returns error if the command fails
    fn set_device_metrics_override(&mut self, metrics: &PageMetrics) -> ProbeResult<()>;

    /// `Page.captureScreenshot` with `format: png` and `fromSurface: true`, decoded from base64
    ///
    /// # Errors
    ///
    /// Returns error if the command fails or the payload is not valid base64
    fn capture_screenshot_from_surface(&mut self) -> ProbeResult<Vec<u8>>;

    /// `Emulation.clearDeviceMetricsOverride`
    ///
    /// # Errors
    ///
    /// Returns error if the command fails
    fn clear_device_metrics_override(&mut self) -> ProbeResult<()>;
}
