//! Full-page capture over raw `DevTools` commands.
//!
//! The viewport is temporarily resized to the document's full scroll extent so
//! the page renders in one frame, a screenshot is taken from the compositor
//! surface, and the override is cleared again. The clear runs on every path
//! once the override has been requested, including a failed screenshot.

use super::DevToolsProtocol;
use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};

/// Script returning the document's full extent and display characteristics
pub const PAGE_METRICS_SCRIPT: &str = r#"({
    width: Math.max(window.innerWidth, document.body.scrollWidth, document.documentElement.scrollWidth)|0,
    height: Math.max(innerHeight, document.body.scrollHeight, document.documentElement.scrollHeight)|0,
    deviceScaleFactor: window.devicePixelRatio || 1,
    mobile: typeof window.orientation !== "undefined"
})"#;

/// Device metrics reported by [`PAGE_METRICS_SCRIPT`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetrics {
    /// Maximum of viewport and scrollable content width, CSS pixels
    pub width: i64,
    /// Maximum of viewport and scrollable content height, CSS pixels
    pub height: i64,
    /// `window.devicePixelRatio`
    pub device_scale_factor: f64,
    /// Mobile emulation flag
    pub mobile: bool,
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            device_scale_factor: 1.0,
            mobile: false,
        }
    }
}

/// Capture the whole scrollable document as PNG
///
/// Order: evaluate metrics, set the metrics override, capture from surface,
/// clear the override. A capture error takes precedence over a clear error.
///
/// # Errors
///
/// Returns the first failing command's error
pub fn capture_full_page<P: DevToolsProtocol + ?Sized>(protocol: &mut P) -> ProbeResult<Vec<u8>> {
    let metrics = protocol.evaluate_page_metrics()?;
    tracing::debug!(
        width = metrics.width,
        height = metrics.height,
        scale = metrics.device_scale_factor,
        mobile = metrics.mobile,
        "overriding device metrics for full-page capture"
    );

    let mut scope = MetricsOverride::acquire(protocol, &metrics)?;
    let screenshot = scope.protocol.capture_screenshot_from_surface();
    let cleared = scope.release();

    match (screenshot, cleared) {
        (Ok(png), Ok(())) => Ok(png),
        (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
        (Err(e), Err(clear_err)) => {
            tracing::warn!(error = %clear_err, "failed to clear device metrics override");
            Err(e)
        }
    }
}

/// Active device metrics override; cleared on release or drop
struct MetricsOverride<'a, P: DevToolsProtocol + ?Sized> {
    protocol: &'a mut P,
    active: bool,
}

impl<'a, P: DevToolsProtocol + ?Sized> MetricsOverride<'a, P> {
    fn acquire(protocol: &'a mut P, metrics: &PageMetrics) -> ProbeResult<Self> {
        let mut scope = Self {
            protocol,
            active: true,
        };
        // A failed set may still leave a partial override behind; drop clears it
        scope.protocol.set_device_metrics_override(metrics)?;
        Ok(scope)
    }

    fn release(mut self) -> ProbeResult<()> {
        self.active = false;
        self.protocol.clear_device_metrics_override()
    }
}

impl<P: DevToolsProtocol + ?Sized> Drop for MetricsOverride<'_, P> {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.protocol.clear_device_metrics_override() {
                tracing::warn!(error = %e, "failed to clear device metrics override");
            }
        }
    }
}
