//! Scripted in-memory driver for tests and offline runs.

use super::{fullpage, CaptureDriver, DevToolsProtocol, PageMetrics};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use std::collections::HashMap;

/// Element handle produced by [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Locator that matched the element
    pub locator: Locator,
    /// Position among the locator's matches
    pub index: usize,
}

/// Mock driver recording every call
#[derive(Debug, Default)]
pub struct MockDriver {
    page_capture: Vec<u8>,
    element_captures: HashMap<Locator, Vec<u8>>,
    element_counts: HashMap<Locator, usize>,
    metrics: PageMetrics,
    applied_metrics: Option<PageMetrics>,
    overridden: bool,
    styles: Vec<(MockElement, String)>,
    fail_style_on: Option<Locator>,
    fail_override: bool,
    fail_capture: bool,
    fail_clear: bool,
    call_history: Vec<String>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes returned by full-page capture
    #[must_use]
    pub fn with_page_capture(mut self, png: Vec<u8>) -> Self {
        self.page_capture = png;
        self
    }

    /// Register `count` elements matching `locator`
    #[must_use]
    pub fn with_elements(mut self, locator: Locator, count: usize) -> Self {
        self.element_counts.insert(locator, count);
        self
    }

    /// Bytes returned by element screenshots of `locator`'s matches
    #[must_use]
    pub fn with_element_capture(mut self, locator: Locator, png: Vec<u8>) -> Self {
        self.element_counts.entry(locator.clone()).or_insert(1);
        self.element_captures.insert(locator, png);
        self
    }

    /// Metrics reported by the page metrics script
    #[must_use]
    pub fn with_metrics(mut self, metrics: PageMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Fail when styling any match of `locator`
    #[must_use]
    pub fn failing_style(mut self, locator: Locator) -> Self {
        self.fail_style_on = Some(locator);
        self
    }

    /// Fail `Emulation.setDeviceMetricsOverride`
    #[must_use]
    pub const fn failing_override(mut self) -> Self {
        self.fail_override = true;
        self
    }

    /// Fail `Page.captureScreenshot`
    #[must_use]
    pub const fn failing_capture(mut self) -> Self {
        self.fail_capture = true;
        self
    }

    /// Fail `Emulation.clearDeviceMetricsOverride`
    #[must_use]
    pub const fn failing_clear(mut self) -> Self {
        self.fail_clear = true;
        self
    }

    /// Replace the full-page capture between comparisons
    pub fn set_page_capture(&mut self, png: Vec<u8>) {
        self.page_capture = png;
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.call_history
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }

    /// Styles applied so far
    #[must_use]
    pub fn styles(&self) -> &[(MockElement, String)] {
        &self.styles
    }

    /// Metrics passed to the last override
    #[must_use]
    pub const fn applied_metrics(&self) -> Option<&PageMetrics> {
        self.applied_metrics.as_ref()
    }

    /// Whether a metrics override is currently in effect
    #[must_use]
    pub const fn metrics_overridden(&self) -> bool {
        self.overridden
    }
}

impl CaptureDriver for MockDriver {
    type Element = MockElement;

    fn find_elements(&mut self, locator: &Locator) -> ProbeResult<Vec<MockElement>> {
        self.call_history.push(format!("find_elements:{locator}"));
        let count = self.element_counts.get(locator).copied().unwrap_or(0);
        Ok((0..count)
            .map(|index| MockElement {
                locator: locator.clone(),
                index,
            })
            .collect())
    }

    fn set_element_style(&mut self, element: &MockElement, css: &str) -> ProbeResult<()> {
        self.call_history
            .push(format!("set_element_style:{}#{}", element.locator, element.index));
        if self.fail_style_on.as_ref() == Some(&element.locator) {
            return Err(ProbeError::protocol(
                "Runtime.callFunctionOn",
                "element is not attached to the page document",
            ));
        }
        self.styles.push((element.clone(), css.to_string()));
        Ok(())
    }

    fn element_screenshot(&mut self, element: &MockElement) -> ProbeResult<Vec<u8>> {
        self.call_history
            .push(format!("element_screenshot:{}#{}", element.locator, element.index));
        Ok(self
            .element_captures
            .get(&element.locator)
            .cloned()
            .unwrap_or_else(|| self.page_capture.clone()))
    }

    fn capture_full_page(&mut self) -> ProbeResult<Vec<u8>> {
        fullpage::capture_full_page(self)
    }

    fn maximize_window(&mut self) -> ProbeResult<()> {
        self.call_history.push("maximize_window".to_string());
        Ok(())
    }
}

impl DevToolsProtocol for MockDriver {
    fn evaluate_page_metrics(&mut self) -> ProbeResult<PageMetrics> {
        self.call_history.push("Runtime.evaluate".to_string());
        Ok(self.metrics.clone())
    }

    fn set_device_metrics_override(&mut self, metrics: &PageMetrics) -> ProbeResult<()> {
        self.call_history
            .push("Emulation.setDeviceMetricsOverride".to_string());
        if self.fail_override {
            return Err(ProbeError::protocol(
                "Emulation.setDeviceMetricsOverride",
                "invalid parameters",
            ));
        }
        self.applied_metrics = Some(metrics.clone());
        self.overridden = true;
        Ok(())
    }

    fn capture_screenshot_from_surface(&mut self) -> ProbeResult<Vec<u8>> {
        self.call_history.push("Page.captureScreenshot".to_string());
        if self.fail_capture {
            return Err(ProbeError::protocol(
                "Page.captureScreenshot",
                "unable to capture screenshot",
            ));
        }
        Ok(self.page_capture.clone())
    }

    fn clear_device_metrics_override(&mut self) -> ProbeResult<()> {
        self.call_history
            .push("Emulation.clearDeviceMetricsOverride".to_string());
        if self.fail_clear {
            return Err(ProbeError::protocol(
                "Emulation.clearDeviceMetricsOverride",
                "target closed",
            ));
        }
        self.overridden = false;
        Ok(())
    }
}
