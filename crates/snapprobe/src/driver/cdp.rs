//! Chromium capture driver over the Chrome `DevTools` Protocol.
//!
//! Wraps chromiumoxide behind the synchronous [`CaptureDriver`] surface by
//! blocking on a runtime owned by the driver. Must not be called from inside
//! another tokio runtime.

use super::{fullpage, CaptureDriver, DevToolsProtocol, PageMetrics, PAGE_METRICS_SCRIPT};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    Bounds, GetWindowForTargetParams, SetWindowBoundsParams, WindowState,
};
use chromiumoxide::cdp::browser_protocol::emulation::{
    ClearDeviceMetricsOverrideParams, SetDeviceMetricsOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// Browser launch settings
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,
    /// Chromium sandbox (disable for containers)
    pub sandbox: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Initial window width
    pub window_width: u32,
    /// Initial window height
    pub window_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chromium_path: None,
            window_width: 1280,
            window_height: 800,
        }
    }
}

impl BrowserSettings {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set initial window size
    #[must_use]
    pub const fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }
}

/// Capture driver backed by a launched Chromium page
#[derive(Debug)]
pub struct CdpDriver {
    runtime: Runtime,
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl CdpDriver {
    /// Launch Chromium and open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if the runtime or the browser cannot be started
    pub fn launch(settings: &BrowserSettings) -> ProbeResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let mut builder =
            BrowserConfig::builder().window_size(settings.window_width, settings.window_height);
        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = settings.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| ProbeError::capture(format!("invalid browser configuration: {e}")))?;

        let (browser, page, handler) = runtime.block_on(async {
            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| ProbeError::capture(format!("browser launch failed: {e}")))?;

            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ProbeError::protocol("Target.createTarget", e.to_string()))?;
            Ok::<_, ProbeError>((browser, page, handle))
        })?;

        tracing::info!(headless = settings.headless, "browser launched");
        Ok(Self {
            runtime,
            browser,
            page,
            handler,
        })
    }

    /// Navigate the page and wait for the load to finish
    ///
    /// # Errors
    ///
    /// Returns error if navigation fails
    pub fn goto(&mut self, url: &str) -> ProbeResult<()> {
        self.runtime
            .block_on(self.page.goto(url))
            .map_err(|e| ProbeError::protocol("Page.navigate", e.to_string()))?;
        tracing::debug!(url, "navigated");
        Ok(())
    }

    /// Underlying chromiumoxide page, for UI actions before a comparison
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// Run a future on the driver's runtime
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Close the browser
    pub fn close(mut self) -> ProbeResult<()> {
        self.runtime
            .block_on(self.browser.close())
            .map_err(|e| ProbeError::protocol("Browser.close", e.to_string()))?;
        Ok(())
    }
}

impl Drop for CdpDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

impl CaptureDriver for CdpDriver {
    type Element = Element;

    fn find_elements(&mut self, locator: &Locator) -> ProbeResult<Vec<Element>> {
        let found = if let Locator::XPath(expression) = locator {
            self.runtime
                .block_on(self.page.find_xpaths(expression.as_str()))
        } else {
            let css = locator.to_css().unwrap_or_default();
            self.runtime.block_on(self.page.find_elements(css))
        };
        found.map_err(|e| ProbeError::protocol("DOM.querySelectorAll", e.to_string()))
    }

    fn set_element_style(&mut self, element: &Element, css: &str) -> ProbeResult<()> {
        let function = format!("function() {{ this.setAttribute('style', {css:?}); }}");
        self.runtime
            .block_on(element.call_js_fn(function, false))
            .map_err(|e| ProbeError::protocol("Runtime.callFunctionOn", e.to_string()))?;
        Ok(())
    }

    fn element_screenshot(&mut self, element: &Element) -> ProbeResult<Vec<u8>> {
        self.runtime
            .block_on(element.screenshot(CaptureScreenshotFormat::Png))
            .map_err(|e| ProbeError::capture(e.to_string()))
    }

    fn capture_full_page(&mut self) -> ProbeResult<Vec<u8>> {
        fullpage::capture_full_page(self)
    }

    fn maximize_window(&mut self) -> ProbeResult<()> {
        let page = &self.page;
        self.runtime.block_on(async {
            let window = page
                .execute(GetWindowForTargetParams::default())
                .await
                .map_err(|e| ProbeError::protocol("Browser.getWindowForTarget", e.to_string()))?;
            let bounds = Bounds::builder().window_state(WindowState::Maximized).build();
            page.execute(SetWindowBoundsParams::new(
                window.result.window_id.clone(),
                bounds,
            ))
            .await
            .map_err(|e| ProbeError::protocol("Browser.setWindowBounds", e.to_string()))?;
            Ok(())
        })
    }
}

impl DevToolsProtocol for CdpDriver {
    fn evaluate_page_metrics(&mut self) -> ProbeResult<PageMetrics> {
        let evaluated = self
            .runtime
            .block_on(self.page.evaluate(PAGE_METRICS_SCRIPT))
            .map_err(|e| ProbeError::protocol("Runtime.evaluate", e.to_string()))?;
        evaluated
            .into_value()
            .map_err(|e| ProbeError::protocol("Runtime.evaluate", e.to_string()))
    }

    fn set_device_metrics_override(&mut self, metrics: &PageMetrics) -> ProbeResult<()> {
        let params = SetDeviceMetricsOverrideParams::new(
            metrics.width,
            metrics.height,
            metrics.device_scale_factor,
            metrics.mobile,
        );
        self.runtime
            .block_on(self.page.execute(params))
            .map_err(|e| ProbeError::protocol("Emulation.setDeviceMetricsOverride", e.to_string()))?;
        Ok(())
    }

    fn capture_screenshot_from_surface(&mut self) -> ProbeResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .from_surface(true)
            .build();
        let screenshot = self
            .runtime
            .block_on(self.page.execute(params))
            .map_err(|e| ProbeError::protocol("Page.captureScreenshot", e.to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| ProbeError::protocol("Page.captureScreenshot", e.to_string()))
    }

    fn clear_device_metrics_override(&mut self) -> ProbeResult<()> {
        self.runtime
            .block_on(self.page.execute(ClearDeviceMetricsOverrideParams::default()))
            .map_err(|e| {
                ProbeError::protocol("Emulation.clearDeviceMetricsOverride", e.to_string())
            })?;
        Ok(())
    }
}
