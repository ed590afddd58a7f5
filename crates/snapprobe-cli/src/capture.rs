//! Capture driver backed by an image file on disk

use snapprobe::{CaptureDriver, Locator, ProbeError, ProbeResult};
use std::path::{Path, PathBuf};

/// Serves a pre-rendered screenshot as the full-page capture
///
/// The file has no addressable elements, so locators match nothing and
/// masking is a no-op.
#[derive(Debug, Clone)]
pub struct FileCapture {
    path: PathBuf,
}

impl FileCapture {
    /// Capture driver reading `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the served image
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> ProbeResult<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| {
            ProbeError::capture(format!("cannot read {}: {e}", self.path.display()))
        })
    }
}

impl CaptureDriver for FileCapture {
    type Element = ();

    fn find_elements(&mut self, _locator: &Locator) -> ProbeResult<Vec<()>> {
        Ok(Vec::new())
    }

    fn set_element_style(&mut self, _element: &(), _css: &str) -> ProbeResult<()> {
        Ok(())
    }

    fn element_screenshot(&mut self, _element: &()) -> ProbeResult<Vec<u8>> {
        self.read()
    }

    fn capture_full_page(&mut self) -> ProbeResult<Vec<u8>> {
        self.read()
    }

    fn maximize_window(&mut self) -> ProbeResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_file_as_page_capture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"png bytes").unwrap();

        let mut driver = FileCapture::new(&path);
        assert_eq!(driver.path(), path.as_path());
        assert_eq!(driver.capture_full_page().unwrap(), b"png bytes");
    }

    #[test]
    fn test_missing_file_is_capture_error() {
        let mut driver = FileCapture::new("/nonexistent/shot.png");
        let err = driver.capture_full_page().unwrap_err();
        assert!(matches!(err, ProbeError::Capture { .. }));
        assert!(err.to_string().contains("/nonexistent/shot.png"));
    }

    #[test]
    fn test_locators_match_nothing() {
        let mut driver = FileCapture::new("shot.png");
        assert!(driver
            .find_elements(&Locator::css(".banner"))
            .unwrap()
            .is_empty());
        driver.maximize_window().unwrap();
    }
}
