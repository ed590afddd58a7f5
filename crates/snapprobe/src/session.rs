//! Snapshot sessions: mask, capture, then establish or compare a reference.
//!
//! ```text
//! Configuring ──capture──► Captured ──┬─ no reference ──────► ReferenceMissing
//!                                     ├─ refresh requested ─► ReferenceStale
//!                                     └─ reference present ─► Compared
//! ```
//!
//! The first two terminal states write the capture as the new reference and
//! end inconclusively. Only `Compared` can pass or fail.

use crate::asserter::Asserter;
use crate::config::ProbeConfig;
use crate::driver::{CaptureDriver, MASK_STYLE};
use crate::image_source::ImageSource;
use crate::locator::{Locator, LocatorSet};
use crate::result::{ProbeError, ProbeResult};
use crate::store::ReferenceStore;
use std::path::PathBuf;

/// Message attached to the inconclusive outcome when a reference is (re)written
pub const REFERENCE_ESTABLISHED_MESSAGE: &str =
    "Reference snapshot is missing or out of date. The current screenshot is saved as a reference.";

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting configuration; no capture yet
    Configuring,
    /// Output captured, reference not yet consulted
    Captured,
    /// No reference existed; the capture became the reference
    ReferenceMissing,
    /// Refresh was requested; the capture replaced the reference
    ReferenceStale,
    /// Capture was compared against the reference
    Compared,
}

/// Non-failing result of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Difference stayed within the threshold
    Passed {
        /// Measured difference percentage
        difference: f64,
    },
    /// Capture was written as the reference; the comparison is inconclusive
    ReferenceEstablished {
        /// Reference file written
        path: PathBuf,
        /// Human-readable explanation
        message: &'static str,
    },
}

impl Verdict {
    /// Whether this verdict is a pass
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

/// Orchestrates one named snapshot against its reference
#[derive(Debug)]
pub struct SnapshotSession<D: CaptureDriver> {
    driver: D,
    store: ReferenceStore,
    config: ProbeConfig,
    fullpage: bool,
    mask_locators: LocatorSet,
    element_locator: Option<Locator>,
    identity: Option<String>,
    output_capture: Option<Vec<u8>>,
    difference_image: Option<Vec<u8>>,
    state: SessionState,
}

impl<D: CaptureDriver> SnapshotSession<D> {
    /// Start a session storing references under `config.reference_dir`
    ///
    /// A relative reference directory is resolved against the working
    /// directory. The directory is created and the window maximized.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or the window cannot be maximized
    pub fn new(driver: D, config: ProbeConfig) -> ProbeResult<Self> {
        let root = if config.reference_dir.is_absolute() {
            config.reference_dir.clone()
        } else {
            std::env::current_dir()?.join(&config.reference_dir)
        };
        Self::with_store(driver, config, ReferenceStore::new(root))
    }

    /// Start a session with an explicit reference store
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or the window cannot be maximized
    pub fn with_store(mut driver: D, config: ProbeConfig, store: ReferenceStore) -> ProbeResult<Self> {
        store.ensure_directory()?;
        driver.maximize_window()?;
        tracing::debug!(root = %store.root().display(), "snapshot session started");
        Ok(Self {
            driver,
            store,
            config,
            fullpage: true,
            mask_locators: LocatorSet::new(),
            element_locator: None,
            identity: None,
            output_capture: None,
            difference_image: None,
            state: SessionState::Configuring,
        })
    }

    /// Capture the whole scrollable page (default) or not
    pub fn set_fullpage(&mut self, fullpage: bool) -> &mut Self {
        self.fullpage = fullpage;
        self
    }

    /// Elements hidden before each capture
    pub fn set_mask_locators(&mut self, locators: LocatorSet) -> &mut Self {
        self.mask_locators = locators;
        self
    }

    /// Element captured when full-page capture is off
    pub fn set_element_locator(&mut self, locator: Option<Locator>) -> &mut Self {
        self.element_locator = locator;
        self
    }

    /// Name of the reference file, without extension
    pub fn set_identity(&mut self, identity: impl Into<String>) -> &mut Self {
        self.identity = Some(identity.into());
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Configured identity
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Bytes of the last capture
    #[must_use]
    pub fn output_capture(&self) -> Option<&[u8]> {
        self.output_capture.as_deref()
    }

    /// Artifact of the last failed comparison
    ///
    /// The highlighted diff for an exceeded difference, the raw capture for a size mismatch.
    #[must_use]
    pub fn difference_image(&self) -> Option<&[u8]> {
        self.difference_image.as_deref()
    }

    /// Reference store
    #[must_use]
    pub const fn store(&self) -> &ReferenceStore {
        &self.store
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Borrow the driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Borrow the driver mutably
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// End the session, returning the driver
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Capture and compare without running any actions first
    ///
    /// # Errors
    ///
    /// See [`Self::compare_snapshots`]
    pub fn assert_snapshots(&mut self, threshold: f64) -> ProbeResult<Verdict> {
        self.compare_snapshots(threshold, |_| Ok(()))
    }

    /// Run `actions` against the driver, then capture and compare
    ///
    /// An error from `actions` is returned before anything is captured.
    ///
    /// # Errors
    ///
    /// Configuration errors, masking and capture failures, `SizeMismatch`,
    /// `DifferenceExceeded`, and I/O errors from the reference store
    pub fn compare_snapshots<F>(&mut self, threshold: f64, actions: F) -> ProbeResult<Verdict>
    where
        F: FnOnce(&mut D) -> ProbeResult<()>,
    {
        actions(&mut self.driver)?;
        self.run(threshold)
    }

    fn run(&mut self, threshold: f64) -> ProbeResult<Verdict> {
        self.state = SessionState::Configuring;
        self.output_capture = None;
        self.difference_image = None;

        let identity = self
            .identity
            .clone()
            .filter(|identity| !identity.is_empty())
            .ok_or(ProbeError::MissingIdentity)?;
        if !self.fullpage && self.element_locator.is_none() {
            return Err(ProbeError::NoCaptureTargetConfigured);
        }

        self.mask_elements()?;
        let capture = self.capture(&identity)?;
        self.output_capture = Some(capture.clone());
        self.state = SessionState::Captured;

        let missing = !self.store.exists(&identity);
        if missing || self.config.refresh_references {
            self.state = if missing {
                SessionState::ReferenceMissing
            } else {
                SessionState::ReferenceStale
            };
            let path = self.store.write(&identity, &capture)?;
            tracing::info!(
                identity = %identity,
                path = %path.display(),
                refreshed = !missing,
                "reference established"
            );
            return Ok(Verdict::ReferenceEstablished {
                path,
                message: REFERENCE_ESTABLISHED_MESSAGE,
            });
        }

        self.state = SessionState::Compared;
        let asserter = Asserter::new(
            &ImageSource::Bytes(capture),
            &ImageSource::Path(self.store.resolve_path(&identity)),
            threshold,
        )?;
        match asserter.assert_snap() {
            Ok(difference) => {
                tracing::info!(identity = %identity, difference, threshold, "snapshot matches reference");
                Ok(Verdict::Passed { difference })
            }
            Err(e @ ProbeError::SizeMismatch { .. }) => {
                tracing::warn!(identity = %identity, error = %e, "snapshot size differs from reference");
                self.difference_image = self.output_capture.clone();
                Err(e)
            }
            Err(e @ ProbeError::DifferenceExceeded { .. }) => {
                tracing::warn!(identity = %identity, error = %e, "snapshot differs from reference");
                self.difference_image = Some(asserter.difference_image()?);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn mask_elements(&mut self) -> ProbeResult<()> {
        for locator in &self.mask_locators {
            let elements = self.driver.find_elements(locator)?;
            for element in &elements {
                if let Err(e) = self.driver.set_element_style(element, MASK_STYLE) {
                    tracing::error!(locator = %locator, error = %e, "failed to mask element");
                    return Err(ProbeError::MaskingFailure {
                        locator: locator.to_string(),
                        message: e.to_string(),
                    });
                }
            }
            tracing::debug!(locator = %locator, count = elements.len(), "masked elements");
        }
        Ok(())
    }

    fn capture(&mut self, identity: &str) -> ProbeResult<Vec<u8>> {
        if self.fullpage {
            tracing::debug!(identity, "capturing full page");
            return self.driver.capture_full_page();
        }
        let Some(locator) = self.element_locator.as_ref() else {
            return Err(ProbeError::NoCaptureTargetConfigured);
        };
        tracing::debug!(identity, locator = %locator, "capturing element");
        let element = self
            .driver
            .find_elements(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::ElementNotFound {
                locator: locator.to_string(),
            })?;
        self.driver.element_screenshot(&element)
    }
}
