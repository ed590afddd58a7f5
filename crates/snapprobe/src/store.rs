//! On-disk reference images keyed by snapshot identity.

use crate::config::DEFAULT_REFERENCE_DIR;
use crate::result::ProbeResult;
use std::path::{Path, PathBuf};

/// Directory of reference images, one `<identity>.png` per snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceStore {
    root: PathBuf,
}

impl ReferenceStore {
    /// Store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at `<cwd>/snap_references`
    ///
    /// # Errors
    ///
    /// Returns error if the working directory cannot be determined
    pub fn in_working_dir() -> ProbeResult<Self> {
        Ok(Self::new(std::env::current_dir()?.join(DEFAULT_REFERENCE_DIR)))
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the reference for `identity`
    #[must_use]
    pub fn resolve_path(&self, identity: &str) -> PathBuf {
        self.root.join(format!("{identity}.png"))
    }

    /// Create the root directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn ensure_directory(&self) -> ProbeResult<()> {
        match std::fs::create_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && self.root.is_dir() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a reference exists for `identity`
    #[must_use]
    pub fn exists(&self, identity: &str) -> bool {
        self.resolve_path(identity).is_file()
    }

    /// Write (or overwrite) the reference for `identity`, returning its path
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn write(&self, identity: &str, png: &[u8]) -> ProbeResult<PathBuf> {
        let path = self.resolve_path(identity);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, png)?;
        tracing::debug!(path = %path.display(), bytes = png.len(), "reference written");
        Ok(path)
    }

    /// Read the raw bytes of the reference for `identity`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub fn read(&self, identity: &str) -> ProbeResult<Vec<u8>> {
        Ok(std::fs::read(self.resolve_path(identity))?)
    }
}
