//! Result and error types for Snapprobe.

use thiserror::Error;

/// Result type for Snapprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Width and height of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors that can occur in Snapprobe
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Image input of a kind the decoder does not accept
    #[error("{found} is an unsupported image input, expected {expected}")]
    UnsupportedInputType {
        /// Description of the rejected input
        found: String,
        /// The accepted input kinds
        expected: &'static str,
    },

    /// Image could not be read or decoded
    #[error("Failed to decode image from {source_desc}: {message}")]
    Decode {
        /// Where the image came from (path or buffer)
        source_desc: String,
        /// Error message
        message: String,
    },

    /// Similarity was requested for buffers of different shape
    #[error("Cannot compute similarity of {left} and {right} images")]
    ShapeMismatch {
        /// First buffer dimensions
        left: Dimensions,
        /// Second buffer dimensions
        right: Dimensions,
    },

    /// Image is smaller than the similarity window
    #[error("Image {dimensions} is smaller than the {window}px similarity window")]
    ImageTooSmall {
        /// Image dimensions
        dimensions: Dimensions,
        /// Window side length
        window: usize,
    },

    /// Neither full-page nor element capture is configured
    #[error("No capture target configured: enable full-page capture or set an element locator")]
    NoCaptureTargetConfigured,

    /// Session has no identity to name its reference file
    #[error("Snapshot identity is not set")]
    MissingIdentity,

    /// Hiding a masked element failed
    #[error("Failed to mask element matched by {locator}: {message}")]
    MaskingFailure {
        /// Locator of the element that could not be masked
        locator: String,
        /// Underlying driver error
        message: String,
    },

    /// Locator matched nothing
    #[error("No element matches {locator}")]
    ElementNotFound {
        /// Locator that matched nothing
        locator: String,
    },

    /// Screenshot capture failed
    #[error("Capture failed: {message}")]
    Capture {
        /// Error message
        message: String,
    },

    /// A browser protocol command failed
    #[error("Protocol command {command} failed: {message}")]
    Protocol {
        /// Protocol method name
        command: String,
        /// Error message
        message: String,
    },

    /// Reference and output images differ in size
    #[error("Screenshot sizes do not match: output is {output}, reference is {reference}")]
    SizeMismatch {
        /// Captured image dimensions
        output: Dimensions,
        /// Reference image dimensions
        reference: Dimensions,
    },

    /// Difference percentage exceeds the configured limit
    #[error("The difference between output and reference ({difference}) exceeds the acceptable limit ({threshold})")]
    DifferenceExceeded {
        /// Measured difference percentage
        difference: f64,
        /// Configured limit
        threshold: f64,
    },

    /// Image encoding failed
    #[error("Image encoding failed: {message}")]
    Encode {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Create a capture error
    #[must_use]
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture {
            message: message.into(),
        }
    }

    /// Create a protocol error
    #[must_use]
    pub fn protocol(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a comparison verdict rather than a fault
    #[must_use]
    pub const fn is_comparison_failure(&self) -> bool {
        matches!(
            self,
            Self::SizeMismatch { .. } | Self::DifferenceExceeded { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_message_carries_both_shapes() {
        let err = ProbeError::SizeMismatch {
            output: Dimensions::new(100, 199),
            reference: Dimensions::new(100, 200),
        };
        let msg = err.to_string();
        assert!(msg.contains("100x199"));
        assert!(msg.contains("100x200"));
        assert!(err.is_comparison_failure());
    }

    #[test]
    fn test_difference_exceeded_message() {
        let err = ProbeError::DifferenceExceeded {
            difference: 3.25,
            threshold: 1.0,
        };
        assert!(err.to_string().contains("(3.25)"));
        assert!(err.to_string().contains("(1)"));
        assert!(err.is_comparison_failure());
    }

    #[test]
    fn test_fatal_errors_are_not_comparison_failures() {
        assert!(!ProbeError::NoCaptureTargetConfigured.is_comparison_failure());
        assert!(!ProbeError::capture("boom").is_comparison_failure());
        let io = ProbeError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(!io.is_comparison_failure());
    }
}
