//! Comparison of one output capture against one reference image.

use crate::diff::DiffVisualizer;
use crate::image_source::{ImageSource, PixelBuffer};
use crate::result::{ProbeError, ProbeResult};
use crate::similarity::{SimilarityEngine, SimilarityResult};
use std::cell::OnceCell;

/// Asserts that an output image stays within a difference limit of its reference
///
/// Similarity is computed at most once, on first use; the diff image is only
/// rendered when asked for.
#[derive(Debug)]
pub struct Asserter {
    output: PixelBuffer,
    reference: PixelBuffer,
    difference_limit: f64,
    engine: SimilarityEngine,
    visualizer: DiffVisualizer,
    similarity: OnceCell<SimilarityResult>,
}

impl Asserter {
    /// Decode both images
    ///
    /// # Errors
    ///
    /// Returns error if either image cannot be decoded
    pub fn new(
        output: &ImageSource,
        reference: &ImageSource,
        difference_limit: f64,
    ) -> ProbeResult<Self> {
        Ok(Self::from_buffers(
            output.decode()?,
            reference.decode()?,
            difference_limit,
        ))
    }

    /// Compare already decoded buffers
    #[must_use]
    pub fn from_buffers(output: PixelBuffer, reference: PixelBuffer, difference_limit: f64) -> Self {
        Self {
            output,
            reference,
            difference_limit,
            engine: SimilarityEngine::default(),
            visualizer: DiffVisualizer::default(),
            similarity: OnceCell::new(),
        }
    }

    /// Use a custom similarity engine
    #[must_use]
    pub fn with_engine(mut self, engine: SimilarityEngine) -> Self {
        self.engine = engine;
        self.similarity = OnceCell::new();
        self
    }

    /// Decoded output image
    #[must_use]
    pub const fn output(&self) -> &PixelBuffer {
        &self.output
    }

    /// Decoded reference image
    #[must_use]
    pub const fn reference(&self) -> &PixelBuffer {
        &self.reference
    }

    /// Configured limit on the difference percentage
    #[must_use]
    pub const fn difference_limit(&self) -> f64 {
        self.difference_limit
    }

    /// Whether both images have the same width and height
    #[must_use]
    pub fn shapes_match(&self) -> bool {
        self.output.dimensions() == self.reference.dimensions()
    }

    /// Similarity of reference and output, computed on first call
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` if shapes differ, or any error from the similarity engine
    pub fn similarity(&self) -> ProbeResult<&SimilarityResult> {
        if let Some(result) = self.similarity.get() {
            return Ok(result);
        }
        self.check_shapes()?;
        let result = self.engine.compare(&self.reference, &self.output)?;
        Ok(self.similarity.get_or_init(|| result))
    }

    /// Difference percentage, rounded to four decimal places
    ///
    /// # Errors
    ///
    /// Returns error if similarity cannot be computed
    pub fn difference(&self) -> ProbeResult<f64> {
        Ok(self.similarity()?.difference_percent())
    }

    /// PNG of the output with dissimilar regions highlighted
    ///
    /// # Errors
    ///
    /// Returns error if similarity cannot be computed or encoding fails
    pub fn difference_image(&self) -> ProbeResult<Vec<u8>> {
        let similarity = self.similarity()?;
        self.visualizer.render_png(&similarity.map, &self.output)
    }

    /// Check shapes, then check the difference against the limit
    ///
    /// Returns the measured difference. Only a difference strictly greater
    /// than the limit fails.
    ///
    /// # Errors
    ///
    /// Returns `SizeMismatch` or `DifferenceExceeded`
    pub fn assert_snap(&self) -> ProbeResult<f64> {
        self.check_shapes()?;
        let difference = self.difference()?;
        tracing::debug!(
            difference,
            limit = self.difference_limit,
            "snapshot difference measured"
        );
        if difference > self.difference_limit {
            return Err(ProbeError::DifferenceExceeded {
                difference,
                threshold: self.difference_limit,
            });
        }
        Ok(difference)
    }

    fn check_shapes(&self) -> ProbeResult<()> {
        if self.shapes_match() {
            Ok(())
        } else {
            Err(ProbeError::SizeMismatch {
                output: self.output.dimensions(),
                reference: self.reference.dimensions(),
            })
        }
    }
}
