//! Difference-region overlays.
//!
//! The similarity map is scaled to 8 bits, binarized with Otsu's threshold
//! (dissimilar pixels become foreground) and traced for external contours.
//! Every traced region is filled with green on a copy of the output capture,
//! which is then blended back over the original at 60% opacity.

use crate::contour::{external_regions, otsu_threshold, threshold_binary_inv, Regions};
use crate::image_source::{encode_png, PixelBuffer};
use crate::result::{Dimensions, ProbeError, ProbeResult};
use crate::similarity::SimilarityMap;
use image::{Rgb, RgbImage, Rgba};

/// Fill colour for difference regions; only the RGB part is painted on 3-channel buffers
pub const HIGHLIGHT_COLOR: Rgba<u8> = Rgba([0, 255, 0, 125]);

/// Weight of the highlighted copy in the final blend
pub const OVERLAY_OPACITY: f64 = 0.6;

/// Renders difference regions over an output capture
#[derive(Debug, Clone)]
pub struct DiffVisualizer {
    color: Rgba<u8>,
    opacity: f64,
}

impl Default for DiffVisualizer {
    fn default() -> Self {
        Self {
            color: HIGHLIGHT_COLOR,
            opacity: OVERLAY_OPACITY,
        }
    }
}

/// Overlay image plus the regions it highlights
#[derive(Debug, Clone)]
pub struct DiffOverlay {
    /// Blended output image
    pub image: RgbImage,
    /// Otsu threshold applied to the scaled similarity map
    pub threshold: u8,
    /// Traced difference regions
    pub regions: Regions,
}

impl DiffOverlay {
    /// Encode the overlay as PNG
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails
    pub fn to_png(&self) -> ProbeResult<Vec<u8>> {
        encode_png(&self.image)
    }
}

impl DiffVisualizer {
    /// Create a visualizer with a custom colour and opacity
    #[must_use]
    pub const fn new(color: Rgba<u8>, opacity: f64) -> Self {
        Self { color, opacity }
    }

    /// Locate dissimilar regions in a similarity map
    #[must_use]
    pub fn regions(&self, map: &SimilarityMap) -> (u8, Regions) {
        let intensity = map.to_intensity();
        let threshold = otsu_threshold(&intensity);
        let binary = threshold_binary_inv(&intensity, threshold);
        (threshold, external_regions(&binary))
    }

    /// Highlight dissimilar regions of `output`
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the map and the output differ in size
    pub fn highlight(&self, map: &SimilarityMap, output: &PixelBuffer) -> ProbeResult<DiffOverlay> {
        let map_dims = Dimensions::new(map.width(), map.height());
        if map_dims != output.dimensions() {
            return Err(ProbeError::ShapeMismatch {
                left: map_dims,
                right: output.dimensions(),
            });
        }

        let (threshold, regions) = self.regions(map);
        let original = output.as_rgb();

        let mut painted = original.clone();
        let Rgba([r, g, b, _]) = self.color;
        for (pixel, mask) in painted.pixels_mut().zip(regions.fill.pixels()) {
            if mask.0[0] != 0 {
                *pixel = Rgb([r, g, b]);
            }
        }

        let image = blend(&painted, original, self.opacity);
        Ok(DiffOverlay {
            image,
            threshold,
            regions,
        })
    }

    /// Highlight dissimilar regions and encode the result as PNG
    ///
    /// # Errors
    ///
    /// Returns error if shapes differ or encoding fails
    pub fn render_png(&self, map: &SimilarityMap, output: &PixelBuffer) -> ProbeResult<Vec<u8>> {
        self.highlight(map, output)?.to_png()
    }
}

/// `alpha * top + (1 - alpha) * bottom`, rounded and saturated per channel
fn blend(top: &RgbImage, bottom: &RgbImage, alpha: f64) -> RgbImage {
    let beta = 1.0 - alpha;
    let mut out = bottom.clone();
    for (dst, src) in out.pixels_mut().zip(top.pixels()) {
        for c in 0..3 {
            let mixed = alpha * f64::from(src.0[c]) + beta * f64::from(dst.0[c]);
            dst.0[c] = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
