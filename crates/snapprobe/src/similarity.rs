//! Structural similarity (SSIM) with Gaussian-weighted windows.
//!
//! Both images are treated as 8-bit luma. For every pixel the local means,
//! variances and covariance are taken over an 11-tap Gaussian window
//! (sigma 1.5, reflected at the borders) and combined into the SSIM index.
//! The global score is the mean of the map with the window radius cropped
//! from every edge; the map itself is returned uncropped.
//!
//! All reductions run sequentially in row-major order, so identical inputs
//! produce bit-identical output.

use crate::image_source::PixelBuffer;
use crate::result::{Dimensions, ProbeError, ProbeResult};
use image::GrayImage;

/// Parameters of the windowed SSIM computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsimParams {
    /// Standard deviation of the Gaussian window
    pub sigma: f64,
    /// Window radius in units of sigma
    pub truncate: f64,
    /// Luminance stabilisation constant
    pub k1: f64,
    /// Contrast stabilisation constant
    pub k2: f64,
    /// Dynamic range of pixel values
    pub data_range: f64,
    /// Normalise variances by N/(N-1) over the window size
    pub sample_covariance: bool,
}

impl Default for SsimParams {
    fn default() -> Self {
        Self {
            sigma: 1.5,
            truncate: 3.5,
            k1: 0.01,
            k2: 0.03,
            data_range: 255.0,
            sample_covariance: true,
        }
    }
}

impl SsimParams {
    /// Window radius in pixels
    #[must_use]
    pub fn radius(&self) -> usize {
        (self.truncate * self.sigma + 0.5) as usize
    }

    /// Window side length in pixels
    #[must_use]
    pub fn window_size(&self) -> usize {
        2 * self.radius() + 1
    }

    /// Normalised 1-D Gaussian kernel
    #[must_use]
    pub fn kernel(&self) -> Vec<f64> {
        let radius = self.radius() as isize;
        let denom = -0.5 / (self.sigma * self.sigma);
        let raw: Vec<f64> = (-radius..=radius)
            .map(|x| (denom * (x * x) as f64).exp())
            .collect();
        let total: f64 = raw.iter().sum();
        raw.into_iter().map(|w| w / total).collect()
    }
}

/// Dense per-pixel similarity values, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMap {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl SimilarityMap {
    /// Build a map from row-major values; `None` if the length is not `width * height`
    #[must_use]
    pub fn new(width: u32, height: u32, values: Vec<f64>) -> Option<Self> {
        (values.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            values,
        })
    }

    /// Map width
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Map height
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major values
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at a pixel
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    /// Scale to 8-bit intensity (`value * 255`, truncated, clamped to 0..=255)
    #[must_use]
    pub fn to_intensity(&self) -> GrayImage {
        let raw = self.values.iter().map(|v| (v * 255.0) as u8).collect();
        // Length always matches width * height
        GrayImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| GrayImage::new(self.width, self.height))
    }
}

/// Output of one similarity computation
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    /// Mean SSIM over the cropped map
    pub mean: f64,
    /// Full per-pixel SSIM map
    pub map: SimilarityMap,
}

impl SimilarityResult {
    /// `(1 - mean) * 100`, rounded to 4 decimal places
    #[must_use]
    pub fn difference_percent(&self) -> f64 {
        difference_percent(self.mean)
    }
}

/// Convert a mean similarity index into the threshold-comparable percentage
#[must_use]
pub fn difference_percent(mean_similarity: f64) -> f64 {
    ((1.0 - mean_similarity) * 100.0 * 10_000.0).round() / 10_000.0
}

/// Computes SSIM scores and maps
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    params: SsimParams,
}

impl SimilarityEngine {
    /// Create an engine with custom parameters
    #[must_use]
    pub const fn new(params: SsimParams) -> Self {
        Self { params }
    }

    /// Get parameters
    #[must_use]
    pub const fn params(&self) -> &SsimParams {
        &self.params
    }

    /// Compare two colour buffers through their luma
    ///
    /// # Errors
    ///
    /// Returns error if shapes differ or are smaller than the window
    pub fn compare(
        &self,
        reference: &PixelBuffer,
        output: &PixelBuffer,
    ) -> ProbeResult<SimilarityResult> {
        self.compute(&reference.to_grayscale(), &output.to_grayscale())
    }

    /// Compute SSIM between two luma images
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if dimensions differ, `ImageTooSmall` if either
    /// side is shorter than the window
    pub fn compute(&self, left: &GrayImage, right: &GrayImage) -> ProbeResult<SimilarityResult> {
        if left.dimensions() != right.dimensions() {
            return Err(ProbeError::ShapeMismatch {
                left: Dimensions::new(left.width(), left.height()),
                right: Dimensions::new(right.width(), right.height()),
            });
        }

        let (width, height) = (left.width() as usize, left.height() as usize);
        let window = self.params.window_size();
        if width < window || height < window {
            return Err(ProbeError::ImageTooSmall {
                dimensions: Dimensions::new(left.width(), left.height()),
                window,
            });
        }

        let kernel = self.params.kernel();
        let x: Vec<f64> = left.as_raw().iter().map(|&v| f64::from(v)).collect();
        let y: Vec<f64> = right.as_raw().iter().map(|&v| f64::from(v)).collect();
        let xx: Vec<f64> = x.iter().map(|v| v * v).collect();
        let yy: Vec<f64> = y.iter().map(|v| v * v).collect();
        let xy: Vec<f64> = x.iter().zip(&y).map(|(a, b)| a * b).collect();

        let blur = |data: &[f64]| gaussian_filter(data, width, height, &kernel);
        let ux = blur(&x);
        let uy = blur(&y);
        let uxx = blur(&xx);
        let uyy = blur(&yy);
        let uxy = blur(&xy);

        let np = (window * window) as f64;
        let cov_norm = if self.params.sample_covariance {
            np / (np - 1.0)
        } else {
            1.0
        };
        let c1 = (self.params.k1 * self.params.data_range).powi(2);
        let c2 = (self.params.k2 * self.params.data_range).powi(2);

        let values: Vec<f64> = (0..width * height)
            .map(|i| {
                let (mx, my) = (ux[i], uy[i]);
                let vx = cov_norm * (uxx[i] - mx * mx);
                let vy = cov_norm * (uyy[i] - my * my);
                let vxy = cov_norm * (uxy[i] - mx * my);
                let a1 = 2.0 * mx * my + c1;
                let a2 = 2.0 * vxy + c2;
                let b1 = mx * mx + my * my + c1;
                let b2 = vx + vy + c2;
                (a1 * a2) / (b1 * b2)
            })
            .collect();

        let pad = self.params.radius();
        let mut sum = 0.0;
        for row in pad..height - pad {
            let start = row * width;
            for value in &values[start + pad..start + width - pad] {
                sum += value;
            }
        }
        let count = ((width - 2 * pad) * (height - 2 * pad)) as f64;

        Ok(SimilarityResult {
            mean: sum / count,
            map: SimilarityMap {
                width: left.width(),
                height: left.height(),
                values,
            },
        })
    }
}

/// Separable Gaussian blur, vertical pass then horizontal, reflect borders
fn gaussian_filter(data: &[f64], width: usize, height: usize, kernel: &[f64]) -> Vec<f64> {
    let radius = (kernel.len() / 2) as isize;

    let mut vertical = vec![0.0; data.len()];
    for row in 0..height {
        for (k, weight) in kernel.iter().enumerate() {
            let src = reflect(row as isize + k as isize - radius, height) * width;
            let dst = row * width;
            for col in 0..width {
                vertical[dst + col] += weight * data[src + col];
            }
        }
    }

    let mut out = vec![0.0; data.len()];
    for row in 0..height {
        let base = row * width;
        for col in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let src = reflect(col as isize + k as isize - radius, width);
                acc += weight * vertical[base + src];
            }
            out[base + col] = acc;
        }
    }
    out
}

/// Mirror an index into `0..len`, repeating the edge sample (`d c b a | a b c d`)
fn reflect(index: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let mut m = index.rem_euclid(period);
    if m >= len {
        m = period - 1 - m;
    }
    m as usize
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::Luma;

    fn textured(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            Luma([((x * 7 + y * 13 + (x * y) % 17) % 256) as u8])
        })
    }

    #[test]
    fn test_kernel_shape() {
        let params = SsimParams::default();
        assert_eq!(params.radius(), 5);
        assert_eq!(params.window_size(), 11);
        let kernel = params.kernel();
        assert_eq!(kernel.len(), 11);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((kernel[0] - kernel[10]).abs() < f64::EPSILON);
        assert!(kernel[5] > kernel[4]);
    }

    #[test]
    fn test_reflect_indices() {
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(-2, 5), 1);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(6, 5), 3);
        assert_eq!(reflect(3, 5), 3);
        assert_eq!(reflect(-1, 1), 0);
    }

    #[test]
    fn test_identical_images_score_exactly_one() {
        let img = textured(40, 30);
        let result = SimilarityEngine::default().compute(&img, &img).unwrap();
        assert_eq!(result.mean, 1.0);
        assert_eq!(result.difference_percent(), 0.0);
        assert!(result.map.values().iter().all(|&v| v == 1.0));
        assert_eq!(result.map.width(), 40);
        assert_eq!(result.map.height(), 30);
    }

    #[test]
    fn test_black_vs_white_constant() {
        let black = GrayImage::from_pixel(16, 16, Luma([0]));
        let white = GrayImage::from_pixel(16, 16, Luma([255]));
        let result = SimilarityEngine::default().compute(&black, &white).unwrap();
        let c1 = (0.01f64 * 255.0).powi(2);
        let expected = c1 / (255.0f64.powi(2) + c1);
        assert!((result.mean - expected).abs() < 1e-9);
        assert!((result.difference_percent() - 99.99).abs() < 1e-9);
    }

    #[test]
    fn test_local_change_lowers_local_similarity() {
        let reference = textured(64, 64);
        let mut output = reference.clone();
        for y in 0..10 {
            for x in 0..10 {
                output.put_pixel(x, y, Luma([255 - reference.get_pixel(x, y).0[0]]));
            }
        }
        let result = SimilarityEngine::default()
            .compute(&reference, &output)
            .unwrap();
        assert!(result.mean < 1.0);
        assert!(result.map.get(3, 3) < 0.5);
        assert!((result.map.get(50, 50) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = textured(20, 20);
        let b = textured(20, 19);
        let err = SimilarityEngine::default().compute(&a, &b).unwrap_err();
        assert!(matches!(err, ProbeError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_image_smaller_than_window() {
        let a = textured(10, 40);
        let err = SimilarityEngine::default().compute(&a, &a).unwrap_err();
        match err {
            ProbeError::ImageTooSmall { window, dimensions } => {
                assert_eq!(window, 11);
                assert_eq!(dimensions, Dimensions::new(10, 40));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_difference_percent_rounding() {
        assert_eq!(difference_percent(1.0), 0.0);
        assert_eq!(difference_percent(0.968), 3.2);
        assert_eq!(difference_percent(0.123_456_78), 87.6543);
    }

    #[test]
    fn test_intensity_truncates_and_clamps() {
        let map = SimilarityMap {
            width: 4,
            height: 1,
            values: vec![1.0, 0.999, -0.4, 0.5],
        };
        assert_eq!(map.to_intensity().into_raw(), vec![255, 254, 0, 127]);
    }

    #[test]
    fn test_population_covariance_option() {
        let reference = textured(24, 24);
        let output = GrayImage::from_fn(24, 24, |x, y| Luma([((x * 3 + y * 5) % 256) as u8]));
        let sample = SimilarityEngine::default()
            .compute(&reference, &output)
            .unwrap();
        let population = SimilarityEngine::new(SsimParams {
            sample_covariance: false,
            ..SsimParams::default()
        })
        .compute(&reference, &output)
        .unwrap();
        assert_ne!(sample.mean.to_bits(), population.mean.to_bits());
    }
}
