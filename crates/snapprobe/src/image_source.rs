//! Image decoding into a fixed 3-channel pixel layout.

use crate::result::{Dimensions, ProbeError, ProbeResult};
use image::{GrayImage, Luma, RgbImage};
use std::path::{Path, PathBuf};

const ACCEPTED_INPUTS: &str = "a path to an image file or encoded image bytes";

// BT.601 luma weights in 14-bit fixed point
const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;

/// Where an image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Image file on disk
    Path(PathBuf),
    /// Encoded image bytes (PNG, JPEG)
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Human-readable description used in error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("{}-byte buffer", bytes.len()),
        }
    }

    /// Decode into a pixel buffer
    ///
    /// # Errors
    ///
    /// Returns error if the input is unsupported or cannot be decoded
    pub fn decode(&self) -> ProbeResult<PixelBuffer> {
        decode(self)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for ImageSource {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for ImageSource {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// A decoded raster image: row-major, 3 channels per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl PixelBuffer {
    /// Number of channels per pixel
    pub const CHANNELS: u8 = 3;

    /// Wrap an RGB image
    #[must_use]
    pub const fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    /// Image width
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width and height
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    /// Channels per pixel
    #[must_use]
    pub const fn channels(&self) -> u8 {
        Self::CHANNELS
    }

    /// Borrow the underlying image
    #[must_use]
    pub const fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Take the underlying image
    #[must_use]
    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    /// Convert to single-channel luma with rounded fixed-point BT.601 weights
    #[must_use]
    pub fn to_grayscale(&self) -> GrayImage {
        let mut gray = GrayImage::new(self.image.width(), self.image.height());
        for (src, dst) in self.image.pixels().zip(gray.pixels_mut()) {
            let [r, g, b] = src.0;
            let luma = (u32::from(r) * LUMA_R
                + u32::from(g) * LUMA_G
                + u32::from(b) * LUMA_B
                + (1 << (LUMA_SHIFT - 1)))
                >> LUMA_SHIFT;
            *dst = Luma([luma as u8]);
        }
        gray
    }
}

/// Decode an image source into a 3-channel pixel buffer
///
/// Alpha is discarded. Paths must name a regular file; byte buffers must be non-empty.
///
/// # Errors
///
/// Returns `UnsupportedInputType` for directories and empty buffers, `Decode` for
/// unreadable files and corrupt data.
pub fn decode(source: &ImageSource) -> ProbeResult<PixelBuffer> {
    let bytes = match source {
        ImageSource::Path(path) => read_file(path)?,
        ImageSource::Bytes(bytes) if bytes.is_empty() => {
            return Err(ProbeError::UnsupportedInputType {
                found: String::from("empty byte buffer"),
                expected: ACCEPTED_INPUTS,
            });
        }
        ImageSource::Bytes(bytes) => std::borrow::Cow::Borrowed(bytes.as_slice()),
    };

    let decoded = image::load_from_memory(&bytes).map_err(|e| ProbeError::Decode {
        source_desc: source.describe(),
        message: e.to_string(),
    })?;

    Ok(PixelBuffer::from_rgb(decoded.to_rgb8()))
}

fn read_file<'a>(path: &Path) -> ProbeResult<std::borrow::Cow<'a, [u8]>> {
    if path.is_dir() {
        return Err(ProbeError::UnsupportedInputType {
            found: format!("directory {}", path.display()),
            expected: ACCEPTED_INPUTS,
        });
    }
    std::fs::read(path)
        .map(std::borrow::Cow::Owned)
        .map_err(|e| ProbeError::Decode {
            source_desc: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Encode an RGB image as PNG
///
/// # Errors
///
/// Returns error if encoding fails
pub fn encode_png(image: &RgbImage) -> ProbeResult<Vec<u8>> {
    use image::ImageEncoder;

    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ProbeError::Encode {
            message: e.to_string(),
        })?;
    Ok(buffer)
}
