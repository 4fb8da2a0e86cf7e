use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::VisionError;
use crate::region::Region;

/// How a region is made unrecognizable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Downsample to a small square, then upsample with nearest-neighbor.
    Pixelate,
    /// Gaussian blur.
    Blur,
}

impl FromStr for Method {
    type Err = VisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pixelate" => Ok(Method::Pixelate),
            "blur" => Ok(Method::Blur),
            other => Err(VisionError::InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Pixelate => write!(f, "pixelate"),
            Method::Blur => write!(f, "blur"),
        }
    }
}

/// Configuration for [`Anonymizer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizerConfig {
    /// Side length of the pixelation grid (default: 10). A region is
    /// downsampled to `pixel_size x pixel_size` before upsampling back.
    pub pixel_size: u32,
    /// Gaussian kernel size in pixels, must be odd (default: 199).
    pub blur_kernel: u32,
    /// Explicit Gaussian standard deviation. Zero (the default) derives the
    /// deviation from `blur_kernel`.
    pub blur_sigma: f32,
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self {
            pixel_size: 10,
            blur_kernel: 199,
            blur_sigma: 0.0,
        }
    }
}

/// Replaces rectangular image regions with an unrecognizable rendition.
///
/// Both methods mutate the region in place within the caller's image buffer
/// and leave every pixel outside the region untouched.
pub struct Anonymizer {
    pixel_size: u32,
    sigma: f32,
}

impl Anonymizer {
    /// Creates an Anonymizer with default configuration.
    pub fn new() -> Self {
        let cfg = AnonymizerConfig::default();
        Self {
            pixel_size: cfg.pixel_size,
            sigma: sigma_for_kernel(cfg.blur_kernel),
        }
    }

    /// Creates an Anonymizer with the given configuration.
    ///
    /// Rejects a zero pixel size, an even or zero blur kernel, and a
    /// negative or non-finite sigma.
    pub fn with_config(cfg: AnonymizerConfig) -> Result<Self, VisionError> {
        if cfg.pixel_size == 0 {
            return Err(VisionError::InvalidConfiguration(
                "pixel size must be greater than zero".into(),
            ));
        }
        if cfg.blur_kernel == 0 || cfg.blur_kernel % 2 == 0 {
            return Err(VisionError::InvalidConfiguration(format!(
                "blur kernel size must be odd, got {}",
                cfg.blur_kernel
            )));
        }
        if !cfg.blur_sigma.is_finite() || cfg.blur_sigma < 0.0 {
            return Err(VisionError::InvalidConfiguration(format!(
                "blur sigma must be finite and non-negative, got {}",
                cfg.blur_sigma
            )));
        }
        let sigma = if cfg.blur_sigma > 0.0 {
            cfg.blur_sigma
        } else {
            sigma_for_kernel(cfg.blur_kernel)
        };
        Ok(Self {
            pixel_size: cfg.pixel_size,
            sigma,
        })
    }

    /// Destructively replaces `region` within `image`.
    ///
    /// The region is clamped to the image bounds first; a zero-area region
    /// is skipped, leaving the image unchanged.
    pub fn anonymize(&self, image: &mut RgbImage, region: Region, method: Method) {
        let (frame_width, frame_height) = image.dimensions();
        let region = region.clamp_to(frame_width, frame_height);
        if region.is_empty() {
            trace!(?region, "skipping zero-area region");
            return;
        }

        let face =
            imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image();
        let patch = match method {
            Method::Pixelate => {
                // Linear down, nearest up: the nearest-neighbor upsample is
                // what produces the blocky pixelation artifact.
                let small =
                    imageops::resize(&face, self.pixel_size, self.pixel_size, FilterType::Triangle);
                imageops::resize(&small, region.width, region.height, FilterType::Nearest)
            }
            Method::Blur => imageproc::filter::gaussian_blur_f32(&face, self.sigma),
        };
        imageops::replace(image, &patch, region.x as i64, region.y as i64);
    }
}

impl Default for Anonymizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Standard deviation implied by a kernel size when no explicit sigma is
/// configured: `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
fn sigma_for_kernel(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
