//! Colorimetric foreground estimation for the no-oracle fallback path

use crate::config::RefinementConfig;
use crate::error::{MatteError, Result};
use crate::types::AlphaMatte;
use image::RgbaImage;

/// Coarse foreground estimator keyed on color distance to the background
///
/// The background color is estimated by averaging the four corner pixels,
/// then every pixel's opacity follows from its Euclidean RGB distance to
/// that estimate: close means transparent, far means opaque, with a linear
/// ramp between one and two thresholds. Backgrounds that share color with
/// the subject degrade accordingly; that trade-off is inherent to the
/// fallback, not an error condition.
#[derive(Debug, Clone)]
pub struct ChromaKeyEstimator {
    threshold: f32,
}

impl ChromaKeyEstimator {
    /// Create an estimator with an explicit distance threshold
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Create an estimator from pipeline configuration
    #[must_use]
    pub fn from_config(config: &RefinementConfig) -> Self {
        Self::new(config.chroma_threshold)
    }

    /// Estimate a per-pixel alpha matte for the image
    ///
    /// Distance below the threshold is background (alpha 0); at or beyond
    /// twice the threshold is opaque foreground (alpha 1); between the two
    /// the alpha ramps linearly. The comparison at the lower bound is
    /// strict, so a pixel at exactly the threshold starts the ramp at 0.
    ///
    /// # Errors
    /// - `InvalidDimensions` for an empty image
    pub fn estimate(&self, image: &RgbaImage) -> Result<AlphaMatte> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(MatteError::invalid_dimensions(
                "Chroma-key estimation requires a non-empty image",
            ));
        }

        let background = Self::estimate_background_color(image);

        let data = image
            .pixels()
            .map(|pixel| {
                let dr = f32::from(pixel[0]) - background[0];
                let dg = f32::from(pixel[1]) - background[1];
                let db = f32::from(pixel[2]) - background[2];
                let distance = (dr * dr + dg * dg + db * db).sqrt();

                if distance < self.threshold {
                    0.0
                } else {
                    ((distance - self.threshold) / self.threshold).clamp(0.0, 1.0)
                }
            })
            .collect();

        Ok(AlphaMatte::new(data, width, height))
    }

    /// Mean RGB of the four corner pixels
    fn estimate_background_color(image: &RgbaImage) -> [f32; 3] {
        let (width, height) = image.dimensions();
        let corners = [
            image.get_pixel(0, 0),
            image.get_pixel(width - 1, 0),
            image.get_pixel(0, height - 1),
            image.get_pixel(width - 1, height - 1),
        ];

        let mut sum = [0.0f32; 3];
        for corner in corners {
            sum[0] += f32::from(corner[0]);
            sum[1] += f32::from(corner[1]);
            sum[2] += f32::from(corner[2]);
        }
        [sum[0] / 4.0, sum[1] / 4.0, sum[2] / 4.0]
    }
}

impl Default for ChromaKeyEstimator {
    fn default() -> Self {
        Self::from_config(&RefinementConfig::default())
    }
}
