//! Trimap construction via morphological erosion and dilation

use crate::config::RefinementConfig;
use crate::types::{ProbabilityMap, Trimap, TrimapLabel};

/// Classifies pixels into definite foreground, definite background, and an
/// unknown band that needs per-pixel alpha resolution
///
/// Erosion (neighborhood minimum) must clear the foreground threshold for a
/// pixel to count as definite foreground, so a single noisy high value
/// cannot promote its surroundings; dilation (neighborhood maximum) must
/// stay under the background threshold for definite background,
/// symmetrically. Everything else lands in the unknown band around the
/// subject's silhouette.
#[derive(Debug, Clone)]
pub struct TrimapBuilder {
    erosion_radius: u32,
    dilation_radius: u32,
    foreground_threshold: f32,
    background_threshold: f32,
}

impl TrimapBuilder {
    /// Create a builder with explicit parameters
    #[must_use]
    pub fn new(
        erosion_radius: u32,
        dilation_radius: u32,
        foreground_threshold: f32,
        background_threshold: f32,
    ) -> Self {
        Self {
            erosion_radius,
            dilation_radius,
            foreground_threshold,
            background_threshold,
        }
    }

    /// Create a builder from pipeline configuration
    #[must_use]
    pub fn from_config(config: &RefinementConfig) -> Self {
        Self::new(
            config.erosion_radius,
            config.dilation_radius,
            config.foreground_threshold,
            config.background_threshold,
        )
    }

    /// Build a trimap for the (smoothed) probability map
    #[must_use]
    pub fn build(&self, map: &ProbabilityMap) -> Trimap {
        let (width, height) = map.dimensions();
        let eroded = neighborhood_scan(map, self.erosion_radius, f32::min);
        let dilated = neighborhood_scan(map, self.dilation_radius, f32::max);

        let labels = eroded
            .iter()
            .zip(dilated.iter())
            .map(|(&erosion, &dilation)| {
                if erosion > self.foreground_threshold {
                    TrimapLabel::Foreground
                } else if dilation < self.background_threshold {
                    TrimapLabel::Background
                } else {
                    TrimapLabel::Unknown
                }
            })
            .collect();

        Trimap::new(labels, width, height)
    }
}

impl Default for TrimapBuilder {
    fn default() -> Self {
        Self::from_config(&RefinementConfig::default())
    }
}

/// Fold each pixel's in-bounds square neighborhood (including self) with
/// `combine`, starting from the center value
#[allow(clippy::indexing_slicing)] // Output length equals map pixel count
fn neighborhood_scan<F>(map: &ProbabilityMap, radius: u32, combine: F) -> Vec<f32>
where
    F: Fn(f32, f32) -> f32,
{
    let (width, height) = map.dimensions();
    let radius = i64::from(radius);
    let mut output = vec![0.0f32; width as usize * height as usize];

    for y in 0..height {
        for x in 0..width {
            let mut acc = map.get(x, y);
            for dy in -radius..=radius {
                let ny = i64::from(y) + dy;
                if ny < 0 || ny >= i64::from(height) {
                    continue;
                }
                for dx in -radius..=radius {
                    let nx = i64::from(x) + dx;
                    if nx < 0 || nx >= i64::from(width) {
                        continue;
                    }
                    acc = combine(acc, map.get(nx as u32, ny as u32));
                }
            }
            output[y as usize * width as usize + x as usize] = acc;
        }
    }

    output
}
