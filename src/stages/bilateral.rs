//! Edge-preserving bilateral smoothing of a probability buffer

use crate::config::RefinementConfig;
use crate::types::ProbabilityMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Weight sums at or below this are treated as degenerate neighborhoods
const WEIGHT_EPSILON: f32 = 1e-8;

/// Edge-preserving smoother for per-pixel foreground probabilities
///
/// Each output value is a weighted average over a square neighborhood,
/// with the per-neighbor weight combining a spatial Gaussian and a range
/// Gaussian over the probability difference. Probability steps that
/// coincide with subject edges keep their contrast while oracle noise in
/// flat regions is averaged away.
#[derive(Debug, Clone)]
pub struct BilateralSmoother {
    radius: u32,
    sigma_space: f32,
    sigma_range: f32,
}

impl BilateralSmoother {
    /// Create a smoother with explicit parameters
    #[must_use]
    pub fn new(radius: u32, sigma_space: f32, sigma_range: f32) -> Self {
        Self {
            radius,
            sigma_space: sigma_space.max(0.0),
            sigma_range: sigma_range.max(0.0),
        }
    }

    /// Create a smoother from pipeline configuration
    #[must_use]
    pub fn from_config(config: &RefinementConfig) -> Self {
        Self::new(config.bilateral_radius, config.sigma_space, config.sigma_range)
    }

    /// Smooth a probability map into a fresh buffer
    ///
    /// The input is never mutated; later stages read it again. Neighbors
    /// outside the image are excluded rather than mirrored, so the weight
    /// sum shrinks near borders. If the weight sum underflows (zero sigmas,
    /// degenerate neighborhoods) the pixel falls back to its unsmoothed
    /// value instead of dividing by near-zero.
    #[must_use]
    pub fn smooth(&self, map: &ProbabilityMap) -> ProbabilityMap {
        let (width, height) = map.dimensions();
        let row_len = width as usize;
        let mut output = vec![0.0f32; row_len * height as usize];

        #[cfg(feature = "rayon")]
        output
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| self.smooth_row(map, y as u32, row));

        #[cfg(not(feature = "rayon"))]
        for (y, row) in output.chunks_mut(row_len).enumerate() {
            self.smooth_row(map, y as u32, row);
        }

        ProbabilityMap::from_normalized(output, width, height)
    }

    /// Smooth one output row from the immutable input snapshot
    #[allow(clippy::indexing_slicing)] // Row length equals map width
    fn smooth_row(&self, map: &ProbabilityMap, y: u32, row: &mut [f32]) {
        let (width, height) = map.dimensions();
        let radius = self.radius as i64;
        let space_denom = 2.0 * self.sigma_space * self.sigma_space;
        let range_denom = 2.0 * self.sigma_range * self.sigma_range;

        for x in 0..width {
            let center = map.get(x, y);
            let mut weighted_sum = 0.0f32;
            let mut weight_sum = 0.0f32;

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

                    let neighbor = map.get(nx as u32, ny as u32);
                    let dist_sq = (dx * dx + dy * dy) as f32;
                    let diff = neighbor - center;

                    // Zero denominators would turn the 0/0 center term into
                    // NaN; emit zero weight and let the fallback handle it
                    let weight = if space_denom > 0.0 && range_denom > 0.0 {
                        (-dist_sq / space_denom).exp() * (-(diff * diff) / range_denom).exp()
                    } else {
                        0.0
                    };

                    weighted_sum += weight * neighbor;
                    weight_sum += weight;
                }
            }

            row[x as usize] = if weight_sum > WEIGHT_EPSILON {
                (weighted_sum / weight_sum).clamp(0.0, 1.0)
            } else {
                center
            };
        }
    }
}

impl Default for BilateralSmoother {
    fn default() -> Self {
        Self::from_config(&RefinementConfig::default())
    }
}
