//! Alpha resolution over the trimap's unknown band

use crate::config::RefinementConfig;
use crate::types::{AlphaMatte, ProbabilityMap, Trimap, TrimapLabel};

/// Resolves the trimap into a final alpha matte
///
/// Definite foreground and background pass through as fully opaque and
/// fully transparent. Unknown pixels map their smoothed probability through
/// a smoothstep transfer, turning the mid-probability band into a soft
/// transition (hair and other fine structure) that saturates outside it.
#[derive(Debug, Clone)]
pub struct AlphaMatteResolver {
    matte_low: f32,
    matte_band: f32,
}

impl AlphaMatteResolver {
    /// Create a resolver with an explicit transition band
    #[must_use]
    pub fn new(matte_low: f32, matte_band: f32) -> Self {
        Self {
            matte_low,
            matte_band,
        }
    }

    /// Create a resolver from pipeline configuration
    #[must_use]
    pub fn from_config(config: &RefinementConfig) -> Self {
        Self::new(config.matte_low, config.matte_band)
    }

    /// Resolve per-pixel opacity from the trimap and smoothed probabilities
    ///
    /// Both inputs must share dimensions; the pipeline derives the trimap
    /// from this same map, so the lengths agree by construction.
    #[must_use]
    pub fn resolve(&self, map: &ProbabilityMap, trimap: &Trimap) -> AlphaMatte {
        let (width, height) = map.dimensions();
        debug_assert_eq!(trimap.dimensions(), (width, height));

        let data = map
            .values()
            .iter()
            .zip(trimap.labels().iter())
            .map(|(&m, &label)| match label {
                TrimapLabel::Foreground => 1.0,
                TrimapLabel::Background => 0.0,
                TrimapLabel::Unknown => {
                    let t = ((m - self.matte_low) / self.matte_band).clamp(0.0, 1.0);
                    smoothstep(t)
                }
            })
            .collect();

        AlphaMatte::new(data, width, height)
    }
}

impl Default for AlphaMatteResolver {
    fn default() -> Self {
        Self::from_config(&RefinementConfig::default())
    }
}

/// Cubic Hermite transfer with zero derivative at both ends
#[inline]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}
