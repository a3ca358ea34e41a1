//! Configuration types for mask refinement operations

use crate::error::{MatteError, Result};
use serde::{Deserialize, Serialize};

/// Refinement strategy options
///
/// The three strategies are mutually exclusive and selected once per
/// processing call; no strategy is retried mid-pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefinementStrategy {
    /// Oracle probability used directly as alpha (lowest cost, hard edges)
    FastAlpha,
    /// Bilateral smoothing, trimap, smoothstep matting (best edge quality)
    RefinedAlpha,
    /// Corner-sampled chroma keying with edge box blur (no oracle needed)
    ChromaKeyFallback,
}

impl RefinementStrategy {
    /// Select a strategy from oracle availability
    ///
    /// Full refinement when a segmentation oracle produced a probability
    /// buffer, the colorimetric fallback when none is available (for
    /// example when oracle initialization failed).
    #[must_use]
    pub fn for_oracle(available: bool) -> Self {
        if available {
            Self::RefinedAlpha
        } else {
            Self::ChromaKeyFallback
        }
    }

    /// Whether this strategy consumes an oracle probability buffer
    #[must_use]
    pub fn requires_probability(self) -> bool {
        !matches!(self, Self::ChromaKeyFallback)
    }
}

impl Default for RefinementStrategy {
    fn default() -> Self {
        Self::RefinedAlpha
    }
}

impl std::fmt::Display for RefinementStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FastAlpha => write!(f, "fast-alpha"),
            Self::RefinedAlpha => write!(f, "refined-alpha"),
            Self::ChromaKeyFallback => write!(f, "chroma-key-fallback"),
        }
    }
}

/// Configuration for mask refinement operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementConfig {
    /// Strategy to run for this call
    pub strategy: RefinementStrategy,

    /// Bilateral filter neighborhood radius in pixels
    pub bilateral_radius: u32,

    /// Spatial Gaussian sigma for the bilateral filter
    pub sigma_space: f32,

    /// Range (value-difference) Gaussian sigma for the bilateral filter
    pub sigma_range: f32,

    /// Erosion neighborhood radius for trimap construction
    pub erosion_radius: u32,

    /// Dilation neighborhood radius for trimap construction
    pub dilation_radius: u32,

    /// Eroded probability above this is definite foreground
    pub foreground_threshold: f32,

    /// Dilated probability below this is definite background
    pub background_threshold: f32,

    /// Lower edge of the smoothstep transition band
    pub matte_low: f32,

    /// Width of the smoothstep transition band
    pub matte_band: f32,

    /// Chroma-key color distance threshold (8-bit RGB units)
    pub chroma_threshold: f32,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            strategy: RefinementStrategy::default(),
            bilateral_radius: 3,
            sigma_space: 2.0,
            sigma_range: 0.2,
            erosion_radius: 2,
            dilation_radius: 2,
            foreground_threshold: 0.9,
            background_threshold: 0.1,
            matte_low: 0.3,
            matte_band: 0.4,
            chroma_threshold: 40.0,
        }
    }
}

impl RefinementConfig {
    /// Create a new configuration builder for fluent API construction
    #[must_use]
    pub fn builder() -> RefinementConfigBuilder {
        RefinementConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Validation Rules
    ///
    /// - Classification thresholds lie in [0,1] with
    ///   `background_threshold < foreground_threshold`
    /// - `matte_low` lies in [0,1] and `matte_band` is strictly positive
    ///   (it divides the smoothstep input)
    /// - `chroma_threshold` is strictly positive (it divides the
    ///   chroma-key ramp)
    /// - Sigmas are non-negative; zero is valid and handled by the
    ///   smoother's degenerate-neighborhood guard
    ///
    /// # Errors
    /// - `InvalidConfig` describing the first parameter out of range
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.foreground_threshold) {
            return Err(MatteError::invalid_config(format!(
                "foreground_threshold must be in 0-1, got {}",
                self.foreground_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.background_threshold) {
            return Err(MatteError::invalid_config(format!(
                "background_threshold must be in 0-1, got {}",
                self.background_threshold
            )));
        }
        if self.background_threshold >= self.foreground_threshold {
            return Err(MatteError::invalid_config(format!(
                "background_threshold ({}) must be below foreground_threshold ({})",
                self.background_threshold, self.foreground_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.matte_low) {
            return Err(MatteError::invalid_config(format!(
                "matte_low must be in 0-1, got {}",
                self.matte_low
            )));
        }
        if self.matte_band <= 0.0 || !self.matte_band.is_finite() {
            return Err(MatteError::invalid_config(format!(
                "matte_band must be a positive finite value, got {}",
                self.matte_band
            )));
        }
        if self.chroma_threshold <= 0.0 || !self.chroma_threshold.is_finite() {
            return Err(MatteError::invalid_config(format!(
                "chroma_threshold must be a positive finite value, got {}",
                self.chroma_threshold
            )));
        }
        if self.sigma_space < 0.0 || self.sigma_range < 0.0 {
            return Err(MatteError::invalid_config(
                "sigma_space and sigma_range must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Builder for `RefinementConfig`
pub struct RefinementConfigBuilder {
    config: RefinementConfig,
}

impl RefinementConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RefinementConfig::default(),
        }
    }

    #[must_use]
    pub fn strategy(mut self, strategy: RefinementStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    #[must_use]
    pub fn bilateral_radius(mut self, radius: u32) -> Self {
        self.config.bilateral_radius = radius;
        self
    }

    #[must_use]
    pub fn sigma_space(mut self, sigma: f32) -> Self {
        self.config.sigma_space = sigma.max(0.0);
        self
    }

    #[must_use]
    pub fn sigma_range(mut self, sigma: f32) -> Self {
        self.config.sigma_range = sigma.max(0.0);
        self
    }

    #[must_use]
    pub fn erosion_radius(mut self, radius: u32) -> Self {
        self.config.erosion_radius = radius;
        self
    }

    #[must_use]
    pub fn dilation_radius(mut self, radius: u32) -> Self {
        self.config.dilation_radius = radius;
        self
    }

    #[must_use]
    pub fn foreground_threshold(mut self, threshold: f32) -> Self {
        self.config.foreground_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn background_threshold(mut self, threshold: f32) -> Self {
        self.config.background_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn matte_low(mut self, low: f32) -> Self {
        self.config.matte_low = low.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn matte_band(mut self, band: f32) -> Self {
        self.config.matte_band = band;
        self
    }

    #[must_use]
    pub fn chroma_threshold(mut self, threshold: f32) -> Self {
        self.config.chroma_threshold = threshold;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// - `InvalidConfig` if validation fails (see
    ///   [`RefinementConfig::validate`])
    pub fn build(self) -> Result<RefinementConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for RefinementConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
