//! Unified refinement pipeline
//!
//! This module provides the `RefinementPipeline` that consolidates the
//! previously duplicated direct-mask, fully-refined, and chroma-key
//! processing variants behind a single configurable strategy dispatch.

use crate::{
    compositor::Compositor,
    config::{RefinementConfig, RefinementStrategy},
    error::{MatteError, Result},
    stages::{
        AlphaMatteResolver, BilateralSmoother, BoxBlurSmoother, ChromaKeyEstimator, TrimapBuilder,
    },
    types::{AlphaMatte, ProbabilityMap, RefinementOutcome, StageTimings, TrimapCounts},
};
use image::RgbaImage;
use instant::Instant;
use log::{debug, info};
use tracing::{debug as trace_debug, span, Level};

/// Orchestrates mask refinement and compositing for a single image
///
/// The pipeline is stateless between calls: every buffer it creates lives
/// for exactly one `process` invocation, and concurrent calls on clones are
/// safe. The strategy is resolved once from configuration per call and
/// never retried mid-pipeline.
#[derive(Debug, Clone)]
pub struct RefinementPipeline {
    config: RefinementConfig,
}

impl RefinementPipeline {
    /// Create a pipeline with the given configuration
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration fails validation
    pub fn new(config: RefinementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a pipeline with default parameters for a strategy
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration fails validation
    pub fn with_strategy(strategy: RefinementStrategy) -> Result<Self> {
        Self::new(RefinementConfig {
            strategy,
            ..RefinementConfig::default()
        })
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &RefinementConfig {
        &self.config
    }

    /// Refine the mask and composite the result into the image
    ///
    /// Computes the complete alpha matte for the configured strategy, then
    /// writes it into the image's alpha channel. The write happens only
    /// after the whole matte exists: on any failure the image buffer is
    /// left untouched.
    ///
    /// # Errors
    /// - `InvalidDimensions` for an empty image
    /// - `InvalidConfig` if the strategy needs a probability buffer and
    ///   none was supplied
    /// - `DimensionMismatch` if the probability buffer does not cover the
    ///   image pixel-for-pixel
    /// - `NoSubjectDetected` if the oracle produced a blank mask
    pub fn process(
        &self,
        image: &mut RgbaImage,
        probability: Option<&ProbabilityMap>,
    ) -> Result<RefinementOutcome> {
        let _span = span!(Level::DEBUG, "refinement", strategy = %self.config.strategy).entered();
        let total_start = Instant::now();

        info!(
            "Starting mask refinement: {}x{} using {}",
            image.width(),
            image.height(),
            self.config.strategy
        );

        let (matte, trimap_counts, mut timings) = self.refine(image, probability)?;

        let composite_start = Instant::now();
        Compositor::apply(image, &matte)?;
        timings.composite_ms = millis(composite_start);
        timings.total_ms = millis(total_start);

        trace_debug!(
            "Refinement completed in {}ms (composite {}ms)",
            timings.total_ms,
            timings.composite_ms
        );

        Ok(RefinementOutcome {
            matte,
            trimap_counts,
            timings,
        })
    }

    /// Compute the alpha matte without touching the image buffer
    ///
    /// # Errors
    /// Same conditions as [`RefinementPipeline::process`].
    pub fn compute_matte(
        &self,
        image: &RgbaImage,
        probability: Option<&ProbabilityMap>,
    ) -> Result<AlphaMatte> {
        let (matte, _, _) = self.refine(image, probability)?;
        Ok(matte)
    }

    /// Run the configured strategy up to (but not including) compositing
    fn refine(
        &self,
        image: &RgbaImage,
        probability: Option<&ProbabilityMap>,
    ) -> Result<(AlphaMatte, Option<TrimapCounts>, StageTimings)> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(MatteError::invalid_dimensions(format!(
                "Image dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let mut timings = StageTimings::new();

        match self.config.strategy {
            RefinementStrategy::FastAlpha => {
                let map = self.ingest(image, probability)?;
                let matte = AlphaMatte::new(map.values().to_vec(), width, height);
                Ok((matte, None, timings))
            },
            RefinementStrategy::RefinedAlpha => {
                let map = self.ingest(image, probability)?;

                let smooth_start = Instant::now();
                let smoothed = BilateralSmoother::from_config(&self.config).smooth(map);
                timings.smooth_ms = millis(smooth_start);
                debug!("Bilateral smoothing completed in {}ms", timings.smooth_ms);

                let trimap_start = Instant::now();
                let trimap = TrimapBuilder::from_config(&self.config).build(&smoothed);
                timings.trimap_ms = millis(trimap_start);
                let counts = trimap.counts();
                debug!(
                    "Trimap built in {}ms: {} fg / {} bg / {} unknown",
                    timings.trimap_ms, counts.foreground, counts.background, counts.unknown
                );

                let resolve_start = Instant::now();
                let matte =
                    AlphaMatteResolver::from_config(&self.config).resolve(&smoothed, &trimap);
                timings.resolve_ms = millis(resolve_start);
                debug!("Alpha resolution completed in {}ms", timings.resolve_ms);

                Ok((matte, Some(counts), timings))
            },
            RefinementStrategy::ChromaKeyFallback => {
                let estimate_start = Instant::now();
                let estimate = ChromaKeyEstimator::from_config(&self.config).estimate(image)?;
                timings.estimate_ms = millis(estimate_start);
                debug!(
                    "Chroma-key estimation completed in {}ms",
                    timings.estimate_ms
                );

                let smooth_start = Instant::now();
                let matte = BoxBlurSmoother::new().smooth(&estimate);
                timings.smooth_ms = millis(smooth_start);
                debug!("Edge box blur completed in {}ms", timings.smooth_ms);

                Ok((matte, None, timings))
            },
        }
    }

    /// Validate the oracle probability buffer against the image
    fn ingest<'a>(
        &self,
        image: &RgbaImage,
        probability: Option<&'a ProbabilityMap>,
    ) -> Result<&'a ProbabilityMap> {
        let map = probability.ok_or_else(|| {
            MatteError::invalid_config(format!(
                "Strategy {} requires a probability buffer from the segmentation oracle",
                self.config.strategy
            ))
        })?;

        if map.dimensions() != image.dimensions() {
            return Err(MatteError::dimension_mismatch(
                image.dimensions(),
                map.dimensions(),
            ));
        }

        if map.is_blank() {
            return Err(MatteError::NoSubjectDetected);
        }

        Ok(map)
    }
}

fn millis(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
