#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Mask Refinement & Compositing Engine
//!
//! Turns a noisy, coarse, per-pixel foreground probability estimate into a
//! clean alpha channel and composites it onto an RGBA image. The
//! segmentation oracle that produces the initial probability buffer, file
//! decoding/encoding, and UI flow are external collaborators; this crate
//! covers only the refinement and compositing core between them.
//!
//! ## Strategies
//!
//! - **`FastAlpha`**: oracle probability used directly as alpha (lowest
//!   cost, hard edges)
//! - **`RefinedAlpha`**: bilateral smoothing, trimap construction, and
//!   smoothstep matting (best edge quality, higher cost)
//! - **`ChromaKeyFallback`**: corner-sampled color-distance keying with
//!   edge box blur, for when no oracle is available
//!
//! ## Quick Start
//!
//! ```rust
//! use mattecore::{refine_and_composite, ProbabilityMap, RefinementConfig};
//! use image::RgbaImage;
//!
//! # fn example() -> mattecore::Result<()> {
//! // Decoded upstream; probabilities acquired from the oracle upstream
//! let mut image = RgbaImage::new(640, 480);
//! let probability = ProbabilityMap::from_bytes(&vec![255u8; 640 * 480], 640, 480)?;
//!
//! let config = RefinementConfig::default();
//! let outcome = refine_and_composite(&mut image, Some(&probability), &config)?;
//! println!("composited in {}ms", outcome.timings.total_ms);
//! # Ok(())
//! # }
//! ```
//!
//! ## No-oracle fallback
//!
//! ```rust
//! use mattecore::{refine_and_composite, RefinementConfig, RefinementStrategy};
//! use image::RgbaImage;
//!
//! # fn example(mut image: RgbaImage) -> mattecore::Result<()> {
//! let config = RefinementConfig::builder()
//!     .strategy(RefinementStrategy::for_oracle(false))
//!     .build()?;
//! refine_and_composite(&mut image, None, &config)?;
//! # Ok(())
//! # }
//! ```
//!
//! All refinement computation is synchronous and pure; buffers live for a
//! single call and nothing persists between images. Enable the `rayon`
//! feature to run the heavy per-pixel stages row-parallel.

pub mod compositor;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod stages;
pub mod types;

// Public API exports
pub use compositor::Compositor;
pub use config::{RefinementConfig, RefinementConfigBuilder, RefinementStrategy};
pub use error::{MatteError, Result};
pub use pipeline::RefinementPipeline;
pub use stages::{
    AlphaMatteResolver, BilateralSmoother, BoxBlurSmoother, ChromaKeyEstimator, TrimapBuilder,
};
pub use types::{
    AlphaMatte, MatteStatistics, ProbabilityMap, RefinementOutcome, StageTimings, Trimap,
    TrimapCounts, TrimapLabel,
};

use image::RgbaImage;

/// Refine the mask and composite the result into the image
///
/// One-call form of [`RefinementPipeline::process`]: computes the alpha
/// matte for the configured strategy and writes it into the image's alpha
/// channel, leaving color channels untouched. On failure the image buffer
/// is not modified.
///
/// # Arguments
///
/// * `image` - Decoded RGBA image to composite onto
/// * `probability` - Oracle probability buffer, if an oracle ran; required
///   by every strategy except `ChromaKeyFallback`
/// * `config` - Strategy selection and stage parameters
///
/// # Errors
///
/// See [`RefinementPipeline::process`].
pub fn refine_and_composite(
    image: &mut RgbaImage,
    probability: Option<&ProbabilityMap>,
    config: &RefinementConfig,
) -> Result<RefinementOutcome> {
    RefinementPipeline::new(config.clone())?.process(image, probability)
}

/// Compute the alpha matte without modifying the image
///
/// For callers that want the matte itself (for inspection, export via
/// [`AlphaMatte::to_mask_image`], or custom compositing) rather than an
/// in-place alpha write.
///
/// # Errors
///
/// See [`RefinementPipeline::process`].
pub fn compute_matte(
    image: &RgbaImage,
    probability: Option<&ProbabilityMap>,
    config: &RefinementConfig,
) -> Result<AlphaMatte> {
    RefinementPipeline::new(config.clone())?.compute_matte(image, probability)
}
