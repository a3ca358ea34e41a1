//! Core types for mask refinement operations

use crate::error::{MatteError, Result};
use image::{GrayImage, ImageBuffer, Luma};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Per-pixel foreground probability buffer, row-major, values in [0,1]
///
/// Produced by a segmentation oracle (dense float or byte output) or by the
/// chroma-key estimator. Every constructor normalizes and clamps incoming
/// values, so downstream stages can assume the [0,1] invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMap {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl ProbabilityMap {
    /// Create a map from already-normalized values
    ///
    /// Values are clamped to [0,1]; NaN ingests as 0. Buffers whose maximum
    /// finite value exceeds 1.0 are treated as 0-255 scaled and divided by
    /// 255 first, since oracle call sites differ on which convention they
    /// emit.
    ///
    /// # Errors
    /// - `InvalidDimensions` if either dimension is zero or the buffer
    ///   length is not `width * height`
    pub fn from_f32(mut data: Vec<f32>, width: u32, height: u32) -> Result<Self> {
        Self::validate_len(data.len(), width, height)?;

        let max = data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f32::NEG_INFINITY, f32::max);
        let byte_scaled = max > 1.0;

        for value in &mut data {
            let v = if value.is_finite() { *value } else { 0.0 };
            let v = if byte_scaled { v / 255.0 } else { v };
            *value = v.clamp(0.0, 1.0);
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Create a map from 8-bit oracle output (0-255)
    ///
    /// # Errors
    /// - `InvalidDimensions` if either dimension is zero or the buffer
    ///   length is not `width * height`
    pub fn from_bytes(data: &[u8], width: u32, height: u32) -> Result<Self> {
        Self::validate_len(data.len(), width, height)?;
        let data = data.iter().map(|&v| f32::from(v) / 255.0).collect();
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Create a map from a dense oracle tensor (row-major, [height, width])
    ///
    /// # Errors
    /// - `InvalidDimensions` if either tensor axis is zero
    pub fn from_array(view: &ArrayView2<'_, f32>) -> Result<Self> {
        let (rows, cols) = view.dim();
        let width = u32::try_from(cols)
            .map_err(|_| MatteError::invalid_dimensions("Tensor width too large for u32"))?;
        let height = u32::try_from(rows)
            .map_err(|_| MatteError::invalid_dimensions("Tensor height too large for u32"))?;
        Self::from_f32(view.iter().copied().collect(), width, height)
    }

    /// Construct from values already known to be in [0,1], skipping scale
    /// detection (stage outputs would otherwise be misread as 0-255 if a
    /// rounding excursion pushed a value past 1.0)
    pub(crate) fn from_normalized(data: Vec<f32>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            data,
            width,
            height,
        }
    }

    fn validate_len(len: usize, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(MatteError::invalid_dimensions(format!(
                "Probability map dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize;
        if len != expected {
            return Err(MatteError::invalid_dimensions(format!(
                "Probability map has {len} values for {width}x{height} ({expected} expected)"
            )));
        }
        Ok(())
    }

    /// Map dimensions (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Map width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Map height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Probability values, row-major
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Probability at (x, y); coordinates must be in bounds
    #[inline]
    #[must_use]
    #[allow(clippy::indexing_slicing)] // Index bounded by dimensions
    pub fn get(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// True when no pixel carries any foreground probability
    ///
    /// A binary oracle mask with zero detections arrives as an all-zero
    /// buffer; this is the signal the pipeline rejects as
    /// `NoSubjectDetected`.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&v| v <= 0.0)
    }

    /// Resize the map to new dimensions
    ///
    /// Intended for reconciling an oracle's internal resolution with the
    /// image being refined; the pipeline itself never resizes.
    ///
    /// # Errors
    /// - `InvalidDimensions` if either target dimension is zero
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<Self> {
        if new_width == 0 || new_height == 0 {
            return Err(MatteError::invalid_dimensions(
                "Resize target dimensions must be non-zero",
            ));
        }
        let current: ImageBuffer<Luma<f32>, Vec<f32>> =
            ImageBuffer::from_raw(self.width, self.height, self.data.clone()).ok_or_else(
                || MatteError::processing("Failed to create image from probability data"),
            )?;
        let resized = image::imageops::resize(
            &current,
            new_width,
            new_height,
            image::imageops::FilterType::Lanczos3,
        );
        // Lanczos overshoots near hard edges; re-clamp to the invariant
        let data = resized.into_raw().iter().map(|v| v.clamp(0.0, 1.0)).collect();
        Ok(Self {
            data,
            width: new_width,
            height: new_height,
        })
    }

    /// Foreground/background pixel statistics at the 0.5 level
    #[must_use]
    pub fn statistics(&self) -> MatteStatistics {
        let total_pixels = self.data.len();
        let foreground_pixels = self.data.iter().filter(|&&v| v > 0.5).count();
        let background_pixels = total_pixels - foreground_pixels;

        MatteStatistics {
            total_pixels,
            foreground_pixels,
            background_pixels,
            foreground_ratio: foreground_pixels as f32 / total_pixels as f32,
            background_ratio: background_pixels as f32 / total_pixels as f32,
        }
    }
}

/// Three-way pixel classification used to bound fine alpha resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrimapLabel {
    /// Definite foreground (alpha 1.0)
    Foreground,
    /// Definite background (alpha 0.0)
    Background,
    /// Edge band needing per-pixel resolution
    Unknown,
}

/// Per-pixel trimap, derived fresh for each refinement pass
#[derive(Debug, Clone)]
pub struct Trimap {
    labels: Vec<TrimapLabel>,
    width: u32,
    height: u32,
}

impl Trimap {
    pub(crate) fn new(labels: Vec<TrimapLabel>, width: u32, height: u32) -> Self {
        debug_assert_eq!(labels.len(), width as usize * height as usize);
        Self {
            labels,
            width,
            height,
        }
    }

    /// Trimap dimensions (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Labels, row-major
    #[must_use]
    pub fn labels(&self) -> &[TrimapLabel] {
        &self.labels
    }

    /// Label at (x, y); coordinates must be in bounds
    #[inline]
    #[must_use]
    #[allow(clippy::indexing_slicing)] // Index bounded by dimensions
    pub fn get(&self, x: u32, y: u32) -> TrimapLabel {
        debug_assert!(x < self.width && y < self.height);
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Per-label pixel counts; the three counts partition the pixel set
    #[must_use]
    pub fn counts(&self) -> TrimapCounts {
        let mut counts = TrimapCounts::default();
        for label in &self.labels {
            match label {
                TrimapLabel::Foreground => counts.foreground += 1,
                TrimapLabel::Background => counts.background += 1,
                TrimapLabel::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}

/// Pixel counts per trimap category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimapCounts {
    pub foreground: usize,
    pub background: usize,
    pub unknown: usize,
}

impl TrimapCounts {
    /// Total pixels across all three categories
    #[must_use]
    pub fn total(&self) -> usize {
        self.foreground + self.background + self.unknown
    }
}

/// Final per-pixel opacity buffer, row-major, values in [0,1]
///
/// Produced by the resolver (or the chroma-key path) and consumed only by
/// the compositor.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMatte {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl AlphaMatte {
    pub(crate) fn new(data: Vec<f32>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            data,
            width,
            height,
        }
    }

    /// Matte dimensions (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Opacity values, row-major
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Opacity at (x, y); coordinates must be in bounds
    #[inline]
    #[must_use]
    #[allow(clippy::indexing_slicing)] // Index bounded by dimensions
    pub fn get(&self, x: u32, y: u32) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Convert the matte to an 8-bit grayscale mask image
    ///
    /// # Errors
    /// - `Processing` if the buffer cannot back a `GrayImage`
    pub fn to_mask_image(&self) -> Result<GrayImage> {
        let data = self
            .data
            .iter()
            .map(|&a| (a * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect();
        GrayImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| MatteError::processing("Failed to create image from matte data"))
    }

    /// Foreground/background pixel statistics at the 0.5 level
    #[must_use]
    pub fn statistics(&self) -> MatteStatistics {
        let total_pixels = self.data.len();
        let foreground_pixels = self.data.iter().filter(|&&v| v > 0.5).count();
        let background_pixels = total_pixels - foreground_pixels;

        MatteStatistics {
            total_pixels,
            foreground_pixels,
            background_pixels,
            foreground_ratio: foreground_pixels as f32 / total_pixels as f32,
            background_ratio: background_pixels as f32 / total_pixels as f32,
        }
    }
}

/// Statistics about a probability map or alpha matte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatteStatistics {
    pub total_pixels: usize,
    pub foreground_pixels: usize,
    pub background_pixels: usize,
    pub foreground_ratio: f32,
    pub background_ratio: f32,
}

/// Timing breakdown for a refinement pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTimings {
    /// Chroma-key estimation (fallback path only)
    pub estimate_ms: u64,

    /// Bilateral or box-blur smoothing
    pub smooth_ms: u64,

    /// Trimap construction (erosion/dilation + classification)
    pub trimap_ms: u64,

    /// Alpha resolution (smoothstep over the unknown band)
    pub resolve_ms: u64,

    /// Alpha channel write into the output image
    pub composite_ms: u64,

    /// Total end-to-end refinement time
    pub total_ms: u64,
}

impl StageTimings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of a refinement pass
///
/// The composited image itself is mutated in place by the caller-supplied
/// buffer; this value carries the matte and per-pass diagnostics.
#[derive(Debug, Clone)]
pub struct RefinementOutcome {
    /// The resolved alpha matte that was composited
    pub matte: AlphaMatte,

    /// Trimap partition sizes (None for strategies that skip the trimap)
    pub trimap_counts: Option<TrimapCounts>,

    /// Detailed timing breakdown
    pub timings: StageTimings,
}
