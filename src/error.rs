//! Error types for mask refinement and compositing operations

use thiserror::Error;

/// Result type alias for refinement operations
pub type Result<T> = std::result::Result<T, MatteError>;

/// Error types for mask refinement and compositing operations
#[derive(Error, Debug)]
pub enum MatteError {
    /// Buffer construction with zero-sized or inconsistent dimensions
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Probability buffer pixel count differs from the image pixel count
    #[error("Dimension mismatch: expected {expected_width}x{expected_height}, got {actual_width}x{actual_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// The segmentation oracle produced no detections (blank mask)
    #[error("No subject detected: segmentation produced an empty mask")]
    NoSubjectDetected,

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal buffer or conversion errors
    #[error("Processing error: {0}")]
    Processing(String),
}

impl MatteError {
    /// Create a new invalid dimensions error
    pub fn invalid_dimensions<S: Into<String>>(msg: S) -> Self {
        Self::InvalidDimensions(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a dimension mismatch error from two (width, height) pairs
    #[must_use]
    pub fn dimension_mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        }
    }
}
