//! Error Types
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, HalationError>`.
//!
//! There is no retry policy anywhere in the pipeline: GPU dispatches are not
//! expected to fail transiently, so every error here is fatal for the frame.
//! On failure the pipeline releases whatever it acquired and publishes no
//! bloom buffer; the caller skips the additive composite for that frame.

use thiserror::Error;

/// The error type for the bloom pipeline.
#[derive(Error, Debug)]
pub enum HalationError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A screen size or pyramid tier resolved to a degenerate extent, or the
    /// requested extent exceeds what the device can allocate. This is a
    /// configuration error, not a runtime condition to recover from.
    #[error("invalid bloom buffer dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width in texels
        width: u32,
        /// Requested height in texels
        height: u32,
    },

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// The buffer pool cannot allocate within its byte budget. Indicates a
    /// systemic GPU memory problem and is surfaced rather than skipped.
    #[error("bloom pool exhausted: {requested} bytes requested, {budget} byte budget")]
    ResourceExhaustion {
        /// Total bytes the pool would hold after the allocation
        requested: u64,
        /// The configured pool budget
        budget: u64,
    },

    // ========================================================================
    // I/O & Image Errors (lens dirt loading)
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error.
    #[error("image decode error: {0}")]
    ImageDecode(String),
}

impl From<image::ImageError> for HalationError {
    fn from(err: image::ImageError) -> Self {
        HalationError::ImageDecode(err.to_string())
    }
}

/// Alias for `Result<T, HalationError>`.
pub type Result<T> = std::result::Result<T, HalationError>;
