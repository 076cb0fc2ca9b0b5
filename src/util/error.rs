//! Error types for stockmatch.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for stockmatch operations.
pub type StockMatchResult<T> = std::result::Result<T, StockMatchError>;

/// Errors that can occur while loading templates or recognizing screenshots.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StockMatchError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer cannot hold the requested view.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The template has no intensity variance, so correlation is undefined.
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// A single template file could not be read or decoded.
    #[error("failed to load template {path:?}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },
    /// No template could be loaded for a set that must not be empty.
    #[error("no {kind} templates loaded")]
    EmptyTemplateSet { kind: &'static str },
    /// The screenshot could not be read or decoded.
    #[error("failed to load image {path:?}: {reason}")]
    ImageLoad { path: PathBuf, reason: String },
    /// An annotated image could not be written.
    #[error("failed to save image {path:?}: {reason}")]
    ImageSave { path: PathBuf, reason: String },
    /// A threshold, distance or path setting is missing or out of range.
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },
    /// The bounded worker pool could not be created.
    #[error("worker pool: {reason}")]
    WorkerPool { reason: String },
    /// Detection was cancelled through a [`CancelToken`](crate::CancelToken).
    #[error("detection cancelled")]
    Cancelled,
}

impl StockMatchError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}
