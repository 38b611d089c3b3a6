//! Error types for grid construction, image I/O and tensor conversion.

use thiserror::Error;

/// Errors raised while building or loading depth and edge grids.
#[derive(Debug, Error)]
pub enum GridError {
    /// The flat buffer does not match the requested grid dimensions.
    #[error("data length mismatch: expected {expected} ({width}x{height}), got {actual}")]
    DataLengthMismatch {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
        /// `width * height`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    #[error("failed to open image at '{path}': {source}")]
    ImageLoadError {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image at '{path}': {source}")]
    ImageSaveError {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Depth and edge maps must be single channel.
    #[error("unsupported pixel format in '{path}': {format} (expected 8-bit or 16-bit grayscale)")]
    UnsupportedPixelFormat { path: String, format: String },

    /// Tensor data could not be read back as `f32`.
    #[error("failed to convert tensor to data: {reason}")]
    TensorConversionError { reason: String },

    /// Grid dimensions do not fit into an image buffer.
    #[error("grid of {width}x{height} cannot be encoded as an image")]
    DimensionOverflow { width: usize, height: usize },
}

/// Result type alias for [`GridError`].
pub type GridResult<T> = Result<T, GridError>;
