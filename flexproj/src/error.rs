//! Error types used by the crate.

use thiserror::Error;

/// Flexproj error type.
#[derive(Debug, Error)]
pub enum FlexProjError {
    /// A constructor was given an argument it cannot build a valid object
    /// from (non-positive cell size, zero grid dimensions and the like).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Raster dimensions do not match the sample buffer.
    #[error("grid of {cols}x{rows} cells does not match buffer of {len} samples")]
    GridShape {
        /// Number of columns the grid was declared with.
        cols: usize,
        /// Number of rows the grid was declared with.
        rows: usize,
        /// Actual sample buffer length.
        len: usize,
    },
    /// A batch operation was cancelled cooperatively.
    #[error("operation cancelled")]
    Cancelled,
    /// Geometry conversion error from the types crate.
    #[error(transparent)]
    Types(#[from] flexproj_types::error::FlexTypesError),
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}
