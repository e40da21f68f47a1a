//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum FlexTypesError {
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
    /// A projection parameter is outside its allowed range.
    #[error("invalid projection parameter: {0}")]
    Parameter(String),
}
