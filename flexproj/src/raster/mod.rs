//! Georeferenced raster data.

mod binary;
pub use binary::BinaryGrid;

mod grid;
pub use grid::GeoGrid;

mod image;
pub use image::GeoImage;

mod ref_grid;
pub use ref_grid::RefGrid;

use serde::{Deserialize, Serialize};

/// Resampling method used when reading a raster between cell centers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSampling {
    /// Value of the closest cell.
    #[default]
    Nearest,
    /// Bilinear interpolation of the 2x2 neighborhood.
    Bilinear,
    /// Catmull-Rom bicubic interpolation of the 4x4 neighborhood.
    Bicubic,
}
