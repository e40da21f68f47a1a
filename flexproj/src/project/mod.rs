//! Forward projection pipeline.
//!
//! The pipeline turns unprojected scene geometry (longitude/latitude in
//! degrees) into planar map geometry. [`FeatureProjector`] is the entry
//! point: it projects individual points, paths and whole scene subtrees,
//! adaptively subdividing straight geographic segments until the projected
//! curve stays within a tolerance of its chord. Open polylines and closed
//! rings that cross the antimeridian seam are handled by [`LineProjector`]
//! and [`PolygonProjector`]; rasters go through [`RasterProjector`].
//!
//! Coordinates outside a projection's mathematical domain are dropped
//! locally and never surface as errors.

mod distortion;
mod feature;
mod graticule;
mod line;
mod polygon;
pub mod progress;
mod raster;

pub use distortion::{distortion_at, tissot_at, DistortionFactors, TissotIndicatrix};
pub use feature::FeatureProjector;
pub use graticule::Graticule;
pub use line::LineProjector;
pub use polygon::PolygonProjector;
pub use progress::{NoProgress, ProgressListener};
pub use raster::RasterProjector;
