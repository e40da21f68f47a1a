//! Flexproj is a map projection engine: the geometry core of an
//! interactive projection-design application.
//!
//! The crate revolves around three groups of components:
//!
//! * [`path`] — a mutable polyline/bezier path buffer with adaptive
//!   flattening, the unit of vector geometry everywhere else;
//! * [`scene`] — an owned tree of geographic objects (paths, points,
//!   texts, rasters and nested sets) with selection, hit-testing and
//!   batched change notification;
//! * [`project`] — the forward projection pipeline that turns unprojected
//!   (longitude/latitude) scene geometry into planar geometry for a given
//!   [`MapProjection`](flexproj_types::geo::MapProjection), adaptively
//!   densifying curves, breaking lines at the antimeridian and splitting
//!   polygons against the projection's valid graticule rectangle.
//!
//! Rasters ([`raster`]) are reprojected cell-by-cell through the inverse
//! projection.
//!
//! The UI layer of the application is an external collaborator: it builds
//! and mutates the unprojected scene tree, re-runs the projection pipeline
//! on change, and renders the projected tree through the [`render::Canvas`]
//! seam.

mod color;
pub mod error;
pub mod path;
pub mod project;
pub mod raster;
pub mod render;
pub mod scene;

pub use color::Color;

// Reexport the types crate.
pub use flexproj_types;
