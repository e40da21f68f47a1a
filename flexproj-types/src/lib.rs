//! Geometry primitives and the map projection abstraction used by the
//! `flexproj` map projection engine.
//!
//! The crate is split into two coordinate worlds:
//!
//! * [`geo`] — geographic coordinates (longitude/latitude on a datum) and
//!   the [`geo::MapProjection`] trait mapping them onto a plane;
//! * the crate root — planar (projected or screen) coordinates:
//!   [`CartesianPoint2d`], [`Point2d`] and [`Rect`].

pub mod error;
pub mod geo;

mod point;
pub use point::*;

mod rect;
pub use rect::Rect;
