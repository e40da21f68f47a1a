//! Geographic coordinates and map projections.

pub mod datum;
pub mod impls;
pub mod traits;

pub use datum::Datum;
pub use traits::point::{GeoPoint, NewGeoPoint};
pub use traits::projection::{GraticuleBounds, MapProjection};
