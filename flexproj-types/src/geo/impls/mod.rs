//! Concrete geographic types and projections.

mod point;
pub use point::GeoPoint2d;

pub mod projection;
