use crate::geo::datum::Datum;
use crate::geo::impls::projection::FlexProjection;
use crate::geo::traits::projection::{GraticuleBounds, MapProjection};
use crate::point::Point2d;

/// The Robinson compromise projection.
///
/// Thin wrapper over [`FlexProjection`] configured with the published
/// Robinson tables; kept as a named type so callers do not need to know it
/// is table-driven.
#[derive(Debug, Clone)]
pub struct Robinson(FlexProjection);

impl Robinson {
    /// Creates the projection with the given central meridian (degrees).
    pub fn new(lon0: f64) -> Self {
        Self(FlexProjection::robinson(lon0))
    }

    /// Replaces the reference ellipsoid.
    pub fn with_datum(self, datum: Datum) -> Self {
        Self(self.0.with_datum(datum))
    }
}

impl Default for Robinson {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl MapProjection for Robinson {
    fn name(&self) -> &str {
        "Robinson"
    }

    fn forward(&self, lon: f64, lat: f64) -> Option<Point2d> {
        self.0.forward(lon, lat)
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        self.0.inverse(x, y)
    }

    fn central_meridian(&self) -> f64 {
        self.0.central_meridian()
    }

    fn bounds(&self) -> GraticuleBounds {
        self.0.bounds()
    }

    fn datum(&self) -> Datum {
        self.0.datum()
    }
}
