use std::f64::consts::FRAC_PI_2;

use crate::geo::datum::Datum;
use crate::geo::traits::projection::{normalize_lon_rad, GraticuleBounds, MapProjection};
use crate::point::Point2d;

/// Sinusoidal (Sanson-Flamsteed) projection.
///
/// Equal-area, with a curved world outline that converges at the poles.
/// The outline makes it a good stress case for antimeridian handling.
#[derive(Debug, Clone, Copy)]
pub struct Sinusoidal {
    datum: Datum,
    lon0: f64,
}

impl Sinusoidal {
    /// Creates the projection with the given central meridian (degrees).
    pub fn new(lon0: f64) -> Self {
        Self {
            datum: Datum::WGS84,
            lon0,
        }
    }

    /// Replaces the reference ellipsoid.
    pub fn with_datum(mut self, datum: Datum) -> Self {
        self.datum = datum;
        self
    }
}

impl Default for Sinusoidal {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl MapProjection for Sinusoidal {
    fn name(&self) -> &str {
        "Sinusoidal"
    }

    fn forward(&self, lon: f64, lat: f64) -> Option<Point2d> {
        if !lat.is_finite() || lat.abs() > FRAC_PI_2 {
            return None;
        }

        let rel = normalize_lon_rad(lon - self.lon0.to_radians());
        let r = self.datum.semimajor();
        Some(Point2d::new(r * rel * lat.cos(), r * lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let r = self.datum.semimajor();
        let lat = y / r;
        if lat.abs() > FRAC_PI_2 {
            return None;
        }

        let cos_lat = lat.cos();
        if cos_lat < 1e-12 {
            // At the poles every x collapses to the apex point.
            return if x.abs() < 1e-9 {
                Some((self.lon0.to_radians(), lat))
            } else {
                None
            };
        }

        let lon = x / (r * cos_lat) + self.lon0.to_radians();
        Some((lon, lat))
    }

    fn central_meridian(&self) -> f64 {
        self.lon0
    }

    fn bounds(&self) -> GraticuleBounds {
        GraticuleBounds::WORLD
    }

    fn datum(&self) -> Datum {
        self.datum
    }

    fn is_equal_area(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn parallels_shrink_towards_poles() {
        let proj = Sinusoidal::default();
        let equator = proj.forward(1.0, 0.0).expect("in domain");
        let high = proj.forward(1.0, 1.0).expect("in domain");
        assert!(high.x.abs() < equator.x.abs());
    }

    #[test]
    fn round_trip() {
        let proj = Sinusoidal::new(-30.0);
        let (lon, lat) = (-1.0, 0.8);
        let p = proj.forward(lon, lat).expect("in domain");
        let (lon2, lat2) = proj.inverse(p.x, p.y).expect("in domain");
        assert_abs_diff_eq!(lon, lon2, epsilon = 1e-10);
        assert_abs_diff_eq!(lat, lat2, epsilon = 1e-10);
    }
}
