use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::geo::datum::Datum;
use crate::geo::traits::projection::{normalize_lon_rad, GraticuleBounds, MapProjection};
use crate::point::Point2d;

/// Highest latitude (degrees) the projection is defined for. Same cutoff
/// as the web map tile grid uses.
const MAX_LAT_DEG: f64 = 85.06;

/// Spherical Mercator projection.
#[derive(Debug, Clone, Copy)]
pub struct Mercator {
    datum: Datum,
    lon0: f64,
}

impl Mercator {
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

impl Default for Mercator {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl MapProjection for Mercator {
    fn name(&self) -> &str {
        "Mercator"
    }

    fn forward(&self, lon: f64, lat: f64) -> Option<Point2d> {
        if lat.abs() > MAX_LAT_DEG.to_radians() {
            return None;
        }

        let rel = normalize_lon_rad(lon - self.lon0.to_radians());
        let r = self.datum.semimajor();
        let x = r * rel;
        let y = r * (FRAC_PI_4 + lat / 2.0).tan().ln();

        if x.is_finite() && y.is_finite() {
            Some(Point2d::new(x, y))
        } else {
            None
        }
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let r = self.datum.semimajor();
        let lat = 2.0 * (y / r).exp().atan() - FRAC_PI_2;
        let lon = x / r + self.lon0.to_radians();

        if lat.is_finite() && lon.is_finite() {
            Some((lon, lat))
        } else {
            None
        }
    }

    fn central_meridian(&self) -> f64 {
        self.lon0
    }

    fn bounds(&self) -> GraticuleBounds {
        GraticuleBounds::with_lat_range(-MAX_LAT_DEG, MAX_LAT_DEG)
    }

    fn datum(&self) -> Datum {
        self.datum
    }

    fn is_conformal(&self) -> bool {
        true
    }

    fn is_rectilinear(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn pole_is_out_of_domain() {
        let proj = Mercator::default();
        assert!(proj.forward(0.0, FRAC_PI_2).is_none());
        assert!(proj.forward(0.0, 89.0_f64.to_radians()).is_none());
    }

    #[test]
    fn round_trip() {
        let proj = Mercator::default();
        let (lon, lat) = (1.2, 0.9);
        let p = proj.forward(lon, lat).expect("in domain");
        let (lon2, lat2) = proj.inverse(p.x, p.y).expect("in domain");
        assert_abs_diff_eq!(lon, lon2, epsilon = 1e-10);
        assert_abs_diff_eq!(lat, lat2, epsilon = 1e-10);
    }

    #[test]
    fn origin_at_central_meridian() {
        let proj = Mercator::new(42.0);
        let p = proj.forward(42.0_f64.to_radians(), 0.0).expect("in domain");
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-9);
    }
}
