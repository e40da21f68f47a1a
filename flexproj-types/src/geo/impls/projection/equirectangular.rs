use std::f64::consts::{FRAC_PI_2, PI};

use crate::geo::datum::Datum;
use crate::geo::traits::projection::{normalize_lon_rad, GraticuleBounds, MapProjection};
use crate::point::Point2d;

/// Equirectangular (plate carrée) projection.
///
/// Meridians and parallels map to equally spaced straight lines. Neither
/// conformal nor equal-area, but trivially invertible, which makes it the
/// reference projection for raster reprojection tests.
#[derive(Debug, Clone, Copy)]
pub struct Equirectangular {
    datum: Datum,
    lon0: f64,
}

impl Equirectangular {
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

impl Default for Equirectangular {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl MapProjection for Equirectangular {
    fn name(&self) -> &str {
        "Equirectangular"
    }

    fn forward(&self, lon: f64, lat: f64) -> Option<Point2d> {
        if !lat.is_finite() || lat.abs() > FRAC_PI_2 {
            return None;
        }

        let rel = normalize_lon_rad(lon - self.lon0.to_radians());
        let r = self.datum.semimajor();
        Some(Point2d::new(r * rel, r * lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let r = self.datum.semimajor();
        let lon = x / r + self.lon0.to_radians();
        let lat = y / r;
        if lat.abs() > FRAC_PI_2 || lon.abs() > PI + self.lon0.to_radians().abs() {
            return None;
        }

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

    fn is_rectilinear(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn equator_maps_to_x_axis() {
        let proj = Equirectangular::default();
        let p = proj.forward(1.0, 0.0).expect("in domain");
        assert_abs_diff_eq!(p.y, 0.0);
        assert_abs_diff_eq!(p.x, Datum::WGS84.semimajor());
    }

    #[test]
    fn round_trip() {
        let proj = Equirectangular::new(10.0);
        let (lon, lat) = (0.5, -0.7);
        let p = proj.forward(lon, lat).expect("in domain");
        let (lon2, lat2) = proj.inverse(p.x, p.y).expect("in domain");
        assert_abs_diff_eq!(lon, lon2, epsilon = 1e-12);
        assert_abs_diff_eq!(lat, lat2, epsilon = 1e-12);
    }
}
