use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::geo::datum::Datum;
use crate::point::Point2d;

/// Valid longitude/latitude rectangle of a projection, in degrees.
///
/// Longitudes are relative to the projection's central meridian: a
/// projection valid on the whole globe has longitudes `[-180, 180]` no
/// matter where its central meridian points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraticuleBounds {
    /// Smallest valid relative longitude.
    pub min_lon: f64,
    /// Largest valid relative longitude.
    pub max_lon: f64,
    /// Smallest valid latitude.
    pub min_lat: f64,
    /// Largest valid latitude.
    pub max_lat: f64,
}

impl GraticuleBounds {
    /// Whole globe.
    pub const WORLD: Self = Self {
        min_lon: -180.0,
        max_lon: 180.0,
        min_lat: -90.0,
        max_lat: 90.0,
    };

    /// Bounds limited in latitude only.
    pub fn with_lat_range(min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            ..Self::WORLD
        }
    }

    /// Whether a latitude (degrees) falls inside the valid range.
    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat
    }
}

impl Default for GraticuleBounds {
    fn default() -> Self {
        Self::WORLD
    }
}

/// A cartographic projection: a pure mapping between geographic and planar
/// coordinates.
///
/// `forward` takes absolute longitude/latitude in radians and produces
/// planar coordinates in map units (meters for earth-sized datums).
/// `inverse` maps planar coordinates back to `(lon, lat)` in radians.
///
/// Both directions return `None` for coordinates outside the mathematical
/// domain of the projection. Callers must treat `None` as "point not
/// representable", never as a fatal error.
pub trait MapProjection: Debug {
    /// Human readable projection name.
    fn name(&self) -> &str;

    /// Projects `(lon, lat)` in radians to planar map coordinates.
    fn forward(&self, lon: f64, lat: f64) -> Option<Point2d>;

    /// Inverse projection: planar map coordinates to `(lon, lat)` radians.
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    /// Central meridian in degrees.
    fn central_meridian(&self) -> f64 {
        0.0
    }

    /// Valid graticule rectangle.
    fn bounds(&self) -> GraticuleBounds {
        GraticuleBounds::WORLD
    }

    /// Reference ellipsoid.
    fn datum(&self) -> Datum {
        Datum::WGS84
    }

    /// Whether the projection preserves local angles.
    fn is_conformal(&self) -> bool {
        false
    }

    /// Whether the projection preserves areas.
    fn is_equal_area(&self) -> bool {
        false
    }

    /// Whether meridians and parallels project to straight lines parallel
    /// to the coordinate axes.
    fn is_rectilinear(&self) -> bool {
        false
    }
}

/// Folds a longitude into `(lon0 - 180, lon0 + 180]` degrees.
pub fn normalize_lon_deg(lon: f64, lon0: f64) -> f64 {
    let mut rel = lon - lon0;
    while rel <= -180.0 {
        rel += 360.0;
    }
    while rel > 180.0 {
        rel -= 360.0;
    }
    rel + lon0
}

/// Folds a longitude into `(-PI, PI]` radians.
pub fn normalize_lon_rad(lon: f64) -> f64 {
    use std::f64::consts::PI;

    let mut lon = lon;
    while lon <= -PI {
        lon += 2.0 * PI;
    }
    while lon > PI {
        lon -= 2.0 * PI;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_deg() {
        assert_eq!(normalize_lon_deg(190.0, 0.0), -170.0);
        assert_eq!(normalize_lon_deg(-190.0, 0.0), 170.0);
        assert_eq!(normalize_lon_deg(180.0, 0.0), 180.0);
        assert_eq!(normalize_lon_deg(-170.0, 100.0), 190.0);
        assert_eq!(normalize_lon_deg(550.0, 0.0), -170.0);
    }

    #[test]
    fn normalize_rad() {
        use std::f64::consts::PI;
        assert!((normalize_lon_rad(1.5 * PI) + 0.5 * PI).abs() < 1e-12);
        assert_eq!(normalize_lon_rad(PI), PI);
    }
}
