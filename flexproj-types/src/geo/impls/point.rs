use serde::{Deserialize, Serialize};

use crate::geo::traits::point::{GeoPoint, NewGeoPoint};

/// 2d point on the surface of the reference ellipsoid.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint for GeoPoint2d {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl NewGeoPoint for GeoPoint2d {
    fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl GeoPoint2d {
    /// Copies coordinates from any other geographic point.
    pub fn from(other: &impl GeoPoint) -> Self {
        Self {
            lat: other.lat(),
            lon: other.lon(),
        }
    }
}

/// Creates a new [`GeoPoint2d`] from latitude and longitude values (in degrees).
///
/// ```
/// use flexproj_types::geo::GeoPoint;
/// use flexproj_types::latlon;
///
/// let point = latlon!(38.0, 52.0);
/// assert_eq!(point.lat(), 38.0);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        <$crate::geo::impls::GeoPoint2d as $crate::geo::NewGeoPoint>::latlon($lat, $lon)
    };
}
