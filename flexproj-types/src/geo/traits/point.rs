/// A point on the surface of the reference ellipsoid.
pub trait GeoPoint {
    /// Latitude in degrees.
    fn lat(&self) -> f64;
    /// Longitude in degrees.
    fn lon(&self) -> f64;

    /// Latitude in radians.
    fn lat_rad(&self) -> f64 {
        self.lat().to_radians()
    }

    /// Longitude in radians.
    fn lon_rad(&self) -> f64 {
        self.lon().to_radians()
    }
}

/// A geographic point that can be constructed from a coordinate pair.
pub trait NewGeoPoint: GeoPoint + Sized {
    /// Creates a point from latitude and longitude in degrees.
    fn latlon(lat: f64, lon: f64) -> Self;

    /// Creates a point from longitude and latitude in degrees.
    fn lonlat(lon: f64, lat: f64) -> Self {
        Self::latlon(lat, lon)
    }
}
