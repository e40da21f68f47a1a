//! Reference ellipsoids.

/// Parameters of the reference ellipsoid used by a projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    semimajor: f64,
    inv_flattening: f64,
}

impl Datum {
    /// WGS84 ellipsoid.
    pub const WGS84: Self = Datum {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257223563,
    };

    /// Sphere with the WGS84 semimajor axis as radius.
    pub const SPHERE: Self = Datum {
        semimajor: 6_378_137.0,
        inv_flattening: f64::INFINITY,
    };

    /// Unit sphere. Useful for projections expressed in abstract map units.
    pub const UNIT_SPHERE: Self = Datum {
        semimajor: 1.0,
        inv_flattening: f64::INFINITY,
    };

    /// Semimajor axis in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Inverse flattening. Infinite for a sphere.
    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::WGS84
    }
}
