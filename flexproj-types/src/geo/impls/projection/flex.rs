use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::FlexTypesError;
use crate::geo::datum::Datum;
use crate::geo::traits::projection::{normalize_lon_rad, GraticuleBounds, MapProjection};
use crate::point::Point2d;

/// Number of table knots: one per 5 degrees of latitude from 0 to 90.
pub const TABLE_KNOTS: usize = 19;

/// Spacing of the table knots in degrees.
const KNOT_STEP_DEG: f64 = 5.0;

/// A designable pseudocylindrical projection defined by latitude tables.
///
/// The projection is described by two tables sampled every 5 degrees of
/// latitude from the equator to the pole:
///
/// * `lengths` — relative length of the parallel (1.0 at the equator for
///   the classic designs);
/// * `heights` — normalized distance of the parallel from the equator,
///   running from 0.0 at the equator to 1.0 at the pole.
///
/// Values between knots are interpolated linearly. The forward mapping is
///
/// ```text
/// x = R * width_factor  * lengths(|lat|) * rel_lon
/// y = R * PI * height_factor * heights(|lat|) * sign(lat)
/// ```
///
/// With the published Robinson tables and factors this reproduces the
/// Robinson projection; editing the tables produces the custom designs the
/// projection-authoring workflow is built around.
#[derive(Debug, Clone)]
pub struct FlexProjection {
    datum: Datum,
    lon0: f64,
    name: String,
    lengths: [f64; TABLE_KNOTS],
    heights: [f64; TABLE_KNOTS],
    width_factor: f64,
    height_factor: f64,
}

/// Robinson relative parallel lengths, 0..90 degrees in 5 degree steps.
pub const ROBINSON_LENGTHS: [f64; TABLE_KNOTS] = [
    1.0000, 0.9986, 0.9954, 0.9900, 0.9822, 0.9730, 0.9600, 0.9427, 0.9216, 0.8962, 0.8679,
    0.8350, 0.7986, 0.7597, 0.7186, 0.6732, 0.6213, 0.5722, 0.5322,
];

/// Robinson normalized parallel distances from the equator.
pub const ROBINSON_HEIGHTS: [f64; TABLE_KNOTS] = [
    0.0000, 0.0620, 0.1240, 0.1860, 0.2480, 0.3100, 0.3720, 0.4340, 0.4958, 0.5571, 0.6176,
    0.6769, 0.7346, 0.7903, 0.8435, 0.8936, 0.9394, 0.9761, 1.0000,
];

impl FlexProjection {
    /// Creates a projection from latitude tables.
    ///
    /// Fails fast when the tables cannot describe a projection:
    /// non-positive parallel lengths, a `heights` table that does not start
    /// at 0.0, end at 1.0 or is not strictly increasing.
    pub fn new(
        name: impl Into<String>,
        lengths: [f64; TABLE_KNOTS],
        heights: [f64; TABLE_KNOTS],
        width_factor: f64,
        height_factor: f64,
        lon0: f64,
    ) -> Result<Self, FlexTypesError> {
        if lengths.iter().any(|&l| l <= 0.0) {
            return Err(FlexTypesError::Parameter(
                "parallel lengths must be positive".into(),
            ));
        }
        if heights[0] != 0.0 || heights[TABLE_KNOTS - 1] != 1.0 {
            return Err(FlexTypesError::Parameter(
                "parallel heights must run from 0.0 to 1.0".into(),
            ));
        }
        if heights.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FlexTypesError::Parameter(
                "parallel heights must be strictly increasing".into(),
            ));
        }
        if width_factor <= 0.0 || height_factor <= 0.0 {
            return Err(FlexTypesError::Parameter(
                "width and height factors must be positive".into(),
            ));
        }

        Ok(Self {
            datum: Datum::WGS84,
            lon0,
            name: name.into(),
            lengths,
            heights,
            width_factor,
            height_factor,
        })
    }

    /// The Robinson projection expressed through its design tables.
    pub fn robinson(lon0: f64) -> Self {
        Self {
            datum: Datum::WGS84,
            lon0,
            name: "Robinson".into(),
            lengths: ROBINSON_LENGTHS,
            heights: ROBINSON_HEIGHTS,
            width_factor: 0.8487,
            height_factor: 1.3523 / PI,
        }
    }

    /// Replaces the reference ellipsoid.
    pub fn with_datum(mut self, datum: Datum) -> Self {
        self.datum = datum;
        self
    }

    /// Linear interpolation of a table at `|lat|` radians.
    fn interpolate(table: &[f64; TABLE_KNOTS], abs_lat: f64) -> f64 {
        let pos = abs_lat.to_degrees() / KNOT_STEP_DEG;
        let i = (pos.floor() as usize).min(TABLE_KNOTS - 2);
        let frac = pos - i as f64;
        table[i] + (table[i + 1] - table[i]) * frac
    }

    /// Latitude (radians, non-negative) whose `heights` entry equals `h`.
    fn latitude_for_height(&self, h: f64) -> Option<f64> {
        if !(0.0..=1.0).contains(&h) {
            return None;
        }

        let i = match self.heights.iter().position(|&v| v >= h) {
            Some(0) => return Some(0.0),
            Some(i) => i - 1,
            None => return None,
        };

        let span = self.heights[i + 1] - self.heights[i];
        let frac = (h - self.heights[i]) / span;
        Some(((i as f64 + frac) * KNOT_STEP_DEG).to_radians())
    }
}

impl MapProjection for FlexProjection {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&self, lon: f64, lat: f64) -> Option<Point2d> {
        if !lat.is_finite() || lat.abs() > FRAC_PI_2 {
            return None;
        }

        let rel = normalize_lon_rad(lon - self.lon0.to_radians());
        let r = self.datum.semimajor();
        let x = r * self.width_factor * Self::interpolate(&self.lengths, lat.abs()) * rel;
        let y = r * PI * self.height_factor * Self::interpolate(&self.heights, lat.abs())
            * lat.signum();
        Some(Point2d::new(x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let r = self.datum.semimajor();
        let h = y.abs() / (r * PI * self.height_factor);
        let abs_lat = self.latitude_for_height(h)?;
        let lat = abs_lat * y.signum();

        let len = Self::interpolate(&self.lengths, abs_lat);
        let rel = x / (r * self.width_factor * len);
        if rel.abs() > PI {
            return None;
        }

        Some((rel + self.lon0.to_radians(), lat))
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
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn rejects_bad_tables() {
        let mut heights = ROBINSON_HEIGHTS;
        heights[5] = heights[4];
        assert!(FlexProjection::new(
            "broken",
            ROBINSON_LENGTHS,
            heights,
            0.8487,
            1.3523 / PI,
            0.0
        )
        .is_err());

        let mut lengths = ROBINSON_LENGTHS;
        lengths[0] = 0.0;
        assert!(FlexProjection::new(
            "broken",
            lengths,
            ROBINSON_HEIGHTS,
            0.8487,
            1.3523 / PI,
            0.0
        )
        .is_err());
    }

    #[test]
    fn matches_robinson_at_knots() {
        let proj = FlexProjection::robinson(0.0);
        let r = proj.datum().semimajor();

        // 45N on the central meridian sits exactly at a table knot.
        let p = proj.forward(0.0, 45.0_f64.to_radians()).expect("in domain");
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, r * 1.3523 * 0.5571, epsilon = 1e-6);

        // Equator scale along x.
        let p = proj.forward(1.0, 0.0).expect("in domain");
        assert_abs_diff_eq!(p.x, r * 0.8487, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 0.0);
    }

    #[test]
    fn round_trip() {
        let proj = FlexProjection::robinson(15.0);
        let (lon, lat) = (0.3, -0.9);
        let p = proj.forward(lon, lat).expect("in domain");
        let (lon2, lat2) = proj.inverse(p.x, p.y).expect("in domain");
        assert_abs_diff_eq!(lon, lon2, epsilon = 1e-9);
        assert_abs_diff_eq!(lat, lat2, epsilon = 1e-9);
    }
}
