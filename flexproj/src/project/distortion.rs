use flexproj_types::geo::MapProjection;

/// Step for the central-difference partial derivatives, in radians.
const DERIVATIVE_STEP: f64 = 1e-5;

/// Local distortion of a projection at a point, from Tissot's theory.
///
/// Scale factors are relative to true scale on the datum sphere: `1.0`
/// means no distortion along that direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionFactors {
    /// Scale factor along the meridian (conventionally `h`).
    pub meridian_scale: f64,
    /// Scale factor along the parallel (conventionally `k`).
    pub parallel_scale: f64,
    /// Areal scale factor `s`; `1.0` everywhere for equal-area
    /// projections.
    pub areal_scale: f64,
    /// Maximum angular deformation `2Ω` in radians; `0.0` everywhere for
    /// conformal projections.
    pub max_angular_deformation: f64,
}

/// Semi-axes of the Tissot indicatrix at a point: the image of an
/// infinitesimal circle on the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TissotIndicatrix {
    /// Maximum local scale factor `a`.
    pub semi_major: f64,
    /// Minimum local scale factor `b`.
    pub semi_minor: f64,
}

/// Computes the local distortion factors at `(lon, lat)` degrees.
///
/// Derivatives of the forward mapping are taken numerically, so this
/// works for any projection including table-driven designs. `None` when
/// the point or its differencing neighborhood is outside the projection
/// domain, or too close to a pole for the parallel direction to be
/// meaningful.
pub fn distortion_at(
    projection: &dyn MapProjection,
    lon: f64,
    lat: f64,
) -> Option<DistortionFactors> {
    let (factors, _) = analyze(projection, lon, lat)?;
    Some(factors)
}

/// Computes the Tissot indicatrix semi-axes at `(lon, lat)` degrees.
pub fn tissot_at(projection: &dyn MapProjection, lon: f64, lat: f64) -> Option<TissotIndicatrix> {
    let (_, indicatrix) = analyze(projection, lon, lat)?;
    Some(indicatrix)
}

fn analyze(
    projection: &dyn MapProjection,
    lon: f64,
    lat: f64,
) -> Option<(DistortionFactors, TissotIndicatrix)> {
    let lon = lon.to_radians();
    let lat = lat.to_radians();
    let cos_lat = lat.cos();
    if cos_lat < 1e-8 {
        return None;
    }

    let h = DERIVATIVE_STEP;
    let east = projection.forward(lon + h, lat)?;
    let west = projection.forward(lon - h, lat)?;
    let north = projection.forward(lon, lat + h)?;
    let south = projection.forward(lon, lat - h)?;

    let dx_dlon = (east.x - west.x) / (2.0 * h);
    let dy_dlon = (east.y - west.y) / (2.0 * h);
    let dx_dlat = (north.x - south.x) / (2.0 * h);
    let dy_dlat = (north.y - south.y) / (2.0 * h);

    let r = projection.datum().semimajor();
    let meridian_scale = (dx_dlat * dx_dlat + dy_dlat * dy_dlat).sqrt() / r;
    let parallel_scale = (dx_dlon * dx_dlon + dy_dlon * dy_dlon).sqrt() / (r * cos_lat);

    // Jacobian-based areal scale equals h*k*sin(theta').
    let areal_scale = (dy_dlat * dx_dlon - dx_dlat * dy_dlon) / (r * r * cos_lat);

    let sum_sq = meridian_scale * meridian_scale + parallel_scale * parallel_scale;
    let a_plus = (sum_sq + 2.0 * areal_scale).max(0.0).sqrt();
    let a_minus = (sum_sq - 2.0 * areal_scale).max(0.0).sqrt();
    let semi_major = (a_plus + a_minus) / 2.0;
    let semi_minor = (a_plus - a_minus) / 2.0;

    let max_angular_deformation = if a_plus > 0.0 {
        2.0 * (a_minus / a_plus).clamp(-1.0, 1.0).asin()
    } else {
        0.0
    };

    Some((
        DistortionFactors {
            meridian_scale,
            parallel_scale,
            areal_scale,
            max_angular_deformation,
        },
        TissotIndicatrix {
            semi_major,
            semi_minor,
        },
    ))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use flexproj_types::geo::impls::projection::{Equirectangular, Mercator, Sinusoidal};

    use super::*;

    #[test]
    fn equal_area_projection_has_unit_areal_scale() {
        let projection = Sinusoidal::new(0.0);
        for &(lon, lat) in &[(0.0, 0.0), (30.0, 45.0), (-120.0, -60.0)] {
            let factors = distortion_at(&projection, lon, lat).expect("in domain");
            assert_abs_diff_eq!(factors.areal_scale, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn conformal_projection_has_no_angular_deformation() {
        let projection = Mercator::new(0.0);
        let factors = distortion_at(&projection, 20.0, 50.0).expect("in domain");
        assert_abs_diff_eq!(
            factors.meridian_scale,
            factors.parallel_scale,
            epsilon = 1e-4
        );
        assert_abs_diff_eq!(factors.max_angular_deformation, 0.0, epsilon = 1e-4);

        let indicatrix = tissot_at(&projection, 20.0, 50.0).expect("in domain");
        assert_abs_diff_eq!(indicatrix.semi_major, indicatrix.semi_minor, epsilon = 1e-4);
    }

    #[test]
    fn equirectangular_stretches_parallels_with_latitude() {
        let projection = Equirectangular::new(0.0);
        let factors = distortion_at(&projection, 0.0, 60.0).expect("in domain");
        assert_abs_diff_eq!(factors.meridian_scale, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(factors.parallel_scale, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(factors.areal_scale, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn poles_are_rejected() {
        let projection = Equirectangular::new(0.0);
        assert!(distortion_at(&projection, 0.0, 90.0).is_none());
    }
}
