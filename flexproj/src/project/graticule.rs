use flexproj_types::geo::GraticuleBounds;

use crate::color::Color;
use crate::error::FlexProjError;
use crate::path::Path;
use crate::scene::symbol::VectorSymbol;
use crate::scene::{GeoObject, GeoPath, GeoSet};

/// Builds unprojected graticule geometry: meridians and parallels as
/// polylines in geographic degrees, densified so the line projector can
/// bend them into smooth projected curves.
#[derive(Debug, Clone)]
pub struct Graticule {
    spacing_deg: f64,
    step_deg: f64,
    symbol: VectorSymbol,
}

impl Default for Graticule {
    fn default() -> Self {
        Self {
            spacing_deg: 15.0,
            step_deg: 2.0,
            symbol: VectorSymbol::stroked(Color::rgba(128, 128, 128, 255), 1.0),
        }
    }
}

impl Graticule {
    /// Creates a builder with an explicit line spacing and vertex step,
    /// both in degrees.
    pub fn new(spacing_deg: f64, step_deg: f64) -> Result<Self, FlexProjError> {
        if !(spacing_deg > 0.0) || !(step_deg > 0.0) {
            return Err(FlexProjError::InvalidArgument(format!(
                "graticule spacing and step must be positive, got {spacing_deg} and {step_deg}"
            )));
        }
        if step_deg > spacing_deg {
            return Err(FlexProjError::InvalidArgument(
                "graticule step must not exceed the line spacing".into(),
            ));
        }
        Ok(Self {
            spacing_deg,
            step_deg,
            ..Self::default()
        })
    }

    /// Replaces the line symbol.
    pub fn with_symbol(mut self, symbol: VectorSymbol) -> Self {
        self.symbol = symbol;
        self
    }

    /// Builds the graticule as a set of open paths, limited in latitude by
    /// the projection's valid bounds.
    pub fn build(&self, bounds: &GraticuleBounds) -> GeoObject {
        let mut set = GeoObject::new_set(GeoSet::new()).with_name("graticule");
        let min_lat = bounds.min_lat;
        let max_lat = bounds.max_lat;

        let meridian_count = (360.0 / self.spacing_deg).round() as i64;
        for i in 0..=meridian_count {
            let lon = -180.0 + i as f64 * self.spacing_deg;
            if lon > 180.0 {
                break;
            }
            let path = self.densified_line(|t| (lon, min_lat + t * (max_lat - min_lat)), max_lat - min_lat);
            set.add_child(
                GeoObject::new_path(GeoPath::new(path, self.symbol.clone()))
                    .with_name(format!("meridian {lon}")),
            );
        }

        let first_parallel = (min_lat / self.spacing_deg).ceil() as i64;
        let last_parallel = (max_lat / self.spacing_deg).floor() as i64;
        for i in first_parallel..=last_parallel {
            let lat = i as f64 * self.spacing_deg;
            let path = self.densified_line(|t| (-180.0 + t * 360.0, lat), 360.0);
            set.add_child(
                GeoObject::new_path(GeoPath::new(path, self.symbol.clone()))
                    .with_name(format!("parallel {lat}")),
            );
        }

        set
    }

    /// Polyline along a parameterized line, one vertex per step.
    fn densified_line(&self, point_at: impl Fn(f64) -> (f64, f64), span_deg: f64) -> Path {
        let steps = ((span_deg / self.step_deg).round() as usize).max(1);
        let mut path = Path::new();
        for i in 0..=steps {
            let (lon, lat) = point_at(i as f64 / steps as f64);
            if i == 0 {
                path.move_to(lon, lat);
            } else {
                path.line_to(lon, lat);
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;
    use crate::scene::GeoObjectKind;

    #[test]
    fn world_graticule_has_expected_line_counts() {
        let graticule = Graticule::default();
        let set = graticule.build(&GraticuleBounds::WORLD);

        // 25 meridians (-180..180 every 15) and 13 parallels (-90..90).
        assert_eq!(set.children().len(), 25 + 13);
    }

    #[test]
    fn latitude_range_limits_both_line_families() {
        let graticule = Graticule::default();
        let set = graticule.build(&GraticuleBounds::with_lat_range(-85.0, 85.0));

        // Parallels at multiples of 15 within [-85, 85]: -75..75.
        let parallels = set
            .children()
            .iter()
            .filter(|c| c.name().is_some_and(|n| n.starts_with("parallel")))
            .count();
        assert_eq!(parallels, 11);

        // Meridians stop at the latitude limits.
        for child in set.children() {
            let GeoObjectKind::Path(path) = child.kind() else {
                panic!("graticule children are paths");
            };
            let bounds = path.path().bounds().expect("non-empty");
            assert!(bounds.y_min() >= -85.0);
            assert!(bounds.y_max() <= 85.0);
        }
    }

    #[test]
    fn lines_are_densified_at_the_step() {
        let graticule = Graticule::new(15.0, 2.0).expect("valid");
        let set = graticule.build(&GraticuleBounds::WORLD);

        // A meridian spans 180 degrees: 90 steps, 91 vertices.
        let GeoObjectKind::Path(meridian) = set.children()[0].kind() else {
            panic!("graticule children are paths");
        };
        assert_eq!(meridian.path().cursor().count(), 91);
        assert_eq!(
            meridian
                .path()
                .cursor()
                .filter(|s| matches!(s, PathSegment::MoveTo(_)))
                .count(),
            1
        );
    }

    #[test]
    fn rejects_degenerate_configuration() {
        assert!(Graticule::new(0.0, 1.0).is_err());
        assert!(Graticule::new(10.0, 20.0).is_err());
    }
}
