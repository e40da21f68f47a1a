use flexproj_types::geo::traits::projection::{normalize_lon_deg, MapProjection};
use flexproj_types::Point2d;

use crate::error::FlexProjError;
use crate::path::Path;
use crate::project::line::LineProjector;
use crate::project::polygon::PolygonProjector;
use crate::project::progress::NoProgress;
use crate::project::raster::RasterProjector;
use crate::raster::GridSampling;
use crate::scene::{GeoObject, GeoObjectKind, GeoPath, GeoPoint, GeoSet, GeoText};

/// Default curve tolerance for general geometry, in map units.
pub const DEFAULT_CURVE_TOLERANCE: f64 = 5000.0;

/// Curve tolerance suited for dense overlays such as graticule lines.
pub const FINE_CURVE_TOLERANCE: f64 = 500.0;

/// Hard cap on adaptive subdivision; tolerance normally stops far earlier.
const MAX_SUBDIVISION_DEPTH: u32 = 32;

/// Projects scene geometry through a [`MapProjection`].
///
/// Input coordinates are longitude/latitude in degrees (x = longitude).
/// Straight geographic segments are adaptively subdivided until the
/// projected polyline stays within `curve_tolerance` map units of the true
/// projected curve. Points the projection cannot represent are dropped,
/// never reported as errors.
#[derive(Debug, Clone, Copy)]
pub struct FeatureProjector<'a> {
    projection: &'a dyn MapProjection,
    curve_tolerance: f64,
    sampling: GridSampling,
}

impl<'a> FeatureProjector<'a> {
    /// Creates a projector with the default curve tolerance.
    pub fn new(projection: &'a dyn MapProjection) -> Self {
        Self {
            projection,
            curve_tolerance: DEFAULT_CURVE_TOLERANCE,
            sampling: GridSampling::Nearest,
        }
    }

    /// Creates a projector with an explicit curve tolerance in map units.
    pub fn with_tolerance(
        projection: &'a dyn MapProjection,
        curve_tolerance: f64,
    ) -> Result<Self, FlexProjError> {
        if !(curve_tolerance > 0.0) {
            return Err(FlexProjError::InvalidArgument(format!(
                "curve tolerance must be positive, got {curve_tolerance}"
            )));
        }
        Ok(Self {
            projection,
            curve_tolerance,
            sampling: GridSampling::Nearest,
        })
    }

    /// Sampling method used when projecting raster objects.
    pub fn with_sampling(mut self, sampling: GridSampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// The projection geometry is projected through.
    pub fn projection(&self) -> &'a dyn MapProjection {
        self.projection
    }

    /// Curve tolerance in map units.
    pub fn curve_tolerance(&self) -> f64 {
        self.curve_tolerance
    }

    /// Projects a single geographic point given in degrees.
    ///
    /// The longitude is folded into the 360 degree band around the central
    /// meridian first. `None` means the point is not representable.
    pub fn project_point(&self, lon: f64, lat: f64) -> Option<Point2d> {
        let lon = normalize_lon_deg(lon, self.projection.central_meridian());
        let p = self
            .projection
            .forward(lon.to_radians(), lat.to_radians())?;
        (p.x.is_finite() && p.y.is_finite()).then_some(p)
    }

    /// Projects the straight geographic segment `start -> end` (degrees)
    /// into a projected polyline.
    ///
    /// Returned points exclude the projected start and include the
    /// projected end; the caller drains them into its destination path.
    /// The segment is subdivided at its geographic midpoint while the
    /// projected midpoint deviates from the chord between the projected
    /// endpoints by more than the tolerance. An empty result means an
    /// endpoint was not representable and the segment is dropped.
    pub fn curved_segment(&self, start: (f64, f64), end: (f64, f64)) -> Vec<Point2d> {
        let (Some(p_start), Some(p_end)) = (
            self.project_point(start.0, start.1),
            self.project_point(end.0, end.1),
        ) else {
            log::debug!(
                "segment ({}, {}) -> ({}, {}) outside projection domain, dropped",
                start.0,
                start.1,
                end.0,
                end.1
            );
            return Vec::new();
        };

        let mut points = Vec::new();
        self.refine(start, end, p_start, p_end, 0, &mut points);
        points.push(p_end);
        points
    }

    fn refine(
        &self,
        start: (f64, f64),
        end: (f64, f64),
        p_start: Point2d,
        p_end: Point2d,
        depth: u32,
        out: &mut Vec<Point2d>,
    ) {
        if depth >= MAX_SUBDIVISION_DEPTH {
            return;
        }

        let mid = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);
        let Some(p_mid) = self.project_point(mid.0, mid.1) else {
            // Midpoint not representable: keep the straight chord.
            return;
        };

        if chord_distance_sq(p_mid, p_start, p_end) > self.curve_tolerance * self.curve_tolerance {
            self.refine(start, mid, p_start, p_mid, depth + 1, out);
            out.push(p_mid);
            self.refine(mid, end, p_mid, p_end, depth + 1, out);
        }
    }

    /// Projects a path, choosing the seam treatment by path topology:
    /// closed paths split against the valid graticule rectangle, open
    /// paths break at the antimeridian.
    pub fn project_path(&self, path: &Path) -> Path {
        if path.is_closed() {
            PolygonProjector::new(self).project_closed_path(path)
        } else {
            LineProjector::new(self).project_open_path(path)
        }
    }

    /// Projects a whole scene subtree into a new tree.
    ///
    /// Leaves the projection cannot represent are dropped; set objects
    /// always survive (possibly with fewer children). Identity flags
    /// (name, visibility, selectability) carry over; selection state does
    /// not.
    pub fn project_object(&self, object: &GeoObject) -> Option<GeoObject> {
        let projected = match object.kind() {
            GeoObjectKind::Path(path) => {
                let result = self.project_path(path.path());
                if result.is_empty() {
                    log::debug!("path outside projection domain, dropped");
                    return None;
                }
                GeoObject::new_path(GeoPath::new(result, path.symbol().clone()))
            }
            GeoObjectKind::Point(point) => {
                let position = self.project_point(point.position().x, point.position().y)?;
                let destination = point
                    .destination()
                    .and_then(|d| self.project_point(d.x, d.y));
                let mut projected = GeoPoint::new(position, point.symbol().clone());
                projected.set_destination(destination);
                GeoObject::new_point(projected)
            }
            GeoObjectKind::Text(text) => {
                let position = self.project_point(text.position().x, text.position().y)?;
                let (dx, dy) = text.offset();
                GeoObject::new_text(
                    GeoText::new(text.text(), position, text.symbol().clone())
                        .with_offset(dx, dy)
                        .with_rotation(text.rotation()),
                )
            }
            GeoObjectKind::Grid(grid) => {
                let raster = RasterProjector::new(self.projection).with_sampling(self.sampling);
                match raster.project_grid(grid, &NoProgress) {
                    Ok(projected) => GeoObject::new_grid(projected),
                    Err(err) => {
                        log::warn!("grid projection failed: {err}");
                        return None;
                    }
                }
            }
            GeoObjectKind::Image(image) => {
                let raster = RasterProjector::new(self.projection).with_sampling(self.sampling);
                match raster.project_image(image, &NoProgress) {
                    Ok(projected) => GeoObject::new_image(projected),
                    Err(err) => {
                        log::warn!("image projection failed: {err}");
                        return None;
                    }
                }
            }
            GeoObjectKind::Set(set) => {
                let projected = if set.is_grouped() {
                    GeoSet::grouped_set()
                } else {
                    GeoSet::new()
                };
                let mut target = GeoObject::new_set(projected);
                for child in set.children() {
                    if let Some(child_projected) = self.project_object(child) {
                        target.add_child(child_projected);
                    }
                }
                target
            }
        };

        Some(copy_attrs(object, projected))
    }

    /// Projects a set root; an empty set comes back when every child is
    /// outside the projection domain.
    pub fn project_set(&self, set: &GeoObject) -> GeoObject {
        self.project_object(set)
            .unwrap_or_else(|| GeoObject::new_set(GeoSet::new()))
    }
}

fn copy_attrs(source: &GeoObject, mut target: GeoObject) -> GeoObject {
    if let Some(name) = source.name() {
        target = target.with_name(name);
    }
    target.set_visible(source.is_visible());
    target.set_selectable(source.is_selectable());
    target
}

/// Squared perpendicular distance from `p` to the chord `a -> b`.
fn chord_distance_sq(p: Point2d, a: Point2d, b: Point2d) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        let px = p.x - a.x;
        let py = p.y - a.y;
        return px * px + py * py;
    }
    let cross = dx * (p.y - a.y) - dy * (p.x - a.x);
    cross * cross / len_sq
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use flexproj_types::geo::impls::projection::{Mercator, Robinson, Sinusoidal};

    use super::*;

    #[test]
    fn central_meridian_point_matches_raw_projection() {
        let projection = Robinson::new(25.0);
        let projector = FeatureProjector::new(&projection);

        let p = projector.project_point(25.0, 0.0).expect("in domain");
        let raw = projection
            .forward(25.0_f64.to_radians(), 0.0)
            .expect("in domain");
        assert_abs_diff_eq!(p.x, raw.x);
        assert_abs_diff_eq!(p.y, raw.y);
    }

    #[test]
    fn out_of_domain_point_is_none() {
        let projection = Mercator::new(0.0);
        let projector = FeatureProjector::new(&projection);
        assert!(projector.project_point(0.0, 89.0).is_none());
        assert!(projector.project_point(0.0, 45.0).is_some());
    }

    #[test]
    fn curved_segment_ends_at_projected_endpoint() {
        let projection = Sinusoidal::new(0.0);
        let projector = FeatureProjector::new(&projection);

        let points = projector.curved_segment((-90.0, 60.0), (90.0, 60.0));
        let last = points.last().expect("non-empty");
        let expected = projector.project_point(90.0, 60.0).expect("in domain");
        assert_abs_diff_eq!(last.x, expected.x);
        assert_abs_diff_eq!(last.y, expected.y);
    }

    #[test]
    fn tighter_tolerance_refines_at_least_as_much() {
        let projection = Sinusoidal::new(0.0);
        let fine = FeatureProjector::with_tolerance(&projection, 100.0).expect("valid");
        let coarse = FeatureProjector::with_tolerance(&projection, 100_000.0).expect("valid");

        // A long parallel away from the equator projects to a curve.
        let fine_points = fine.curved_segment((-120.0, 55.0), (120.0, 55.0));
        let coarse_points = coarse.curved_segment((-120.0, 55.0), (120.0, 55.0));
        assert!(fine_points.len() >= coarse_points.len());
        assert!(fine_points.len() > 1);
    }

    #[test]
    fn invalid_tolerance_rejected() {
        let projection = Sinusoidal::new(0.0);
        assert!(FeatureProjector::with_tolerance(&projection, 0.0).is_err());
        assert!(FeatureProjector::with_tolerance(&projection, -1.0).is_err());
    }

    #[test]
    fn projecting_a_subtree_keeps_structure() {
        use crate::scene::symbol::{PointSymbol, VectorSymbol};

        let projection = Robinson::new(0.0);
        let projector = FeatureProjector::new(&projection);

        let mut path = Path::new();
        path.move_to(-30.0, 10.0);
        path.line_to(30.0, 10.0);

        let mut source = GeoObject::new_set(GeoSet::new()).with_name("coast");
        source.add_child(GeoObject::new_path(GeoPath::new(
            path,
            VectorSymbol::default(),
        )));
        source.add_child(GeoObject::new_point(GeoPoint::new(
            Point2d::new(0.0, 0.0),
            PointSymbol::default(),
        )));

        let projected = projector.project_set(&source);
        assert_eq!(projected.name(), Some("coast"));
        assert_eq!(projected.children().len(), 2);
        assert!(matches!(
            projected.children()[0].kind(),
            GeoObjectKind::Path(_)
        ));
    }
}
