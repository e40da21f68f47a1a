use flexproj_types::geo::GraticuleBounds;
use geo::BooleanOps;
use geo_types::{LineString, MultiPolygon, Polygon};

use crate::path::{Path, PathInstruction, PathSegment};
use crate::project::feature::FeatureProjector;
use crate::project::line::{out_of_range, SEAM_EPS_DEG};

/// Flattening tolerance for geographic bezier input, in degrees.
const BEZIER_TOLERANCE_DEG: f64 = 0.01;

/// Snapping epsilon for vertices near the seam or the latitude limits,
/// in degrees.
const SNAP_EPS_DEG: f64 = 1e-6;

/// Projects closed rings, splitting them against the projection's valid
/// graticule rectangle.
///
/// A ring crossing the antimeridian seam is cut into the part inside the
/// 360 degree band around the central meridian and the part outside it;
/// the outside part is wrapped by 360 degrees onto the opposite map edge
/// and both parts are projected independently, producing the standard
/// "cut at the antimeridian" world map treatment.
#[derive(Debug)]
pub struct PolygonProjector<'a, 'p> {
    feature: &'a FeatureProjector<'p>,
}

impl<'a, 'p> PolygonProjector<'a, 'p> {
    /// Wraps a feature projector.
    pub fn new(feature: &'a FeatureProjector<'p>) -> Self {
        Self { feature }
    }

    /// Projects a closed path into planar map coordinates.
    pub fn project_closed_path(&self, path: &Path) -> Path {
        let flat = path.flatten(BEZIER_TOLERANCE_DEG);
        let rings = collect_rings(&flat);

        let projection = self.feature.projection();
        let lon0 = projection.central_meridian();
        let bounds = projection.bounds();
        let west = lon0 - 180.0;
        let east = lon0 + 180.0;

        let mut out = Path::new();

        let crosses = rings.iter().flatten().any(|&(lon, lat)| {
            out_of_range(lon - lon0)
                || lat < bounds.min_lat - SNAP_EPS_DEG
                || lat > bounds.max_lat + SNAP_EPS_DEG
        });
        if !crosses {
            for ring in &rings {
                self.project_ring(ring, west, east, &mut out);
            }
            return out;
        }

        let source = MultiPolygon(
            rings
                .into_iter()
                .filter(|ring| ring.len() >= 3)
                .map(|ring| Polygon::new(LineString::from(ring), Vec::new()))
                .collect(),
        );
        let clip = MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (west, bounds.min_lat),
                (east, bounds.min_lat),
                (east, bounds.max_lat),
                (west, bounds.max_lat),
            ]),
            Vec::new(),
        )]);

        let inner = source.intersection(&clip);
        let outer = source.difference(&clip);

        self.project_area(&inner, 0.0, west, east, &bounds, &mut out);

        // The outside part lives beyond the seam; wrapping it by a full
        // turn brings it back into the band on the opposite map edge. The
        // side it comes from follows the sign of the central meridian.
        let wrap = if lon0 >= 0.0 { 360.0 } else { -360.0 };
        self.project_area(&outer, wrap, west, east, &bounds, &mut out);

        out
    }

    fn project_area(
        &self,
        area: &MultiPolygon<f64>,
        lon_shift: f64,
        west: f64,
        east: f64,
        bounds: &GraticuleBounds,
        out: &mut Path,
    ) {
        for polygon in &area.0 {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                let mut coords: Vec<(f64, f64)> = ring
                    .0
                    .iter()
                    .map(|c| (c.x + lon_shift, c.y))
                    .collect();
                // Boolean output rings repeat the first coordinate.
                if coords.len() > 1 && coords.first() == coords.last() {
                    coords.pop();
                }
                snap_ring(&mut coords, west, east, bounds);
                self.project_ring(&coords, west, east, out);
            }
        }
    }

    fn project_ring(&self, ring: &[(f64, f64)], west: f64, east: f64, out: &mut Path) {
        if ring.len() < 3 {
            return;
        }

        let points = nudge_seam_vertices(ring, west, east);

        let mut opened = false;
        let n = points.len();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            if !opened {
                match self.feature.project_point(a.0, a.1) {
                    Some(p) => {
                        out.move_to(p.x, p.y);
                        opened = true;
                    }
                    None => continue,
                }
            }
            for q in self.feature.curved_segment(a, b) {
                out.line_to(q.x, q.y);
            }
        }

        if out.last_instruction() == Some(PathInstruction::MoveTo) {
            out.remove_last_instruction();
        } else if opened {
            out.close();
        }
    }
}

/// Snaps coordinates within [`SNAP_EPS_DEG`] of the seam longitudes or the
/// latitude limits exactly onto them, removing boolean clipping noise.
fn snap_ring(ring: &mut [(f64, f64)], west: f64, east: f64, bounds: &GraticuleBounds) {
    for (lon, lat) in ring.iter_mut() {
        if (*lon - west).abs() < SNAP_EPS_DEG {
            *lon = west;
        } else if (*lon - east).abs() < SNAP_EPS_DEG {
            *lon = east;
        }
        if (*lat - bounds.min_lat).abs() < SNAP_EPS_DEG {
            *lat = bounds.min_lat;
        } else if (*lat - bounds.max_lat).abs() < SNAP_EPS_DEG {
            *lat = bounds.max_lat;
        }
    }
}

/// Keeps seam vertices on the ring's own side of the antimeridian.
///
/// Longitude normalization folds the western seam onto the eastern one, so
/// a ring flush against the west edge would project its seam vertices to
/// the opposite side of the map. Vertices exactly on a seam are nudged a
/// hair inward, but only when the ring's bounding box edge coincides with
/// that seam; an isolated vertex merely touching the seam from a ring
/// spanning elsewhere is left alone.
fn nudge_seam_vertices(ring: &[(f64, f64)], west: f64, east: f64) -> Vec<(f64, f64)> {
    let min_lon = ring.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_lon = ring.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let flush_west = (min_lon - west).abs() < SNAP_EPS_DEG;
    let flush_east = (east - max_lon).abs() < SNAP_EPS_DEG;

    ring.iter()
        .map(|&(lon, lat)| {
            if flush_west && lon == west {
                (lon + SEAM_EPS_DEG, lat)
            } else if flush_east && lon == east {
                (lon - SEAM_EPS_DEG, lat)
            } else {
                (lon, lat)
            }
        })
        .collect()
}

fn collect_rings(path: &Path) -> Vec<Vec<(f64, f64)>> {
    let mut rings = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for segment in path.cursor() {
        match segment {
            PathSegment::MoveTo(p) => {
                if current.len() >= 3 {
                    rings.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                current.push((p.x, p.y));
            }
            PathSegment::LineTo(p) => current.push((p.x, p.y)),
            // A sub-path without an explicit close still forms a ring.
            PathSegment::Close => {}
            // Input was flattened.
            PathSegment::QuadTo(..) | PathSegment::CubicTo(..) => {}
        }
    }
    if current.len() >= 3 {
        rings.push(current);
    }

    rings
}

#[cfg(test)]
mod tests {
    use flexproj_types::geo::impls::projection::{Equirectangular, Robinson};
    use flexproj_types::geo::MapProjection;

    use super::*;

    fn square(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> Path {
        let mut path = Path::new();
        path.move_to(lon_min, lat_min);
        path.line_to(lon_max, lat_min);
        path.line_to(lon_max, lat_max);
        path.line_to(lon_min, lat_max);
        path.close();
        path
    }

    fn subpath_count(path: &Path) -> usize {
        path.cursor()
            .filter(|s| matches!(s, PathSegment::MoveTo(_)))
            .count()
    }

    #[test]
    fn ring_inside_the_band_projects_as_one_closed_ring() {
        let projection = Robinson::new(0.0);
        let projector = FeatureProjector::new(&projection);
        let path = square(-40.0, -20.0, 40.0, 30.0);

        let projected = PolygonProjector::new(&projector).project_closed_path(&path);
        assert_eq!(subpath_count(&projected), 1);
        assert!(projected.is_closed());
    }

    #[test]
    fn seam_straddling_ring_splits_into_inner_and_outer_parts() {
        // Central meridian 90E, seam at 90W; the ring spans 120W..60W.
        let projection = Robinson::new(90.0);
        let projector = FeatureProjector::new(&projection);
        let path = square(-120.0, 0.0, -60.0, 20.0);

        let projected = PolygonProjector::new(&projector).project_closed_path(&path);
        assert!(subpath_count(&projected) >= 2);
        assert!(projected.is_closed());
    }

    #[test]
    fn split_halves_land_on_opposite_map_edges() {
        let projection = Equirectangular::new(90.0);
        let projector = FeatureProjector::new(&projection);
        let path = square(-120.0, 0.0, -60.0, 20.0);

        let projected = PolygonProjector::new(&projector).project_closed_path(&path);
        let edge = projection
            .forward((90.0_f64 + 179.0).to_radians(), 0.0)
            .expect("in domain")
            .x;

        let xs: Vec<f64> = projected
            .cursor()
            .filter_map(|s| s.end_point().map(|p| p.x))
            .collect();
        assert!(xs.iter().any(|&x| x < -edge));
        assert!(xs.iter().any(|&x| x > edge));
    }

    #[test]
    fn compound_path_projects_every_ring() {
        let projection = Robinson::new(0.0);
        let projector = FeatureProjector::new(&projection);

        let mut path = square(-30.0, -10.0, -10.0, 10.0);
        path.append(&square(10.0, -10.0, 30.0, 10.0), false);

        let projected = PolygonProjector::new(&projector).project_closed_path(&path);
        assert_eq!(subpath_count(&projected), 2);
    }
}
