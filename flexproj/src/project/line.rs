use crate::path::{Path, PathInstruction, PathSegment};
use crate::project::feature::FeatureProjector;

/// Flattening tolerance for geographic bezier input, in degrees.
const BEZIER_TOLERANCE_DEG: f64 = 0.01;

/// Longitude nudge keeping seam endpoints on their own side of the
/// antimeridian, in degrees (about a millimeter on an earth-sized datum).
pub(crate) const SEAM_EPS_DEG: f64 = 1e-8;

/// Projects open polylines, breaking them where they cross the
/// antimeridian seam at 180 degrees from the central meridian.
///
/// A vertex is "out of range" when its raw longitude lies outside the
/// 360 degree band around the central meridian. When that state flips
/// between consecutive vertices, the segment crosses the seam: the
/// current sub-path ends at the seam intersection and a new sub-path
/// starts at the same geographic meridian approached from the other side,
/// so no projected segment spans the full map width.
#[derive(Debug)]
pub struct LineProjector<'a, 'p> {
    feature: &'a FeatureProjector<'p>,
}

impl<'a, 'p> LineProjector<'a, 'p> {
    /// Wraps a feature projector.
    pub fn new(feature: &'a FeatureProjector<'p>) -> Self {
        Self { feature }
    }

    /// Projects an open path into planar map coordinates.
    pub fn project_open_path(&self, path: &Path) -> Path {
        let flat;
        let path = if path.has_bezier_segments() {
            flat = path.flatten(BEZIER_TOLERANCE_DEG);
            &flat
        } else {
            path
        };

        let lon0 = self.feature.projection().central_meridian();
        let mut out = Path::new();
        let mut state = Traversal {
            prev: None,
            prev_out_of_range: false,
            subpath_open: false,
        };

        for segment in path.cursor() {
            match segment {
                PathSegment::MoveTo(p) => {
                    self.start_subpath(&mut out, &mut state, (p.x, p.y), lon0);
                }
                PathSegment::LineTo(p) => {
                    let cur = (p.x, p.y);
                    match state.prev {
                        // A leading line instruction is tolerated and
                        // starts the sub-path.
                        None => self.start_subpath(&mut out, &mut state, cur, lon0),
                        Some(prev) => self.advance(&mut out, &mut state, prev, cur, lon0),
                    }
                }
                PathSegment::Close => {
                    if state.subpath_open {
                        out.close();
                    }
                    state.prev = None;
                    state.subpath_open = false;
                }
                // Input was flattened above.
                PathSegment::QuadTo(..) | PathSegment::CubicTo(..) => {}
            }
        }

        // A trailing sub-path that never produced geometry.
        if out.last_instruction() == Some(PathInstruction::MoveTo) {
            out.remove_last_instruction();
        }

        out
    }

    fn start_subpath(&self, out: &mut Path, state: &mut Traversal, point: (f64, f64), lon0: f64) {
        if out.last_instruction() == Some(PathInstruction::MoveTo) {
            out.remove_last_instruction();
        }

        state.prev = Some(point);
        state.prev_out_of_range = out_of_range(point.0 - lon0);
        state.subpath_open = match self.feature.project_point(point.0, point.1) {
            Some(p) => {
                out.move_to(p.x, p.y);
                true
            }
            None => false,
        };
    }

    fn advance(
        &self,
        out: &mut Path,
        state: &mut Traversal,
        prev: (f64, f64),
        cur: (f64, f64),
        lon0: f64,
    ) {
        let cur_out_of_range = out_of_range(cur.0 - lon0);

        if cur_out_of_range != state.prev_out_of_range {
            self.split_at_seam(out, state, prev, cur, lon0);
        } else {
            self.emit_curved(out, state, prev, cur);
        }

        state.prev = Some(cur);
        state.prev_out_of_range = cur_out_of_range;
    }

    /// Ends the current sub-path at the seam and restarts it at the same
    /// meridian approached from the other side.
    fn split_at_seam(
        &self,
        out: &mut Path,
        state: &mut Traversal,
        prev: (f64, f64),
        cur: (f64, f64),
        lon0: f64,
    ) {
        let prev_rel = prev.0 - lon0;
        let cur_rel = cur.0 - lon0;
        let step = cur_rel - prev_rel;

        // The seam value lying between the two relative longitudes.
        let seam = if step > 0.0 {
            if prev_rel < -180.0 {
                -180.0
            } else {
                180.0
            }
        } else if prev_rel > 180.0 {
            180.0
        } else {
            -180.0
        };

        let t = (seam - prev_rel) / step;
        let lat = prev.1 + t * (cur.1 - prev.1);

        // Both intersections are the same geographic meridian; the nudge
        // decides which map edge each one projects to.
        let toward_prev = (lon0 + seam - step.signum() * SEAM_EPS_DEG, lat);
        let toward_cur = (lon0 + seam + step.signum() * SEAM_EPS_DEG, lat);

        self.emit_curved(out, state, prev, toward_prev);
        if out.last_instruction() == Some(PathInstruction::MoveTo) {
            // The sub-path collapsed to its start point; drop it.
            out.remove_last_instruction();
        }

        state.subpath_open = match self.feature.project_point(toward_cur.0, toward_cur.1) {
            Some(p) => {
                out.move_to(p.x, p.y);
                true
            }
            None => false,
        };
        self.emit_curved(out, state, toward_cur, cur);
    }

    fn emit_curved(&self, out: &mut Path, state: &mut Traversal, prev: (f64, f64), cur: (f64, f64)) {
        if !state.subpath_open {
            // An earlier vertex was unprojectable; restart the sub-path
            // here if this one is representable.
            if let Some(p) = self.feature.project_point(prev.0, prev.1) {
                out.move_to(p.x, p.y);
                state.subpath_open = true;
            }
        }
        for point in self.feature.curved_segment(prev, cur) {
            if state.subpath_open {
                out.line_to(point.x, point.y);
            } else {
                out.move_to(point.x, point.y);
                state.subpath_open = true;
            }
        }
    }
}

struct Traversal {
    prev: Option<(f64, f64)>,
    prev_out_of_range: bool,
    subpath_open: bool,
}

/// Whether a relative longitude (degrees) lies outside the valid band.
pub(crate) fn out_of_range(rel_lon: f64) -> bool {
    !(-180.0..=180.0).contains(&rel_lon)
}

#[cfg(test)]
mod tests {
    use flexproj_types::geo::impls::projection::{Equirectangular, Robinson};
    use flexproj_types::geo::MapProjection;

    use super::*;

    fn subpath_count(path: &Path) -> usize {
        path.cursor()
            .filter(|s| matches!(s, PathSegment::MoveTo(_)))
            .count()
    }

    #[test]
    fn line_crossing_the_seam_splits_into_two_subpaths() {
        // Central meridian at 90E puts the seam at 90W; a line running
        // through the Pacific crosses it.
        let projection = Robinson::new(90.0);
        let projector = FeatureProjector::new(&projection);

        let mut path = Path::new();
        path.move_to(-60.0, 10.0);
        path.line_to(-80.0, 12.0);
        path.line_to(-100.0, 14.0);
        path.line_to(-120.0, 16.0);

        let projected = LineProjector::new(&projector).project_open_path(&path);
        assert!(subpath_count(&projected) >= 2);

        // No segment may span the full projected width.
        let width = projection
            .forward(std::f64::consts::PI + 90.0_f64.to_radians(), 0.0)
            .expect("in domain")
            .x
            * 2.0;
        let mut prev: Option<flexproj_types::Point2d> = None;
        for segment in projected.cursor() {
            match segment {
                PathSegment::MoveTo(p) => prev = Some(p),
                PathSegment::LineTo(p) => {
                    let from = prev.expect("line has a start");
                    assert!((p.x - from.x).abs() < width * 0.9);
                    prev = Some(p);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn line_inside_the_band_stays_in_one_subpath() {
        let projection = Robinson::new(0.0);
        let projector = FeatureProjector::new(&projection);

        let mut path = Path::new();
        path.move_to(-120.0, -20.0);
        path.line_to(0.0, 5.0);
        path.line_to(150.0, 30.0);

        let projected = LineProjector::new(&projector).project_open_path(&path);
        assert_eq!(subpath_count(&projected), 1);
        assert!(!projected.is_empty());
    }

    #[test]
    fn seam_halves_end_near_opposite_edges() {
        let projection = Equirectangular::new(90.0);
        let projector = FeatureProjector::new(&projection);

        let mut path = Path::new();
        path.move_to(-80.0, 0.0);
        path.line_to(-100.0, 0.0);

        let projected = LineProjector::new(&projector).project_open_path(&path);
        assert_eq!(subpath_count(&projected), 2);

        // Equirectangular x range is [-R*PI, R*PI] around the central
        // meridian; the two halves must end close to opposite edges.
        let edge = projection
            .forward((90.0_f64 + 179.999).to_radians(), 0.0)
            .expect("in domain")
            .x;
        let xs: Vec<f64> = projected
            .cursor()
            .filter_map(|s| s.end_point().map(|p| p.x))
            .collect();
        assert!(xs.iter().any(|&x| (x - edge).abs() < edge * 0.01));
        assert!(xs.iter().any(|&x| (x + edge).abs() < edge * 0.01));
    }

    #[test]
    fn unprojectable_leading_points_are_skipped() {
        use flexproj_types::geo::impls::projection::Mercator;

        let projection = Mercator::new(0.0);
        let projector = FeatureProjector::new(&projection);

        let mut path = Path::new();
        path.move_to(10.0, 89.5);
        path.line_to(10.0, 89.0);
        path.line_to(10.0, 50.0);
        path.line_to(10.0, 40.0);

        let projected = LineProjector::new(&projector).project_open_path(&path);
        // The polar vertices are dropped, the temperate ones survive.
        assert!(!projected.is_empty());
        assert!(projected
            .cursor()
            .all(|s| !matches!(s, PathSegment::QuadTo(..) | PathSegment::CubicTo(..))));
    }
}
