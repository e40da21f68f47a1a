use flexproj_types::Rect;
use nalgebra::Affine2;
use serde::{Deserialize, Serialize};

use crate::path::cursor::{PathCursor, PathSegment};
use crate::path::flatten;

/// A single drawing instruction of a [`Path`].
///
/// Each instruction consumes a fixed number of doubles from the coordinate
/// buffer: control points first, the segment end point last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathInstruction {
    /// Starts a new sub-path. 2 doubles.
    MoveTo,
    /// Straight segment. 2 doubles.
    LineTo,
    /// Quadratic bezier segment. 4 doubles.
    QuadTo,
    /// Cubic bezier segment. 6 doubles.
    CubicTo,
    /// Closes the current sub-path. 0 doubles.
    Close,
}

impl PathInstruction {
    /// Number of doubles the instruction consumes from the coordinate
    /// buffer.
    pub fn coord_count(&self) -> usize {
        match self {
            PathInstruction::MoveTo | PathInstruction::LineTo => 2,
            PathInstruction::QuadTo => 4,
            PathInstruction::CubicTo => 6,
            PathInstruction::Close => 0,
        }
    }
}

/// Mutable polyline/bezier geometry buffer.
///
/// Instructions and coordinates live in two parallel flat buffers; every
/// non-[`Close`](PathInstruction::Close) instruction owns a matching
/// coordinate slice. The bounding box is maintained incrementally while
/// appending and recomputed after destructive edits, so [`Path::bounds`]
/// is always current.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    instructions: Vec<PathInstruction>,
    coords: Vec<f64>,
    bounds: Option<Rect>,
}

impl Path {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the path contains no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of instructions in the path.
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Starts a new sub-path at `(x, y)`.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.push(PathInstruction::MoveTo, &[x, y]);
    }

    /// Adds a straight segment to `(x, y)`.
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.push(PathInstruction::LineTo, &[x, y]);
    }

    /// Adds a quadratic bezier segment with control point `(cx, cy)`.
    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.push(PathInstruction::QuadTo, &[cx, cy, x, y]);
    }

    /// Adds a cubic bezier segment with control points `(c1x, c1y)` and
    /// `(c2x, c2y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.push(PathInstruction::CubicTo, &[c1x, c1y, c2x, c2y, x, y]);
    }

    /// Closes the current sub-path.
    pub fn close(&mut self) {
        self.instructions.push(PathInstruction::Close);
    }

    fn push(&mut self, instruction: PathInstruction, coords: &[f64]) {
        debug_assert_eq!(instruction.coord_count(), coords.len());
        self.instructions.push(instruction);
        self.coords.extend_from_slice(coords);
        for pair in coords.chunks_exact(2) {
            match &mut self.bounds {
                Some(rect) => rect.extend(pair[0], pair[1]),
                None => self.bounds = Some(Rect::new(pair[0], pair[1], pair[0], pair[1])),
            }
        }
    }

    /// Removes the last instruction and its coordinates, if any.
    pub fn remove_last_instruction(&mut self) {
        if let Some(instruction) = self.instructions.pop() {
            let len = self.coords.len() - instruction.coord_count();
            self.coords.truncate(len);
            self.recompute_bounds();
        }
    }

    /// The last instruction of the path, if any.
    pub fn last_instruction(&self) -> Option<PathInstruction> {
        self.instructions.last().copied()
    }

    /// Removes all geometry. The bounding box becomes `None`.
    pub fn reset(&mut self) {
        self.instructions.clear();
        self.coords.clear();
        self.bounds = None;
    }

    /// Appends another path to this one.
    ///
    /// With `connect` set, the appended path's leading `MoveTo` is
    /// converted to a `LineTo`, splicing the two paths into one sub-path;
    /// otherwise the appended geometry starts its own sub-path.
    pub fn append(&mut self, other: &Path, connect: bool) {
        let mut instructions = other.instructions.as_slice();
        if connect && !self.is_empty() {
            if let [PathInstruction::MoveTo, rest @ ..] = instructions {
                self.instructions.push(PathInstruction::LineTo);
                instructions = rest;
            }
        }

        self.instructions.extend_from_slice(instructions);
        self.coords.extend_from_slice(&other.coords);
        self.bounds = match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (a, b) => a.or(b),
        };
    }

    /// Whether the path consists of more than one sub-path.
    pub fn is_compound(&self) -> bool {
        self.instructions
            .iter()
            .filter(|i| **i == PathInstruction::MoveTo)
            .count()
            > 1
    }

    /// Whether the path contains a `Close` instruction.
    ///
    /// Reports true if *any* sub-path anywhere in a compound path is
    /// closed, not only the last one. Long-standing behavior that callers
    /// rely on; do not change without auditing area and fill code.
    pub fn is_closed(&self) -> bool {
        self.instructions.contains(&PathInstruction::Close)
    }

    /// Whether the path contains any quadratic or cubic segments.
    pub fn has_bezier_segments(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| matches!(i, PathInstruction::QuadTo | PathInstruction::CubicTo))
    }

    /// First coordinate pair of the path, if any.
    pub fn start_point(&self) -> Option<(f64, f64)> {
        if self.coords.len() >= 2 {
            Some((self.coords[0], self.coords[1]))
        } else {
            None
        }
    }

    /// End point of the last instruction carrying coordinates, if any.
    pub fn end_point(&self) -> Option<(f64, f64)> {
        if self.coords.len() >= 2 {
            Some((
                self.coords[self.coords.len() - 2],
                self.coords[self.coords.len() - 1],
            ))
        } else {
            None
        }
    }

    /// Read-only traversal cursor over the path.
    pub fn cursor(&self) -> PathCursor<'_> {
        PathCursor::new(&self.instructions, &self.coords)
    }

    /// Bounding box of all coordinates, including bezier control points.
    /// `None` for an empty path.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn recompute_bounds(&mut self) {
        let mut pairs = self.coords.chunks_exact(2);
        self.bounds = pairs.next().map(|first| {
            let mut rect = Rect::new(first[0], first[1], first[0], first[1]);
            for pair in pairs {
                rect.extend(pair[0], pair[1]);
            }
            rect
        });
    }

    /// Signed area of the path by the shoelace formula.
    ///
    /// Positive for counterclockwise orientation. Only straight chains
    /// contribute: bezier segments move the running point but add nothing
    /// to the sum, so curved outlines under-report their area. Flatten
    /// first when exact areas of curved paths are needed.
    pub fn signed_area(&self) -> f64 {
        let mut sum = 0.0;
        let mut subpath_start: Option<(f64, f64)> = None;
        let mut prev: Option<(f64, f64)> = None;

        let close_subpath = |prev: Option<(f64, f64)>, start: Option<(f64, f64)>| {
            if let (Some(p), Some(s)) = (prev, start) {
                p.0 * s.1 - s.0 * p.1
            } else {
                0.0
            }
        };

        for segment in self.cursor() {
            match segment {
                PathSegment::MoveTo(p) => {
                    sum += close_subpath(prev, subpath_start);
                    subpath_start = Some((p.x, p.y));
                    prev = subpath_start;
                }
                PathSegment::LineTo(p) => {
                    if let Some(prev) = prev {
                        sum += prev.0 * p.y - p.x * prev.1;
                    }
                    prev = Some((p.x, p.y));
                }
                PathSegment::QuadTo(_, p) | PathSegment::CubicTo(_, _, p) => {
                    // Curves are excluded from the sum.
                    prev = Some((p.x, p.y));
                }
                PathSegment::Close => {
                    sum += close_subpath(prev, subpath_start);
                    prev = subpath_start;
                    subpath_start = None;
                }
            }
        }
        sum += close_subpath(prev, subpath_start);

        sum / 2.0
    }

    /// Absolute area of the path. See [`Path::signed_area`] for the
    /// treatment of bezier segments.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Reverses the drawing direction of every sub-path in place.
    ///
    /// Control points of bezier segments swap accordingly; closed
    /// sub-paths stay closed. Flips the sign of [`Path::signed_area`].
    pub fn reverse(&mut self) {
        let mut reversed = Path::new();

        let mut subpath: Vec<PathSegment> = Vec::new();
        let flush = |subpath: &mut Vec<PathSegment>, reversed: &mut Path| {
            if subpath.is_empty() {
                return;
            }
            reverse_subpath(subpath, reversed);
            subpath.clear();
        };

        for segment in self.cursor() {
            if matches!(segment, PathSegment::MoveTo(_)) {
                flush(&mut subpath, &mut reversed);
            }
            subpath.push(segment);
        }
        flush(&mut subpath, &mut reversed);

        *self = reversed;
    }

    /// Translates all coordinates in place.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.map_coords(|x, y| (x + dx, y + dy));
    }

    /// Scales all coordinates relative to the origin.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.map_coords(|x, y| (x * sx, y * sy));
    }

    /// Rotates all coordinates around the origin by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        let (sin, cos) = angle.sin_cos();
        self.map_coords(|x, y| (x * cos - y * sin, x * sin + y * cos));
    }

    /// Applies an affine transform to all coordinates in place.
    pub fn transform(&mut self, transform: &Affine2<f64>) {
        let m = transform.matrix();
        let (m11, m12, m13) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
        let (m21, m22, m23) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
        self.map_coords(|x, y| (m11 * x + m12 * y + m13, m21 * x + m22 * y + m23));
    }

    fn map_coords(&mut self, f: impl Fn(f64, f64) -> (f64, f64)) {
        for pair in self.coords.chunks_exact_mut(2) {
            let (x, y) = f(pair[0], pair[1]);
            pair[0] = x;
            pair[1] = y;
        }
        self.recompute_bounds();
    }

    /// Replaces bezier segments with polyline approximations.
    ///
    /// `tolerance` is the maximum allowed distance between a curve and its
    /// polyline approximation, in the path's coordinate units. The result
    /// contains no quadratic or cubic instructions.
    pub fn flatten(&self, tolerance: f64) -> Path {
        let mut flattened = Path::new();
        let mut current = (0.0, 0.0);

        for segment in self.cursor() {
            match segment {
                PathSegment::MoveTo(p) => {
                    flattened.move_to(p.x, p.y);
                    current = (p.x, p.y);
                }
                PathSegment::LineTo(p) => {
                    flattened.line_to(p.x, p.y);
                    current = (p.x, p.y);
                }
                PathSegment::QuadTo(c, p) => {
                    flatten::flatten_quad(current, (c.x, c.y), (p.x, p.y), tolerance, &mut |x, y| {
                        flattened.line_to(x, y)
                    });
                    current = (p.x, p.y);
                }
                PathSegment::CubicTo(c1, c2, p) => {
                    flatten::flatten_cubic(
                        current,
                        (c1.x, c1.y),
                        (c2.x, c2.y),
                        (p.x, p.y),
                        tolerance,
                        &mut |x, y| flattened.line_to(x, y),
                    );
                    current = (p.x, p.y);
                }
                PathSegment::Close => flattened.close(),
            }
        }

        flattened
    }
}

/// Emits `subpath` into `out` in reverse drawing order.
fn reverse_subpath(subpath: &[PathSegment], out: &mut Path) {
    let closed = subpath
        .iter()
        .any(|s| matches!(s, PathSegment::Close));

    // End points of every drawing instruction, in order.
    let mut points = Vec::new();
    for segment in subpath {
        match segment {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => points.push(*p),
            PathSegment::QuadTo(_, p) | PathSegment::CubicTo(_, _, p) => points.push(*p),
            PathSegment::Close => {}
        }
    }
    let Some(last) = points.last() else {
        return;
    };

    out.move_to(last.x, last.y);

    let drawing: Vec<_> = subpath
        .iter()
        .filter(|s| !matches!(s, PathSegment::Close))
        .collect();
    for (i, segment) in drawing.iter().enumerate().rev() {
        // The reversed segment ends at the start point of the original one.
        if i == 0 {
            break;
        }
        let end = points[i - 1];
        match segment {
            PathSegment::MoveTo(_) => {}
            PathSegment::LineTo(_) => out.line_to(end.x, end.y),
            PathSegment::QuadTo(c, _) => out.quad_to(c.x, c.y, end.x, end.y),
            PathSegment::CubicTo(c1, c2, _) => {
                out.cubic_to(c2.x, c2.y, c1.x, c1.y, end.x, end.y)
            }
            // Close segments are filtered out of `drawing` above.
            PathSegment::Close => {}
        }
    }

    if closed {
        out.close();
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn unit_square() -> Path {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(1.0, 0.0);
        path.line_to(1.0, 1.0);
        path.line_to(0.0, 1.0);
        path.close();
        path
    }

    #[test]
    fn bounds_follow_edits() {
        let mut path = Path::new();
        assert_eq!(path.bounds(), None);

        path.move_to(1.0, 1.0);
        path.line_to(3.0, -2.0);
        assert_eq!(path.bounds(), Some(Rect::new(1.0, -2.0, 3.0, 1.0)));

        path.remove_last_instruction();
        assert_eq!(path.bounds(), Some(Rect::new(1.0, 1.0, 1.0, 1.0)));

        path.reset();
        assert_eq!(path.bounds(), None);
    }

    #[test]
    fn append_connected_turns_moveto_into_lineto() {
        let mut first = Path::new();
        first.move_to(0.0, 0.0);
        first.line_to(1.0, 0.0);

        let mut second = Path::new();
        second.move_to(2.0, 0.0);
        second.line_to(3.0, 0.0);

        let mut connected = first.clone();
        connected.append(&second, true);
        assert!(!connected.is_compound());
        assert_eq!(connected.instruction_count(), 4);

        let mut detached = first;
        detached.append(&second, false);
        assert!(detached.is_compound());
    }

    #[test]
    fn is_closed_reports_any_subpath() {
        let mut path = unit_square();
        path.move_to(5.0, 5.0);
        path.line_to(6.0, 5.0);

        // The open second sub-path does not reset the flag.
        assert!(path.is_closed());
    }

    #[test]
    fn signed_area_square() {
        let path = unit_square();
        assert_abs_diff_eq!(path.signed_area(), 1.0);
        assert_abs_diff_eq!(path.area(), 1.0);
    }

    #[test]
    fn reverse_flips_signed_area() {
        let mut path = unit_square();
        let area = path.signed_area();
        path.reverse();
        assert_abs_diff_eq!(path.signed_area(), -area);
        assert_abs_diff_eq!(path.area(), area.abs());
        assert!(path.is_closed());
    }

    #[test]
    fn bezier_segments_do_not_contribute_area() {
        let mut curved = Path::new();
        curved.move_to(0.0, 0.0);
        curved.line_to(1.0, 0.0);
        // The right edge of the square, drawn as a curve, drops out of the
        // sum entirely. The full square would report 1.0.
        curved.quad_to(1.0, 0.5, 1.0, 1.0);
        curved.line_to(0.0, 1.0);
        curved.close();

        assert_abs_diff_eq!(curved.signed_area(), 0.5);
    }

    #[test]
    fn flatten_removes_beziers() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.quad_to(0.5, 1.0, 1.0, 0.0);
        path.cubic_to(1.5, 1.0, 2.5, -1.0, 3.0, 0.0);
        assert!(path.has_bezier_segments());

        let flat = path.flatten(0.01);
        assert!(!flat.has_bezier_segments());
        assert!(flat.instruction_count() > path.instruction_count());
        assert_eq!(flat.end_point(), Some((3.0, 0.0)));
    }

    #[test]
    fn reverse_keeps_bezier_shape_endpoints() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.cubic_to(0.0, 1.0, 1.0, 1.0, 1.0, 0.0);
        path.line_to(2.0, 0.0);

        path.reverse();
        assert_eq!(path.start_point(), Some((2.0, 0.0)));
        assert_eq!(path.end_point(), Some((0.0, 0.0)));
        assert!(path.has_bezier_segments());
    }

    #[test]
    fn transform_recomputes_bounds() {
        let mut path = unit_square();
        path.translate(10.0, 0.0);
        assert_eq!(path.bounds(), Some(Rect::new(10.0, 0.0, 11.0, 1.0)));

        path.scale(2.0, 1.0);
        assert_eq!(path.bounds(), Some(Rect::new(20.0, 0.0, 22.0, 1.0)));
    }
}
