//! Recursive bezier flattening.
//!
//! Both flatteners use de Casteljau midpoint subdivision: a curve is
//! replaced by a straight line to its end point once every control point
//! lies within `tolerance` of the chord.

/// Subdivision depth limit guarding against degenerate control polygons.
const MAX_DEPTH: u32 = 24;

/// Squared distance from `p` to the chord `(a, b)`, measured to the
/// infinite line through the chord (sufficient as a flatness test).
fn line_distance_sq(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        let px = p.0 - a.0;
        let py = p.1 - a.1;
        return px * px + py * py;
    }

    let cross = dx * (p.1 - a.1) - dy * (p.0 - a.0);
    cross * cross / len_sq
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

/// Emits `line_to` points approximating the quadratic bezier
/// `(start, control, end)`, end point included, start point excluded.
pub fn flatten_quad(
    start: (f64, f64),
    control: (f64, f64),
    end: (f64, f64),
    tolerance: f64,
    line_to: &mut impl FnMut(f64, f64),
) {
    flatten_quad_impl(start, control, end, tolerance * tolerance, 0, line_to);
}

fn flatten_quad_impl(
    start: (f64, f64),
    control: (f64, f64),
    end: (f64, f64),
    tolerance_sq: f64,
    depth: u32,
    line_to: &mut impl FnMut(f64, f64),
) {
    if depth >= MAX_DEPTH || line_distance_sq(start, end, control) <= tolerance_sq {
        line_to(end.0, end.1);
        return;
    }

    let c1 = midpoint(start, control);
    let c2 = midpoint(control, end);
    let mid = midpoint(c1, c2);
    flatten_quad_impl(start, c1, mid, tolerance_sq, depth + 1, line_to);
    flatten_quad_impl(mid, c2, end, tolerance_sq, depth + 1, line_to);
}

/// Emits `line_to` points approximating the cubic bezier
/// `(start, c1, c2, end)`, end point included, start point excluded.
pub fn flatten_cubic(
    start: (f64, f64),
    c1: (f64, f64),
    c2: (f64, f64),
    end: (f64, f64),
    tolerance: f64,
    line_to: &mut impl FnMut(f64, f64),
) {
    flatten_cubic_impl(start, c1, c2, end, tolerance * tolerance, 0, line_to);
}

#[allow(clippy::too_many_arguments)]
fn flatten_cubic_impl(
    start: (f64, f64),
    c1: (f64, f64),
    c2: (f64, f64),
    end: (f64, f64),
    tolerance_sq: f64,
    depth: u32,
    line_to: &mut impl FnMut(f64, f64),
) {
    let flat = line_distance_sq(start, end, c1) <= tolerance_sq
        && line_distance_sq(start, end, c2) <= tolerance_sq;
    if depth >= MAX_DEPTH || flat {
        line_to(end.0, end.1);
        return;
    }

    let m1 = midpoint(start, c1);
    let m2 = midpoint(c1, c2);
    let m3 = midpoint(c2, end);
    let m12 = midpoint(m1, m2);
    let m23 = midpoint(m2, m3);
    let mid = midpoint(m12, m23);
    flatten_cubic_impl(start, m1, m12, mid, tolerance_sq, depth + 1, line_to);
    flatten_cubic_impl(mid, m23, m3, end, tolerance_sq, depth + 1, line_to);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_stays_within_tolerance() {
        let tolerance = 0.01;
        let mut points = vec![(0.0, 0.0)];
        flatten_quad((0.0, 0.0), (1.0, 2.0), (2.0, 0.0), tolerance, &mut |x, y| {
            points.push((x, y))
        });

        assert!(points.len() > 2);
        assert_eq!(*points.last().expect("non-empty"), (2.0, 0.0));

        // Every emitted point must lie on the curve's convex hull side,
        // i.e. between the endpoints vertically for this symmetric case.
        for (x, y) in points {
            assert!((0.0..=2.0).contains(&x));
            assert!((0.0..=1.0 + tolerance).contains(&y));
        }
    }

    #[test]
    fn tighter_tolerance_emits_more_points() {
        let mut coarse = 0;
        flatten_cubic(
            (0.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
            0.1,
            &mut |_, _| coarse += 1,
        );

        let mut fine = 0;
        flatten_cubic(
            (0.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
            0.001,
            &mut |_, _| fine += 1,
        );

        assert!(fine > coarse);
    }

    #[test]
    fn flat_curve_collapses_to_single_segment() {
        let mut count = 0;
        flatten_quad((0.0, 0.0), (1.0, 0.0), (2.0, 0.0), 0.01, &mut |_, _| {
            count += 1
        });
        assert_eq!(count, 1);
    }
}
