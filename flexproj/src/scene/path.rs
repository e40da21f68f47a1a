use flexproj_types::{CartesianPoint2d, Point2d, Rect};
use serde::{Deserialize, Serialize};

use crate::path::{Path, PathSegment};
use crate::scene::symbol::VectorSymbol;

/// Path geometry with its symbolization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPath {
    path: Path,
    symbol: VectorSymbol,
}

impl GeoPath {
    /// Combines path geometry with a symbol.
    pub fn new(path: Path, symbol: VectorSymbol) -> Self {
        Self { path, symbol }
    }

    /// The path geometry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mutable access to the path geometry.
    pub fn path_mut(&mut self) -> &mut Path {
        &mut self.path
    }

    /// The symbol.
    pub fn symbol(&self) -> &VectorSymbol {
        &self.symbol
    }

    /// Replaces the symbol.
    pub fn set_symbol(&mut self, symbol: VectorSymbol) {
        self.symbol = symbol;
    }

    /// Bounding box of the drawn geometry: the path bounds grown by half
    /// the stroke width at the given map scale.
    pub fn bounds(&self, scale: f64) -> Option<Rect> {
        let margin = self.symbol.stroke_width_at_scale(scale) / 2.0;
        self.path.bounds().map(|r| {
            Rect::new(
                r.x_min() - margin,
                r.y_min() - margin,
                r.x_max() + margin,
                r.y_max() + margin,
            )
        })
    }

    /// Whether a point hits the drawn symbol.
    ///
    /// A point is on the symbol when it is within `tolerance` (or half the
    /// stroke width, whichever is larger) of the stroked outline, or
    /// inside a filled closed path.
    pub fn is_point_on_symbol(&self, point: &Point2d, tolerance: f64, scale: f64) -> bool {
        let tolerance = tolerance.max(self.symbol.stroke_width_at_scale(scale) / 2.0);

        // Coarse reject against the (conservative) bounding box.
        match self.bounds(scale) {
            Some(bounds) => {
                let grown = Rect::new(
                    bounds.x_min() - tolerance,
                    bounds.y_min() - tolerance,
                    bounds.x_max() + tolerance,
                    bounds.y_max() + tolerance,
                );
                if !grown.contains(point) {
                    return false;
                }
            }
            None => return false,
        }

        let flat = self.path.flatten(tolerance / 2.0);
        if distance_to_path_sq(&flat, point) <= tolerance * tolerance {
            return true;
        }

        self.symbol.fill_color.is_some() && self.path.is_closed() && point_in_path(&flat, point)
    }
}

/// Squared distance from a point to the nearest segment of a flattened
/// path.
fn distance_to_path_sq(flat: &Path, point: &Point2d) -> f64 {
    let mut min_sq = f64::INFINITY;
    let mut prev: Option<Point2d> = None;
    let mut subpath_start: Option<Point2d> = None;

    for segment in flat.cursor() {
        match segment {
            PathSegment::MoveTo(p) => {
                subpath_start = Some(p);
                prev = Some(p);
            }
            PathSegment::LineTo(p) => {
                if let Some(a) = prev {
                    min_sq = min_sq.min(point.distance_to_segment_sq(&a, &p));
                }
                prev = Some(p);
            }
            PathSegment::Close => {
                if let (Some(a), Some(b)) = (prev, subpath_start) {
                    min_sq = min_sq.min(point.distance_to_segment_sq(&a, &b));
                }
                prev = subpath_start;
            }
            // The path is flattened.
            PathSegment::QuadTo(_, p) | PathSegment::CubicTo(_, _, p) => {
                prev = Some(p);
            }
        }
    }

    min_sq
}

/// Even-odd point-in-polygon test over a flattened path. Every sub-path
/// is treated as implicitly closed.
fn point_in_path(flat: &Path, point: &Point2d) -> bool {
    let mut inside = false;
    let mut prev: Option<Point2d> = None;
    let mut subpath_start: Option<Point2d> = None;

    let mut toggle = |a: Point2d, b: Point2d| {
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
    };

    for segment in flat.cursor() {
        match segment {
            PathSegment::MoveTo(p) => {
                if let (Some(a), Some(b)) = (prev, subpath_start) {
                    toggle(a, b);
                }
                subpath_start = Some(p);
                prev = Some(p);
            }
            PathSegment::LineTo(p) => {
                if let Some(a) = prev {
                    toggle(a, p);
                }
                prev = Some(p);
            }
            PathSegment::Close => {
                if let (Some(a), Some(b)) = (prev, subpath_start) {
                    toggle(a, b);
                }
                prev = subpath_start;
            }
            PathSegment::QuadTo(_, p) | PathSegment::CubicTo(_, _, p) => {
                prev = Some(p);
            }
        }
    }
    if let (Some(a), Some(b)) = (prev, subpath_start) {
        toggle(a, b);
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn square_path() -> Path {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 0.0);
        path.line_to(10.0, 10.0);
        path.line_to(0.0, 10.0);
        path.close();
        path
    }

    #[test]
    fn stroke_hit_requires_proximity_to_outline() {
        let geo = GeoPath::new(square_path(), VectorSymbol::stroked(Color::BLACK, 1.0));
        assert!(geo.is_point_on_symbol(&Point2d::new(10.1, 5.0), 0.5, 1.0));
        assert!(!geo.is_point_on_symbol(&Point2d::new(5.0, 5.0), 0.5, 1.0));
    }

    #[test]
    fn fill_hit_covers_interior() {
        let geo = GeoPath::new(square_path(), VectorSymbol::filled(Color::GRAY));
        assert!(geo.is_point_on_symbol(&Point2d::new(5.0, 5.0), 0.5, 1.0));
        assert!(!geo.is_point_on_symbol(&Point2d::new(15.0, 5.0), 0.5, 1.0));
    }

    #[test]
    fn bounds_include_stroke_width() {
        let mut symbol = VectorSymbol::stroked(Color::BLACK, 4.0);
        symbol.scale_invariant = false;
        let geo = GeoPath::new(square_path(), symbol);
        let bounds = geo.bounds(1.0).expect("non-empty");
        assert_eq!(bounds, Rect::new(-2.0, -2.0, 12.0, 12.0));
    }
}
