use serde::{Deserialize, Serialize};

use crate::point::{CartesianPoint2d, Point2d};

/// Axis-aligned rectangle with `f64` bounds.
///
/// Used for path bounding boxes, raster extents and the valid graticule
/// region of a projection. A `Rect` is allowed to be degenerate (zero width
/// or height); a single point has a valid, degenerate bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rect {
    /// Creates a new rectangle. `min` bounds must not exceed `max` bounds.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        debug_assert!(x_min <= x_max && y_min <= y_max);
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Left bound.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Right bound.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Bottom bound.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Top bound.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center point.
    pub fn center(&self) -> Point2d {
        Point2d::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Degenerate rectangle covering a single point.
    pub fn from_point(p: &impl CartesianPoint2d<Num = f64>) -> Self {
        Self {
            x_min: p.x(),
            x_max: p.x(),
            y_min: p.y(),
            y_max: p.y(),
        }
    }

    /// Bounding rectangle of a point set. `None` for an empty iterator.
    pub fn from_points<'a, P: CartesianPoint2d<Num = f64> + 'a>(
        mut points: impl Iterator<Item = &'a P>,
    ) -> Option<Self> {
        let first = points.next()?;
        let mut rect = Self::from_point(first);
        for p in points {
            rect.extend(p.x(), p.y());
        }

        Some(rect)
    }

    /// Grows the rectangle in place to contain `(x, y)`.
    pub fn extend(&mut self, x: f64, y: f64) {
        if x < self.x_min {
            self.x_min = x;
        }
        if x > self.x_max {
            self.x_max = x;
        }
        if y < self.y_min {
            self.y_min = y;
        }
        if y > self.y_max {
            self.y_max = y;
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Clips the rectangle to `other`. `None` if they do not overlap.
    pub fn limit(&self, other: Self) -> Option<Self> {
        let x_min = self.x_min.max(other.x_min);
        let y_min = self.y_min.max(other.y_min);
        let x_max = self.x_max.min(other.x_max);
        let y_max = self.y_max.min(other.y_max);
        if x_min > x_max || y_min > y_max {
            None
        } else {
            Some(Self {
                x_min,
                y_min,
                x_max,
                y_max,
            })
        }
    }

    /// Whether the point lies inside the rectangle (bounds inclusive).
    pub fn contains(&self, point: &impl CartesianPoint2d<Num = f64>) -> bool {
        self.x_min <= point.x()
            && self.x_max >= point.x()
            && self.y_min <= point.y()
            && self.y_max >= point.y()
    }

    /// Whether `other` overlaps this rectangle (touching counts).
    pub fn intersects(&self, other: &Self) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }

    /// Scales the rectangle around its center.
    pub fn magnify(&self, factor: f64) -> Self {
        let c = self.center();
        let half_width = self.width() / 2.0 * factor;
        let half_height = self.height() / 2.0 * factor;
        Self {
            x_min: c.x - half_width,
            x_max: c.x + half_width,
            y_min: c.y - half_height,
            y_max: c.y + half_height,
        }
    }

    /// Corner points in counterclockwise order starting at `(x_min, y_min)`.
    pub fn into_quadrangle(self) -> [Point2d; 4] {
        [
            Point2d::new(self.x_min, self.y_min),
            Point2d::new(self.x_max, self.y_min),
            Point2d::new(self.x_max, self.y_max),
            Point2d::new(self.x_min, self.y_max),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_grows_in_all_directions() {
        let mut rect = Rect::from_point(&Point2d::new(1.0, 1.0));
        rect.extend(-1.0, 0.0);
        rect.extend(2.0, 3.0);
        assert_eq!(rect, Rect::new(-1.0, 0.0, 2.0, 3.0));
    }

    #[test]
    fn limit_disjoint_is_none() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(2.0, 2.0, 3.0, 3.0);
        assert!(a.limit(b).is_none());
        assert_eq!(a.limit(a), Some(a));
    }

    #[test]
    fn merge_and_contains() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(-1.0, 0.5, 0.5, 2.0);
        let merged = a.merge(b);
        assert_eq!(merged, Rect::new(-1.0, 0.0, 1.0, 2.0));
        assert!(merged.contains(&Point2d::new(1.0, 2.0)));
        assert!(!merged.contains(&Point2d::new(1.1, 2.0)));
    }
}
