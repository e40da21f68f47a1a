use nalgebra::Scalar;
use num_traits::{Bounded, FromPrimitive, Num};

pub use nalgebra::Point2;

/// Planar point with `f64` coordinates.
pub type Point2d = Point2<f64>;

/// A point on a 2d cartesian plane.
pub trait CartesianPoint2d {
    /// Numeric type used to represent coordinates.
    type Num: Num + Copy + PartialOrd;

    /// X coordinate.
    fn x(&self) -> Self::Num;
    /// Y coordinate.
    fn y(&self) -> Self::Num;

    /// Whether both coordinates are exactly equal to the other point's.
    fn equal(&self, other: &impl CartesianPoint2d<Num = Self::Num>) -> bool {
        self.x() == other.x() && self.y() == other.y()
    }

    /// Squared euclidean distance to `other`.
    fn distance_sq(&self, other: &impl CartesianPoint2d<Num = Self::Num>) -> Self::Num {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        dx * dx + dy * dy
    }

    /// Squared distance from this point to the segment `(a, b)`.
    fn distance_to_segment_sq(
        &self,
        a: &impl CartesianPoint2d<Num = f64>,
        b: &impl CartesianPoint2d<Num = f64>,
    ) -> f64
    where
        Self: CartesianPoint2d<Num = f64>,
    {
        let dx = b.x() - a.x();
        let dy = b.y() - a.y();
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.distance_sq(&Point2::new(a.x(), a.y()));
        }

        let t = ((self.x() - a.x()) * dx + (self.y() - a.y()) * dy) / len_sq;
        let t = t.clamp(0.0, 1.0);
        let px = a.x() + t * dx;
        let py = a.y() + t * dy;
        self.distance_sq(&Point2::new(px, py))
    }
}

/// A cartesian point that can be constructed from a coordinate pair.
pub trait NewCartesianPoint2d<N = f64>: CartesianPoint2d<Num = N> + Sized {
    /// Creates a new point with the given coordinates.
    fn new(x: N, y: N) -> Self;
}

impl<Num: num_traits::Num + Copy + PartialOrd + Bounded + Scalar + FromPrimitive> CartesianPoint2d
    for Point2<Num>
{
    type Num = Num;

    fn x(&self) -> Num {
        self.x
    }
    fn y(&self) -> Num {
        self.y
    }
}

impl<Num: num_traits::Num + Copy + PartialOrd + Bounded + Scalar + FromPrimitive>
    NewCartesianPoint2d<Num> for Point2<Num>
{
    fn new(x: Num, y: Num) -> Self {
        Point2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_segment() {
        let p = Point2d::new(0.5, 1.0);
        assert_eq!(
            p.distance_to_segment_sq(&Point2d::new(0.0, 0.0), &Point2d::new(1.0, 0.0)),
            1.0
        );

        let p = Point2d::new(2.0, 0.0);
        assert_eq!(
            p.distance_to_segment_sq(&Point2d::new(0.0, 0.0), &Point2d::new(1.0, 0.0)),
            1.0
        );
    }

    #[test]
    fn degenerate_segment() {
        let p = Point2d::new(1.0, 1.0);
        assert_eq!(
            p.distance_to_segment_sq(&Point2d::new(0.0, 0.0), &Point2d::new(0.0, 0.0)),
            2.0
        );
    }
}
