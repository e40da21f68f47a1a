use flexproj_types::{CartesianPoint2d, Point2d, Rect};
use serde::{Deserialize, Serialize};

use crate::scene::symbol::PointSymbol;

/// Point feature with its marker symbol.
///
/// A point optionally carries a *destination* coordinate: control points
/// of a projection design drag towards their destination, and
/// control-point-based transformations read it back. Plain point features
/// leave it unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    position: Point2d,
    destination: Option<Point2d>,
    symbol: PointSymbol,
}

impl GeoPoint {
    /// Creates a point feature at a position.
    pub fn new(position: Point2d, symbol: PointSymbol) -> Self {
        Self {
            position,
            destination: None,
            symbol,
        }
    }

    /// Creates a control point with a destination coordinate.
    pub fn control(position: Point2d, destination: Point2d, symbol: PointSymbol) -> Self {
        Self {
            position,
            destination: Some(destination),
            symbol,
        }
    }

    /// Position of the point.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// Moves the point.
    pub fn set_position(&mut self, position: Point2d) {
        self.position = position;
    }

    /// Destination coordinate of a control point, if any.
    pub fn destination(&self) -> Option<Point2d> {
        self.destination
    }

    /// Sets or clears the destination coordinate.
    pub fn set_destination(&mut self, destination: Option<Point2d>) {
        self.destination = destination;
    }

    /// The marker symbol.
    pub fn symbol(&self) -> &PointSymbol {
        &self.symbol
    }

    /// Replaces the marker symbol.
    pub fn set_symbol(&mut self, symbol: PointSymbol) {
        self.symbol = symbol;
    }

    /// Bounding box of the drawn marker at the given map scale.
    pub fn bounds(&self, scale: f64) -> Rect {
        let r = self.symbol.radius_at_scale(scale);
        Rect::new(
            self.position.x - r,
            self.position.y - r,
            self.position.x + r,
            self.position.y + r,
        )
    }

    /// Whether a point hits the drawn marker.
    pub fn is_point_on_symbol(&self, point: &Point2d, tolerance: f64, scale: f64) -> bool {
        let r = self.symbol.radius_at_scale(scale) + tolerance;
        self.position.distance_sq(point) <= r * r
    }
}
