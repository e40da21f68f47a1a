use flexproj_types::{CartesianPoint2d, Point2d, Rect};
use serde::{Deserialize, Serialize};

use crate::scene::symbol::FontSymbol;

/// Text label anchored at a geographic position.
///
/// The offset shifts the label relative to its anchor in drawing units
/// (screen pixels for scale-invariant fonts); rotation is in radians,
/// counterclockwise. Text metrics live in the renderer, so the label's
/// own bounds are just its anchor point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoText {
    position: Point2d,
    dx: f64,
    dy: f64,
    rotation: f64,
    text: String,
    symbol: FontSymbol,
}

impl GeoText {
    /// Creates a label at a position.
    pub fn new(text: impl Into<String>, position: Point2d, symbol: FontSymbol) -> Self {
        Self {
            position,
            dx: 0.0,
            dy: 0.0,
            rotation: 0.0,
            text: text.into(),
            symbol,
        }
    }

    /// Same label, shifted by an offset from its anchor.
    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    /// Same label, rotated by `rotation` radians.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// The label text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the label text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Anchor position.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// Moves the anchor.
    pub fn set_position(&mut self, position: Point2d) {
        self.position = position;
    }

    /// Offset from the anchor.
    pub fn offset(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }

    /// Rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// The font symbol.
    pub fn symbol(&self) -> &FontSymbol {
        &self.symbol
    }

    /// Replaces the font symbol.
    pub fn set_symbol(&mut self, symbol: FontSymbol) {
        self.symbol = symbol;
    }

    /// Bounding box; degenerate at the anchor point.
    pub fn bounds(&self) -> Rect {
        Rect::from_point(&self.position)
    }

    /// Whether a point hits the label anchor within `tolerance`.
    pub fn is_point_on_symbol(&self, point: &Point2d, tolerance: f64) -> bool {
        self.position.distance_sq(point) <= tolerance * tolerance
    }
}
