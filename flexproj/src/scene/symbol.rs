//! Symbolization attributes, kept separate from geometry.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Stroke cap style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    /// Flat cap ending exactly at the end point.
    #[default]
    Butt,
    /// Rounded cap.
    Round,
    /// Square cap extending past the end point.
    Square,
}

/// Stroke and fill attributes of path geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSymbol {
    /// Stroke color. Transparent strokes are not drawn.
    pub stroke_color: Color,
    /// Fill color of closed paths. `None` leaves the interior unfilled.
    pub fill_color: Option<Color>,
    /// Stroke width.
    pub stroke_width: f32,
    /// Dash length; `0.0` draws a solid line.
    pub dash_length: f32,
    /// When set, stroke width and dash length are in screen pixels and do
    /// not grow with zoom; otherwise they are in map units.
    pub scale_invariant: bool,
    /// Stroke cap style.
    pub cap: LineCap,
}

impl Default for VectorSymbol {
    fn default() -> Self {
        Self {
            stroke_color: Color::BLACK,
            fill_color: None,
            stroke_width: 1.0,
            dash_length: 0.0,
            scale_invariant: true,
            cap: LineCap::Butt,
        }
    }
}

impl VectorSymbol {
    /// Solid stroke of the given color, no fill.
    pub fn stroked(color: Color, width: f32) -> Self {
        Self {
            stroke_color: color,
            stroke_width: width,
            ..Default::default()
        }
    }

    /// Filled symbol with a transparent hairline stroke.
    pub fn filled(color: Color) -> Self {
        Self {
            stroke_color: Color::TRANSPARENT,
            fill_color: Some(color),
            ..Default::default()
        }
    }

    /// Stroke width in map units at the given map scale.
    pub fn stroke_width_at_scale(&self, scale: f64) -> f64 {
        if self.scale_invariant {
            f64::from(self.stroke_width) / scale
        } else {
            f64::from(self.stroke_width)
        }
    }
}

/// Attributes of point markers: a circle with optional crosshair lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSymbol {
    /// Marker color.
    pub color: Color,
    /// Circle radius.
    pub radius: f32,
    /// Length of the crosshair lines extending from the circle; `0.0`
    /// draws the circle only.
    pub line_length: f32,
    /// Stroke width of circle and crosshair.
    pub stroke_width: f32,
    /// When set, radius and line length are in screen pixels.
    pub scale_invariant: bool,
}

impl Default for PointSymbol {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            radius: 3.0,
            line_length: 0.0,
            stroke_width: 1.0,
            scale_invariant: true,
        }
    }
}

impl PointSymbol {
    /// Marker radius in map units at the given map scale.
    pub fn radius_at_scale(&self, scale: f64) -> f64 {
        if self.scale_invariant {
            f64::from(self.radius) / scale
        } else {
            f64::from(self.radius)
        }
    }
}

/// Horizontal text alignment relative to the anchor point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlignment {
    /// Anchor at the left edge of the text.
    #[default]
    Left,
    /// Anchor at the center.
    Center,
    /// Anchor at the right edge.
    Right,
}

/// Font attributes of text labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSymbol {
    /// Text color.
    pub color: Color,
    /// Font size in points.
    pub size: f32,
    /// Horizontal alignment.
    pub alignment: TextAlignment,
    /// When set, the font size stays constant in screen pixels.
    pub scale_invariant: bool,
}

impl Default for FontSymbol {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 12.0,
            alignment: TextAlignment::Left,
            scale_invariant: true,
        }
    }
}
