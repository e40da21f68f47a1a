//! Rendering seam between the scene graph and the UI layer.
//!
//! The engine does not draw anything itself. Walking a scene tree with
//! [`GeoObject::draw`](crate::scene::GeoObject::draw) dispatches each
//! visible node to a [`Canvas`] implementation provided by the caller,
//! together with the node's symbol and the per-draw-call [`RenderParams`].

use flexproj_types::Point2d;
use nalgebra::Affine2;

use crate::path::Path;
use crate::raster::{GeoGrid, GeoImage};
use crate::scene::{FontSymbol, PointSymbol, VectorSymbol};

/// Transient per-draw-call parameters.
///
/// Carries the world-to-device transform and the selection drawing mode.
/// Never stored in the scene and never mutated by the draw pass.
#[derive(Debug, Clone)]
pub struct RenderParams {
    /// Device pixels per map unit.
    pub scale: f64,
    /// World coordinate of the top-left device corner.
    pub origin: Point2d,
    /// Whether selected objects are drawn with selection highlighting.
    pub highlight_selection: bool,
    /// Extra transform applied to selected objects only, used while the
    /// user drags a selection. `None` outside of interactive drags.
    pub selection_transform: Option<Affine2<f64>>,
}

impl RenderParams {
    /// Parameters for a plain draw at the given scale and origin.
    pub fn new(scale: f64, origin: Point2d) -> Self {
        Self {
            scale,
            origin,
            highlight_selection: false,
            selection_transform: None,
        }
    }

    /// Same parameters with selection highlighting enabled.
    pub fn with_selection_highlight(mut self) -> Self {
        self.highlight_selection = true;
        self
    }

    /// Converts a world coordinate to device coordinates. The device y
    /// axis points down.
    pub fn to_device(&self, point: Point2d, selected: bool) -> Point2d {
        let world = match (&self.selection_transform, selected) {
            (Some(transform), true) => transform * point,
            _ => point,
        };
        Point2d::new(
            (world.x - self.origin.x) * self.scale,
            (self.origin.y - world.y) * self.scale,
        )
    }
}

/// Target the scene graph draws into.
///
/// Implemented by the UI layer (or by test doubles). All coordinates
/// passed to the canvas are world coordinates; implementations use
/// [`RenderParams::to_device`] for the device mapping so that the
/// selection drag transform is applied consistently.
pub trait Canvas {
    /// Draws path geometry with the given symbol.
    fn draw_path(
        &mut self,
        path: &Path,
        symbol: &VectorSymbol,
        selected: bool,
        params: &RenderParams,
    );

    /// Draws a point marker at a world position.
    fn draw_marker(
        &mut self,
        position: Point2d,
        symbol: &PointSymbol,
        selected: bool,
        params: &RenderParams,
    );

    /// Draws a text label anchored at a world position.
    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        text: &str,
        position: Point2d,
        offset: (f64, f64),
        rotation: f64,
        symbol: &FontSymbol,
        selected: bool,
        params: &RenderParams,
    );

    /// Draws a value grid into its georeferenced extent.
    fn draw_grid(&mut self, grid: &GeoGrid, selected: bool, params: &RenderParams);

    /// Draws an image into its georeferenced extent.
    fn draw_image(&mut self, image: &GeoImage, selected: bool, params: &RenderParams);
}
