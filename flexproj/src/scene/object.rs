use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use flexproj_types::{Point2d, Rect};
use nalgebra::Affine2;
use serde::{Deserialize, Serialize};

use crate::raster::{GeoGrid, GeoImage};
use crate::render::{Canvas, RenderParams};
use crate::scene::event::SceneChange;
use crate::scene::path::GeoPath;
use crate::scene::point::GeoPoint;
use crate::scene::set::GeoSet;
use crate::scene::text::GeoText;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a scene object.
///
/// Used for non-owning references into the owned scene tree: parent
/// back-references, spatial indices and selection bookkeeping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ObjectAttrs {
    name: Option<String>,
    id: ObjectId,
    visible: bool,
    selectable: bool,
    selected: bool,
    parent: Option<ObjectId>,
}

impl ObjectAttrs {
    fn new() -> Self {
        Self {
            name: None,
            id: ObjectId::next(),
            visible: true,
            selectable: true,
            selected: false,
            parent: None,
        }
    }
}

/// The closed set of scene object variants.
///
/// Every dispatch site matches this enum exhaustively, so adding a
/// variant forces a review of all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeoObjectKind {
    /// Path geometry with a vector symbol.
    Path(GeoPath),
    /// Point feature (or control point) with a marker symbol.
    Point(GeoPoint),
    /// Text label.
    Text(GeoText),
    /// Value grid raster.
    Grid(GeoGrid),
    /// Image raster.
    Image(GeoImage),
    /// Nested collection of objects.
    Set(GeoSet),
}

/// A node of the scene tree: identity and state flags plus the variant
/// payload.
///
/// Sets exclusively own their children; the `parent` back-reference is a
/// non-owning [`ObjectId`] maintained by the child-list operations.
/// `Clone` deep-copies the subtree and preserves ids; use
/// [`GeoObject::clone_subtree`] to also detach the copy from its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoObject {
    attrs: ObjectAttrs,
    kind: GeoObjectKind,
}

impl GeoObject {
    /// Wraps a variant payload into a fresh scene object.
    pub fn new(kind: GeoObjectKind) -> Self {
        Self {
            attrs: ObjectAttrs::new(),
            kind,
        }
    }

    /// New path object.
    pub fn new_path(path: GeoPath) -> Self {
        Self::new(GeoObjectKind::Path(path))
    }

    /// New point object.
    pub fn new_point(point: GeoPoint) -> Self {
        Self::new(GeoObjectKind::Point(point))
    }

    /// New text object.
    pub fn new_text(text: GeoText) -> Self {
        Self::new(GeoObjectKind::Text(text))
    }

    /// New grid object.
    pub fn new_grid(grid: GeoGrid) -> Self {
        Self::new(GeoObjectKind::Grid(grid))
    }

    /// New image object.
    pub fn new_image(image: GeoImage) -> Self {
        Self::new(GeoObjectKind::Image(image))
    }

    /// New set object.
    pub fn new_set(set: GeoSet) -> Self {
        Self::new(GeoObjectKind::Set(set))
    }

    /// Same object with a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.attrs.name = Some(name.into());
        self
    }

    /// Object id.
    pub fn id(&self) -> ObjectId {
        self.attrs.id
    }

    /// Object name, if set.
    pub fn name(&self) -> Option<&str> {
        self.attrs.name.as_deref()
    }

    /// Sets or clears the name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.attrs.name = name;
    }

    /// Id of the owning set, if the object is part of a tree.
    pub fn parent(&self) -> Option<ObjectId> {
        self.attrs.parent
    }

    /// Whether the object is drawn.
    pub fn is_visible(&self) -> bool {
        self.attrs.visible
    }

    /// Shows or hides the object.
    pub fn set_visible(&mut self, visible: bool) -> SceneChange {
        if self.attrs.visible == visible {
            return SceneChange::NONE;
        }
        self.attrs.visible = visible;
        SceneChange::VISIBILITY
    }

    /// Whether the object participates in selection.
    pub fn is_selectable(&self) -> bool {
        self.attrs.selectable
    }

    /// Changes selectability. Making a selected object unselectable also
    /// deselects it.
    pub fn set_selectable(&mut self, selectable: bool) -> SceneChange {
        self.attrs.selectable = selectable;
        if !selectable && self.attrs.selected {
            self.attrs.selected = false;
            return SceneChange::SELECTION;
        }
        SceneChange::NONE
    }

    /// Whether the object is selected.
    pub fn is_selected(&self) -> bool {
        self.attrs.selected
    }

    /// Selects or deselects the object.
    ///
    /// Selecting an unselectable object is vetoed and changes nothing.
    /// On sets the new state recurses into all children.
    pub fn set_selected(&mut self, selected: bool) -> SceneChange {
        if selected && !self.attrs.selectable {
            return SceneChange::NONE;
        }

        let mut change = if self.attrs.selected != selected {
            self.attrs.selected = selected;
            SceneChange::SELECTION
        } else {
            SceneChange::NONE
        };

        if let GeoObjectKind::Set(set) = &mut self.kind {
            for child in &mut set.children {
                change = change.merge(child.set_selected(selected));
            }
        }

        change
    }

    /// The variant payload.
    pub fn kind(&self) -> &GeoObjectKind {
        &self.kind
    }

    /// Mutable access to the variant payload.
    pub fn kind_mut(&mut self) -> &mut GeoObjectKind {
        &mut self.kind
    }

    /// The payload as a set, if this is a set object.
    pub fn as_set(&self) -> Option<&GeoSet> {
        match &self.kind {
            GeoObjectKind::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Deep copy of the subtree, detached from any parent.
    ///
    /// Ids are preserved; only the copy root's parent reference is
    /// cleared.
    pub fn clone_subtree(&self) -> GeoObject {
        let mut copy = self.clone();
        copy.attrs.parent = None;
        copy
    }

    // ---- child list operations -------------------------------------------

    /// Direct children; empty for leaf objects.
    pub fn children(&self) -> &[GeoObject] {
        match &self.kind {
            GeoObjectKind::Set(set) => &set.children,
            _ => &[],
        }
    }

    /// Mutable direct children; empty for leaf objects.
    pub fn children_mut(&mut self) -> &mut [GeoObject] {
        match &mut self.kind {
            GeoObjectKind::Set(set) => &mut set.children,
            _ => &mut [],
        }
    }

    fn set_payload_mut(&mut self) -> &mut GeoSet {
        match &mut self.kind {
            GeoObjectKind::Set(set) => set,
            _ => panic!("children can only be attached to set objects"),
        }
    }

    /// Appends a child to this set.
    ///
    /// # Panics
    ///
    /// Panics if this object is not a set.
    pub fn add_child(&mut self, mut child: GeoObject) -> SceneChange {
        child.attrs.parent = Some(self.attrs.id);
        self.set_payload_mut().children.push(child);
        SceneChange::STRUCTURE
    }

    /// Inserts a child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if this object is not a set or `index` is out of bounds.
    pub fn insert_child(&mut self, index: usize, mut child: GeoObject) -> SceneChange {
        child.attrs.parent = Some(self.attrs.id);
        self.set_payload_mut().children.insert(index, child);
        SceneChange::STRUCTURE
    }

    /// Removes the direct child with the given id and returns it with its
    /// parent reference cleared. `None` when no direct child matches.
    pub fn remove_child(&mut self, id: ObjectId) -> Option<GeoObject> {
        let GeoObjectKind::Set(set) = &mut self.kind else {
            return None;
        };
        let index = set.children.iter().position(|c| c.attrs.id == id)?;
        let mut child = set.children.remove(index);
        child.attrs.parent = None;
        Some(child)
    }

    /// Removes all children, clearing their parent references.
    pub fn remove_all_children(&mut self) -> SceneChange {
        let GeoObjectKind::Set(set) = &mut self.kind else {
            return SceneChange::NONE;
        };
        if set.children.is_empty() {
            return SceneChange::NONE;
        }
        for child in &mut set.children {
            child.attrs.parent = None;
        }
        set.children.clear();
        SceneChange::STRUCTURE
    }

    /// Replaces the direct child with the given id, keeping its position
    /// in the draw order. Returns the replaced child, or `None` (and
    /// leaves the set unchanged) when no direct child matches.
    pub fn replace_child(&mut self, id: ObjectId, mut replacement: GeoObject) -> Option<GeoObject> {
        let self_id = self.attrs.id;
        let GeoObjectKind::Set(set) = &mut self.kind else {
            return None;
        };
        let index = set.children.iter().position(|c| c.attrs.id == id)?;
        replacement.attrs.parent = Some(self_id);
        let mut old = std::mem::replace(&mut set.children[index], replacement);
        old.attrs.parent = None;
        Some(old)
    }

    /// Finds an object by id in this subtree, including self.
    pub fn find(&self, id: ObjectId) -> Option<&GeoObject> {
        if self.attrs.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// Mutable version of [`GeoObject::find`].
    pub fn find_mut(&mut self, id: ObjectId) -> Option<&mut GeoObject> {
        if self.attrs.id == id {
            return Some(self);
        }
        self.children_mut().iter_mut().find_map(|c| c.find_mut(id))
    }

    // ---- geometry dispatch -----------------------------------------------

    /// Bounding box of the subtree at the given map scale.
    ///
    /// Skips invisible objects when `only_visible` is set and unselected
    /// leaves when `only_selected` is set; returns `None` when nothing
    /// contributes a valid box.
    pub fn bounds(&self, scale: f64, only_visible: bool, only_selected: bool) -> Option<Rect> {
        if only_visible && !self.attrs.visible {
            return None;
        }

        match &self.kind {
            GeoObjectKind::Set(set) => set
                .children
                .iter()
                .filter_map(|c| c.bounds(scale, only_visible, only_selected))
                .reduce(|a, b| a.merge(b)),
            _ if only_selected && !self.attrs.selected => None,
            GeoObjectKind::Path(path) => path.bounds(scale),
            GeoObjectKind::Point(point) => Some(point.bounds(scale)),
            GeoObjectKind::Text(text) => Some(text.bounds()),
            GeoObjectKind::Grid(grid) => Some(grid.extent()),
            GeoObjectKind::Image(image) => Some(image.extent()),
        }
    }

    /// Whether a point hits this object's drawn symbol (any visible
    /// descendant, for sets).
    pub fn is_point_on_object(&self, point: &Point2d, tolerance: f64, scale: f64) -> bool {
        match &self.kind {
            GeoObjectKind::Set(set) => set
                .children
                .iter()
                .any(|c| c.attrs.visible && c.is_point_on_object(point, tolerance, scale)),
            GeoObjectKind::Path(path) => path.is_point_on_symbol(point, tolerance, scale),
            GeoObjectKind::Point(p) => p.is_point_on_symbol(point, tolerance, scale),
            GeoObjectKind::Text(text) => text.is_point_on_symbol(point, tolerance),
            GeoObjectKind::Grid(grid) => grid.extent().contains(point),
            GeoObjectKind::Image(image) => image.extent().contains(point),
        }
    }

    /// Topmost leaf at a position.
    ///
    /// Children are tested in reverse insertion order so the object drawn
    /// last wins, matching what the user sees.
    pub fn object_at_position(
        &self,
        point: &Point2d,
        tolerance: f64,
        scale: f64,
        only_selectable: bool,
        only_visible: bool,
    ) -> Option<&GeoObject> {
        if only_visible && !self.attrs.visible {
            return None;
        }

        match &self.kind {
            GeoObjectKind::Set(set) => set.children.iter().rev().find_map(|c| {
                c.object_at_position(point, tolerance, scale, only_selectable, only_visible)
            }),
            _ => {
                if only_selectable && !self.attrs.selectable {
                    return None;
                }
                self.is_point_on_object(point, tolerance, scale)
                    .then_some(self)
            }
        }
    }

    // ---- selection policies ----------------------------------------------

    /// Click selection.
    ///
    /// Ungrouped sets recurse per child: the topmost hit child is selected
    /// (or toggled, with `extend`), every other child is deselected unless
    /// `extend` keeps the existing selection. Grouped sets act as one
    /// unit: a hit anywhere selects or toggles the whole set.
    pub fn select_by_point(
        &mut self,
        point: &Point2d,
        tolerance: f64,
        scale: f64,
        extend: bool,
    ) -> SceneChange {
        if let GeoObjectKind::Set(set) = &mut self.kind {
            if !set.is_grouped() {
                let mut change = SceneChange::NONE;
                let mut hit_taken = false;
                for child in set.children.iter_mut().rev() {
                    let hit = !hit_taken
                        && child.attrs.visible
                        && child.is_point_on_object(point, tolerance, scale);
                    if hit {
                        hit_taken = true;
                        change =
                            change.merge(child.select_by_point(point, tolerance, scale, extend));
                    } else if !extend {
                        change = change.merge(child.set_selected(false));
                    }
                }
                return change;
            }
        }

        // Grouped sets and leaves select as one atomic unit.
        if self.attrs.visible && self.is_point_on_object(point, tolerance, scale) {
            let target = if extend { !self.attrs.selected } else { true };
            return self.set_selected(target);
        }
        if !extend {
            return self.set_selected(false);
        }
        SceneChange::NONE
    }

    /// Rectangle selection.
    ///
    /// An object is inside when its bounds intersect the rectangle.
    /// Grouped sets select atomically; with `extend`, objects outside the
    /// rectangle keep their selection state.
    pub fn select_by_rect(&mut self, rect: &Rect, scale: f64, extend: bool) -> SceneChange {
        if let GeoObjectKind::Set(set) = &mut self.kind {
            if !set.is_grouped() {
                let mut change = SceneChange::NONE;
                for child in &mut set.children {
                    change = change.merge(child.select_by_rect(rect, scale, extend));
                }
                return change;
            }
        }

        let inside = self.attrs.visible
            && self
                .bounds(scale, true, false)
                .is_some_and(|b| b.intersects(rect));
        if inside {
            return self.set_selected(true);
        }
        if !extend {
            return self.set_selected(false);
        }
        SceneChange::NONE
    }

    // ---- transforms ------------------------------------------------------

    /// Translates the subtree's geometry in place.
    pub fn translate(&mut self, dx: f64, dy: f64) -> SceneChange {
        match &mut self.kind {
            GeoObjectKind::Path(path) => path.path_mut().translate(dx, dy),
            GeoObjectKind::Point(point) => {
                let p = point.position();
                point.set_position(Point2d::new(p.x + dx, p.y + dy));
                if let Some(d) = point.destination() {
                    point.set_destination(Some(Point2d::new(d.x + dx, d.y + dy)));
                }
            }
            GeoObjectKind::Text(text) => {
                let p = text.position();
                text.set_position(Point2d::new(p.x + dx, p.y + dy));
            }
            GeoObjectKind::Grid(grid) => grid.translate(dx, dy),
            GeoObjectKind::Image(image) => image.translate(dx, dy),
            GeoObjectKind::Set(set) => {
                for child in &mut set.children {
                    child.translate(dx, dy);
                }
            }
        }

        SceneChange::STRUCTURE
    }

    /// Applies an affine transform to the subtree's vector geometry.
    ///
    /// Rasters are axis-aligned by construction and cannot be transformed
    /// arbitrarily; they are skipped with a warning.
    pub fn transform(&mut self, transform: &Affine2<f64>) -> SceneChange {
        match &mut self.kind {
            GeoObjectKind::Path(path) => path.path_mut().transform(transform),
            GeoObjectKind::Point(point) => {
                point.set_position(transform * point.position());
                if let Some(d) = point.destination() {
                    point.set_destination(Some(transform * d));
                }
            }
            GeoObjectKind::Text(text) => {
                text.set_position(transform * text.position());
            }
            GeoObjectKind::Grid(_) | GeoObjectKind::Image(_) => {
                log::warn!(
                    "skipping affine transform of raster object {}",
                    self.attrs.id
                );
            }
            GeoObjectKind::Set(set) => {
                for child in &mut set.children {
                    child.transform(transform);
                }
            }
        }

        SceneChange::STRUCTURE
    }

    // ---- drawing ---------------------------------------------------------

    /// Draws the subtree into a canvas.
    ///
    /// Invisible objects are skipped; children draw in insertion order so
    /// later children paint on top. The `selected` flag passed to the
    /// canvas is only raised when the params enable selection
    /// highlighting.
    pub fn draw(&self, canvas: &mut dyn Canvas, params: &RenderParams) {
        if !self.attrs.visible {
            return;
        }

        let selected = self.attrs.selected && params.highlight_selection;
        match &self.kind {
            GeoObjectKind::Path(path) => {
                canvas.draw_path(path.path(), path.symbol(), selected, params)
            }
            GeoObjectKind::Point(point) => {
                canvas.draw_marker(point.position(), point.symbol(), selected, params)
            }
            GeoObjectKind::Text(text) => canvas.draw_text(
                text.text(),
                text.position(),
                text.offset(),
                text.rotation(),
                text.symbol(),
                selected,
                params,
            ),
            GeoObjectKind::Grid(grid) => canvas.draw_grid(grid, selected, params),
            GeoObjectKind::Image(image) => canvas.draw_image(image, selected, params),
            GeoObjectKind::Set(set) => {
                for child in &set.children {
                    child.draw(canvas, params);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;
    use crate::scene::symbol::{PointSymbol, VectorSymbol};

    fn marker(x: f64, y: f64) -> GeoObject {
        GeoObject::new_point(GeoPoint::new(Point2d::new(x, y), PointSymbol::default()))
    }

    fn set_of(children: Vec<GeoObject>) -> GeoObject {
        let mut set = GeoObject::new_set(GeoSet::new());
        for child in children {
            set.add_child(child);
        }
        set
    }

    #[test]
    fn add_remove_maintains_parent_refs() {
        let mut set = set_of(vec![marker(0.0, 0.0), marker(1.0, 1.0)]);
        let set_id = set.id();
        let child_id = set.children()[0].id();
        assert_eq!(set.children()[0].parent(), Some(set_id));

        let removed = set.remove_child(child_id).expect("child exists");
        assert_eq!(removed.parent(), None);
        assert_eq!(set.children().len(), 1);
    }

    #[test]
    fn remove_all_children_clears_parents() {
        let mut set = set_of((0..5).map(|i| marker(i as f64, 0.0)).collect());
        assert_eq!(set.children().len(), 5);

        // An external handle on a child keeps working after removal
        // because ids, not references, tie the index structures together.
        let change = set.remove_all_children();
        assert_eq!(change, SceneChange::STRUCTURE);
        assert_eq!(set.children().len(), 0);
        assert_eq!(set.remove_all_children(), SceneChange::NONE);
    }

    #[test]
    fn replace_child_keeps_draw_order() {
        let mut set = set_of(vec![marker(0.0, 0.0), marker(1.0, 0.0), marker(2.0, 0.0)]);
        let middle_id = set.children()[1].id();

        let replacement = marker(9.0, 9.0);
        let replacement_id = replacement.id();
        let old = set.replace_child(middle_id, replacement).expect("replaced");
        assert_eq!(old.id(), middle_id);
        assert_eq!(old.parent(), None);
        assert_eq!(set.children()[1].id(), replacement_id);
        assert_eq!(set.children()[1].parent(), Some(set.id()));
    }

    #[test]
    fn selection_veto_on_unselectable() {
        let mut object = marker(0.0, 0.0);
        object.set_selectable(false);
        assert_eq!(object.set_selected(true), SceneChange::NONE);
        assert!(!object.is_selected());

        object.set_selectable(true);
        assert_eq!(object.set_selected(true), SceneChange::SELECTION);
        assert!(object.is_selected());
    }

    #[test]
    fn grouped_set_selects_atomically() {
        let mut set = set_of(vec![marker(0.0, 0.0), marker(10.0, 0.0), marker(20.0, 0.0)]);
        if let GeoObjectKind::Set(s) = set.kind_mut() {
            s.set_grouped(true);
        }

        // A click on one marker selects the whole set.
        let change = set.select_by_point(&Point2d::new(10.0, 0.0), 1.0, 1.0, false);
        assert_eq!(change, SceneChange::SELECTION);
        assert!(set.is_selected());
        assert!(set.children().iter().all(|c| c.is_selected()));

        // A click on empty space deselects everything.
        set.select_by_point(&Point2d::new(100.0, 100.0), 1.0, 1.0, false);
        assert!(!set.is_selected());
        assert!(set.children().iter().all(|c| !c.is_selected()));
    }

    #[test]
    fn ungrouped_click_selects_only_hit_child() {
        let mut set = set_of(vec![marker(0.0, 0.0), marker(10.0, 0.0)]);
        set.select_by_point(&Point2d::new(10.0, 0.0), 1.0, 1.0, false);
        assert!(!set.children()[0].is_selected());
        assert!(set.children()[1].is_selected());

        // Extending click toggles the hit child and keeps the rest.
        set.select_by_point(&Point2d::new(0.0, 0.0), 1.0, 1.0, true);
        assert!(set.children()[0].is_selected());
        assert!(set.children()[1].is_selected());

        set.select_by_point(&Point2d::new(0.0, 0.0), 1.0, 1.0, true);
        assert!(!set.children()[0].is_selected());
        assert!(set.children()[1].is_selected());
    }

    #[test]
    fn hit_testing_walks_reverse_draw_order() {
        // Two coincident markers: the one added last must win.
        let mut set = set_of(vec![marker(0.0, 0.0), marker(0.0, 0.0)]);
        let top_id = set.children()[1].id();
        let hit = set
            .object_at_position(&Point2d::new(0.0, 0.0), 1.0, 1.0, true, true)
            .expect("hit");
        assert_eq!(hit.id(), top_id);

        // Hidden objects are skipped.
        let top_id_again = top_id;
        set.children_mut()[1].set_visible(false);
        let hit = set
            .object_at_position(&Point2d::new(0.0, 0.0), 1.0, 1.0, true, true)
            .expect("hit");
        assert_ne!(hit.id(), top_id_again);
    }

    #[test]
    fn bounds_union_skips_invisible() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 10.0);
        let mut symbol = VectorSymbol::stroked(crate::Color::BLACK, 0.0);
        symbol.scale_invariant = false;

        let mut set = set_of(vec![
            GeoObject::new_path(GeoPath::new(path, symbol)),
            marker(100.0, 100.0),
        ]);

        let all = set.bounds(1.0, true, false).expect("non-empty");
        assert!(all.x_max() >= 100.0);

        set.children_mut()[1].set_visible(false);
        let visible_only = set.bounds(1.0, true, false).expect("non-empty");
        assert_eq!(visible_only.x_max(), 10.0);

        // Empty set has no bounds.
        let empty = GeoObject::new_set(GeoSet::new());
        assert_eq!(empty.bounds(1.0, true, false), None);
    }

    #[test]
    fn clone_subtree_detaches_parent_and_keeps_ids() {
        let mut set = set_of(vec![marker(0.0, 0.0)]);
        let child_id = set.children()[0].id();
        let parent_id = set.id();

        let copy = set.children()[0].clone_subtree();
        assert_eq!(copy.id(), child_id);
        assert_eq!(copy.parent(), None);
        assert_eq!(set.children()[0].parent(), Some(parent_id));

        let set_copy = set.clone_subtree();
        assert_eq!(set_copy.children()[0].parent(), Some(parent_id));
    }
}
