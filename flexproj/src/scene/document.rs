use std::sync::Arc;

use flexproj_types::{Point2d, Rect};

use crate::scene::event::{ChangeBroadcaster, ListenerId, SceneChange};
use crate::scene::object::{GeoObject, ObjectId};
use crate::scene::set::GeoSet;

/// The root of a scene: an ungrouped set plus the change broadcaster.
///
/// All mutation goes through [`MapDocument::edit`] so that the
/// [`SceneChange`] returned by tree operations is reported to listeners.
/// Reading never notifies.
#[derive(Debug)]
pub struct MapDocument {
    root: GeoObject,
    broadcaster: Arc<ChangeBroadcaster>,
}

impl Default for MapDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MapDocument {
    /// Creates a document with an empty root set.
    pub fn new() -> Self {
        Self {
            root: GeoObject::new_set(GeoSet::new()),
            broadcaster: Arc::new(ChangeBroadcaster::new()),
        }
    }

    /// The root set object.
    pub fn root(&self) -> &GeoObject {
        &self.root
    }

    /// Id of the root set.
    pub fn root_id(&self) -> ObjectId {
        self.root.id()
    }

    /// Mutates the tree and reports the change the closure returns.
    ///
    /// Inside an open [`MapDocument::batch`] the change accumulates
    /// instead of being delivered immediately.
    pub fn edit<R>(&mut self, op: impl FnOnce(&mut GeoObject) -> (SceneChange, R)) -> R {
        let (change, result) = op(&mut self.root);
        self.broadcaster.notify(change);
        result
    }

    /// [`MapDocument::edit`] for operations without a result value.
    pub fn update(&mut self, op: impl FnOnce(&mut GeoObject) -> SceneChange) {
        let change = op(&mut self.root);
        self.broadcaster.notify(change);
    }

    /// Shared handle on the change broadcaster.
    ///
    /// Take the handle first when wrapping mutations in a batch, so the
    /// batch guard does not borrow the document:
    ///
    /// ```ignore
    /// let broadcaster = document.broadcaster();
    /// let _batch = broadcaster.batch();
    /// document.add_object(object);
    /// ```
    pub fn broadcaster(&self) -> Arc<ChangeBroadcaster> {
        self.broadcaster.clone()
    }

    /// Registers a change listener.
    pub fn add_listener(&self, listener: impl FnMut(SceneChange) + Send + 'static) -> ListenerId {
        self.broadcaster.add_listener(listener)
    }

    /// Removes a change listener.
    pub fn remove_listener(&self, id: ListenerId) {
        self.broadcaster.remove_listener(id);
    }

    /// Appends an object to the root set.
    pub fn add_object(&mut self, object: GeoObject) -> ObjectId {
        let id = object.id();
        self.update(|root| root.add_child(object));
        id
    }

    /// Removes an object anywhere in the tree by id.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<GeoObject> {
        self.edit(|root| {
            let Some(parent_id) = root.find(id).and_then(|o| o.parent()) else {
                return (SceneChange::NONE, None);
            };
            let Some(parent) = root.find_mut(parent_id) else {
                return (SceneChange::NONE, None);
            };
            match parent.remove_child(id) {
                Some(removed) => (SceneChange::STRUCTURE, Some(removed)),
                None => (SceneChange::NONE, None),
            }
        })
    }

    /// Finds an object by id.
    pub fn find(&self, id: ObjectId) -> Option<&GeoObject> {
        self.root.find(id)
    }

    /// Bounding box of the visible scene at the given map scale.
    pub fn bounds(&self, scale: f64) -> Option<Rect> {
        self.root.bounds(scale, true, false)
    }

    /// Bounding box of the current selection at the given map scale.
    pub fn selection_bounds(&self, scale: f64) -> Option<Rect> {
        self.root.bounds(scale, true, true)
    }

    /// Click selection over the whole scene; see
    /// [`GeoObject::select_by_point`].
    pub fn select_by_point(
        &mut self,
        point: &Point2d,
        tolerance: f64,
        scale: f64,
        extend: bool,
    ) -> SceneChange {
        let change = self.root.select_by_point(point, tolerance, scale, extend);
        self.broadcaster.notify(change);
        change
    }

    /// Rectangle selection over the whole scene; see
    /// [`GeoObject::select_by_rect`].
    pub fn select_by_rect(&mut self, rect: &Rect, scale: f64, extend: bool) -> SceneChange {
        let change = self.root.select_by_rect(rect, scale, extend);
        self.broadcaster.notify(change);
        change
    }

    /// Deselects everything.
    pub fn clear_selection(&mut self) -> SceneChange {
        let change = self.root.set_selected(false);
        self.broadcaster.notify(change);
        change
    }
}
