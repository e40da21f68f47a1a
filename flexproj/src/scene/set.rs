use serde::{Deserialize, Serialize};

use crate::scene::object::GeoObject;

/// Ordered collection of scene objects.
///
/// Children are drawn in insertion order (last child on top) and
/// hit-tested in reverse. A *grouped* set behaves as one atomic selectable
/// unit: selecting any member selects or deselects the whole set.
///
/// Child list mutation goes through the owning
/// [`GeoObject`](crate::scene::GeoObject), which keeps the children's
/// parent back-references consistent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoSet {
    pub(crate) children: Vec<GeoObject>,
    grouped: bool,
}

impl GeoSet {
    /// Creates an empty, ungrouped set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty grouped set.
    pub fn grouped_set() -> Self {
        Self {
            children: Vec::new(),
            grouped: true,
        }
    }

    /// Whether the set selects atomically.
    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// Switches the grouped behavior.
    pub fn set_grouped(&mut self, grouped: bool) {
        self.grouped = grouped;
    }

    /// The children, in insertion order.
    pub fn children(&self) -> &[GeoObject] {
        &self.children
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}
