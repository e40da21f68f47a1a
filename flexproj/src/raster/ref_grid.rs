use ahash::{AHashMap, AHashSet};
use flexproj_types::{Point2d, Rect};

use crate::error::FlexProjError;
use crate::scene::ObjectId;

/// Spatial index mapping grid cells to the scene objects overlapping them.
///
/// Backed by a sparse cell map, so large mostly-empty extents cost
/// nothing. Used for overlap and collision queries ("which objects are
/// near this point") without walking the whole scene tree.
#[derive(Debug, Clone, Default)]
pub struct RefGrid {
    cell_size: f64,
    cells: AHashMap<(i64, i64), AHashSet<ObjectId>>,
    extents: AHashMap<ObjectId, Rect>,
}

impl RefGrid {
    /// Creates an index with the given cell size.
    pub fn new(cell_size: f64) -> Result<Self, FlexProjError> {
        if cell_size <= 0.0 || !cell_size.is_finite() {
            return Err(FlexProjError::InvalidArgument(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }

        Ok(Self {
            cell_size,
            cells: AHashMap::new(),
            extents: AHashMap::new(),
        })
    }

    fn cell_span(&self, rect: &Rect) -> (i64, i64, i64, i64) {
        (
            (rect.x_min() / self.cell_size).floor() as i64,
            (rect.x_max() / self.cell_size).floor() as i64,
            (rect.y_min() / self.cell_size).floor() as i64,
            (rect.y_max() / self.cell_size).floor() as i64,
        )
    }

    /// Registers an object covering `rect`. Re-inserting an id replaces
    /// its previous footprint.
    pub fn insert(&mut self, id: ObjectId, rect: Rect) {
        self.remove(id);

        let (col_min, col_max, row_min, row_max) = self.cell_span(&rect);
        for col in col_min..=col_max {
            for row in row_min..=row_max {
                self.cells.entry((col, row)).or_default().insert(id);
            }
        }
        self.extents.insert(id, rect);
    }

    /// Removes an object from the index. Unknown ids are ignored.
    pub fn remove(&mut self, id: ObjectId) {
        let Some(rect) = self.extents.remove(&id) else {
            return;
        };

        let (col_min, col_max, row_min, row_max) = self.cell_span(&rect);
        for col in col_min..=col_max {
            for row in row_min..=row_max {
                if let Some(cell) = self.cells.get_mut(&(col, row)) {
                    cell.remove(&id);
                    if cell.is_empty() {
                        self.cells.remove(&(col, row));
                    }
                }
            }
        }
    }

    /// Ids of objects whose footprint rectangle contains the point.
    pub fn query_point(&self, point: &Point2d) -> AHashSet<ObjectId> {
        let col = (point.x / self.cell_size).floor() as i64;
        let row = (point.y / self.cell_size).floor() as i64;

        let mut result = AHashSet::new();
        if let Some(cell) = self.cells.get(&(col, row)) {
            for id in cell {
                if self.extents.get(id).is_some_and(|r| r.contains(point)) {
                    result.insert(*id);
                }
            }
        }

        result
    }

    /// Ids of objects whose footprint rectangle intersects `rect`.
    pub fn query_rect(&self, rect: &Rect) -> AHashSet<ObjectId> {
        let (col_min, col_max, row_min, row_max) = self.cell_span(rect);

        let mut result = AHashSet::new();
        for col in col_min..=col_max {
            for row in row_min..=row_max {
                if let Some(cell) = self.cells.get(&(col, row)) {
                    for id in cell {
                        if self.extents.get(id).is_some_and(|r| r.intersects(rect)) {
                            result.insert(*id);
                        }
                    }
                }
            }
        }

        result
    }

    /// Number of indexed objects.
    pub fn len(&self) -> usize {
        self.extents.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GeoObject, GeoSet};

    fn id() -> ObjectId {
        // Ids come from the scene id generator to keep them unique.
        GeoObject::new_set(GeoSet::default()).id()
    }

    #[test]
    fn insert_query_remove() {
        let mut index = RefGrid::new(10.0).expect("valid cell size");
        let a = id();
        let b = id();
        index.insert(a, Rect::new(0.0, 0.0, 5.0, 5.0));
        index.insert(b, Rect::new(100.0, 100.0, 105.0, 105.0));
        assert_eq!(index.len(), 2);

        let hits = index.query_point(&Point2d::new(1.0, 1.0));
        assert!(hits.contains(&a) && !hits.contains(&b));

        // Same cell, but outside the footprint rectangle.
        assert!(index.query_point(&Point2d::new(8.0, 8.0)).is_empty());

        let hits = index.query_rect(&Rect::new(4.0, 4.0, 101.0, 101.0));
        assert_eq!(hits.len(), 2);

        index.remove(a);
        assert!(index.query_point(&Point2d::new(1.0, 1.0)).is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn reinsert_replaces_footprint() {
        let mut index = RefGrid::new(10.0).expect("valid cell size");
        let a = id();
        index.insert(a, Rect::new(0.0, 0.0, 5.0, 5.0));
        index.insert(a, Rect::new(50.0, 50.0, 55.0, 55.0));

        assert!(index.query_point(&Point2d::new(1.0, 1.0)).is_empty());
        assert!(index
            .query_point(&Point2d::new(51.0, 51.0))
            .contains(&a));
        assert_eq!(index.len(), 1);
    }
}
