use flexproj_types::Rect;
use serde::{Deserialize, Serialize};

use crate::error::FlexProjError;

/// Bit-packed occupancy grid.
///
/// Used as a cheap collision mask: mark the footprint of placed map
/// elements and query whether a candidate area is still free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryGrid {
    cols: usize,
    rows: usize,
    west: f64,
    north: f64,
    cell_size: f64,
    bits: Vec<u64>,
}

impl BinaryGrid {
    /// Creates an empty (all clear) grid.
    pub fn new(
        cols: usize,
        rows: usize,
        west: f64,
        north: f64,
        cell_size: f64,
    ) -> Result<Self, FlexProjError> {
        if cols == 0 || rows == 0 {
            return Err(FlexProjError::InvalidArgument(
                "grid dimensions must be positive".into(),
            ));
        }
        if cell_size <= 0.0 || !cell_size.is_finite() {
            return Err(FlexProjError::InvalidArgument(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }

        let words = (cols * rows).div_ceil(64);
        Ok(Self {
            cols,
            rows,
            west,
            north,
            cell_size,
            bits: vec![0; words],
        })
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Whether the cell at `(col, row)` is set.
    pub fn get(&self, col: usize, row: usize) -> bool {
        let bit = row * self.cols + col;
        self.bits[bit / 64] & (1 << (bit % 64)) != 0
    }

    /// Sets or clears the cell at `(col, row)`.
    pub fn set(&mut self, col: usize, row: usize, value: bool) {
        let bit = row * self.cols + col;
        if value {
            self.bits[bit / 64] |= 1 << (bit % 64);
        } else {
            self.bits[bit / 64] &= !(1 << (bit % 64));
        }
    }

    /// Cell range (inclusive) covered by a coordinate rectangle, clipped
    /// to the grid. `None` when the rectangle misses the grid entirely.
    fn cell_range(&self, rect: &Rect) -> Option<(usize, usize, usize, usize)> {
        let extent = Rect::new(
            self.west,
            self.north - self.rows as f64 * self.cell_size,
            self.west + self.cols as f64 * self.cell_size,
            self.north,
        );
        let clipped = rect.limit(extent)?;

        let col_min = ((clipped.x_min() - self.west) / self.cell_size).floor() as usize;
        let col_max = (((clipped.x_max() - self.west) / self.cell_size).ceil() as usize)
            .saturating_sub(1)
            .min(self.cols - 1);
        let row_min = ((self.north - clipped.y_max()) / self.cell_size).floor() as usize;
        let row_max = (((self.north - clipped.y_min()) / self.cell_size).ceil() as usize)
            .saturating_sub(1)
            .min(self.rows - 1);

        Some((col_min.min(self.cols - 1), col_max, row_min.min(self.rows - 1), row_max))
    }

    /// Marks every cell intersecting the rectangle.
    pub fn mark_rect(&mut self, rect: &Rect) {
        if let Some((col_min, col_max, row_min, row_max)) = self.cell_range(rect) {
            for row in row_min..=row_max {
                for col in col_min..=col_max {
                    self.set(col, row, true);
                }
            }
        }
    }

    /// Whether any cell intersecting the rectangle is set.
    pub fn is_marked(&self, rect: &Rect) -> bool {
        let Some((col_min, col_max, row_min, row_max)) = self.cell_range(rect) else {
            return false;
        };
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                if self.get(col, row) {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_bits() {
        let mut grid = BinaryGrid::new(100, 3, 0.0, 3.0, 1.0).expect("valid grid");
        assert!(!grid.get(99, 2));
        grid.set(99, 2, true);
        assert!(grid.get(99, 2));
        grid.set(99, 2, false);
        assert!(!grid.get(99, 2));
    }

    #[test]
    fn mark_and_query_rect() {
        let mut grid = BinaryGrid::new(10, 10, 0.0, 10.0, 1.0).expect("valid grid");
        grid.mark_rect(&Rect::new(2.2, 2.2, 3.8, 3.8));

        assert!(grid.is_marked(&Rect::new(3.0, 3.0, 3.5, 3.5)));
        assert!(!grid.is_marked(&Rect::new(6.0, 6.0, 7.0, 7.0)));
        // Far outside the grid.
        assert!(!grid.is_marked(&Rect::new(20.0, 20.0, 21.0, 21.0)));
    }
}
