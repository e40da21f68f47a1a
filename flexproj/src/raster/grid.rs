use flexproj_types::Rect;
use serde::{Deserialize, Serialize};

use crate::error::FlexProjError;
use crate::raster::GridSampling;

/// Georeferenced grid of `f32` samples.
///
/// Cells are square and row-major, row 0 at the top. `west`/`north` are
/// the coordinates of the outer corner of the top-left cell; cell centers
/// sit half a cell inward. Cells carrying no information hold the
/// `nodata` sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoGrid {
    cols: usize,
    rows: usize,
    west: f64,
    north: f64,
    cell_size: f64,
    nodata: f32,
    samples: Vec<f32>,
}

impl GeoGrid {
    /// Default nodata sentinel.
    pub const DEFAULT_NODATA: f32 = -9999.0;

    /// Creates a grid from an existing sample buffer.
    pub fn new(
        cols: usize,
        rows: usize,
        west: f64,
        north: f64,
        cell_size: f64,
        nodata: f32,
        samples: Vec<f32>,
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
        if samples.len() != cols * rows {
            return Err(FlexProjError::GridShape {
                cols,
                rows,
                len: samples.len(),
            });
        }

        Ok(Self {
            cols,
            rows,
            west,
            north,
            cell_size,
            nodata,
            samples,
        })
    }

    /// Creates a grid with every cell set to `value`.
    pub fn filled(
        cols: usize,
        rows: usize,
        west: f64,
        north: f64,
        cell_size: f64,
        value: f32,
    ) -> Result<Self, FlexProjError> {
        Self::new(
            cols,
            rows,
            west,
            north,
            cell_size,
            Self::DEFAULT_NODATA,
            vec![value; cols.saturating_mul(rows)],
        )
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// West edge of the grid.
    pub fn west(&self) -> f64 {
        self.west
    }

    /// North edge of the grid.
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Cell size in coordinate units.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// The nodata sentinel value.
    pub fn nodata(&self) -> f32 {
        self.nodata
    }

    /// Raw sample buffer, row-major.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Geographic extent of the grid.
    pub fn extent(&self) -> Rect {
        Rect::new(
            self.west,
            self.north - self.rows as f64 * self.cell_size,
            self.west + self.cols as f64 * self.cell_size,
            self.north,
        )
    }

    /// Value of the cell at `(col, row)`.
    pub fn value(&self, col: usize, row: usize) -> f32 {
        self.samples[row * self.cols + col]
    }

    /// Sets the cell at `(col, row)`.
    pub fn set_value(&mut self, col: usize, row: usize, value: f32) {
        self.samples[row * self.cols + col] = value;
    }

    /// Whether a sample holds the nodata sentinel (or is not finite).
    pub fn is_nodata(&self, value: f32) -> bool {
        !value.is_finite() || value == self.nodata
    }

    /// Minimum and maximum of the valid samples. `None` when every cell is
    /// nodata.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut result: Option<(f32, f32)> = None;
        for &v in &self.samples {
            if self.is_nodata(v) {
                continue;
            }
            result = Some(match result {
                Some((min, max)) => (min.min(v), max.max(v)),
                None => (v, v),
            });
        }

        result
    }

    /// Coordinate of the center of cell `(col, row)`.
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.west + (col as f64 + 0.5) * self.cell_size,
            self.north - (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Samples the grid at a coordinate with the given method.
    ///
    /// Returns `None` when the coordinate is outside the grid extent or
    /// any contributing cell is nodata.
    pub fn sample(&self, x: f64, y: f64, method: GridSampling) -> Option<f32> {
        if !self.extent().contains(&flexproj_types::Point2d::new(x, y)) {
            return None;
        }

        // Fractional position in cell-center coordinates.
        let fx = (x - self.west) / self.cell_size - 0.5;
        let fy = (self.north - y) / self.cell_size - 0.5;

        match method {
            GridSampling::Nearest => {
                let col = (fx.round().max(0.0) as usize).min(self.cols - 1);
                let row = (fy.round().max(0.0) as usize).min(self.rows - 1);
                let v = self.value(col, row);
                (!self.is_nodata(v)).then_some(v)
            }
            GridSampling::Bilinear => self.sample_bilinear(fx, fy),
            GridSampling::Bicubic => self.sample_bicubic(fx, fy),
        }
    }

    fn clamped(&self, col: i64, row: i64) -> f32 {
        let col = col.clamp(0, self.cols as i64 - 1) as usize;
        let row = row.clamp(0, self.rows as i64 - 1) as usize;
        self.value(col, row)
    }

    fn sample_bilinear(&self, fx: f64, fy: f64) -> Option<f32> {
        let col = fx.floor() as i64;
        let row = fy.floor() as i64;
        let tx = fx - col as f64;
        let ty = fy - row as f64;

        let mut values = [0.0f64; 4];
        for (i, (dc, dr)) in [(0, 0), (1, 0), (0, 1), (1, 1)].iter().enumerate() {
            let v = self.clamped(col + dc, row + dr);
            if self.is_nodata(v) {
                return None;
            }
            values[i] = f64::from(v);
        }

        let top = values[0] * (1.0 - tx) + values[1] * tx;
        let bottom = values[2] * (1.0 - tx) + values[3] * tx;
        Some((top * (1.0 - ty) + bottom * ty) as f32)
    }

    fn sample_bicubic(&self, fx: f64, fy: f64) -> Option<f32> {
        let col = fx.floor() as i64;
        let row = fy.floor() as i64;
        let tx = fx - col as f64;
        let ty = fy - row as f64;

        let mut rows = [0.0f64; 4];
        for dr in -1..=2i64 {
            let mut values = [0.0f64; 4];
            for dc in -1..=2i64 {
                let v = self.clamped(col + dc, row + dr);
                if self.is_nodata(v) {
                    return None;
                }
                values[(dc + 1) as usize] = f64::from(v);
            }
            rows[(dr + 1) as usize] = catmull_rom(values, tx);
        }

        Some(catmull_rom(rows, ty) as f32)
    }

    /// Shifts the grid origin.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.west += dx;
        self.north += dy;
    }
}

/// Catmull-Rom interpolation of four equally spaced samples at `t` within
/// the middle interval.
fn catmull_rom(p: [f64; 4], t: f64) -> f64 {
    0.5 * (2.0 * p[1]
        + (p[2] - p[0]) * t
        + (2.0 * p[0] - 5.0 * p[1] + 4.0 * p[2] - p[3]) * t * t
        + (3.0 * p[1] - p[0] - 3.0 * p[2] + p[3]) * t * t * t)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn construction_is_validated() {
        assert_matches!(
            GeoGrid::filled(0, 2, 0.0, 0.0, 1.0, 0.0),
            Err(FlexProjError::InvalidArgument(_))
        );
        assert_matches!(
            GeoGrid::filled(2, 2, 0.0, 0.0, 0.0, 0.0),
            Err(FlexProjError::InvalidArgument(_))
        );
        assert_matches!(
            GeoGrid::new(2, 2, 0.0, 0.0, 1.0, -9999.0, vec![0.0; 3]),
            Err(FlexProjError::GridShape { len: 3, .. })
        );
    }

    #[test]
    fn extent_and_cell_centers() {
        let grid = GeoGrid::filled(4, 2, 10.0, 50.0, 0.5, 1.0).expect("valid grid");
        assert_eq!(grid.extent(), Rect::new(10.0, 49.0, 12.0, 50.0));
        assert_eq!(grid.cell_center(0, 0), (10.25, 49.75));
        assert_eq!(grid.cell_center(3, 1), (11.75, 49.25));
    }

    fn linear_grid() -> GeoGrid {
        // value == column index, a linear ramp along x.
        let mut grid = GeoGrid::filled(4, 4, 0.0, 4.0, 1.0, 0.0).expect("valid grid");
        for row in 0..4 {
            for col in 0..4 {
                grid.set_value(col, row, col as f32);
            }
        }
        grid
    }

    #[test]
    fn sampling_reproduces_linear_field() {
        let grid = linear_grid();
        // Exactly between the centers of columns 1 and 2.
        let x = 2.0;
        let y = 2.0;
        assert_abs_diff_eq!(
            grid.sample(x, y, GridSampling::Bilinear).expect("inside"),
            1.5
        );
        assert_abs_diff_eq!(
            grid.sample(x, y, GridSampling::Bicubic).expect("inside"),
            1.5
        );
    }

    #[test]
    fn sampling_outside_extent_is_none() {
        let grid = linear_grid();
        assert_eq!(grid.sample(-0.1, 2.0, GridSampling::Nearest), None);
        assert_eq!(grid.sample(2.0, 4.1, GridSampling::Bilinear), None);
    }

    #[test]
    fn nodata_poisons_interpolation() {
        let mut grid = linear_grid();
        grid.set_value(1, 1, GeoGrid::DEFAULT_NODATA);
        assert_eq!(grid.sample(1.7, 2.3, GridSampling::Bilinear), None);

        // Nearest sampling of a valid cell still works.
        assert!(grid.sample(3.5, 0.5, GridSampling::Nearest).is_some());
    }

    #[test]
    fn min_max_skips_nodata() {
        let mut grid = linear_grid();
        assert_eq!(grid.min_max(), Some((0.0, 3.0)));
        for row in 0..4 {
            for col in 0..4 {
                grid.set_value(col, row, GeoGrid::DEFAULT_NODATA);
            }
        }
        assert_eq!(grid.min_max(), None);
    }
}
