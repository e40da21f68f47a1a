use std::f64::consts::{FRAC_PI_2, PI};

use flexproj_types::geo::MapProjection;
use flexproj_types::Rect;

use crate::error::FlexProjError;
use crate::project::progress::ProgressListener;
use crate::raster::{GeoGrid, GeoImage, GridSampling};

/// Reprojects georeferenced rasters point by point.
///
/// The destination extent is discovered by forward-projecting the border
/// of the source's geographic extent; every destination cell is then
/// inverse-projected back to geographic coordinates and sampled from the
/// source. Cells the projection cannot reach become nodata (grids) or
/// transparent (images). This is point sampling, with no area-weighted
/// resampling.
#[derive(Debug, Clone, Copy)]
pub struct RasterProjector<'a> {
    projection: &'a dyn MapProjection,
    sampling: GridSampling,
}

impl<'a> RasterProjector<'a> {
    /// Creates a projector sampling with nearest-neighbor lookup.
    pub fn new(projection: &'a dyn MapProjection) -> Self {
        Self {
            projection,
            sampling: GridSampling::Nearest,
        }
    }

    /// Replaces the sampling method.
    pub fn with_sampling(mut self, sampling: GridSampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Reprojects a value grid.
    ///
    /// The source extent is in geographic degrees, the result in map
    /// units. Progress is reported and cancellation polled once per
    /// destination row; on cancellation the partial result is discarded
    /// and [`FlexProjError::Cancelled`] returned.
    pub fn project_grid(
        &self,
        source: &GeoGrid,
        progress: &dyn ProgressListener,
    ) -> Result<GeoGrid, FlexProjError> {
        let extent = self
            .destination_extent(source.extent(), source.cell_size())
            .ok_or_else(|| {
                FlexProjError::InvalidArgument(
                    "source raster is entirely outside the projection domain".into(),
                )
            })?;

        let cols = source.cols();
        let cell_size = extent.width() / cols as f64;
        let rows = ((extent.height() / cell_size).round() as usize).max(1);

        let mut dest = GeoGrid::filled(
            cols,
            rows,
            extent.x_min(),
            extent.y_max(),
            cell_size,
            GeoGrid::DEFAULT_NODATA,
        )?;
        let nodata = dest.nodata();

        for row in 0..rows {
            progress.progress(100.0 * row as f64 / rows as f64);
            if progress.is_cancelled() {
                return Err(FlexProjError::Cancelled);
            }

            for col in 0..cols {
                let (x, y) = dest.cell_center(col, row);
                let value = self
                    .inverse_geographic(x, y)
                    .and_then(|(lon, lat)| source.sample(lon, lat, self.sampling))
                    .unwrap_or(nodata);
                dest.set_value(col, row, value);
            }
        }
        progress.progress(100.0);

        Ok(dest)
    }

    /// Reprojects an image; unreachable cells become transparent pixels.
    pub fn project_image(
        &self,
        source: &GeoImage,
        progress: &dyn ProgressListener,
    ) -> Result<GeoImage, FlexProjError> {
        let source_extent = source.extent();
        let step = source_extent.width() / source.width() as f64;
        let extent = self
            .destination_extent(source_extent, step)
            .ok_or_else(|| {
                FlexProjError::InvalidArgument(
                    "source image is entirely outside the projection domain".into(),
                )
            })?;

        let width = source.width();
        let cell_size = extent.width() / width as f64;
        let height = ((extent.height() / cell_size).round() as usize).max(1);

        let mut dest = GeoImage::transparent(width, height, extent)?;

        for row in 0..height {
            progress.progress(100.0 * row as f64 / height as f64);
            if progress.is_cancelled() {
                return Err(FlexProjError::Cancelled);
            }

            let y = extent.y_max() - (row as f64 + 0.5) * cell_size;
            for col in 0..width {
                let x = extent.x_min() + (col as f64 + 0.5) * cell_size;
                if let Some(rgba) = self
                    .inverse_geographic(x, y)
                    .and_then(|(lon, lat)| source.sample(lon, lat, self.sampling))
                {
                    dest.set_pixel(col, row, rgba);
                }
            }
        }
        progress.progress(100.0);

        Ok(dest)
    }

    /// Inverse-projects a map coordinate, returning lon/lat in degrees
    /// when the result is finite and on the globe.
    ///
    /// The longitude check runs relative to the central meridian and
    /// before any folding, so that points beyond the map outline (which
    /// some inverses report as longitudes past the seam) are rejected
    /// instead of wrapping onto the opposite side.
    fn inverse_geographic(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (lon, lat) = self.projection.inverse(x, y)?;
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let rel = lon - self.projection.central_meridian().to_radians();
        if !(-PI..=PI).contains(&rel) || !(-FRAC_PI_2..=FRAC_PI_2).contains(&lat) {
            return None;
        }
        Some((lon.to_degrees(), lat.to_degrees()))
    }

    /// Bounding box of the projected source extent, found by walking the
    /// (clamped) geographic border at source resolution.
    fn destination_extent(&self, geographic: Rect, step_deg: f64) -> Option<Rect> {
        let west = geographic.x_min().max(-180.0);
        let east = geographic.x_max().min(180.0);
        let south = geographic.y_min().max(-90.0);
        let north = geographic.y_max().min(90.0);
        if west >= east || south >= north {
            return None;
        }

        let mut extent: Option<Rect> = None;
        let mut add = |lon: f64, lat: f64| {
            if let Some(p) = self.projection.forward(lon.to_radians(), lat.to_radians()) {
                if p.x.is_finite() && p.y.is_finite() {
                    extent = Some(match extent {
                        Some(mut r) => {
                            r.extend(p.x, p.y);
                            r
                        }
                        None => Rect::new(p.x, p.y, p.x, p.y),
                    });
                }
            }
        };

        let mut lon = west;
        while lon < east {
            add(lon, south);
            add(lon, north);
            lon += step_deg;
        }
        let mut lat = south;
        while lat < north {
            add(west, lat);
            add(east, lat);
            lat += step_deg;
        }
        add(east, south);
        add(east, north);

        extent.filter(|r| r.width() > 0.0 && r.height() > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use flexproj_types::geo::impls::projection::{Equirectangular, Sinusoidal};

    use super::*;
    use crate::project::progress::test_support::CancelAfter;
    use crate::project::progress::NoProgress;

    fn constant_grid(value: f32) -> GeoGrid {
        // 20x10 one-degree cells covering 20W..0, 0..10N.
        GeoGrid::filled(20, 10, -20.0, 10.0, 1.0, value).expect("valid grid")
    }

    #[test]
    fn constant_grid_stays_constant_inside_the_footprint() {
        let projection = Equirectangular::new(0.0);
        let projector = RasterProjector::new(&projection);

        let dest = projector
            .project_grid(&constant_grid(7.5), &NoProgress)
            .expect("projects");

        assert_eq!(dest.cols(), 20);
        let values: Vec<f32> = dest
            .samples()
            .iter()
            .copied()
            .filter(|&v| !dest.is_nodata(v))
            .collect();
        assert!(!values.is_empty());
        assert!(values.iter().all(|&v| (v - 7.5).abs() < 1e-6));
    }

    #[test]
    fn cells_outside_the_projection_footprint_are_nodata() {
        // A sinusoidal world is lens shaped; the corners of its bounding
        // box inverse-project outside the globe.
        let projection = Sinusoidal::new(0.0);
        let projector = RasterProjector::new(&projection);
        let world = GeoGrid::filled(36, 18, -180.0, 90.0, 10.0, 1.0).expect("valid grid");

        let dest = projector
            .project_grid(&world, &NoProgress)
            .expect("projects");

        let nodata_cells = dest
            .samples()
            .iter()
            .filter(|&&v| dest.is_nodata(v))
            .count();
        assert!(nodata_cells > 0);
        assert!(nodata_cells < dest.samples().len());
    }

    #[test]
    fn cancellation_aborts_with_error() {
        let projection = Equirectangular::new(0.0);
        let projector = RasterProjector::new(&projection);

        let result = projector.project_grid(&constant_grid(1.0), &CancelAfter::new(2));
        assert!(matches!(result, Err(FlexProjError::Cancelled)));
    }

    #[test]
    fn image_reprojection_preserves_opaque_interior() {
        let projection = Equirectangular::new(0.0);
        let projector = RasterProjector::new(&projection);

        let mut source =
            GeoImage::transparent(8, 8, Rect::new(-8.0, -8.0, 8.0, 8.0)).expect("valid image");
        for row in 0..8 {
            for col in 0..8 {
                source.set_pixel(col, row, [255, 0, 0, 255]);
            }
        }

        let dest = projector
            .project_image(&source, &NoProgress)
            .expect("projects");
        let center = dest.pixel(dest.width() / 2, dest.height() / 2);
        assert_eq!(center, [255, 0, 0, 255]);
    }
}
