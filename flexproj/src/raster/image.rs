use flexproj_types::{Point2d, Rect};
use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FlexProjError;
use crate::raster::GridSampling;

/// Georeferenced RGBA image.
///
/// Pixels are stored as a flat RGBA8 buffer, row 0 at the top, mapped
/// linearly onto the geographic `extent`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    extent: Rect,
}

impl GeoImage {
    /// Number of bytes per pixel.
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Creates an image from an RGBA8 buffer.
    pub fn new(
        width: usize,
        height: usize,
        pixels: Vec<u8>,
        extent: Rect,
    ) -> Result<Self, FlexProjError> {
        if width == 0 || height == 0 {
            return Err(FlexProjError::InvalidArgument(
                "image dimensions must be positive".into(),
            ));
        }
        if pixels.len() != width * height * Self::BYTES_PER_PIXEL {
            return Err(FlexProjError::InvalidArgument(format!(
                "image of {width}x{height} pixels does not match buffer of {} bytes",
                pixels.len()
            )));
        }

        Ok(Self {
            width,
            height,
            pixels,
            extent,
        })
    }

    /// Fully transparent image of the given size.
    pub fn transparent(width: usize, height: usize, extent: Rect) -> Result<Self, FlexProjError> {
        let len = width
            .saturating_mul(height)
            .saturating_mul(Self::BYTES_PER_PIXEL);
        Self::new(width, height, vec![0; len], extent)
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Geographic extent the image is mapped onto.
    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Raw RGBA8 buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The pixel at `(col, row)` as an RGBA quad.
    pub fn pixel(&self, col: usize, row: usize) -> [u8; 4] {
        let i = (row * self.width + col) * Self::BYTES_PER_PIXEL;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Sets the pixel at `(col, row)`.
    pub fn set_pixel(&mut self, col: usize, row: usize, rgba: [u8; 4]) {
        let i = (row * self.width + col) * Self::BYTES_PER_PIXEL;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Width of one pixel in extent units.
    pub fn pixel_size_x(&self) -> f64 {
        self.extent.width() / self.width as f64
    }

    /// Height of one pixel in extent units.
    pub fn pixel_size_y(&self) -> f64 {
        self.extent.height() / self.height as f64
    }

    /// Samples the image at a geographic coordinate.
    ///
    /// Bicubic sampling falls back to bilinear; color channels do not
    /// benefit from the sharper kernel the way continuous fields do.
    /// Returns `None` outside the extent.
    pub fn sample(&self, x: f64, y: f64, method: GridSampling) -> Option<[u8; 4]> {
        if !self.extent.contains(&Point2d::new(x, y)) {
            return None;
        }

        let fx = (x - self.extent.x_min()) / self.pixel_size_x() - 0.5;
        let fy = (self.extent.y_max() - y) / self.pixel_size_y() - 0.5;

        match method {
            GridSampling::Nearest => {
                let col = (fx.round().max(0.0) as usize).min(self.width - 1);
                let row = (fy.round().max(0.0) as usize).min(self.height - 1);
                Some(self.pixel(col, row))
            }
            GridSampling::Bilinear | GridSampling::Bicubic => Some(self.sample_bilinear(fx, fy)),
        }
    }

    fn clamped(&self, col: i64, row: i64) -> [u8; 4] {
        let col = col.clamp(0, self.width as i64 - 1) as usize;
        let row = row.clamp(0, self.height as i64 - 1) as usize;
        self.pixel(col, row)
    }

    fn sample_bilinear(&self, fx: f64, fy: f64) -> [u8; 4] {
        let col = fx.floor() as i64;
        let row = fy.floor() as i64;
        let tx = fx - col as f64;
        let ty = fy - row as f64;

        let p00 = self.clamped(col, row);
        let p10 = self.clamped(col + 1, row);
        let p01 = self.clamped(col, row + 1);
        let p11 = self.clamped(col + 1, row + 1);

        let mut result = [0u8; 4];
        for channel in 0..4 {
            let top =
                f64::from(p00[channel]) * (1.0 - tx) + f64::from(p10[channel]) * tx;
            let bottom =
                f64::from(p01[channel]) * (1.0 - tx) + f64::from(p11[channel]) * tx;
            result[channel] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
        }

        result
    }

    /// Shifts the image extent.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.extent = Rect::new(
            self.extent.x_min() + dx,
            self.extent.y_min() + dy,
            self.extent.x_max() + dx,
            self.extent.y_max() + dy,
        );
    }
}

// Raw pixel buffers must not travel through the object-graph
// serialization path; images are exchanged through an image codec
// instead.
impl Serialize for GeoImage {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom(
            "GeoImage pixel buffers are not serializable; use an image codec",
        ))
    }
}

impl<'de> Deserialize<'de> for GeoImage {
    fn deserialize<D: Deserializer<'de>>(_deserializer: D) -> Result<Self, D::Error> {
        Err(D::Error::custom(
            "GeoImage pixel buffers are not deserializable; use an image codec",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> GeoImage {
        let mut image =
            GeoImage::transparent(2, 2, Rect::new(0.0, 0.0, 2.0, 2.0)).expect("valid image");
        image.set_pixel(0, 0, [255, 255, 255, 255]);
        image.set_pixel(1, 1, [255, 255, 255, 255]);
        image
    }

    #[test]
    fn construction_is_validated() {
        assert!(GeoImage::new(2, 2, vec![0; 15], Rect::new(0.0, 0.0, 1.0, 1.0)).is_err());
        assert!(GeoImage::new(0, 2, vec![], Rect::new(0.0, 0.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn nearest_sampling_picks_pixel_centers() {
        let image = checker();
        // Top-left quadrant is white, bottom-right quadrant is white.
        assert_eq!(
            image.sample(0.5, 1.5, GridSampling::Nearest),
            Some([255, 255, 255, 255])
        );
        assert_eq!(image.sample(0.5, 0.5, GridSampling::Nearest), Some([0, 0, 0, 0]));
        assert_eq!(image.sample(2.5, 0.5, GridSampling::Nearest), None);
    }

    #[test]
    fn bilinear_blends_channels() {
        let image = checker();
        // Dead center: average of two white and two transparent pixels.
        let px = image.sample(1.0, 1.0, GridSampling::Bilinear).expect("inside");
        assert_eq!(px, [128, 128, 128, 128]);
    }

    #[test]
    fn serialization_is_refused() {
        let image = checker();
        assert!(serde_json::to_string(&image).is_err());
        assert!(serde_json::from_str::<GeoImage>("{}").is_err());
    }
}
