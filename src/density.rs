//! Density fields: per-cell scalar weights driving both sampling and
//! relaxation.

#[cfg(feature = "image")]
use crate::Error;
#[cfg(feature = "image")]
use std::path::Path;

/// A non-negative weight per cell of a fixed `width × height` grid.
///
/// The crate uses the 0–255 darkness convention: a weight of 0 is a
/// fully light cell, 255 a fully dark one. Normalized per-point
/// densities produced by the relaxation engine divide by 255
/// accordingly.
pub trait DensityField {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Weight of the cell at `(x, y)`, with `x < width` and
    /// `y < height`.
    fn density(&self, x: usize, y: usize) -> f64;
}

/// A density field backed by a row-major weight buffer.
#[derive(Debug, Clone)]
pub struct GridDensity {
    width: usize,
    height: usize,
    weights: Vec<f64>,
}

impl GridDensity {
    /// # Panics
    ///
    /// Panics if `weights.len() != width * height`.
    pub fn new(width: usize, height: usize, weights: Vec<f64>) -> Self {
        assert_eq!(
            weights.len(),
            width * height,
            "weight buffer does not match grid dimensions",
        );
        Self {
            width,
            height,
            weights,
        }
    }

    pub fn from_fn(width: usize, height: usize, mut weight: impl FnMut(usize, usize) -> f64) -> Self {
        let mut weights = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                weights.push(weight(x, y));
            }
        }
        Self {
            width,
            height,
            weights,
        }
    }

    /// Decodes a raster image into a field where dark pixels weigh up
    /// to 255 and white pixels weigh 0.
    #[cfg(feature = "image")]
    pub fn from_image(path: impl AsRef<Path>) -> Result<Self, Error> {
        let img = image::open(path).map_err(Error::DensitySource)?.to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Self::from_fn(width as usize, height as usize, |x, y| {
            let [r, g, b] = img.get_pixel(x as u32, y as u32).0;
            255.0 - f64::from(u16::from(r) + u16::from(g) + u16::from(b)) / 3.0
        }))
    }
}

impl DensityField for GridDensity {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn density(&self, x: usize, y: usize) -> f64 {
        self.weights[y * self.width + x]
    }
}
