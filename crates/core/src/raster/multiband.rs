//! Multi-band imagery with per-pixel validity masking

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::Array2;
use std::ops::Index;

/// A fixed-width multi-band pixel with a joint validity flag.
///
/// All `N` channel values share a single mask bit: either the whole
/// measurement is usable or none of it is. Numeric transforms are applied
/// uniformly through [`MaskedPixel::map`], which carries the flag unchanged,
/// so invalid pixels flow through arithmetic without special-casing and
/// consumers decide at the end of the pipeline whether to trust the values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskedPixel<T, const N: usize> {
    bands: [T; N],
    valid: bool,
}

impl<T: Copy, const N: usize> MaskedPixel<T, N> {
    /// Create a valid pixel from channel values
    pub fn valid(bands: [T; N]) -> Self {
        Self { bands, valid: true }
    }

    /// Create an invalid (masked) pixel.
    ///
    /// The channel values are retained but must not be interpreted.
    pub fn invalid(bands: [T; N]) -> Self {
        Self {
            bands,
            valid: false,
        }
    }

    /// Whether this pixel holds a usable measurement
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Channel values in band order
    pub fn bands(&self) -> &[T; N] {
        &self.bands
    }

    /// Apply a per-channel transform, propagating the validity flag unchanged.
    ///
    /// An invalid input yields an invalid output regardless of what the
    /// transform produces.
    pub fn map<U, F>(&self, f: F) -> MaskedPixel<U, N>
    where
        U: Copy,
        F: FnMut(T) -> U,
    {
        MaskedPixel {
            bands: self.bands.map(f),
            valid: self.valid,
        }
    }
}

impl<T, const N: usize> Index<usize> for MaskedPixel<T, N> {
    type Output = T;

    fn index(&self, band: usize) -> &T {
        &self.bands[band]
    }
}

/// A georeferenced grid of [`MaskedPixel`]s.
///
/// Input imagery container: `MultiBandRaster<u16, 8>` holds a raw 8-band
/// WorldView scene. Stored row-major like [`crate::raster::Raster`].
#[derive(Debug, Clone)]
pub struct MultiBandRaster<T: RasterElement, const N: usize> {
    data: Array2<MaskedPixel<T, N>>,
    transform: GeoTransform,
    crs: Option<CRS>,
}

impl<T: RasterElement, const N: usize> MultiBandRaster<T, N> {
    /// Create a raster from a row-major pixel vector
    pub fn from_pixels(pixels: Vec<MaskedPixel<T, N>>, rows: usize, cols: usize) -> Result<Self> {
        if pixels.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), pixels)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            data: array,
            transform: GeoTransform::default(),
            crs: None,
        })
    }

    /// Create a raster with every pixel set to the same value
    pub fn filled(rows: usize, cols: usize, pixel: MaskedPixel<T, N>) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), pixel),
            transform: GeoTransform::default(),
            crs: None,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of pixels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bands per pixel
    pub const fn num_bands(&self) -> usize {
        N
    }

    /// Get pixel at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<MaskedPixel<T, N>> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get pixel at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> MaskedPixel<T, N> {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set pixel at (row, col)
    pub fn set(&mut self, row: usize, col: usize, pixel: MaskedPixel<T, N>) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = pixel;
        Ok(())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<MaskedPixel<T, N>> {
        &self.data
    }

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the geotransform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Get the CRS
    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Set the CRS
    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }

    /// Number of pixels whose validity flag is set
    pub fn count_valid(&self) -> usize {
        self.data.iter().filter(|p| p.is_valid()).count()
    }
}
