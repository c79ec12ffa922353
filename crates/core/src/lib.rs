//! # Floodmark Core
//!
//! Core types and I/O for the floodmark surface-water detection library.
//!
//! This crate provides:
//! - `MaskedPixel<T, N>` / `MultiBandRaster<T, N>`: multi-band imagery with
//!   per-pixel validity
//! - `Raster<T>`: single-band raster grid (classification products)
//! - `GeoTransform`: affine transformation for georeferencing
//! - `CRS`: coordinate reference system handling
//! - GeoTIFF I/O (native `tiff`, optional GDAL backend)

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, MaskedPixel, MultiBandRaster, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, MaskedPixel, MultiBandRaster, Raster, RasterElement};
}
