//! I/O operations for reading and writing raster data

#[cfg(feature = "gdal")]
mod gdal_io;
mod native;

#[cfg(feature = "gdal")]
pub use gdal_io::{read_class_geotiff, read_multiband_geotiff, write_class_geotiff};

#[cfg(not(feature = "gdal"))]
pub use native::{read_class_geotiff, read_multiband_geotiff, write_class_geotiff};

// Buffer-based I/O (always available, no filesystem dependency)
pub use native::{read_class_from_buffer, read_multiband_from_buffer, write_class_to_buffer};
