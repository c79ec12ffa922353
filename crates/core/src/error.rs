//! Error types for floodmark

use thiserror::Error;

/// Main error type for floodmark operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No {expected} file among the candidate input paths")]
    FileNotFound { expected: String },

    #[error("Metadata parse error: {0}")]
    MetadataParse(String),

    #[error("Incomplete metadata: found {found} of {expected} required fields")]
    MetadataIncomplete { found: usize, expected: usize },

    #[error("Malformed acquisition timestamp: {0}")]
    TimestampFormat(String),

    #[error("Failed to read georeference: {0}")]
    GeoReferenceRead(String),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Gdal(e.to_string())
    }
}

/// Result type alias for floodmark operations
pub type Result<T> = std::result::Result<T, Error>;
