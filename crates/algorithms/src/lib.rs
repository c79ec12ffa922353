//! # Floodmark Algorithms
//!
//! Radiometric calibration and surface-water classification for
//! WorldView-style multispectral imagery.
//!
//! ## Pipeline
//!
//! - **sensor**: band registry, IMD calibration metadata, acquisition
//!   ephemeris
//! - **calibration**: raw digital numbers → TOA reflectance
//! - **water**: spectral indices, tri-state classification, scene driver

pub mod calibration;
pub mod sensor;
pub mod water;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::calibration::{convert_to_toa, ToaConverter};
    pub use crate::sensor::{
        parse_imd, AcquisitionTime, SceneMetadata, ToaPixel, WorldViewBand, WorldViewImage,
        WorldViewPixel, NUM_WORLDVIEW_BANDS, WORLDVIEW_ESUN,
    };
    pub use crate::water::{
        classify_image, classify_pixel, detect_water, ndvi, ndwi, ndwi2, summarize,
        ClassSummary, DetectionParams, WaterClass,
    };
    pub use floodmark_core::prelude::*;
}
