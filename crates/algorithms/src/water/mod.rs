//! Water detection: spectral indices, classification, pipeline driver

mod classify;
mod indices;
mod pipeline;

pub use classify::{
    classify_image, classify_pixel, summarize, ClassSummary, DetectionParams, WaterClass,
};
pub use indices::{ndvi, ndwi, ndwi2};
pub use pipeline::{
    detect_water, find_input, load_worldview_image, load_worldview_metadata,
};
