//! Radiometric calibration

mod toa;

pub use toa::{convert_to_toa, ToaConverter};
