//! Sensor model: band registry, calibration metadata, acquisition ephemeris

mod bands;
mod ephemeris;
mod metadata;

pub use bands::{WorldViewBand, NUM_WORLDVIEW_BANDS, WORLDVIEW_ESUN};
pub use ephemeris::{earth_sun_distance_au, AcquisitionTime};
pub use metadata::{parse_imd, SceneMetadata};

use floodmark_core::raster::{MaskedPixel, MultiBandRaster};
use std::ops::Index;

/// Raw 8-band WorldView pixel (digital numbers)
pub type WorldViewPixel = MaskedPixel<u16, NUM_WORLDVIEW_BANDS>;

/// TOA reflectance pixel
pub type ToaPixel = MaskedPixel<f32, NUM_WORLDVIEW_BANDS>;

/// Raw 8-band WorldView scene
pub type WorldViewImage = MultiBandRaster<u16, NUM_WORLDVIEW_BANDS>;

impl Index<WorldViewBand> for WorldViewPixel {
    type Output = u16;

    fn index(&self, band: WorldViewBand) -> &u16 {
        &self.bands()[band.index()]
    }
}

impl Index<WorldViewBand> for ToaPixel {
    type Output = f32;

    fn index(&self, band: WorldViewBand) -> &f32 {
        &self.bands()[band.index()]
    }
}
