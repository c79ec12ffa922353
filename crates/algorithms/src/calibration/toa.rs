//! Raw digital numbers to top-of-atmosphere reflectance
//!
//! Two-stage radiometric model: per-band gain converts counts to radiance,
//! then a scene-wide scale factor (Earth–Sun distance and solar geometry)
//! and the per-band solar irradiance convert radiance to reflectance.

use crate::sensor::{
    SceneMetadata, ToaPixel, WorldViewImage, WorldViewPixel, NUM_WORLDVIEW_BANDS, WORLDVIEW_ESUN,
};
use floodmark_core::raster::MultiBandRaster;
use floodmark_core::Result;
use rayon::prelude::*;
use tracing::warn;

/// Converts raw pixels of one scene to TOA reflectance.
///
/// Binds a single [`SceneMetadata`]: per-band gains and the scene scale
/// factor are precomputed once, then applied pixel-wise. The arithmetic is
/// applied uniformly to invalid pixels too; their validity flag passes
/// through untouched and consumers must check it before trusting values.
#[derive(Debug, Clone)]
pub struct ToaConverter {
    gain: [f32; NUM_WORLDVIEW_BANDS],
    scale_factor: f32,
}

impl ToaConverter {
    pub fn new(metadata: &SceneMetadata) -> Self {
        let mut gain = [0.0f32; NUM_WORLDVIEW_BANDS];
        for (i, g) in gain.iter_mut().enumerate() {
            *g = (metadata.abs_cal_factor[i] / metadata.effective_bandwidth[i]) as f32;
        }

        // Solar zenith is 90° − elevation. An elevation of zero puts the
        // cosine at zero; the division then yields non-finite reflectance,
        // which is propagated rather than rejected.
        if metadata.mean_sun_elevation <= 0.0 {
            warn!(
                mean_sun_elevation = metadata.mean_sun_elevation,
                "sun at or below horizon; reflectance will not be finite"
            );
        }

        let d = metadata.earth_sun_distance;
        let zenith = (90.0 - metadata.mean_sun_elevation).to_radians();
        let scale_factor = (d * d * std::f64::consts::PI / zenith.cos()) as f32;

        Self { gain, scale_factor }
    }

    /// Scene scale factor `d² · π / cos(zenith)`
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Top-of-atmosphere radiance: per-band gain applied to raw counts
    pub fn radiance(&self, pixel: &WorldViewPixel) -> ToaPixel {
        let mut band = 0;
        pixel.map(|raw| {
            let value = raw as f32 * self.gain[band];
            band += 1;
            value
        })
    }

    /// Top-of-atmosphere reflectance for one pixel
    pub fn convert(&self, pixel: &WorldViewPixel) -> ToaPixel {
        let mut band = 0;
        pixel.map(|raw| {
            let radiance = raw as f32 * self.gain[band];
            let reflectance = radiance * self.scale_factor / WORLDVIEW_ESUN[band];
            band += 1;
            reflectance
        })
    }
}

/// Convert a whole raw scene to TOA reflectance, row-parallel.
///
/// The output keeps the input's georeferencing and per-pixel validity.
pub fn convert_to_toa(
    image: &WorldViewImage,
    metadata: &SceneMetadata,
) -> Result<MultiBandRaster<f32, NUM_WORLDVIEW_BANDS>> {
    let converter = ToaConverter::new(metadata);
    let (rows, cols) = image.shape();

    let pixels: Vec<ToaPixel> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = Vec::with_capacity(cols);
            for col in 0..cols {
                let pixel = unsafe { image.get_unchecked(row, col) };
                row_data.push(converter.convert(&pixel));
            }
            row_data
        })
        .collect();

    let mut output = MultiBandRaster::from_pixels(pixels, rows, cols)?;
    output.set_transform(*image.transform());
    output.set_crs(image.crs().cloned());
    Ok(output)
}
