//! Tri-state surface-water classification

use crate::calibration::ToaConverter;
use crate::sensor::{SceneMetadata, ToaPixel, WorldViewImage};
use crate::water::indices::ndwi;
use floodmark_core::raster::Raster;
use floodmark_core::Result;
use rayon::prelude::*;

/// Per-pixel classification label, stored as an 8-bit raster value.
///
/// `NoData` doubles as the declared nodata sentinel of output rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WaterClass {
    NoData = 0,
    Land = 1,
    Water = 2,
}

impl WaterClass {
    /// Numeric encoding used in output rasters
    pub const fn value(self) -> u8 {
        self as u8
    }
}

impl From<WaterClass> for u8 {
    fn from(class: WaterClass) -> u8 {
        class.value()
    }
}

/// Parameters for water detection
#[derive(Debug, Clone)]
pub struct DetectionParams {
    /// NDWI decision threshold (strict `>`).
    ///
    /// The default of 0.1 is a provisional heuristic with no empirical
    /// tuning behind it; adjust per scene.
    pub ndwi_threshold: f32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            ndwi_threshold: 0.1,
        }
    }
}

/// Classify one TOA reflectance pixel.
///
/// Invalid pixels map to `NoData` no matter what their channels hold.
// TODO: a bare NDWI threshold confuses shadow and dark built surfaces with
// water; evaluate an NDVI cross-check on more scenes.
pub fn classify_pixel(pixel: &ToaPixel, params: &DetectionParams) -> WaterClass {
    if !pixel.is_valid() {
        return WaterClass::NoData;
    }
    if ndwi(pixel) > params.ndwi_threshold {
        WaterClass::Water
    } else {
        WaterClass::Land
    }
}

/// Classify a whole raw scene.
///
/// TOA conversion is fused with per-pixel labeling, row-parallel; pixels
/// are independent and no ordering is guaranteed between them. The output
/// carries the input's georeferencing and declares
/// [`WaterClass::NoData`] as its nodata value.
pub fn classify_image(
    image: &WorldViewImage,
    metadata: &SceneMetadata,
    params: &DetectionParams,
) -> Result<Raster<u8>> {
    let converter = ToaConverter::new(metadata);
    let (rows, cols) = image.shape();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![WaterClass::NoData.value(); cols];
            for col in 0..cols {
                let pixel = unsafe { image.get_unchecked(row, col) };
                let toa = converter.convert(&pixel);
                row_data[col] = classify_pixel(&toa, params).value();
            }
            row_data
        })
        .collect();

    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_transform(*image.transform());
    output.set_crs(image.crs().cloned());
    output.set_nodata(Some(WaterClass::NoData.value()));
    Ok(output)
}

/// Pixel counts per classification label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassSummary {
    pub water: usize,
    pub land: usize,
    pub nodata: usize,
}

/// Count label occurrences in a classification raster
pub fn summarize(raster: &Raster<u8>) -> ClassSummary {
    let mut summary = ClassSummary::default();
    for &value in raster.data().iter() {
        if value == WaterClass::Water.value() {
            summary.water += 1;
        } else if value == WaterClass::Land.value() {
            summary.land += 1;
        } else {
            summary.nodata += 1;
        }
    }
    summary
}
