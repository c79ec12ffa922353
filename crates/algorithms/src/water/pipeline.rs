//! Scene-level detection driver
//!
//! Orchestration only: locate the delivery files, parse and validate
//! calibration metadata, classify every pixel, write the labeled raster.
//! Metadata must be complete before any pixel work starts; everything per
//! pixel is pure and order-free.

use crate::sensor::{SceneMetadata, WorldViewImage, NUM_WORLDVIEW_BANDS};
use crate::water::classify::{classify_image, summarize, ClassSummary, DetectionParams};
use floodmark_core::io::{read_multiband_geotiff, write_class_geotiff};
use floodmark_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Locate the one candidate path with the given extension (case-insensitive)
pub fn find_input<'a>(paths: &'a [PathBuf], extension: &str) -> Result<&'a Path> {
    paths
        .iter()
        .find(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
        })
        .map(PathBuf::as_path)
        .ok_or_else(|| Error::FileNotFound {
            expected: format!(".{}", extension),
        })
}

/// Load the 8-band WorldView scene from the candidate paths
pub fn load_worldview_image(paths: &[PathBuf]) -> Result<WorldViewImage> {
    let image_path = find_input(paths, "tif")?;
    info!(path = %image_path.display(), "reading WorldView image");
    read_multiband_geotiff::<u16, NUM_WORLDVIEW_BANDS, _>(image_path)
}

/// Load and validate the scene calibration metadata from the candidate paths
pub fn load_worldview_metadata(paths: &[PathBuf]) -> Result<SceneMetadata> {
    let metadata_path = find_input(paths, "imd")?;
    info!(path = %metadata_path.display(), "reading calibration metadata");
    let metadata = SceneMetadata::parse_from_file(metadata_path)?;
    debug!(?metadata, "scene calibration");
    Ok(metadata)
}

/// Detect surface water in a WorldView scene.
///
/// Loads the image and calibration metadata from `input_paths`, classifies
/// every pixel, and writes an 8-bit labeled raster to `output` with the
/// scene georeference and [`crate::water::WaterClass::NoData`] declared as
/// the nodata value. Returns the per-class pixel counts.
pub fn detect_water(
    input_paths: &[PathBuf],
    output: &Path,
    params: &DetectionParams,
) -> Result<ClassSummary> {
    let metadata = load_worldview_metadata(input_paths)?;
    let image = load_worldview_image(input_paths)?;

    let classified = classify_image(&image, &metadata, params)?;
    let summary = summarize(&classified);
    info!(
        water = summary.water,
        land = summary.land,
        nodata = summary.nodata,
        "classification complete"
    );

    write_class_geotiff(&classified, output)?;
    info!(path = %output.display(), "wrote classification");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_input_by_extension() {
        let paths = vec![
            PathBuf::from("scene/16OCT23174654.IMD"),
            PathBuf::from("scene/16OCT23174654.TIF"),
            PathBuf::from("scene/README.txt"),
        ];

        assert_eq!(
            find_input(&paths, "tif").unwrap(),
            Path::new("scene/16OCT23174654.TIF")
        );
        assert_eq!(
            find_input(&paths, "imd").unwrap(),
            Path::new("scene/16OCT23174654.IMD")
        );
    }

    #[test]
    fn test_find_input_missing_is_file_not_found() {
        let paths = vec![PathBuf::from("scene/16OCT23174654.TIF")];
        assert!(matches!(
            find_input(&paths, "imd"),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_detect_water_requires_metadata_file() {
        let paths = vec![PathBuf::from("scene/only_image.tif")];
        let result = detect_water(
            &paths,
            Path::new("out.tif"),
            &DetectionParams::default(),
        );
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }
}
