//! End-to-end test on a synthetic WorldView scene.
//!
//! A 2×2 8-band image with fixed digital numbers and a synthetic IMD text
//! run through the full chain: metadata parse → TOA conversion →
//! classification → GeoTIFF write → read-back. Reflectance is checked
//! against the radiometric formula, the Earth–Sun distance against a
//! hand-computed value for the acquisition date.

use approx::assert_relative_eq;
use floodmark_algorithms::prelude::*;
use floodmark_core::io::{read_class_from_buffer, write_class_to_buffer};
use floodmark_core::raster::MaskedPixel;
use floodmark_core::GeoTransform;
use std::io::Cursor;

const BAND_NAMES: [&str; NUM_WORLDVIEW_BANDS] = [
    "BAND_C", "BAND_B", "BAND_G", "BAND_Y", "BAND_R", "BAND_RE", "BAND_N", "BAND_N2",
];

/// IMD text for the synthetic scene: gain (i+1)/4 per band, sun at zenith.
fn scene_imd() -> String {
    let mut text = String::from("version = \"28.4\";\nsatId = \"WV03\";\n");
    for (i, name) in BAND_NAMES.iter().enumerate() {
        text.push_str(&format!("BEGIN_GROUP = {}\n", name));
        text.push_str(&format!("\tabsCalFactor = {:e};\n", (i + 1) as f64 * 0.125));
        text.push_str("\teffectiveBandwidth = 5e-1;\n");
        text.push_str(&format!("END_GROUP = {}\n", name));
    }
    text.push_str("BEGIN_GROUP = IMAGE_1\n");
    text.push_str("\tmeanSunEl = 90.00;\n");
    text.push_str("\tfirstLineTime = 2016-10-23T17:46:54.796950Z;\n");
    text.push_str("END_GROUP = IMAGE_1\n");
    text
}

/// 2×2 scene: water-like pixel, two land-like pixels, one masked pixel.
fn scene_image() -> WorldViewImage {
    let mut water = [100u16; NUM_WORLDVIEW_BANDS];
    water[WorldViewBand::Blue.index()] = 800;
    water[WorldViewBand::Nir1.index()] = 50;

    let pixels = vec![
        MaskedPixel::valid(water),
        MaskedPixel::valid([100; NUM_WORLDVIEW_BANDS]),
        MaskedPixel::valid([250; NUM_WORLDVIEW_BANDS]),
        MaskedPixel::invalid([0; NUM_WORLDVIEW_BANDS]),
    ];

    let mut image = WorldViewImage::from_pixels(pixels, 2, 2).unwrap();
    image.set_transform(GeoTransform::new(354000.0, 6185000.0, 2.0, -2.0));
    image
}

#[test]
fn metadata_parses_and_derives_earth_sun_distance() {
    let metadata = parse_imd(Cursor::new(scene_imd())).unwrap();

    assert_eq!(metadata.mean_sun_elevation, 90.0);
    assert_eq!(metadata.acquisition_time, "2016-10-23T17:46:54.796950Z");

    // Hand-computed for 2016-10-23 17:46:54.8 UT:
    // JD = 2457685.2409, g = 6409.35° (≡ 289.35°), d = 0.99472 AU.
    assert_relative_eq!(metadata.earth_sun_distance, 0.99472, epsilon = 1e-3);
}

#[test]
fn reflectance_matches_radiometric_formula() {
    let metadata = parse_imd(Cursor::new(scene_imd())).unwrap();
    let image = scene_image();

    let toa = convert_to_toa(&image, &metadata).unwrap();

    // Sun at zenith: scale = d²·π exactly.
    let d = metadata.earth_sun_distance;
    let scale = d * d * std::f64::consts::PI;

    let raw = image.get(0, 0).unwrap();
    let reflectance = toa.get(0, 0).unwrap();
    assert!(reflectance.is_valid());

    for i in 0..NUM_WORLDVIEW_BANDS {
        let gain = metadata.abs_cal_factor[i] / metadata.effective_bandwidth[i];
        let expected = raw[i] as f64 * gain * scale / WORLDVIEW_ESUN[i] as f64;
        assert_relative_eq!(reflectance[i] as f64, expected, epsilon = 1e-4);
    }

    // Spot-check one band end to end: Blue DN 800, gain 0.5,
    // reflectance = 800 · 0.5 · 0.98946π / 1974.2416 ≈ 0.62975.
    let blue = reflectance[WorldViewBand::Blue.index()];
    assert_relative_eq!(blue as f64, 0.62975, epsilon = 1e-3);

    // The masked pixel converts formally but stays invalid.
    assert!(!toa.get(1, 1).unwrap().is_valid());
}

#[test]
fn classification_labels_and_output_roundtrip() {
    let metadata = parse_imd(Cursor::new(scene_imd())).unwrap();
    let image = scene_image();

    let classified = classify_image(&image, &metadata, &DetectionParams::default()).unwrap();

    assert_eq!(classified.get(0, 0).unwrap(), WaterClass::Water.value());
    assert_eq!(classified.get(0, 1).unwrap(), WaterClass::Land.value());
    assert_eq!(classified.get(1, 0).unwrap(), WaterClass::Land.value());
    assert_eq!(classified.get(1, 1).unwrap(), WaterClass::NoData.value());

    let summary = summarize(&classified);
    assert_eq!(summary.water, 1);
    assert_eq!(summary.land, 2);
    assert_eq!(summary.nodata, 1);

    // Write and read back: labels, nodata declaration and georeference
    // must survive the GeoTIFF encoding.
    let buffer = write_class_to_buffer(&classified).unwrap();
    let loaded = read_class_from_buffer(&buffer).unwrap();

    assert_eq!(loaded.shape(), (2, 2));
    assert_eq!(loaded.get(0, 0).unwrap(), WaterClass::Water.value());
    assert_eq!(loaded.get(1, 1).unwrap(), WaterClass::NoData.value());
    assert_eq!(loaded.nodata(), Some(WaterClass::NoData.value()));
    assert_relative_eq!(loaded.transform().origin_x, 354000.0);
    assert_relative_eq!(loaded.transform().pixel_height, -2.0);
}

#[test]
fn metadata_loads_from_delivery_files() {
    use floodmark_algorithms::water::load_worldview_metadata;
    use std::io::Write;
    use std::path::PathBuf;

    let mut imd_file = tempfile::NamedTempFile::with_suffix(".IMD").unwrap();
    imd_file.write_all(scene_imd().as_bytes()).unwrap();
    imd_file.flush().unwrap();

    let paths = vec![
        PathBuf::from("unrelated/README.txt"),
        imd_file.path().to_path_buf(),
    ];

    let metadata = load_worldview_metadata(&paths).unwrap();
    assert_eq!(metadata.mean_sun_elevation, 90.0);

    // Without the metadata file in the candidate set the driver refuses.
    let missing = vec![PathBuf::from("unrelated/README.txt")];
    assert!(load_worldview_metadata(&missing).is_err());
}

#[test]
fn detection_threshold_is_configurable() {
    let metadata = parse_imd(Cursor::new(scene_imd())).unwrap();
    let image = scene_image();

    // An absurdly high threshold turns every valid pixel into land.
    let strict = DetectionParams {
        ndwi_threshold: 0.99,
    };
    let classified = classify_image(&image, &metadata, &strict).unwrap();
    let summary = summarize(&classified);

    assert_eq!(summary.water, 0);
    assert_eq!(summary.land, 3);
    assert_eq!(summary.nodata, 1);
}
