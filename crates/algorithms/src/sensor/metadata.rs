//! Calibration metadata extraction from IMD files
//!
//! WorldView delivery metadata is a line-oriented text format: per-band
//! parameters grouped between `BEGIN_GROUP = BAND_x` / `END_GROUP` markers,
//! scene-level fields outside any group. The extractor is a two-state line
//! machine: outside a recognized band group, or inside one with a resolved
//! channel index.

use crate::sensor::bands::{WorldViewBand, NUM_WORLDVIEW_BANDS};
use crate::sensor::ephemeris::{earth_sun_distance_au, AcquisitionTime};
use floodmark_core::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Fields a complete metadata file must provide: one gain and one bandwidth
/// per band, plus sun elevation and acquisition time.
const REQUIRED_FIELDS: usize = 2 * NUM_WORLDVIEW_BANDS + 2;

/// Per-scene radiometric calibration record.
///
/// Built incrementally by [`parse_imd`]; `earth_sun_distance` is derived
/// from `acquisition_time` as the final step. After a successful parse the
/// record is treated as immutable for the rest of the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMetadata {
    /// Absolute calibration factor (gain), one per band
    pub abs_cal_factor: [f64; NUM_WORLDVIEW_BANDS],
    /// Effective bandwidth, one per band
    pub effective_bandwidth: [f64; NUM_WORLDVIEW_BANDS],
    /// Mean sun elevation over the scene, degrees
    pub mean_sun_elevation: f64,
    /// Earth–Sun distance, AU (derived; zero until the derive step runs)
    pub earth_sun_distance: f64,
    /// Acquisition time, `YYYY-MM-DDTHH:MM:SS.ffffffZ`
    pub acquisition_time: String,
}

impl SceneMetadata {
    /// Parse and validate a metadata file
    pub fn parse_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        parse_imd(BufReader::new(file))
    }
}

/// What a single metadata line means to the extractor.
///
/// Classification is substring-based on purpose: IMD lines carry extra
/// tokens around the keys of interest, and the format is verbose. Keeping
/// the string matching here lets the state machine in [`parse_imd`] stay
/// independent of it.
#[derive(Debug, PartialEq)]
enum MetadataLine<'a> {
    BeginGroup(&'a str),
    AbsCalFactor(&'a str),
    EffectiveBandwidth(&'a str),
    MeanSunElevation(&'a str),
    FirstLineTime(&'a str),
    Other,
}

fn classify_line(line: &str) -> MetadataLine<'_> {
    if line.contains("BEGIN_GROUP") {
        return MetadataLine::BeginGroup(group_name(line));
    }
    if line.contains("absCalFactor") {
        return MetadataLine::AbsCalFactor(value_text(line));
    }
    if line.contains("effectiveBandwidth") {
        return MetadataLine::EffectiveBandwidth(value_text(line));
    }
    if line.contains("meanSunEl") {
        return MetadataLine::MeanSunElevation(value_text(line));
    }
    if line.contains("firstLineTime") {
        return MetadataLine::FirstLineTime(time_text(line));
    }
    MetadataLine::Other
}

/// Group name: the text after the `=` separator, one leading space stripped
fn group_name(line: &str) -> &str {
    match line.split_once('=') {
        Some((_, rest)) => rest.strip_prefix(' ').unwrap_or(rest).trim_end(),
        None => "",
    }
}

/// Field value: the text after the last `=`, stripped of the trailing `;`
fn value_text(line: &str) -> &str {
    let rest = match line.rfind('=') {
        Some(pos) => &line[pos + 1..],
        None => line,
    };
    rest.trim().trim_end_matches(';').trim_end()
}

/// Timestamp: the text after the first `=`, normalized to the documented
/// `YYYY-MM-DDTHH:MM:SS.ffffffZ` layout (surrounding whitespace and the
/// IMD trailing `;` removed)
fn time_text(line: &str) -> &str {
    let rest = match line.split_once('=') {
        Some((_, rest)) => rest,
        None => line,
    };
    rest.trim().trim_end_matches(';').trim_end()
}

fn parse_float(text: &str, key: &str) -> Result<f64> {
    text.parse()
        .map_err(|_| Error::MetadataParse(format!("cannot parse {} value {:?}", key, text)))
}

/// Extract calibration metadata from an IMD text stream.
///
/// Per-band fields require an enclosing recognized band group; encountering
/// one outside a group is a parse error. Unrecognized groups and unrelated
/// lines are skipped. The stream is consumed to the end and the strict
/// completeness invariant checked: exactly `2 * NUM_WORLDVIEW_BANDS + 2`
/// required fields, or [`Error::MetadataIncomplete`]. Partial metadata is
/// never accepted.
pub fn parse_imd<R: BufRead>(reader: R) -> Result<SceneMetadata> {
    let mut metadata = SceneMetadata::default();
    let mut channel: Option<usize> = None;
    let mut found = 0usize;

    for line in reader.lines() {
        let line = line?;
        match classify_line(&line) {
            MetadataLine::BeginGroup(name) => {
                channel = WorldViewBand::from_group_name(name).map(WorldViewBand::index);
            }
            MetadataLine::AbsCalFactor(text) => {
                let index = channel.ok_or_else(|| {
                    Error::MetadataParse("absCalFactor outside band group".into())
                })?;
                metadata.abs_cal_factor[index] = parse_float(text, "absCalFactor")?;
                found += 1;
            }
            MetadataLine::EffectiveBandwidth(text) => {
                let index = channel.ok_or_else(|| {
                    Error::MetadataParse("effectiveBandwidth outside band group".into())
                })?;
                metadata.effective_bandwidth[index] = parse_float(text, "effectiveBandwidth")?;
                found += 1;
            }
            MetadataLine::MeanSunElevation(text) => {
                metadata.mean_sun_elevation = parse_float(text, "meanSunEl")?;
                found += 1;
            }
            MetadataLine::FirstLineTime(text) => {
                metadata.acquisition_time = text.to_string();
                found += 1;
            }
            MetadataLine::Other => {}
        }
    }

    if found != REQUIRED_FIELDS {
        return Err(Error::MetadataIncomplete {
            found,
            expected: REQUIRED_FIELDS,
        });
    }

    let time = AcquisitionTime::parse(&metadata.acquisition_time)?;
    metadata.earth_sun_distance = earth_sun_distance_au(&time);

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const BAND_NAMES: [&str; NUM_WORLDVIEW_BANDS] = [
        "BAND_C", "BAND_B", "BAND_G", "BAND_Y", "BAND_R", "BAND_RE", "BAND_N", "BAND_N2",
    ];

    /// Build a well-formed IMD text with per-band gain (i+1)/4 and bandwidth 0.5
    fn synthetic_imd() -> String {
        let mut text = String::from(
            "version = \"28.4\";\n\
             generationTime = 2016-10-24T20:40:27.000000Z;\n\
             productOrderId = \"056549765010_01_P001\";\n",
        );
        for (i, name) in BAND_NAMES.iter().enumerate() {
            text.push_str(&format!("BEGIN_GROUP = {}\n", name));
            text.push_str(&format!("\tabsCalFactor = {:e};\n", (i + 1) as f64 * 0.25));
            text.push_str("\teffectiveBandwidth = 5e-1;\n");
            text.push_str(&format!("END_GROUP = {}\n", name));
        }
        text.push_str("BEGIN_GROUP = IMAGE_1\n");
        text.push_str("\tmeanSunEl = 35.10;\n");
        text.push_str("\tfirstLineTime = 2016-10-23T17:46:54.796950Z;\n");
        text.push_str("END_GROUP = IMAGE_1\n");
        text
    }

    #[test]
    fn test_well_formed_parse() {
        let metadata = parse_imd(Cursor::new(synthetic_imd())).unwrap();

        for i in 0..NUM_WORLDVIEW_BANDS {
            assert_eq!(metadata.abs_cal_factor[i], (i + 1) as f64 * 0.25);
            assert_eq!(metadata.effective_bandwidth[i], 0.5);
        }
        assert_eq!(metadata.mean_sun_elevation, 35.10);
        assert_eq!(metadata.acquisition_time, "2016-10-23T17:46:54.796950Z");
        // Derived during the finalize step, not read from the file.
        assert!(metadata.earth_sun_distance > 0.983 && metadata.earth_sun_distance < 1.017);
    }

    #[test]
    fn test_groups_resolve_out_of_order() {
        // Band groups in reverse order must still land in the right slots.
        let mut text = String::new();
        for (i, name) in BAND_NAMES.iter().enumerate().rev() {
            text.push_str(&format!("BEGIN_GROUP = {}\n", name));
            text.push_str(&format!("\tabsCalFactor = {};\n", (i + 1) as f64));
            text.push_str("\teffectiveBandwidth = 1.0;\n");
            text.push_str(&format!("END_GROUP = {}\n", name));
        }
        text.push_str("meanSunEl = 50.0;\n");
        text.push_str("firstLineTime = 2020-06-01T10:00:00.000000Z;\n");

        let metadata = parse_imd(Cursor::new(text)).unwrap();
        assert_eq!(metadata.abs_cal_factor[0], 1.0);
        assert_eq!(metadata.abs_cal_factor[7], 8.0);
    }

    #[test]
    fn test_missing_field_is_incomplete() {
        let text = synthetic_imd().replacen("\tmeanSunEl = 35.10;\n", "", 1);
        let result = parse_imd(Cursor::new(text));
        assert!(matches!(
            result,
            Err(Error::MetadataIncomplete {
                found: 17,
                expected: 18
            })
        ));
    }

    #[test]
    fn test_missing_band_field_is_incomplete() {
        let text = synthetic_imd().replacen("\teffectiveBandwidth = 5e-1;\n", "", 1);
        assert!(matches!(
            parse_imd(Cursor::new(text)),
            Err(Error::MetadataIncomplete { .. })
        ));
    }

    #[test]
    fn test_gain_before_any_group_is_parse_error() {
        let text = format!("absCalFactor = 1.0;\n{}", synthetic_imd());
        assert!(matches!(
            parse_imd(Cursor::new(text)),
            Err(Error::MetadataParse(_))
        ));
    }

    #[test]
    fn test_unrecognized_group_without_band_fields_is_ignored() {
        let mut text = synthetic_imd();
        text.push_str("BEGIN_GROUP = MAP_PROJECTED_PRODUCT\n");
        text.push_str("\tmapProjName = \"UTM\";\n");
        text.push_str("END_GROUP = MAP_PROJECTED_PRODUCT\n");

        assert!(parse_imd(Cursor::new(text)).is_ok());
    }

    #[test]
    fn test_band_field_in_unrecognized_group_is_parse_error() {
        // A gain inside an unknown group has no channel to land in.
        let mut text = String::from("BEGIN_GROUP = BAND_P\n\tabsCalFactor = 1.0;\n");
        text.push_str(&synthetic_imd());
        assert!(matches!(
            parse_imd(Cursor::new(text)),
            Err(Error::MetadataParse(_))
        ));
    }

    #[test]
    fn test_unparseable_value_is_parse_error() {
        let text = synthetic_imd().replacen("meanSunEl = 35.10;", "meanSunEl = high;", 1);
        assert!(matches!(
            parse_imd(Cursor::new(text)),
            Err(Error::MetadataParse(_))
        ));
    }

    #[test]
    fn test_bad_timestamp_fails_derive_step() {
        let text = synthetic_imd().replacen(
            "firstLineTime = 2016-10-23T17:46:54.796950Z;",
            "firstLineTime = late October;",
            1,
        );
        assert!(matches!(
            parse_imd(Cursor::new(text)),
            Err(Error::TimestampFormat(_))
        ));
    }

    #[test]
    fn test_classify_line_tolerates_surrounding_tokens() {
        assert_eq!(
            classify_line("      absCalFactor = 9.295654e-03;"),
            MetadataLine::AbsCalFactor("9.295654e-03")
        );
        assert_eq!(
            classify_line("BEGIN_GROUP = BAND_RE"),
            MetadataLine::BeginGroup("BAND_RE")
        );
        assert_eq!(classify_line("END_GROUP = BAND_RE"), MetadataLine::Other);
        assert_eq!(classify_line("cloudCover = 0.003;"), MetadataLine::Other);
    }
}
