//! Acquisition time parsing and Earth–Sun distance

use floodmark_core::{Error, Result};

/// Scene acquisition time, parsed from the fixed-width IMD timestamp layout
/// `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl AcquisitionTime {
    /// Parse the fixed substring extents (offsets 0, 5, 8, 11, 14, 17).
    ///
    /// Any extent that does not parse as a number is a hard
    /// [`Error::TimestampFormat`] failure, never silently defaulted.
    pub fn parse(timestamp: &str) -> Result<Self> {
        fn field<T: std::str::FromStr>(
            timestamp: &str,
            range: std::ops::Range<usize>,
            what: &str,
        ) -> Result<T> {
            timestamp
                .get(range)
                .and_then(|text| text.parse().ok())
                .ok_or_else(|| Error::TimestampFormat(format!("bad {} in {:?}", what, timestamp)))
        }

        let seconds_text = timestamp
            .get(17..)
            .ok_or_else(|| Error::TimestampFormat(format!("too short: {:?}", timestamp)))?;
        let seconds_text = seconds_text.strip_suffix('Z').unwrap_or(seconds_text);
        let second: f64 = seconds_text
            .parse()
            .map_err(|_| Error::TimestampFormat(format!("bad seconds in {:?}", timestamp)))?;

        Ok(Self {
            year: field(timestamp, 0..4, "year")?,
            month: field(timestamp, 5..7, "month")?,
            day: field(timestamp, 8..10, "day")?,
            hour: field(timestamp, 11..13, "hour")?,
            minute: field(timestamp, 14..16, "minute")?,
            second,
        })
    }
}

/// Earth–Sun distance in astronomical units at the given time.
///
/// Julian-day / mean-anomaly approximation from the WorldView radiometric
/// calibration note. The result stays within [0.983, 1.017] AU over the
/// orbital cycle.
pub fn earth_sun_distance_au(time: &AcquisitionTime) -> f64 {
    let (year, month) = if time.month <= 2 {
        (time.year - 1, time.month + 12)
    } else {
        (time.year, time.month)
    };

    let ut = time.hour as f64 + time.minute as f64 / 60.0 + time.second / 3600.0;
    let a = (year as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    let julian_day = (365.25 * (year as f64 + 4716.0)).floor()
        + (30.6001 * (month as f64 + 1.0)).floor()
        + time.day as f64
        + ut / 24.0
        + b
        - 1524.5;

    let days_since_j2000 = julian_day - 2451545.0;
    let mean_anomaly = (357.529 + 0.98560028 * days_since_j2000).to_radians();

    1.00014 - 0.01671 * mean_anomaly.cos() - 0.00014 * (2.0 * mean_anomaly).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_reference_timestamp() {
        let time = AcquisitionTime::parse("2016-10-23T17:46:54.796950Z").unwrap();
        assert_eq!(time.year, 2016);
        assert_eq!(time.month, 10);
        assert_eq!(time.day, 23);
        assert_eq!(time.hour, 17);
        assert_eq!(time.minute, 46);
        assert_relative_eq!(time.second, 54.796950, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(AcquisitionTime::parse("yesterday, around noon").is_err());
        assert!(AcquisitionTime::parse("2016-XX-23T17:46:54.796950Z").is_err());
        assert!(AcquisitionTime::parse("2016-10-23").is_err());
        assert!(AcquisitionTime::parse("").is_err());
    }

    #[test]
    fn test_distance_near_perihelion() {
        // Early January: Earth close to the Sun.
        let time = AcquisitionTime::parse("2016-01-03T12:00:00.000000Z").unwrap();
        let d = earth_sun_distance_au(&time);
        assert_relative_eq!(d, 0.9833, epsilon = 2e-3);
    }

    #[test]
    fn test_distance_near_aphelion() {
        // Early July: Earth farthest from the Sun.
        let time = AcquisitionTime::parse("2016-07-04T12:00:00.000000Z").unwrap();
        let d = earth_sun_distance_au(&time);
        assert_relative_eq!(d, 1.0167, epsilon = 2e-3);
    }

    #[test]
    fn test_distance_stays_in_orbital_range() {
        for month in 1..=12 {
            let stamp = format!("2023-{:02}-15T06:30:00.000000Z", month);
            let time = AcquisitionTime::parse(&stamp).unwrap();
            let d = earth_sun_distance_au(&time);
            assert!(
                (0.983..=1.017).contains(&d),
                "month {}: {} AU out of range",
                month,
                d
            );
        }
    }
}
