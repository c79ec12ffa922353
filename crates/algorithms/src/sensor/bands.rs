//! WorldView band registry and solar irradiance constants

/// Number of spectral bands in a WorldView-2/3 multispectral scene
pub const NUM_WORLDVIEW_BANDS: usize = 8;

/// Band-averaged solar spectral irradiance, W·m⁻²·µm⁻¹
/// - Values from "Radiometric Use of WorldView-2 Imagery"
pub const WORLDVIEW_ESUN: [f32; NUM_WORLDVIEW_BANDS] = [
    1758.2229, // Coastal
    1974.2416, // Blue
    1856.4104, // Green
    1738.4791, // Yellow
    1559.4555, // Red
    1342.0695, // Red Edge
    1069.7302, // NIR 1
    861.2866,  // NIR 2
];

/// One spectral band of an 8-band WorldView sensor.
///
/// Discriminants are contiguous and zero-based, matching the channel order
/// physically present in the interleaved source raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldViewBand {
    Coastal = 0,
    Blue = 1,
    Green = 2,
    Yellow = 3,
    Red = 4,
    RedEdge = 5,
    Nir1 = 6,
    Nir2 = 7,
}

impl WorldViewBand {
    /// Zero-based channel index into the interleaved raster
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Resolve an IMD band group name (`BAND_C` .. `BAND_N2`).
    ///
    /// Unknown names yield `None`; metadata files contain unrelated groups
    /// that callers skip rather than reject.
    pub fn from_group_name(name: &str) -> Option<Self> {
        match name {
            "BAND_C" => Some(Self::Coastal),
            "BAND_B" => Some(Self::Blue),
            "BAND_G" => Some(Self::Green),
            "BAND_Y" => Some(Self::Yellow),
            "BAND_R" => Some(Self::Red),
            "BAND_RE" => Some(Self::RedEdge),
            "BAND_N" => Some(Self::Nir1),
            "BAND_N2" => Some(Self::Nir2),
            _ => None,
        }
    }
}
