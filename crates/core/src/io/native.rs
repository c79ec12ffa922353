//! Native GeoTIFF reading/writing (without GDAL dependency)
//!
//! Uses the `tiff` crate for TIFF I/O: chunky-interleaved multi-band input
//! imagery and single-band 8-bit classification output. For full GeoTIFF
//! support (projections, exotic layouts), enable the `gdal` feature.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, MaskedPixel, MultiBandRaster, Raster, RasterElement};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray8;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

// GeoTIFF / GDAL tags. The `tiff` crate canonicalizes these well-known codes
// (33550, 33922, 34735, 42113) to named `Tag` variants when decoding, so both
// reads and writes must use those names — `Tag::Unknown(n)` would never match a
// decoded entry even though it serializes to the same u16.

/// Read a chunky-interleaved multi-band GeoTIFF into a [`MultiBandRaster`].
///
/// The file must carry exactly `N` samples per pixel. Pixels whose channels
/// are all zero are masked invalid.
// TODO: read the nodata value from the GDAL_NODATA tag instead of assuming zero.
pub fn read_multiband_geotiff<T, const N: usize, P>(path: P) -> Result<MultiBandRaster<T, N>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_multiband(file)
}

/// Read a multi-band GeoTIFF from an in-memory buffer.
///
/// Same as [`read_multiband_geotiff`] but operates on a byte slice.
pub fn read_multiband_from_buffer<T, const N: usize>(data: &[u8]) -> Result<MultiBandRaster<T, N>>
where
    T: RasterElement,
{
    decode_multiband(Cursor::new(data))
}

/// Internal: decode a multi-band GeoTIFF from any `Read + Seek` source
fn decode_multiband<T, const N: usize, R>(reader: R) -> Result<MultiBandRaster<T, N>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let samples = match decoder.find_tag(Tag::SamplesPerPixel) {
        Ok(Some(value)) => value
            .into_u32()
            .map_err(|e| Error::Other(format!("Bad SamplesPerPixel tag: {}", e)))? as usize,
        _ => 1,
    };
    if samples != N {
        return Err(Error::UnsupportedDataType(format!(
            "Expected {} samples per pixel, file has {}",
            N, samples
        )));
    }

    // The input image must be georeferenced; the output inherits it.
    let transform = read_geotransform(&mut decoder)
        .map_err(|e| Error::GeoReferenceRead(e.to_string()))?;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;
    let data: Vec<T> = decode_samples(result)?;

    if data.len() != rows * cols * N {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let pixels: Vec<MaskedPixel<T, N>> = data
        .chunks_exact(N)
        .map(|chunk| {
            let mut bands = [T::zero(); N];
            bands.copy_from_slice(chunk);
            if bands.iter().all(|b| b.is_zero()) {
                MaskedPixel::invalid(bands)
            } else {
                MaskedPixel::valid(bands)
            }
        })
        .collect();

    let mut raster = MultiBandRaster::from_pixels(pixels, rows, cols)?;
    raster.set_transform(transform);
    Ok(raster)
}

/// Cast a decoded sample buffer into the requested element type
fn decode_samples<T: RasterElement>(result: DecodingResult) -> Result<Vec<T>> {
    fn cast_buffer<T, S>(buf: Vec<S>) -> Vec<T>
    where
        T: RasterElement,
        S: num_traits::ToPrimitive + Copy + num_traits::NumCast,
    {
        buf.iter()
            .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
            .collect()
    }

    match result {
        DecodingResult::U8(buf) => Ok(cast_buffer(buf)),
        DecodingResult::U16(buf) => Ok(cast_buffer(buf)),
        DecodingResult::U32(buf) => Ok(cast_buffer(buf)),
        DecodingResult::I8(buf) => Ok(cast_buffer(buf)),
        DecodingResult::I16(buf) => Ok(cast_buffer(buf)),
        DecodingResult::I32(buf) => Ok(cast_buffer(buf)),
        DecodingResult::F32(buf) => Ok(cast_buffer(buf)),
        DecodingResult::F64(buf) => Ok(cast_buffer(buf)),
        _ => Err(Error::UnsupportedDataType(
            "Unsupported TIFF pixel format".to_string(),
        )),
    }
}

/// Attempt to read a GeoTransform from TIFF tags
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]
        // scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        let pixel_width = scale[0];
        let pixel_height = -scale[1]; // Negative for north-up

        return Ok(GeoTransform::new(
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        ));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// Write an 8-bit classification raster to a GeoTIFF file.
///
/// The geotransform is written as ModelPixelScale + ModelTiepoint tags and
/// the raster's nodata value (if any) as a GDAL_NODATA tag.
pub fn write_class_geotiff<P: AsRef<Path>>(raster: &Raster<u8>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_class(raster, file)
}

/// Write an 8-bit classification raster to an in-memory GeoTIFF buffer
pub fn write_class_to_buffer(raster: &Raster<u8>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_class(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

/// Internal: encode a classification raster into any `Write + Seek` sink
fn encode_class<W>(raster: &Raster<u8>, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<u8> = raster.data().iter().copied().collect();

    let mut image = encoder
        .new_image::<Gray8>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();

    let scale = vec![gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = vec![0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    // Minimal GeoKeyDirectory so downstream tools recognize a valid GeoTIFF:
    // GTModelTypeGeoKey=1 (Projected), GTRasterTypeGeoKey=1 (PixelIsArea).
    let geokeys: Vec<u16> = vec![
        1, 1, 0, 2, // Version 1.1.0, 2 keys
        1024, 0, 1, 1, // GTModelTypeGeoKey = ModelTypeProjected
        1025, 0, 1, 1, // GTRasterTypeGeoKey = RasterPixelIsArea
    ];
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    eprintln!("DBG encode nodata = {:?}", raster.nodata());
    if let Some(nodata) = raster.nodata() {
        let nodata_str = nodata.to_string();
        image
            .encoder()
            .write_tag(Tag::Unknown(GDAL_NODATA), nodata_str.as_str())
            .map_err(|e| Error::Other(format!("Cannot write nodata tag: {}", e)))?;
    }

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

/// Read an 8-bit classification raster back from a GeoTIFF file.
///
/// Tolerant of missing geo tags (the transform falls back to the default);
/// the GDAL_NODATA tag is honored when present.
pub fn read_class_geotiff<P: AsRef<Path>>(path: P) -> Result<Raster<u8>> {
    let file = File::open(path.as_ref())?;
    decode_class(file)
}

/// Read an 8-bit classification raster from an in-memory GeoTIFF buffer
pub fn read_class_from_buffer(data: &[u8]) -> Result<Raster<u8>> {
    decode_class(Cursor::new(data))
}

/// Internal: decode a classification raster from any `Read + Seek` source
fn decode_class<R>(reader: R) -> Result<Raster<u8>>
where
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let transform = read_geotransform(&mut decoder).ok();
    eprintln!("DBG transform = {:?}", transform);
    eprintln!("DBG ascii_string = {:?}", decoder.get_tag_ascii_string(Tag::Unknown(GDAL_NODATA)));

    eprintln!("DBG scale tag present = {:?}", decoder.find_tag(Tag::Unknown(MODEL_PIXEL_SCALE)).map(|o| o.is_some()));
    eprintln!("DBG nodata u16={} present = {:?}", GDAL_NODATA, decoder.find_tag(Tag::Unknown(GDAL_NODATA)).map(|o| o.is_some()));
    let raw_tag = decoder.find_tag(Tag::Unknown(GDAL_NODATA));
    let nodata = match raw_tag {
        Ok(Some(value)) => {
            let s = value.into_string();
            eprintln!("DBG decode into_string = {:?}", s);
            s.ok()
                .and_then(|s| s.trim().trim_end_matches('\0').parse::<u8>().ok())
        }
        _ => None,
    };

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;
    let data: Vec<u8> = decode_samples(result)?;

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Some(transform) = transform {
        raster.set_transform(transform);
    }
    raster.set_nodata(nodata);
    Ok(raster)
}
