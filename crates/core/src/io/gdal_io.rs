//! GeoTIFF reading and writing using GDAL

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, MaskedPixel, MultiBandRaster, Raster, RasterElement};
use gdal::raster::{Buffer, GdalType, RasterCreationOptions};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use std::path::Path;

/// Read a multi-band GeoTIFF into a [`MultiBandRaster`].
///
/// The dataset must carry exactly `N` bands. Pixels whose channels are all
/// zero are masked invalid, and a readable geotransform is required.
pub fn read_multiband_geotiff<T, const N: usize, P>(path: P) -> Result<MultiBandRaster<T, N>>
where
    T: RasterElement + GdalType,
    P: AsRef<Path>,
{
    let dataset = Dataset::open(path.as_ref())?;
    let (cols, rows) = dataset.raster_size();

    if dataset.raster_count() != N {
        return Err(Error::UnsupportedDataType(format!(
            "Expected {} bands, dataset has {}",
            N,
            dataset.raster_count()
        )));
    }

    let gt = dataset
        .geo_transform()
        .map_err(|e| Error::GeoReferenceRead(e.to_string()))?;

    // Band planes, then interleave into per-pixel channel arrays
    let mut planes: Vec<Vec<T>> = Vec::with_capacity(N);
    for band_idx in 1..=N {
        let band = dataset.rasterband(band_idx)?;
        let buffer = band.read_as::<T>((0, 0), (cols, rows), (cols, rows), None)?;
        planes.push(buffer.data().to_vec());
    }

    let pixels: Vec<MaskedPixel<T, N>> = (0..rows * cols)
        .map(|i| {
            let mut bands = [T::zero(); N];
            for (b, plane) in planes.iter().enumerate() {
                bands[b] = plane[i];
            }
            if bands.iter().all(|v| v.is_zero()) {
                MaskedPixel::invalid(bands)
            } else {
                MaskedPixel::valid(bands)
            }
        })
        .collect();

    let mut raster = MultiBandRaster::from_pixels(pixels, rows, cols)?;
    raster.set_transform(GeoTransform::from_gdal(gt));

    if let Ok(srs) = dataset.spatial_ref() {
        if let Ok(wkt) = srs.to_wkt() {
            let mut crs = CRS::from_wkt(wkt);
            if let Ok(code) = srs.auth_code() {
                crs = CRS::from_epsg(code as u32);
            }
            raster.set_crs(Some(crs));
        }
    }

    Ok(raster)
}

/// Write an 8-bit classification raster to a GeoTIFF file
pub fn write_class_geotiff<P: AsRef<Path>>(raster: &Raster<u8>, path: P) -> Result<()> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let (rows, cols) = raster.shape();

    let options = RasterCreationOptions::from_iter(["COMPRESS=DEFLATE", "TILED=YES"]);
    let mut dataset = driver.create_with_band_type_with_options::<u8, _>(
        path.as_ref(),
        cols,
        rows,
        1,
        &options,
    )?;

    dataset.set_geo_transform(&raster.transform().to_gdal())?;

    if let Some(crs) = raster.crs() {
        if let Some(epsg) = crs.epsg() {
            let srs = SpatialRef::from_epsg(epsg)?;
            dataset.set_spatial_ref(&srs)?;
        } else if let Some(wkt) = crs.wkt() {
            let srs = SpatialRef::from_wkt(wkt)?;
            dataset.set_spatial_ref(&srs)?;
        }
    }

    let mut band = dataset.rasterband(1)?;
    if let Some(nodata) = raster.nodata() {
        band.set_no_data_value(Some(nodata as f64))?;
    }

    let data: Vec<u8> = raster.data().iter().copied().collect();
    let mut buffer = Buffer::new((cols, rows), data);
    band.write((0, 0), (cols, rows), &mut buffer)?;

    Ok(())
}

/// Read an 8-bit classification raster back from a GeoTIFF file
pub fn read_class_geotiff<P: AsRef<Path>>(path: P) -> Result<Raster<u8>> {
    let dataset = Dataset::open(path.as_ref())?;
    let (cols, rows) = dataset.raster_size();
    let band = dataset.rasterband(1)?;

    let buffer = band.read_as::<u8>((0, 0), (cols, rows), (cols, rows), None)?;
    let mut raster = Raster::from_vec(buffer.data().to_vec(), rows, cols)?;

    if let Ok(gt) = dataset.geo_transform() {
        raster.set_transform(GeoTransform::from_gdal(gt));
    }
    if let Some(nodata) = band.no_data_value() {
        if let Some(nd) = num_traits::cast(nodata) {
            raster.set_nodata(Some(nd));
        }
    }

    Ok(raster)
}
