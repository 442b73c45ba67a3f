//! NDVI time-series raster input.
//!
//! The raster is a stack of equally-sized bands (one per acquisition
//! date), stored row-major, with a GDAL-style affine transform mapping
//! pixel `(col, row)` to map coordinates.
//!
//! Rasters are read from `GeoTIFF` (every page and every sample of a
//! multi-sample page is a band) or, for any other extension, from a JSON
//! document with the same fields as [`NdviRaster`].

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::GenerateError;

/// A multi-band NDVI raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdviRaster {
    /// Pixels per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// GDAL geotransform: `[x_origin, pixel_width, row_rotation,
    /// y_origin, column_rotation, pixel_height]`.
    pub transform: [f64; 6],
    /// Raw NDVI values, one `width * height` vector per time slice.
    pub bands: Vec<Vec<f64>>,
}

impl NdviRaster {
    /// Reads a raster from disk and checks its shape. `.tif`/`.tiff`
    /// files are decoded as `GeoTIFF`; anything else is parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] if the file cannot be read or decoded, or
    /// the raster shape is inconsistent.
    pub fn load(path: &Path) -> Result<Self, GenerateError> {
        let raster = if is_geotiff(path) {
            Self::from_geotiff(BufReader::new(File::open(path)?))?
        } else {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str::<Self>(&contents)?
        };
        raster.validate()?;
        log::debug!(
            "Loaded {}x{} raster with {} bands from {}",
            raster.width,
            raster.height,
            raster.bands.len(),
            path.display()
        );
        Ok(raster)
    }

    /// Decodes a `GeoTIFF`. Each page contributes one band per sample;
    /// the transform comes from the `ModelPixelScale` and
    /// `ModelTiepoint` tags of the first page.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Tiff`] if decoding fails and
    /// [`GenerateError::InvalidRaster`] if the georeferencing tags are
    /// missing or pages differ in size.
    pub fn from_geotiff<R: Read + Seek>(reader: R) -> Result<Self, GenerateError> {
        let mut decoder = Decoder::new(reader)?;
        let dimensions = decoder.dimensions()?;
        let transform = geo_transform(&mut decoder)?;

        let width = dimensions.0 as usize;
        let height = dimensions.1 as usize;
        let area = area(width, height)?;

        let mut bands = Vec::new();
        let mut page = 0;
        loop {
            let page_dimensions = decoder.dimensions()?;
            if page_dimensions != dimensions {
                return Err(GenerateError::InvalidRaster {
                    message: format!(
                        "page {page} is {}x{}, expected {width}x{height}",
                        page_dimensions.0, page_dimensions.1
                    ),
                });
            }

            let samples = decoded_values(decoder.read_image()?);
            push_bands(&mut bands, &samples, area, page)?;

            if !decoder.more_images() {
                break;
            }
            decoder.next_image()?;
            page += 1;
        }

        Ok(Self {
            width,
            height,
            transform,
            bands,
        })
    }

    /// Checks that there is at least one band and that every band holds
    /// exactly `width * height` values.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidRaster`] describing the first
    /// problem found.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.bands.is_empty() {
            return Err(GenerateError::InvalidRaster {
                message: "raster has no bands".to_string(),
            });
        }

        let expected = area(self.width, self.height)?;
        for (i, band) in self.bands.iter().enumerate() {
            if band.len() != expected {
                return Err(GenerateError::InvalidRaster {
                    message: format!(
                        "band {i} has {} values, expected {expected} ({}x{})",
                        band.len(),
                        self.width,
                        self.height
                    ),
                });
            }
        }

        Ok(())
    }

    /// Per-pixel maximum across all bands. `NaN` values (no data) are
    /// ignored unless every band is `NaN` at that pixel.
    #[must_use]
    pub fn peak(&self) -> Vec<f64> {
        let len = self.bands.first().map_or(0, Vec::len);
        let mut peak = vec![f64::NAN; len];
        for band in &self.bands {
            for (max, value) in peak.iter_mut().zip(band) {
                *max = max.max(*value);
            }
        }
        peak
    }

    /// Map coordinates `(x, y)` of the center of pixel `(col, row)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        let [x0, dx, rx, y0, ry, dy] = self.transform;
        let c = col as f64 + 0.5;
        let r = row as f64 + 0.5;
        (x0 + c * dx + r * rx, y0 + c * ry + r * dy)
    }
}

/// Number of pixels in a `width` x `height` raster.
fn area(width: usize, height: usize) -> Result<usize, GenerateError> {
    width
        .checked_mul(height)
        .ok_or_else(|| GenerateError::InvalidRaster {
            message: format!("{width}x{height} raster is too large"),
        })
}

fn is_geotiff(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
}

/// GDAL transform from the `GeoTIFF` pixel scale and first tie point.
/// Tie point `(i, j) -> (x, y)` anchors the pixel grid; rows run south.
fn geo_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<[f64; 6], GenerateError> {
    let scale = decoder
        .find_tag(Tag::ModelPixelScaleTag)?
        .map(tiff::decoder::ifd::Value::into_f64_vec)
        .transpose()?
        .unwrap_or_default();
    let tiepoint = decoder
        .find_tag(Tag::ModelTiepointTag)?
        .map(tiff::decoder::ifd::Value::into_f64_vec)
        .transpose()?
        .unwrap_or_default();

    let &[sx, sy, ..] = scale.as_slice() else {
        return Err(GenerateError::InvalidRaster {
            message: "missing ModelPixelScale tag".to_string(),
        });
    };
    let &[i, j, _, x, y, ..] = tiepoint.as_slice() else {
        return Err(GenerateError::InvalidRaster {
            message: "missing ModelTiepoint tag".to_string(),
        });
    };

    Ok([x - i * sx, sx, 0.0, y + j * sy, 0.0, -sy])
}

#[allow(clippy::cast_precision_loss)]
fn decoded_values(result: DecodingResult) -> Vec<f64> {
    match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
    }
}

/// Splits one page's interleaved samples into bands of `area` pixels.
fn push_bands(
    bands: &mut Vec<Vec<f64>>,
    samples: &[f64],
    area: usize,
    page: usize,
) -> Result<(), GenerateError> {
    if area == 0 || samples.is_empty() || !samples.len().is_multiple_of(area) {
        return Err(GenerateError::InvalidRaster {
            message: format!(
                "page {page} holds {} samples for {area} pixels",
                samples.len()
            ),
        });
    }

    let per_pixel = samples.len() / area;
    for offset in 0..per_pixel {
        bands.push(samples.iter().skip(offset).step_by(per_pixel).copied().collect());
    }
    Ok(())
}

/// Groups the `true` cells of a row-major mask into 4-connected regions.
///
/// Regions are returned in the order their first cell appears in a
/// row-major scan; each region lists its cell indices. A mask whose
/// length is not `width * height` has no regions.
#[must_use]
pub fn label_regions(mask: &[bool], width: usize, height: usize) -> Vec<Vec<usize>> {
    if width.checked_mul(height) != Some(mask.len()) {
        return Vec::new();
    }

    let mut visited = vec![false; mask.len()];
    let mut regions = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }

        let mut region = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(idx) = queue.pop_front() {
            region.push(idx);
            let col = idx % width;
            let row = idx / width;

            let mut neighbors = Vec::with_capacity(4);
            if col > 0 {
                neighbors.push(idx - 1);
            }
            if col + 1 < width {
                neighbors.push(idx + 1);
            }
            if row > 0 {
                neighbors.push(idx - width);
            }
            if row + 1 < height {
                neighbors.push(idx + width);
            }

            for n in neighbors {
                if mask[n] && !visited[n] {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }

        region.sort_unstable();
        regions.push(region);
    }

    regions
}
