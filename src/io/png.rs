//! PNG heightfield I/O (16-bit grayscale).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::field::Heightfield;

/// Errors that can occur during PNG load or save.
#[derive(Error, Debug)]
pub enum PngIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("expected a grayscale image, got {0}")]
    NotGrayscale(String),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f64, f64),
}

/// Options for PNG save.
#[derive(Debug, Clone)]
pub struct PngOptions {
    /// Minimum height value for normalization.
    pub min_height: f64,
    /// Maximum height value for normalization.
    pub max_height: f64,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngOptions {
    /// Creates options with the height range auto-detected from the field.
    ///
    /// Saving a constant field with auto-detected range fails validation,
    /// since min equals max.
    pub fn auto_range(field: &Heightfield) -> Self {
        let (min, max) = field.height_range();
        Self {
            min_height: min,
            max_height: max,
            ..Default::default()
        }
    }
}

/// Loads a grayscale PNG as a heightfield normalized to [0, 1].
///
/// 8-bit sources are widened to 16 bits before normalization. Color images
/// are rejected rather than silently converted.
pub fn load_png(path: &Path) -> Result<Heightfield, PngIoError> {
    let img = image::open(path)?;
    let gray = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => img.into_luma16(),
        other => return Err(PngIoError::NotGrayscale(format!("{:?}", other.color()))),
    };

    let (width, height) = gray.dimensions();
    let data = gray
        .pixels()
        .map(|p| p.0[0] as f64 / 65535.0)
        .collect::<Vec<f64>>();

    Ok(Heightfield {
        width,
        height,
        data,
    })
}

/// Saves a heightfield as a 16-bit grayscale PNG.
///
/// Heights are normalized from `[min_height, max_height]` to the full
/// 16-bit span; values outside the range are clamped.
pub fn save_png(
    field: &Heightfield,
    path: &Path,
    options: &PngOptions,
) -> Result<(), PngIoError> {
    let min = options.min_height;
    let max = options.max_height;

    if min >= max {
        return Err(PngIoError::InvalidHeightRange(min, max));
    }

    let range = max - min;
    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(field.width, field.height);

    for y in 0..field.height {
        for x in 0..field.width {
            let normalized = ((field.get(x, y) - min) / range).clamp(0.0, 1.0);
            let value = (normalized * 65535.0) as u16;
            img.put_pixel(x, y, Luma([value]));
        }
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // Convert the u16 buffer to bytes for the encoder.
    let raw_data = img.as_raw();
    let byte_slice: &[u8] = bytemuck::cast_slice(raw_data);

    encoder.write_image(
        byte_slice,
        field.width,
        field.height,
        image::ExtendedColorType::L16,
    )?;

    Ok(())
}
