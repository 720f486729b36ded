//! Binary PGM (P5) heightfield I/O.
//!
//! PGM is the plainest interchange format for grayscale terrain and the one
//! most command-line tooling understands; 16-bit maxval keeps the full
//! height resolution.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::DynamicImage;
use thiserror::Error;

use crate::field::Heightfield;

/// Errors that can occur during PGM load or save.
#[derive(Error, Debug)]
pub enum PgmIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("expected a grayscale image, got {0}")]
    NotGrayscale(String),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f64, f64),
}

/// Loads a PGM file as a heightfield normalized to [0, 1].
///
/// Both 8-bit and 16-bit maxvals are accepted; 8-bit sources are widened
/// before normalization.
pub fn load_pgm(path: &Path) -> Result<Heightfield, PgmIoError> {
    let img = image::open(path)?;
    let gray = match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => img.into_luma16(),
        other => return Err(PgmIoError::NotGrayscale(format!("{:?}", other.color()))),
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

/// Saves a heightfield as a binary PGM with 16-bit samples.
///
/// Heights are normalized from `[min_height, max_height]`; values outside
/// the range are clamped. The header and raster are written by hand:
/// samples with maxval > 255 are big-endian per the format.
pub fn save_pgm(
    field: &Heightfield,
    path: &Path,
    min_height: f64,
    max_height: f64,
) -> Result<(), PgmIoError> {
    if min_height >= max_height {
        return Err(PgmIoError::InvalidHeightRange(min_height, max_height));
    }

    let range = max_height - min_height;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write!(writer, "P5\n{} {}\n65535\n", field.width, field.height)?;
    for &h in &field.data {
        let normalized = ((h - min_height) / range).clamp(0.0, 1.0);
        let value = (normalized * 65535.0) as u16;
        writer.write_all(&value.to_be_bytes())?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pgm_round_trip() {
        let field = Heightfield::from_fn(16, 12, |x, y| (x * y) as f64 / (15.0 * 11.0));

        let dir = tempdir().unwrap();
        let path = dir.path().join("terrain.pgm");
        save_pgm(&field, &path, 0.0, 1.0).unwrap();

        let loaded = load_pgm(&path).unwrap();
        assert_eq!(loaded.width, 16);
        assert_eq!(loaded.height, 12);
        for (a, b) in field.data.iter().zip(loaded.data.iter()) {
            assert!((a - b).abs() < 2.0 / 65535.0);
        }
    }

    #[test]
    fn test_pgm_header_and_payload_size() {
        let field = Heightfield::new(4, 3);
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.pgm");
        save_pgm(&field, &path, 0.0, 1.0).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let header = b"P5\n4 3\n65535\n";
        assert!(bytes.starts_with(header));
        // Two bytes per cell after the header.
        assert_eq!(bytes.len(), header.len() + 4 * 3 * 2);
    }

    #[test]
    fn test_save_rejects_invalid_range() {
        let field = Heightfield::new(4, 4);
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.pgm");

        let result = save_pgm(&field, &path, 0.5, 0.5);
        assert!(matches!(result, Err(PgmIoError::InvalidHeightRange(_, _))));
    }
}
