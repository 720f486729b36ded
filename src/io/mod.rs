//! Heightfield file I/O.
//!
//! Supported formats: 16-bit grayscale PNG and binary PGM (P5). Heights are
//! normalized to [0, 1] on load; saving maps a configurable height range
//! back onto the 16-bit sample span.

mod pgm;
mod png;

pub use pgm::{load_pgm, save_pgm, PgmIoError};
pub use png::{load_png, save_png, PngIoError, PngOptions};

use std::path::Path;

use thiserror::Error;

use crate::field::Heightfield;

/// Errors raised by the extension-dispatching load/save helpers.
#[derive(Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Png(#[from] PngIoError),
    #[error(transparent)]
    Pgm(#[from] PgmIoError),
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Loads a heightfield, picking the decoder from the file extension.
pub fn load_heightfield(path: &Path) -> Result<Heightfield, IoError> {
    match extension_of(path).as_deref() {
        Some("png") => Ok(load_png(path)?),
        Some("pgm") => Ok(load_pgm(path)?),
        other => Err(IoError::UnsupportedExtension(
            other.unwrap_or("").to_string(),
        )),
    }
}

/// Saves a heightfield, picking the encoder from the file extension.
///
/// Heights are normalized from `[min_height, max_height]` in both formats;
/// PNG output uses the default compression settings.
pub fn save_heightfield(
    field: &Heightfield,
    path: &Path,
    min_height: f64,
    max_height: f64,
) -> Result<(), IoError> {
    match extension_of(path).as_deref() {
        Some("png") => {
            let options = PngOptions {
                min_height,
                max_height,
                ..Default::default()
            };
            Ok(save_png(field, path, &options)?)
        }
        Some("pgm") => Ok(save_pgm(field, path, min_height, max_height)?),
        other => Err(IoError::UnsupportedExtension(
            other.unwrap_or("").to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dispatch_by_extension() {
        let field = Heightfield::from_fn(8, 8, |x, _| x as f64 / 7.0);
        let dir = tempdir().unwrap();

        for name in ["field.png", "field.pgm", "FIELD.PNG"] {
            let path = dir.path().join(name);
            save_heightfield(&field, &path, 0.0, 1.0).unwrap();
            let loaded = load_heightfield(&path).unwrap();
            assert_eq!(loaded.width, 8);
            assert_eq!(loaded.height, 8);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let field = Heightfield::new(4, 4);
        let dir = tempdir().unwrap();
        let path = dir.path().join("field.tiff");

        let result = save_heightfield(&field, &path, 0.0, 1.0);
        assert!(matches!(result, Err(IoError::UnsupportedExtension(e)) if e == "tiff"));

        let result = load_heightfield(&dir.path().join("field"));
        assert!(matches!(result, Err(IoError::UnsupportedExtension(_))));
    }
}
