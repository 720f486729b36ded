//! Heightfield storage and bilinear scalar sampling.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a heightfield from raw data.
#[derive(Error, Debug)]
pub enum FieldError {
    /// Data length does not match the declared dimensions.
    #[error("data length {len} does not match a {width}x{height} grid")]
    DimensionMismatch {
        width: u32,
        height: u32,
        len: usize,
    },
}

/// A rectangular grid of elevation values stored in row-major order.
///
/// Heights are unitless doubles; the file loaders normalize sources to
/// `[0, 1]`. Index layout is `y * width + x`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heightfield {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Elevation values, row-major.
    pub data: Vec<f64>,
}

impl Heightfield {
    /// Creates a zero-filled heightfield.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width as usize) * (height as usize)],
        }
    }

    /// Creates a heightfield from existing row-major data.
    ///
    /// Fails if the data length does not equal `width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<f64>) -> Result<Self, FieldError> {
        let expected = (width as usize) * (height as usize);
        if data.len() != expected {
            return Err(FieldError::DimensionMismatch {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a heightfield by evaluating `f` at every cell.
    pub fn from_fn<F: FnMut(u32, u32) -> f64>(width: u32, height: u32, mut f: F) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Returns the height at the given cell.
    ///
    /// # Panics
    /// Panics in debug builds if x or y is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> f64 {
        debug_assert!(x < self.width && y < self.height);
        self.data[(y * self.width + x) as usize]
    }

    /// Sets the height at the given cell.
    ///
    /// # Panics
    /// Panics in debug builds if x or y is out of bounds.
    pub fn set(&mut self, x: u32, y: u32, value: f64) {
        debug_assert!(x < self.width && y < self.height);
        self.data[(y * self.width + x) as usize] = value;
    }

    /// Returns the total number of cells.
    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns the (min, max) elevation over all cells.
    pub fn height_range(&self) -> (f64, f64) {
        let mut min = f64::MAX;
        let mut max = f64::MIN;

        for &h in &self.data {
            min = min.min(h);
            max = max.max(h);
        }

        (min, max)
    }

    /// Returns true if `pos` lies in the region where bilinear sampling is
    /// defined: `[0, width-2] x [0, height-2]`.
    ///
    /// Cells in the last row and column only ever act as interpolation
    /// neighbors, never as anchor cells, so the anchor coordinate must stop
    /// one cell short of each upper edge.
    pub fn in_sample_bounds(&self, pos: DVec2) -> bool {
        pos.x >= 0.0
            && pos.y >= 0.0
            && pos.x <= self.width as f64 - 2.0
            && pos.y <= self.height as f64 - 2.0
    }

    /// Bilinearly interpolates the height at a continuous position.
    ///
    /// The anchor cell is `(floor(x), floor(y))` and the four surrounding
    /// cells are blended with weights `(1-u)(1-v)`, `u(1-v)`, `(1-u)v`, `uv`
    /// where `(u, v)` is the fractional offset inside the cell. Exact grid
    /// positions reproduce stored values and every result stays within the
    /// min/max of the four neighbors.
    ///
    /// # Panics
    /// Panics in debug builds if `pos` is outside the valid sampling region.
    pub fn sample(&self, pos: DVec2) -> f64 {
        debug_assert!(self.in_sample_bounds(pos));
        let xi = pos.x.floor() as u32;
        let yi = pos.y.floor() as u32;
        let u = pos.x - pos.x.floor();
        let v = pos.y - pos.y.floor();

        let ul = self.get(xi, yi);
        let ur = self.get(xi + 1, yi);
        let ll = self.get(xi, yi + 1);
        let lr = self.get(xi + 1, yi + 1);

        ul * (1.0 - u) * (1.0 - v) + ur * u * (1.0 - v) + ll * (1.0 - u) * v + lr * u * v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heightfield_creation() {
        let field = Heightfield::new(8, 6);
        assert_eq!(field.width, 8);
        assert_eq!(field.height, 6);
        assert_eq!(field.data.len(), 48);
        assert!(field.data.iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_from_data_rejects_wrong_length() {
        let result = Heightfield::from_data(4, 4, vec![0.0; 15]);
        assert!(matches!(
            result,
            Err(FieldError::DimensionMismatch { len: 15, .. })
        ));
    }

    #[test]
    fn test_get_set_roundtrip() {
        let mut field = Heightfield::new(5, 5);
        field.set(3, 2, 0.75);
        assert_eq!(field.get(3, 2), 0.75);
        assert_eq!(field.data[2 * 5 + 3], 0.75);
    }

    #[test]
    fn test_height_range() {
        let field = Heightfield::from_fn(4, 4, |x, y| (x + y) as f64 * 0.1);
        let (min, max) = field.height_range();
        assert_eq!(min, 0.0);
        assert!((max - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_sample_identity_at_grid_positions() {
        let field = Heightfield::from_fn(6, 5, |x, y| (x as f64 * 1.3).sin() + y as f64 * 0.7);
        for y in 0..4 {
            for x in 0..5 {
                let sampled = field.sample(DVec2::new(x as f64, y as f64));
                assert_eq!(sampled, field.get(x, y));
            }
        }
    }

    #[test]
    fn test_sample_matches_manual_bilinear() {
        let field = Heightfield::from_data(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let center = field.sample(DVec2::new(0.5, 0.5));
        assert!((center - 1.5).abs() < 1e-12);
        // Pure horizontal blend along the top row.
        let quarter = field.sample(DVec2::new(0.25, 0.0));
        assert!((quarter - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_sample_bounded_by_neighbors() {
        let field = Heightfield::from_fn(8, 8, |x, y| ((x * 31 + y * 17) % 13) as f64);
        for &(px, py) in &[(0.3, 0.8), (2.5, 4.1), (6.0, 6.0), (5.9, 0.01)] {
            let pos = DVec2::new(px, py);
            let value = field.sample(pos);
            let xi = px.floor() as u32;
            let yi = py.floor() as u32;
            let corners = [
                field.get(xi, yi),
                field.get(xi + 1, yi),
                field.get(xi, yi + 1),
                field.get(xi + 1, yi + 1),
            ];
            let min = corners.iter().cloned().fold(f64::MAX, f64::min);
            let max = corners.iter().cloned().fold(f64::MIN, f64::max);
            assert!(value >= min - 1e-12 && value <= max + 1e-12);
        }
    }

    #[test]
    fn test_sample_bounds_predicate() {
        let field = Heightfield::new(4, 6);
        assert!(field.in_sample_bounds(DVec2::new(0.0, 0.0)));
        assert!(field.in_sample_bounds(DVec2::new(2.0, 4.0)));
        assert!(field.in_sample_bounds(DVec2::new(1.999, 3.5)));
        assert!(!field.in_sample_bounds(DVec2::new(2.001, 0.0)));
        assert!(!field.in_sample_bounds(DVec2::new(0.0, 4.5)));
        assert!(!field.in_sample_bounds(DVec2::new(-0.1, 1.0)));
    }
}
