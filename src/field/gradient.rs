//! Forward-difference gradient grids and bilinear vector sampling.

use glam::DVec2;

use crate::field::Heightfield;

/// Per-cell terrain gradient, stored row-major like its source heightfield.
///
/// The grid is built once from the initial terrain. Droplet simulation keeps
/// reading this snapshot while heights change underneath it; steering from
/// the original surface is part of the reference behavior.
#[derive(Debug, Clone)]
pub struct GradientField {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Gradient vectors, row-major.
    pub data: Vec<DVec2>,
}

impl GradientField {
    /// Builds the gradient of a heightfield with forward differences.
    ///
    /// `g(x, y) = (h(x+1, y) - h(x, y), h(x, y+1) - h(x, y))` for cells
    /// with both forward neighbors. Cells in the last row or last column
    /// hold the zero vector, so construction never reads out of bounds.
    pub fn from_heightfield(field: &Heightfield) -> Self {
        let (width, height) = (field.width, field.height);
        let mut data = vec![DVec2::ZERO; field.cell_count()];

        for y in 0..height.saturating_sub(1) {
            for x in 0..width.saturating_sub(1) {
                let here = field.get(x, y);
                data[(y * width + x) as usize] = DVec2::new(
                    field.get(x + 1, y) - here,
                    field.get(x, y + 1) - here,
                );
            }
        }

        Self {
            width,
            height,
            data,
        }
    }

    /// Returns the gradient at the given cell.
    ///
    /// # Panics
    /// Panics in debug builds if x or y is out of bounds.
    pub fn get(&self, x: u32, y: u32) -> DVec2 {
        debug_assert!(x < self.width && y < self.height);
        self.data[(y * self.width + x) as usize]
    }

    /// Bilinearly interpolates the gradient at a continuous position.
    ///
    /// Componentwise blend with the same weights and valid region as
    /// `Heightfield::sample`.
    ///
    /// # Panics
    /// Panics in debug builds if `pos` is outside the valid sampling region.
    pub fn sample(&self, pos: DVec2) -> DVec2 {
        debug_assert!(
            pos.x >= 0.0
                && pos.y >= 0.0
                && pos.x <= self.width as f64 - 2.0
                && pos.y <= self.height as f64 - 2.0
        );
        let xi = pos.x.floor() as u32;
        let yi = pos.y.floor() as u32;
        let u = pos.x - pos.x.floor();
        let v = pos.y - pos.y.floor();

        let ul = self.get(xi, yi);
        let ur = self.get(xi + 1, yi);
        let ll = self.get(xi, yi + 1);
        let lr = self.get(xi + 1, yi + 1);

        ul * ((1.0 - u) * (1.0 - v)) + ur * (u * (1.0 - v)) + ll * ((1.0 - u) * v) + lr * (u * v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_of_linear_ramp() {
        // h = 2x + 3y, so interior gradients are exactly (2, 3).
        let field = Heightfield::from_fn(5, 4, |x, y| 2.0 * x as f64 + 3.0 * y as f64);
        let grad = GradientField::from_heightfield(&field);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(grad.get(x, y), DVec2::new(2.0, 3.0));
            }
        }
        // The ramp still climbs in y along the last column, but border
        // cells hold the zero vector, not a partial difference.
        assert_eq!(grad.get(4, 0), DVec2::ZERO);
        assert_eq!(grad.get(0, 3), DVec2::ZERO);
    }

    #[test]
    fn test_gradient_boundary_convention() {
        // Heights vary along both axes, so a partial forward difference
        // at the border would be nonzero; every border cell must still be
        // the full zero vector.
        let field = Heightfield::from_fn(6, 6, |x, y| ((x * 7 + y * 3) % 5) as f64);
        let grad = GradientField::from_heightfield(&field);
        for y in 0..6 {
            assert_eq!(grad.get(5, y), DVec2::ZERO);
        }
        for x in 0..6 {
            assert_eq!(grad.get(x, 5), DVec2::ZERO);
        }
    }

    #[test]
    fn test_gradient_sample_identity_at_grid_positions() {
        let field = Heightfield::from_fn(5, 5, |x, y| (x as f64).powi(2) - y as f64);
        let grad = GradientField::from_heightfield(&field);
        for y in 0..4 {
            for x in 0..4 {
                let sampled = grad.sample(DVec2::new(x as f64, y as f64));
                assert_eq!(sampled, grad.get(x, y));
            }
        }
    }

    #[test]
    fn test_gradient_sample_blends_componentwise() {
        let field = Heightfield::from_fn(4, 4, |x, y| (x * x + y) as f64);
        let grad = GradientField::from_heightfield(&field);
        let center = grad.sample(DVec2::new(0.5, 0.5));
        let expected = (grad.get(0, 0) + grad.get(1, 0) + grad.get(0, 1) + grad.get(1, 1)) * 0.25;
        assert!((center - expected).length() < 1e-12);
    }
}
