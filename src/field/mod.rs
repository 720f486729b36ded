//! Heightfield grids, bilinear samplers, and gradient construction.

mod gradient;
mod heightfield;

pub use gradient::GradientField;
pub use heightfield::{FieldError, Heightfield};
