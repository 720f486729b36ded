//! Particle-based hydraulic erosion for grayscale heightfields.
//!
//! Terrain is a row-major grid of doubles. Virtual raindrops spawn at
//! random positions, roll downhill steered by a blend of inertia and the
//! terrain gradient, pick up sediment where they accelerate and shed it
//! where they slow, mutating the grid in place. Input and output are
//! 16-bit grayscale images (PNG or PGM).

pub mod erosion;
pub mod field;
pub mod io;

pub use erosion::{
    erode, erode_batched, erode_with_observer, ConfigError, Droplet, ErosionError, ErosionStats,
    SimulationParams,
};
pub use field::{FieldError, GradientField, Heightfield};
