//! Droplet-based hydraulic erosion.
//!
//! Virtual raindrops spawn at random positions, roll downhill under a blend
//! of inertia and the terrain gradient, and exchange material with the grid
//! as their sediment load crosses the local carrying capacity. The kernel
//! primitives live in [`kernel`]; [`erode`] is the sequential reference
//! driver and [`erode_batched`] a snapshot-based parallel variant.

mod config;
mod droplet;
pub mod kernel;
mod simulate;

pub use config::{ConfigError, SimulationParams};
pub use droplet::Droplet;
pub use simulate::{erode, erode_batched, erode_with_observer, ErosionError, ErosionStats};
