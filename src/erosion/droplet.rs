//! Droplet state.

use glam::DVec2;

/// A single simulated water droplet.
///
/// Droplets spawn at rest: zero direction, zero velocity, no sediment.
/// Direction stays a unit vector (or zero, on flat ground) throughout the
/// droplet's life; velocity is the scalar speed fed into the capacity
/// formula.
#[derive(Debug, Clone)]
pub struct Droplet {
    /// Continuous grid position.
    pub pos: DVec2,
    /// Unit travel direction, or zero when at rest.
    pub dir: DVec2,
    /// Scalar speed.
    pub velocity: f64,
    /// Suspended sediment volume.
    pub sediment: f64,
    /// Remaining water volume.
    pub water: f64,
}

impl Droplet {
    /// Spawns a droplet at rest with the given water volume.
    pub fn spawn(pos: DVec2, water: f64) -> Self {
        Self {
            pos,
            dir: DVec2::ZERO,
            velocity: 0.0,
            sediment: 0.0,
            water,
        }
    }
}
