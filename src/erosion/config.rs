//! Droplet simulation configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by parameter validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("droplet count must be at least 1")]
    ZeroDroplets,
    #[error("droplet lifetime must be at least 1 step")]
    ZeroLifetime,
    #[error("brush radius must be at least 1 cell")]
    ZeroRadius,
    #[error("inertia must lie in [0, 1), got {0}")]
    InertiaOutOfRange(f64),
    #[error("evaporation must lie in [0, 1), got {0}")]
    EvaporationOutOfRange(f64),
    #[error("erosion rate must lie in [0, 1], got {0}")]
    ErosionOutOfRange(f64),
    #[error("deposition rate must lie in [0, 1], got {0}")]
    DepositionOutOfRange(f64),
    #[error("capacity constant must be positive, got {0}")]
    NonPositiveCapacity(f64),
    #[error("minimum slope must be positive, got {0}")]
    NonPositiveMinSlope(f64),
    #[error("initial water volume must be positive, got {0}")]
    NonPositiveWater(f64),
    #[error("gravity must be non-negative, got {0}")]
    NegativeGravity(f64),
}

/// Parameters for droplet-based hydraulic erosion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Number of droplets to simulate.
    pub droplets: usize,
    /// Maximum steps per droplet before it is retired.
    pub max_steps: u32,

    /// Direction inertia (0-1): how much of the previous travel direction
    /// survives each steering update. 0 follows the gradient exactly.
    pub inertia: f64,
    /// Sediment capacity multiplier (Kc).
    pub capacity: f64,
    /// Fraction of the capacity deficit eroded per step (0-1).
    pub erosion: f64,
    /// Fraction of excess sediment deposited per step (0-1).
    pub deposition: f64,
    /// Floor for the slope term of the capacity formula; keeps capacity
    /// positive on near-flat terrain.
    pub min_slope: f64,

    /// Water evaporation factor per step (0-1).
    pub evaporation: f64,
    /// Gravity constant feeding the velocity update.
    pub gravity: f64,
    /// Erosion brush radius in cells (>= 1).
    pub radius: u32,
    /// Water volume each droplet spawns with.
    pub initial_water: f64,

    /// Random seed for droplet spawn positions.
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            droplets: 70_000,
            max_steps: 30,

            inertia: 0.2,
            capacity: 8.0,
            erosion: 0.3,
            deposition: 0.3,
            min_slope: 0.01,

            evaporation: 0.02,
            gravity: 4.0,
            radius: 2,
            initial_water: 1.0,

            seed: 42,
        }
    }
}

impl SimulationParams {
    /// Creates the default parameter set with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Creates a parameter set for subtle smoothing (fewer, weaker droplets).
    pub fn gentle(seed: u64) -> Self {
        Self {
            droplets: 30_000,
            capacity: 4.0,
            erosion: 0.1,
            deposition: 0.5,
            seed,
            ..Default::default()
        }
    }

    /// Creates a parameter set for heavy carving (more, stronger droplets).
    pub fn aggressive(seed: u64) -> Self {
        Self {
            droplets: 150_000,
            max_steps: 64,
            capacity: 12.0,
            erosion: 0.5,
            radius: 3,
            seed,
            ..Default::default()
        }
    }

    /// Checks every parameter against its valid range.
    ///
    /// Comparisons are written so that NaN values are rejected too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.droplets == 0 {
            return Err(ConfigError::ZeroDroplets);
        }
        if self.max_steps == 0 {
            return Err(ConfigError::ZeroLifetime);
        }
        if self.radius == 0 {
            return Err(ConfigError::ZeroRadius);
        }
        if !(self.inertia >= 0.0 && self.inertia < 1.0) {
            return Err(ConfigError::InertiaOutOfRange(self.inertia));
        }
        if !(self.evaporation >= 0.0 && self.evaporation < 1.0) {
            return Err(ConfigError::EvaporationOutOfRange(self.evaporation));
        }
        if !(self.erosion >= 0.0 && self.erosion <= 1.0) {
            return Err(ConfigError::ErosionOutOfRange(self.erosion));
        }
        if !(self.deposition >= 0.0 && self.deposition <= 1.0) {
            return Err(ConfigError::DepositionOutOfRange(self.deposition));
        }
        if !(self.capacity > 0.0) {
            return Err(ConfigError::NonPositiveCapacity(self.capacity));
        }
        if !(self.min_slope > 0.0) {
            return Err(ConfigError::NonPositiveMinSlope(self.min_slope));
        }
        if !(self.initial_water > 0.0) {
            return Err(ConfigError::NonPositiveWater(self.initial_water));
        }
        if !(self.gravity >= 0.0) {
            return Err(ConfigError::NegativeGravity(self.gravity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        let params = SimulationParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.max_steps, 30);
        assert!((params.inertia - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_with_seed() {
        let params = SimulationParams::with_seed(123);
        assert_eq!(params.seed, 123);
        assert_eq!(params.droplets, SimulationParams::default().droplets);
    }

    #[test]
    fn test_gentle_params() {
        let params = SimulationParams::gentle(1);
        assert!(params.validate().is_ok());
        assert!(params.erosion < SimulationParams::default().erosion);
    }

    #[test]
    fn test_aggressive_params() {
        let params = SimulationParams::aggressive(2);
        assert!(params.validate().is_ok());
        assert!(params.droplets > SimulationParams::default().droplets);
        assert!(params.radius > SimulationParams::default().radius);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut params = SimulationParams::default();
        params.droplets = 0;
        assert!(matches!(params.validate(), Err(ConfigError::ZeroDroplets)));

        let mut params = SimulationParams::default();
        params.max_steps = 0;
        assert!(matches!(params.validate(), Err(ConfigError::ZeroLifetime)));

        let mut params = SimulationParams::default();
        params.radius = 0;
        assert!(matches!(params.validate(), Err(ConfigError::ZeroRadius)));

        let mut params = SimulationParams::default();
        params.inertia = 1.0;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InertiaOutOfRange(_))
        ));

        let mut params = SimulationParams::default();
        params.evaporation = -0.5;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::EvaporationOutOfRange(_))
        ));

        let mut params = SimulationParams::default();
        params.min_slope = 0.0;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonPositiveMinSlope(_))
        ));

        let mut params = SimulationParams::default();
        params.capacity = f64::NAN;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonPositiveCapacity(_))
        ));
    }
}
