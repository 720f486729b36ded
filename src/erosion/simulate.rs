//! Simulation drivers: sequential reference, observed, and batched.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use thiserror::Error;

use crate::erosion::kernel;
use crate::erosion::{ConfigError, Droplet, SimulationParams};
use crate::field::{GradientField, Heightfield};

/// Errors raised by the simulation drivers.
#[derive(Error, Debug)]
pub enum ErosionError {
    /// Parameter validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The grid has no interior for droplets to spawn in.
    #[error("grid {0}x{1} is too small to erode (need at least 3x3)")]
    GridTooSmall(u32, u32),
    /// The batched driver was asked for empty batches.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}

/// Aggregate counters for one simulation run.
#[derive(Debug, Clone, Default)]
pub struct ErosionStats {
    /// Droplets simulated.
    pub droplets: usize,
    /// Completed steps across all droplets.
    pub steps: u64,
    /// Droplets that walked off the grid before their lifetime expired.
    pub escaped: usize,
    /// Total height removed by the erosion brush.
    pub total_eroded: f64,
    /// Total height added back by deposition.
    pub total_deposited: f64,
}

/// Runs the sequential droplet simulation over `field`, mutating it in
/// place.
///
/// Each droplet runs to completion before the next spawns, so later
/// droplets see the terrain changes of earlier ones. The gradient grid is
/// built once from the initial terrain and reused for the whole run. With a
/// fixed grid and parameter set the result is bit-identical across runs.
pub fn erode(
    field: &mut Heightfield,
    params: &SimulationParams,
) -> Result<ErosionStats, ErosionError> {
    erode_with_observer(field, params, |_, _| {})
}

/// Like [`erode`], invoking `observer` with the droplet index and its new
/// position after every completed step.
///
/// Useful for tracing droplet paths; the observer does not influence the
/// simulation.
pub fn erode_with_observer<F>(
    field: &mut Heightfield,
    params: &SimulationParams,
    mut observer: F,
) -> Result<ErosionStats, ErosionError>
where
    F: FnMut(usize, DVec2),
{
    params.validate()?;
    check_grid(field)?;

    let gradient = GradientField::from_heightfield(field);
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut stats = ErosionStats {
        droplets: params.droplets,
        ..Default::default()
    };

    let max_x = field.width as f64 - 2.0;
    let max_y = field.height as f64 - 2.0;

    for i in 0..params.droplets {
        let spawn = DVec2::new(
            rng.random_range(0.0..max_x),
            rng.random_range(0.0..max_y),
        );
        let mut drop = Droplet::spawn(spawn, params.initial_water);

        for _ in 0..params.max_steps {
            if droplet_step(field, &gradient, &mut drop, params, &mut stats) {
                stats.steps += 1;
                observer(i, drop.pos);
            } else {
                stats.escaped += 1;
                break;
            }
        }
    }

    Ok(stats)
}

/// Advances one droplet by one step against the live grid.
///
/// Returns false when the droplet stepped off the valid sampling region;
/// nothing is mutated in that case.
fn droplet_step(
    field: &mut Heightfield,
    gradient: &GradientField,
    drop: &mut Droplet,
    params: &SimulationParams,
    stats: &mut ErosionStats,
) -> bool {
    let pos_old = drop.pos;
    let grad = gradient.sample(pos_old);
    let h_old = field.sample(pos_old);

    // Steer: blend the previous direction with the downhill direction,
    // then take a unit step. A zero blend leaves the droplet in place.
    drop.dir = (drop.dir * params.inertia - grad * (1.0 - params.inertia)).normalize_or_zero();
    drop.pos = pos_old + drop.dir;

    if !field.in_sample_bounds(drop.pos) {
        return false;
    }

    let h_new = field.sample(drop.pos);
    let h_diff = h_new - h_old;
    let capacity = (-h_diff).max(params.min_slope) * drop.velocity * drop.water * params.capacity;

    if h_diff > 0.0 || drop.sediment > capacity {
        // Climbing, or carrying more than the flow can hold: drop sediment
        // at the cell we came from. Uphill motion deposits at most enough
        // to fill the height difference.
        let amount = if h_diff > 0.0 {
            drop.sediment.min(h_diff)
        } else {
            (drop.sediment - capacity) * params.deposition
        };
        if amount > 0.0 {
            drop.sediment -= amount;
            kernel::deposit(field, pos_old, amount);
            stats.total_deposited += amount;
        }
    } else {
        // Never erode more than the step's height drop, so the droplet
        // does not dig a pit behind itself.
        let amount = params.erosion * (capacity - drop.sediment).min(-h_diff);
        if amount > 0.0 {
            drop.sediment += amount;
            kernel::erode(field, pos_old, amount, params.radius);
            stats.total_eroded += amount;
        }
    }

    drop.velocity = (drop.velocity * drop.velocity - h_diff * params.gravity)
        .max(0.0)
        .sqrt();
    drop.water *= 1.0 - params.evaporation;

    true
}

/// Runs the droplet simulation in snapshot batches, droplets within a batch
/// in parallel.
///
/// Every droplet in a batch reads a consistent snapshot of the grid; height
/// changes are buffered per droplet and merged in droplet order once the
/// batch completes. Each droplet draws its spawn position from its own rng
/// seeded `seed + index`, so output is deterministic for a fixed seed and
/// batch size, but not the same output as the sequential driver, which
/// lets every droplet see all earlier changes.
pub fn erode_batched(
    field: &mut Heightfield,
    params: &SimulationParams,
    batch_size: usize,
) -> Result<ErosionStats, ErosionError> {
    params.validate()?;
    check_grid(field)?;
    if batch_size == 0 {
        return Err(ErosionError::ZeroBatchSize);
    }

    let gradient = GradientField::from_heightfield(field);
    let mut stats = ErosionStats {
        droplets: params.droplets,
        ..Default::default()
    };

    let mut start = 0usize;
    while start < params.droplets {
        let count = batch_size.min(params.droplets - start);
        let snapshot = field.clone();

        let runs: Vec<DropletRun> = (start..start + count)
            .into_par_iter()
            .map(|i| run_droplet_buffered(&snapshot, &gradient, params, i as u64))
            .collect();

        for run in runs {
            for (idx, delta) in run.deltas {
                field.data[idx] += delta;
            }
            stats.steps += run.steps;
            stats.escaped += run.escaped as usize;
            stats.total_eroded += run.eroded;
            stats.total_deposited += run.deposited;
        }

        start += count;
    }

    Ok(stats)
}

struct DropletRun {
    deltas: Vec<(usize, f64)>,
    steps: u64,
    escaped: bool,
    eroded: f64,
    deposited: f64,
}

/// Runs one droplet against an immutable snapshot, buffering its height
/// changes. Same step rules as [`droplet_step`], with all reads going to
/// the snapshot.
fn run_droplet_buffered(
    snapshot: &Heightfield,
    gradient: &GradientField,
    params: &SimulationParams,
    index: u64,
) -> DropletRun {
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed.wrapping_add(index));
    let max_x = snapshot.width as f64 - 2.0;
    let max_y = snapshot.height as f64 - 2.0;
    let spawn = DVec2::new(
        rng.random_range(0.0..max_x),
        rng.random_range(0.0..max_y),
    );

    let mut drop = Droplet::spawn(spawn, params.initial_water);
    let mut run = DropletRun {
        deltas: Vec::new(),
        steps: 0,
        escaped: false,
        eroded: 0.0,
        deposited: 0.0,
    };

    for _ in 0..params.max_steps {
        let pos_old = drop.pos;
        let grad = gradient.sample(pos_old);
        let h_old = snapshot.sample(pos_old);

        drop.dir = (drop.dir * params.inertia - grad * (1.0 - params.inertia)).normalize_or_zero();
        drop.pos = pos_old + drop.dir;

        if !snapshot.in_sample_bounds(drop.pos) {
            run.escaped = true;
            break;
        }

        let h_new = snapshot.sample(drop.pos);
        let h_diff = h_new - h_old;
        let capacity =
            (-h_diff).max(params.min_slope) * drop.velocity * drop.water * params.capacity;

        if h_diff > 0.0 || drop.sediment > capacity {
            let amount = if h_diff > 0.0 {
                drop.sediment.min(h_diff)
            } else {
                (drop.sediment - capacity) * params.deposition
            };
            if amount > 0.0 {
                drop.sediment -= amount;
                kernel::deposit_into(snapshot, pos_old, amount, &mut run.deltas);
                run.deposited += amount;
            }
        } else {
            let amount = params.erosion * (capacity - drop.sediment).min(-h_diff);
            if amount > 0.0 {
                drop.sediment += amount;
                kernel::erode_into(snapshot, pos_old, amount, params.radius, &mut run.deltas);
                run.eroded += amount;
            }
        }

        drop.velocity = (drop.velocity * drop.velocity - h_diff * params.gravity)
            .max(0.0)
            .sqrt();
        drop.water *= 1.0 - params.evaporation;
        run.steps += 1;
    }

    run
}

fn check_grid(field: &Heightfield) -> Result<(), ErosionError> {
    // Spawn positions are drawn from [0, w-2) x [0, h-2); both ranges must
    // be non-empty.
    if field.width < 3 || field.height < 3 {
        return Err(ErosionError::GridTooSmall(field.width, field.height));
    }
    Ok(())
}
