//! Erosim CLI - droplet-based hydraulic erosion for heightfields.
//!
//! Load a grayscale heightfield, rain virtual droplets on it, and save the
//! eroded result.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use erosim::erosion::{erode, erode_batched, erode_with_observer, SimulationParams};
use erosim::io::{load_heightfield, save_heightfield};

/// Droplet-based hydraulic erosion for grayscale heightfields.
#[derive(Parser)]
#[command(name = "erosim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Erode a heightfield with virtual raindrops.
    Simulate {
        /// Input heightfield (PNG or PGM).
        #[arg(short, long)]
        input: PathBuf,

        /// Output heightfield path (PNG or PGM).
        #[arg(short, long)]
        output: PathBuf,

        /// Number of droplets to simulate.
        #[arg(short, long, default_value = "70000")]
        droplets: usize,

        /// Maximum steps per droplet.
        #[arg(long, default_value = "30")]
        lifetime: u32,

        /// Direction inertia (0-1).
        #[arg(long, default_value = "0.2")]
        inertia: f64,

        /// Sediment capacity multiplier.
        #[arg(long, default_value = "8.0")]
        capacity: f64,

        /// Erosion rate (0-1).
        #[arg(long, default_value = "0.3")]
        erosion: f64,

        /// Deposition rate (0-1).
        #[arg(long, default_value = "0.3")]
        deposition: f64,

        /// Capacity floor for near-flat slopes.
        #[arg(long, default_value = "0.01")]
        min_slope: f64,

        /// Water evaporation factor per step (0-1).
        #[arg(long, default_value = "0.02")]
        evaporation: f64,

        /// Gravity constant for the velocity update.
        #[arg(long, default_value = "4.0")]
        gravity: f64,

        /// Erosion brush radius in cells.
        #[arg(long, default_value = "2")]
        radius: u32,

        /// Initial water volume per droplet.
        #[arg(long, default_value = "1.0")]
        initial_water: f64,

        /// Random seed for droplet spawns (defaults to the clock).
        #[arg(short, long)]
        seed: Option<u64>,

        /// Use a tuning preset instead of the individual parameter flags.
        #[arg(long)]
        preset: Option<Preset>,

        /// Write droplet paths to a file as "x y" lines, one blank line
        /// between droplets.
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Run droplets in parallel batches of this size (faster, but not
        /// equivalent to the sequential result).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Rescale output to the eroded field's own height range instead of
        /// clamping to [0, 1].
        #[arg(long)]
        normalize: bool,
    },

    /// Display information about a heightfield file.
    Info {
        /// Input heightfield (PNG or PGM).
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Subtle smoothing pass.
    Gentle,
    /// Heavy carving pass.
    Aggressive,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            input,
            output,
            droplets,
            lifetime,
            inertia,
            capacity,
            erosion,
            deposition,
            min_slope,
            evaporation,
            gravity,
            radius,
            initial_water,
            seed,
            preset,
            trace,
            batch_size,
            normalize,
        } => {
            run_simulate(
                input,
                output,
                droplets,
                lifetime,
                inertia,
                capacity,
                erosion,
                deposition,
                min_slope,
                evaporation,
                gravity,
                radius,
                initial_water,
                seed,
                preset,
                trace,
                batch_size,
                normalize,
            );
        }
        Commands::Info { input } => {
            run_info(input);
        }
    }
}

fn run_simulate(
    input: PathBuf,
    output: PathBuf,
    droplets: usize,
    lifetime: u32,
    inertia: f64,
    capacity: f64,
    erosion: f64,
    deposition: f64,
    min_slope: f64,
    evaporation: f64,
    gravity: f64,
    radius: u32,
    initial_water: f64,
    seed: Option<u64>,
    preset: Option<Preset>,
    trace: Option<PathBuf>,
    batch_size: Option<usize>,
    normalize: bool,
) {
    if trace.is_some() && batch_size.is_some() {
        eprintln!("Error: --trace is not supported with --batch-size");
        std::process::exit(1);
    }

    // Generate seed if not provided
    let seed = seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64
    });

    println!("Erosim - Droplet Erosion");
    println!("========================");

    let params = match preset {
        Some(Preset::Gentle) => {
            println!("Preset: gentle");
            SimulationParams::gentle(seed)
        }
        Some(Preset::Aggressive) => {
            println!("Preset: aggressive");
            SimulationParams::aggressive(seed)
        }
        None => SimulationParams {
            droplets,
            max_steps: lifetime,
            inertia,
            capacity,
            erosion,
            deposition,
            min_slope,
            evaporation,
            gravity,
            radius,
            initial_water,
            seed,
        },
    };

    params.validate().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let mut field = load_heightfield(&input).unwrap_or_else(|e| {
        eprintln!("Error loading heightfield: {}", e);
        std::process::exit(1);
    });

    let (min_h, max_h) = field.height_range();
    println!("Input: {}", input.display());
    println!("Grid: {}x{} cells", field.width, field.height);
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);
    println!(
        "Droplets: {}  Lifetime: {}  Seed: {}",
        params.droplets, params.max_steps, params.seed
    );

    println!("\nSimulating...");
    let start = Instant::now();

    let result = if let Some(trace_path) = &trace {
        let file = File::create(trace_path).unwrap_or_else(|e| {
            eprintln!("Error creating trace file: {}", e);
            std::process::exit(1);
        });
        let mut writer = BufWriter::new(file);
        let mut last_drop = usize::MAX;

        let result = erode_with_observer(&mut field, &params, |i, pos| {
            let written = if last_drop != usize::MAX && i != last_drop {
                writeln!(writer)
            } else {
                Ok(())
            }
            .and_then(|_| writeln!(writer, "{} {}", pos.x, pos.y));
            if let Err(e) = written {
                eprintln!("Error writing trace file: {}", e);
                std::process::exit(1);
            }
            last_drop = i;
        });

        writer.flush().unwrap_or_else(|e| {
            eprintln!("Error writing trace file: {}", e);
            std::process::exit(1);
        });
        println!("Trace: {}", trace_path.display());
        result
    } else if let Some(batch) = batch_size {
        println!("Parallel batches of {}", batch);
        erode_batched(&mut field, &params, batch)
    } else {
        erode(&mut field, &params)
    };

    let stats = result.unwrap_or_else(|e| {
        eprintln!("Error during simulation: {}", e);
        std::process::exit(1);
    });

    let sim_time = start.elapsed();
    println!("Simulation completed in {:.2?}", sim_time);
    println!("  Steps:     {}", stats.steps);
    println!("  Escaped:   {}/{}", stats.escaped, stats.droplets);
    println!("  Eroded:    {:.6}", stats.total_eroded);
    println!("  Deposited: {:.6}", stats.total_deposited);

    let (out_min, out_max) = field.height_range();
    println!("Height range after: [{:.4}, {:.4}]", out_min, out_max);

    let (save_min, save_max) = if normalize {
        (out_min, out_max)
    } else {
        (0.0, 1.0)
    };
    save_heightfield(&field, &output, save_min, save_max).unwrap_or_else(|e| {
        eprintln!("Error saving heightfield: {}", e);
        std::process::exit(1);
    });

    println!("\nSaved: {}", output.display());
    println!("Total time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_info(input: PathBuf) {
    let field = load_heightfield(&input).unwrap_or_else(|e| {
        eprintln!("Error loading heightfield: {}", e);
        std::process::exit(1);
    });

    let cells = field.cell_count();
    let bytes = cells * std::mem::size_of::<f64>();
    let (min_h, max_h) = field.height_range();
    let mean = field.data.iter().sum::<f64>() / cells as f64;

    println!("Erosim - Heightfield Info");
    println!("=========================");
    println!();
    println!("File: {}", input.display());
    println!("Grid: {}x{} ({} cells)", field.width, field.height, cells);
    println!(
        "In-memory size: {} bytes ({:.2} MB)",
        bytes,
        bytes as f64 / 1024.0 / 1024.0
    );
    println!();
    println!("Height range: [{:.6}, {:.6}]", min_h, max_h);
    println!("Mean height:  {:.6}", mean);

    if field.width < 3 || field.height < 3 {
        println!();
        println!("Note: grid is too small to erode (need at least 3x3).");
    }
}
