//! Knock CLI - render, analyze, and calibrate procedural impact sounds.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;

/// Knock - deterministic impact-sound synthesis and calibration
#[derive(Parser)]
#[command(name = "knock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one bank or palette sound to a WAV file
    Render {
        /// Sound identifier (see `palette` for the stock set)
        #[arg(short, long)]
        sound: String,

        /// Output WAV path
        #[arg(short, long)]
        out: String,

        /// Base seed for noise and calibration
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,

        /// Target-ranges JSON to calibrate impact sounds against
        #[arg(long)]
        targets: Option<String>,
    },

    /// Compute the feature vector of an existing WAV file
    Analyze {
        /// Path to the input WAV file
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run one calibration against target feature ranges
    Calibrate {
        /// Path to a calibration-targets JSON document
        /// (see refs/example-targets.json for the shape)
        #[arg(short, long)]
        targets: String,

        /// Number of layered impacts to search over
        #[arg(long, default_value_t = 1)]
        layers: usize,

        /// Search seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Wall-clock budget in seconds
        #[arg(long, default_value_t = 30.0)]
        budget_secs: f64,

        /// Success threshold on the cost
        #[arg(long, default_value_t = 1e-3)]
        threshold: f64,

        /// Rendered duration of each candidate in seconds
        #[arg(long, default_value_t = 0.25)]
        duration: f64,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,

        /// Write the winning parameters and report to this JSON file
        #[arg(short, long)]
        out: Option<String>,

        /// Output machine-readable JSON on stdout (no progress lines)
        #[arg(long)]
        json: bool,
    },

    /// Render the full stock sound set into a directory
    Palette {
        /// Output directory for the WAV files
        #[arg(long)]
        out_dir: String,

        /// Base seed for the impact sounds
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            sound,
            out,
            seed,
            sample_rate,
            targets,
        } => commands::render::run(&sound, &out, seed, sample_rate, targets.as_deref()),
        Commands::Analyze { input, json } => commands::analyze::run(&input, json),
        Commands::Calibrate {
            targets,
            layers,
            seed,
            budget_secs,
            threshold,
            duration,
            sample_rate,
            out,
            json,
        } => commands::calibrate::run(commands::calibrate::Options {
            targets_path: targets,
            layers,
            seed,
            budget_secs,
            threshold,
            duration_s: duration,
            sample_rate,
            out_path: out,
            json,
        }),
        Commands::Palette {
            out_dir,
            seed,
            sample_rate,
        } => commands::palette::run(&out_dir, seed, sample_rate),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
