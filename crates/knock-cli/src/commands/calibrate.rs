//! `calibrate` command: search impact parameters against target ranges.

use anyhow::{Context, Result};
use colored::Colorize;

use knock_spec::{ParamBounds, TargetRanges};
use knock_synth::{calibrate_with_progress, CalibrationSpec, TerminationReason};

/// Parsed options for the calibrate command.
pub struct Options {
    pub targets_path: String,
    pub layers: usize,
    pub seed: u64,
    pub budget_secs: f64,
    pub threshold: f64,
    pub duration_s: f64,
    pub sample_rate: u32,
    pub out_path: Option<String>,
    pub json: bool,
}

/// Runs the calibrate command.
pub fn run(options: Options) -> Result<()> {
    let data = std::fs::read_to_string(&options.targets_path)
        .with_context(|| format!("failed to read {}", options.targets_path))?;
    let targets: TargetRanges =
        serde_json::from_str(&data).context("invalid target-ranges JSON")?;

    let spec = CalibrationSpec {
        layers: options.layers,
        time_budget_secs: options.budget_secs,
        success_threshold: options.threshold,
        duration_s: options.duration_s,
        ..CalibrationSpec::new(targets, options.seed)
    };
    let sr = options.sample_rate as f64;
    let bounds = ParamBounds::for_impact_layers(options.layers, sr)
        .context("failed to build search bounds")?;

    let quiet = options.json;
    let outcome = calibrate_with_progress(&spec, &bounds, sr, |stats| {
        if !quiet && stats.generation % 10 == 0 {
            println!(
                "  {} generation {:>4}  best cost {:.6}",
                "...".dimmed(),
                stats.generation,
                stats.best_cost
            );
        }
        false
    })
    .context("calibration failed")?;

    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("failed to serialize outcome")?
        );
    } else {
        let status = match outcome.result.termination {
            TerminationReason::Converged => "converged".green().bold(),
            TerminationReason::TimeBudget => "time budget exhausted".yellow().bold(),
            TerminationReason::Plateau => "plateaued".yellow().bold(),
            TerminationReason::GenerationCap => "generation cap reached".yellow().bold(),
            TerminationReason::CallbackStop => "stopped".yellow().bold(),
        };
        println!(
            "{status}: cost {:.6} after {} generations ({} evaluations, {:.1}s)",
            outcome.result.cost,
            outcome.result.generations,
            outcome.result.evaluations,
            outcome.result.elapsed.as_secs_f64()
        );
        for warning in &outcome.warnings {
            println!("  {} {}", "warning:".yellow().bold(), warning);
        }
        if outcome.warnings.is_empty() {
            println!("  every feature inside its target range");
        }
    }

    if let Some(path) = &options.out_path {
        let report =
            serde_json::to_string_pretty(&outcome).context("failed to serialize outcome")?;
        std::fs::write(path, report).with_context(|| format!("failed to write {path}"))?;
        if !options.json {
            println!("{} {}", "wrote".green(), path);
        }
    }

    Ok(())
}
