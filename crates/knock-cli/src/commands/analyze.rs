//! `analyze` command: feature vector of an existing WAV file.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use knock_spec::FEATURE_NAMES;
use knock_synth::analyze;

/// Runs the analyze command.
pub fn run(input: &str, json: bool) -> Result<()> {
    let (samples, sample_rate) = super::read_wav_mono(Path::new(input))?;
    let features = analyze(&samples, sample_rate as f64);

    if json {
        let out = serde_json::to_string_pretty(&features)
            .context("failed to serialize features")?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "{} ({} samples at {} Hz, {:.1} ms)",
        input.bold(),
        samples.len(),
        sample_rate,
        samples.len() as f64 / sample_rate as f64 * 1000.0
    );
    for (name, value) in FEATURE_NAMES.iter().zip(features.as_array()) {
        let unit = match *name {
            "f_centroid" => "Hz",
            "f_spread" => "oct",
            "t_centroid" | "t_spread" => "ms",
            _ => "",
        };
        println!("  {:<12} {:>12.4} {}", name.cyan(), value, unit.dimmed());
    }

    Ok(())
}
