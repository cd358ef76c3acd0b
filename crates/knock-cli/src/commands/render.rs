//! `render` command: one sound to one WAV file.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

use knock_spec::TargetRanges;
use knock_synth::palette::{impact_bank, render_tonal, TonalSound};
use knock_synth::wav::{pcm_hash, write_wav_file};

/// Runs the render command.
pub fn run(
    sound: &str,
    out: &str,
    seed: u64,
    sample_rate: u32,
    targets_path: Option<&str>,
) -> Result<()> {
    let sr = sample_rate as f64;

    let samples = if let Some(tonal) = TonalSound::all().iter().find(|s| s.name() == sound) {
        render_tonal(*tonal, sr).context("tonal synthesis failed")?
    } else {
        let mut bank = impact_bank(sr, seed);
        if !bank.ids().iter().any(|id| id == sound) {
            bail!(
                "unknown sound '{sound}'; known sounds: {}",
                known_sounds(&bank.ids()).join(", ")
            );
        }

        if let Some(path) = targets_path {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {path}"))?;
            let targets: TargetRanges =
                serde_json::from_str(&data).context("invalid target-ranges JSON")?;
            bank.set_targets(sound, targets);
        }

        let samples = bank.render(sound).context("impact synthesis failed")?;
        if let Some(outcome) = bank.outcome(sound) {
            println!(
                "calibrated {} in {} generations, cost {:.6}",
                sound.bold(),
                outcome.result.generations,
                outcome.result.cost
            );
            for warning in &outcome.warnings {
                println!("  {} {}", "warning:".yellow().bold(), warning);
            }
        }
        samples
    };

    write_wav_file(Path::new(out), &samples, sample_rate).context("failed to write WAV")?;
    println!(
        "{} {} ({:.2}s, pcm {})",
        "wrote".green(),
        out,
        samples.len() as f64 / sr,
        &pcm_hash(&samples)[..16]
    );

    Ok(())
}

fn known_sounds(bank_ids: &[String]) -> Vec<String> {
    let mut names: Vec<String> = TonalSound::all()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    names.extend(bank_ids.iter().cloned());
    names
}
