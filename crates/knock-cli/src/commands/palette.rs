//! `palette` command: render the full stock sound set.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use knock_synth::palette::{impact_bank, render_tonal, TonalSound};
use knock_synth::wav::write_wav_file;

/// Runs the palette command.
pub fn run(out_dir: &str, seed: u64, sample_rate: u32) -> Result<()> {
    let dir = Path::new(out_dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let sr = sample_rate as f64;

    println!("writing to {}/", dir.display());

    for sound in TonalSound::all() {
        let samples = render_tonal(sound, sr)
            .with_context(|| format!("failed to render '{}'", sound.name()))?;
        write_sound(dir, sound.name(), &samples, sample_rate)?;
    }

    let mut bank = impact_bank(sr, seed);
    for id in bank.ids() {
        let samples = bank
            .render(&id)
            .with_context(|| format!("failed to render '{id}'"))?;
        write_sound(dir, &id, &samples, sample_rate)?;
    }

    Ok(())
}

fn write_sound(dir: &Path, name: &str, samples: &[f64], sample_rate: u32) -> Result<()> {
    let path = dir.join(format!("{name}.wav"));
    write_wav_file(&path, samples, sample_rate)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "  {} {}.wav ({:.2}s)",
        "ok".green(),
        name,
        samples.len() as f64 / sample_rate as f64
    );
    Ok(())
}
