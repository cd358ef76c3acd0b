//! Command implementations for the Knock CLI.

pub mod analyze;
pub mod calibrate;
pub mod palette;
pub mod render;

use anyhow::{Context, Result};
use std::path::Path;

/// Loads a WAV file as mono f64 samples.
///
/// Multi-channel files are folded to mono by averaging; integer formats are
/// scaled to [-1, 1].
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f64>, u32)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<Result<_, _>>()
            .context("failed to decode float samples")?,
        hound::SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<Result<_, _>>()
                .context("failed to decode integer samples")?
        }
    };

    let mut mono = Vec::with_capacity(interleaved.len() / channels);
    for frame in interleaved.chunks(channels) {
        mono.push(frame.iter().sum::<f64>() / channels as f64);
    }

    Ok((mono, spec.sample_rate))
}
