//! Deterministic mono WAV output.
//!
//! Writes 16-bit PCM with a fixed 44-byte header so identical samples always
//! produce byte-identical files. The BLAKE3 hash of the PCM payload is
//! exposed for build-reproducibility checks on shipped assets.

use std::io::Write;
use std::path::Path;

use crate::error::SynthResult;

/// Converts f64 samples to little-endian 16-bit PCM bytes.
///
/// Samples outside [-1.0, 1.0] are clipped.
pub fn samples_to_pcm16(samples: &[f64]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clipped = sample.clamp(-1.0, 1.0);
        let value = (clipped * 32_767.0).round() as i16;
        pcm.extend_from_slice(&value.to_le_bytes());
    }
    pcm
}

/// Builds a complete mono 16-bit WAV file in memory.
pub fn wav_bytes(samples: &[f64], sample_rate: u32) -> Vec<u8> {
    let pcm = samples_to_pcm16(samples);
    let data_size = pcm.len() as u32;
    let byte_rate = sample_rate * 2;

    let mut buffer = Vec::with_capacity(44 + pcm.len());
    buffer.extend_from_slice(b"RIFF");
    buffer.extend_from_slice(&(36 + data_size).to_le_bytes());
    buffer.extend_from_slice(b"WAVE");

    buffer.extend_from_slice(b"fmt ");
    buffer.extend_from_slice(&16u32.to_le_bytes()); // chunk size for PCM
    buffer.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buffer.extend_from_slice(&1u16.to_le_bytes()); // mono
    buffer.extend_from_slice(&sample_rate.to_le_bytes());
    buffer.extend_from_slice(&byte_rate.to_le_bytes());
    buffer.extend_from_slice(&2u16.to_le_bytes()); // block align
    buffer.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    buffer.extend_from_slice(b"data");
    buffer.extend_from_slice(&data_size.to_le_bytes());
    buffer.extend_from_slice(&pcm);

    buffer
}

/// Writes a mono 16-bit WAV file to disk.
pub fn write_wav_file(path: &Path, samples: &[f64], sample_rate: u32) -> SynthResult<()> {
    let bytes = wav_bytes(samples, sample_rate);
    let mut file = std::fs::File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

/// BLAKE3 hex digest of the PCM payload.
pub fn pcm_hash(samples: &[f64]) -> String {
    blake3::hash(&samples_to_pcm16(samples)).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_header_magic() {
        let bytes = wav_bytes(&[0.0, 0.5, -0.5], 44_100);

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(bytes.len(), 44 + 6);
    }

    #[test]
    fn test_pcm_clipping() {
        let pcm = samples_to_pcm16(&[2.0, -2.0]);
        assert_eq!(&pcm[0..2], &32_767i16.to_le_bytes());
        assert_eq!(&pcm[2..4], &(-32_767i16).to_le_bytes());
    }

    #[test]
    fn test_pcm_hash_is_stable() {
        let samples: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.01).sin()).collect();
        let a = pcm_hash(&samples);
        let b = pcm_hash(&samples);

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_write_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples: Vec<f64> = (0..441).map(|i| (i as f64 * 0.05).sin()).collect();

        write_wav_file(&path, &samples, 44_100).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, wav_bytes(&samples, 44_100));
    }
}
