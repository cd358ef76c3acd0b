//! Stock sound palette.
//!
//! Every tonal sound is derived from G major so the palette reads as one
//! designed family, and each voice pair is detuned a few cents for organic
//! warmth. The impact sounds come from the modal synthesizer via the sound
//! bank and are the only members with a calibration path.

use knock_spec::{ChainParams, CompressorParams, LayerParams, ReverbParams, SynthParams};

use crate::bank::{SoundBank, SoundDef};
use crate::chain;
use crate::error::SynthResult;
use crate::oscillator::silence;
use crate::rng::create_rng;
use crate::synthesis::tonal::{FmBell, WarmTriangleVoice, WarmVoice};
use crate::synthesis::Synthesizer;

// Key of G
const G4: f64 = 392.00;
const B4: f64 = 493.88;
const D4: f64 = 293.66;
const D5: f64 = 587.33;
const EB4: f64 = 311.13;
const F4: f64 = 349.23;
const G5: f64 = 783.99;
const B5: f64 = 987.77;
const D6: f64 = 1174.66;

/// Master chain for the tonal palette: 4 kHz low-pass to roll off harsh
/// highs, subtle room reverb, gentle compression, +2 dB of gain.
pub fn master_chain() -> ChainParams {
    ChainParams {
        highpass_hz: 0.0,
        lowpass_hz: 4_000.0,
        gain: 1.2589254117941673, // +2 dB
        reverb: Some(ReverbParams::default()),
        compressor: Some(CompressorParams::default()),
    }
}

/// The tonal (non-calibrated) palette sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TonalSound {
    /// Ascending major third, warm and rewarding.
    Confirm,
    /// Descending tritone, instinctively "off" but gentle.
    Deny,
    /// Arpeggio blooming into a sustained chord.
    Success,
    /// Descending minor figure.
    Failure,
    /// FM bell double pip.
    Alert,
    /// Single FM bell chime.
    Notify,
}

impl TonalSound {
    /// All palette members in presentation order.
    pub fn all() -> [TonalSound; 6] {
        [
            TonalSound::Confirm,
            TonalSound::Deny,
            TonalSound::Success,
            TonalSound::Failure,
            TonalSound::Alert,
            TonalSound::Notify,
        ]
    }

    /// Stable identifier, used for file names.
    pub fn name(&self) -> &'static str {
        match self {
            TonalSound::Confirm => "confirm",
            TonalSound::Deny => "deny",
            TonalSound::Success => "success",
            TonalSound::Failure => "failure",
            TonalSound::Alert => "alert",
            TonalSound::Notify => "notify",
        }
    }
}

/// Renders one tonal palette sound through the master chain.
pub fn render_tonal(sound: TonalSound, sample_rate: f64) -> SynthResult<Vec<f64>> {
    let raw = match sound {
        TonalSound::Confirm => confirm(sample_rate),
        TonalSound::Deny => deny(sample_rate),
        TonalSound::Success => success(sample_rate),
        TonalSound::Failure => failure(sample_rate),
        TonalSound::Alert => alert(sample_rate),
        TonalSound::Notify => notify(sample_rate),
    };
    chain::process(&raw, &master_chain(), sample_rate)
}

/// Builds the impact half of the palette as a sound bank.
///
/// `impact-soft` is a single dull low thud; `impact-hard` layers a body
/// with a brighter transient strike. Both are ready for calibration once
/// reference target ranges are attached via [`SoundBank::set_targets`].
pub fn impact_bank(sample_rate: f64, seed: u64) -> SoundBank {
    let mut bank = SoundBank::new(sample_rate, seed);

    bank.insert(SoundDef {
        id: "impact-soft".to_string(),
        duration_s: 0.09,
        layers: vec![LayerParams {
            synth: SynthParams {
                fundamental_hz: 98.0,
                noise_mix: 0.25,
                noise_brightness_hz: 1_800.0,
                mode_balance: 0.25,
                onset_ms: 1.0,
                decay_ms: 35.0,
                decay_shape: 0.8,
            },
            chain: ChainParams {
                highpass_hz: 30.0,
                lowpass_hz: 6_000.0,
                gain: 1.0,
                reverb: None,
                compressor: None,
            },
        }],
        targets: None,
    });

    bank.insert(SoundDef {
        id: "impact-hard".to_string(),
        duration_s: 0.12,
        layers: vec![
            LayerParams {
                synth: SynthParams {
                    fundamental_hz: 146.83,
                    noise_mix: 0.45,
                    noise_brightness_hz: 3_500.0,
                    mode_balance: 0.4,
                    onset_ms: 1.0,
                    decay_ms: 45.0,
                    decay_shape: 0.75,
                },
                chain: ChainParams {
                    highpass_hz: 30.0,
                    lowpass_hz: 8_000.0,
                    gain: 1.0,
                    reverb: None,
                    compressor: None,
                },
            },
            LayerParams {
                synth: SynthParams {
                    fundamental_hz: 587.33,
                    noise_mix: 0.6,
                    noise_brightness_hz: 6_000.0,
                    mode_balance: 0.7,
                    onset_ms: 0.0,
                    decay_ms: 12.0,
                    decay_shape: 0.6,
                },
                chain: ChainParams {
                    highpass_hz: 200.0,
                    lowpass_hz: 9_000.0,
                    gain: 0.5,
                    reverb: None,
                    compressor: None,
                },
            },
        ],
        targets: None,
    });

    bank
}

fn seconds(sample_rate: f64, duration_s: f64) -> usize {
    (duration_s * sample_rate).round() as usize
}

/// Concatenates segments into one buffer.
fn join(parts: &[Vec<f64>]) -> Vec<f64> {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut output = Vec::with_capacity(total);
    for part in parts {
        output.extend_from_slice(part);
    }
    output
}

/// Sums voices of equal or shorter length into the first.
fn layer_into(base: &mut [f64], voice: &[f64], level: f64) {
    for (slot, sample) in base.iter_mut().zip(voice) {
        *slot += sample * level;
    }
}

fn synthesize<S: Synthesizer>(voice: &S, sample_rate: f64, duration_s: f64) -> Vec<f64> {
    // Tonal voices draw nothing from the RNG; the stream is fixed anyway.
    let mut rng = create_rng(0);
    voice.synthesize(seconds(sample_rate, duration_s), sample_rate, &mut rng)
}

/// Ascending major third G4 -> B4.
fn confirm(sample_rate: f64) -> Vec<f64> {
    let a = synthesize(&WarmVoice::new(G4, 22.0), sample_rate, 0.08);
    let b = synthesize(&WarmVoice::new(B4, 22.0), sample_rate, 0.08);
    join(&[a, silence(seconds(sample_rate, 0.02)), b])
}

/// Descending tritone B4 -> F4.
fn deny(sample_rate: f64) -> Vec<f64> {
    let a = synthesize(&WarmTriangleVoice::new(B4, 9.0), sample_rate, 0.10);
    let b = synthesize(&WarmTriangleVoice::new(F4, 9.0), sample_rate, 0.10);
    join(&[a, silence(seconds(sample_rate, 0.025)), b])
}

/// G major arpeggio blooming into a sustained chord.
fn success(sample_rate: f64) -> Vec<f64> {
    let mut parts = Vec::new();
    for (i, freq) in [G4, B4, D5, G5].into_iter().enumerate() {
        parts.push(synthesize(
            &WarmVoice::new(freq, 6.0 + i as f64 * 2.0),
            sample_rate,
            0.10,
        ));
        parts.push(silence(seconds(sample_rate, 0.035)));
    }

    let mut chord = synthesize(&WarmVoice::new(G5, 3.0), sample_rate, 0.40);
    let second = synthesize(&WarmVoice::new(B5, 3.0), sample_rate, 0.40);
    let third = synthesize(&WarmVoice::new(D6, 3.0), sample_rate, 0.40);
    layer_into(&mut chord, &second, 0.7);
    layer_into(&mut chord, &third, 0.5);
    parts.push(chord);

    join(&parts)
}

/// Descending G4 -> Eb4 -> D4.
fn failure(sample_rate: f64) -> Vec<f64> {
    let mut parts = Vec::new();
    for (i, freq) in [G4, EB4, D4].into_iter().enumerate() {
        parts.push(synthesize(
            &WarmTriangleVoice::new(freq, 5.0),
            sample_rate,
            0.13,
        ));
        if i < 2 {
            parts.push(silence(seconds(sample_rate, 0.035)));
        }
    }
    join(&parts)
}

/// FM bell double pip at D5.
fn alert(sample_rate: f64) -> Vec<f64> {
    let pip = synthesize(&FmBell::new(D5, 1.41, 3.5, 20.0), sample_rate, 0.07);
    join(&[pip.clone(), silence(seconds(sample_rate, 0.04)), pip])
}

/// FM bell chime at G5.
fn notify(sample_rate: f64) -> Vec<f64> {
    synthesize(&FmBell::new(G5, 1.41, 5.0, 5.0), sample_rate, 0.30)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 44_100.0;

    #[test]
    fn test_all_tonal_sounds_render() {
        for sound in TonalSound::all() {
            let samples = render_tonal(sound, SR).unwrap();
            assert!(!samples.is_empty(), "{} was empty", sound.name());
            assert!(
                samples.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{} exceeded full scale",
                sound.name()
            );
        }
    }

    #[test]
    fn test_tonal_sounds_are_deterministic() {
        let a = render_tonal(TonalSound::Confirm, SR).unwrap();
        let b = render_tonal(TonalSound::Confirm, SR).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_palette_names_are_unique() {
        let mut names: Vec<&str> = TonalSound::all().iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_impact_bank_renders_both_sounds() {
        let mut bank = impact_bank(SR, 42);
        let ids = bank.ids();
        assert_eq!(ids, vec!["impact-hard".to_string(), "impact-soft".to_string()]);

        for id in ids {
            let samples = bank.render(&id).unwrap();
            assert!(!samples.is_empty());
            assert!(samples.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_confirm_is_two_segments() {
        let samples = confirm(SR);
        let expected =
            seconds(SR, 0.08) + seconds(SR, 0.02) + seconds(SR, 0.08);
        assert_eq!(samples.len(), expected);

        // The gap between the notes is silent.
        let gap_start = seconds(SR, 0.08);
        let gap_end = gap_start + seconds(SR, 0.02);
        assert!(samples[gap_start..gap_end].iter().all(|&s| s == 0.0));
    }
}
