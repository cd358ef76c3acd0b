//! Calibration loop tests through the public API.

use std::time::Duration;

use knock_spec::{ChainParams, LayerParams, ParamBounds, SynthParams, TargetRanges};
use knock_synth::calibrate::{objective_noise_seed, warm_start};
use knock_synth::wav::pcm_hash;
use knock_synth::{
    analyze, calibrate, render_layers, CalibrationSpec, DeConfig, DifferentialEvolution,
    TerminationReason,
};

const SR: f64 = 44_100.0;

fn fixture_layer() -> LayerParams {
    LayerParams {
        synth: SynthParams::default(),
        chain: ChainParams {
            highpass_hz: 0.0,
            lowpass_hz: 8_000.0,
            gain: 1.0,
            reverb: None,
            compressor: None,
        },
    }
}

fn reachable_spec(seed: u64) -> CalibrationSpec {
    let layer = fixture_layer();
    let waveform =
        render_layers(&[layer], 0.06, SR, objective_noise_seed(seed)).unwrap();
    let features = analyze(&waveform, SR);
    let targets = TargetRanges::from_references(&features, &features, 0.25).unwrap();

    CalibrationSpec {
        duration_s: 0.06,
        population: 8,
        max_generations: 5,
        initial_guess: Some(warm_start(&[layer])),
        ..CalibrationSpec::new(targets, seed)
    }
}

#[test]
fn test_calibrate_runs_are_bit_identical() {
    let spec = reachable_spec(21);
    let bounds = ParamBounds::for_impact_layers(1, SR).unwrap();

    let a = calibrate(&spec, &bounds, SR).unwrap();
    let b = calibrate(&spec, &bounds, SR).unwrap();

    assert_eq!(a.result.best, b.result.best);
    assert_eq!(a.result.cost, b.result.cost);
    assert_eq!(a.result.termination, b.result.termination);
    assert_eq!(a.features, b.features);

    // The re-rendered winners are the same audio, byte for byte.
    let wave_a = render_layers(&a.layers, 0.06, SR, objective_noise_seed(21)).unwrap();
    let wave_b = render_layers(&b.layers, 0.06, SR, objective_noise_seed(21)).unwrap();
    assert_eq!(pcm_hash(&wave_a), pcm_hash(&wave_b));
}

#[test]
fn test_calibrate_meets_reachable_targets() {
    let spec = reachable_spec(22);
    let bounds = ParamBounds::for_impact_layers(1, SR).unwrap();

    let outcome = calibrate(&spec, &bounds, SR).unwrap();
    assert_eq!(outcome.result.termination, TerminationReason::Converged);
    assert!(outcome.result.cost <= spec.success_threshold);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_synthetic_objective_converges_within_budget() {
    // A known global minimum inside the bounds with zero cost at the
    // bottom: the search must reach the threshold well inside its budget.
    let bounds = ParamBounds::new(vec![(-4.0, 4.0); 4]).unwrap();
    let config = DeConfig {
        population: 30,
        max_generations: 400,
        success_threshold: 1e-3,
        time_budget: Duration::from_secs(20),
        plateau_window: 300,
        plateau_rel_tol: 1e-12,
        ..DeConfig::default()
    };
    let mut search = DifferentialEvolution::new(bounds, config, 42).unwrap();
    let result = search.run(|x| x.iter().map(|v| (v - 0.5) * (v - 0.5)).sum());

    assert_eq!(result.termination, TerminationReason::Converged);
    assert!(result.cost <= 1e-3);
    assert!(result.elapsed < Duration::from_secs(20));
}

#[test]
fn test_flat_objective_plateaus_before_the_cap() {
    let bounds = ParamBounds::new(vec![(0.0, 1.0); 6]).unwrap();
    let config = DeConfig {
        population: 10,
        max_generations: 1000,
        success_threshold: 1e-9,
        time_budget: Duration::from_secs(20),
        plateau_window: 8,
        plateau_rel_tol: 1e-3,
        ..DeConfig::default()
    };
    let mut search = DifferentialEvolution::new(bounds, config, 42).unwrap();
    let result = search.run(|_| 7.5);

    assert_eq!(result.termination, TerminationReason::Plateau);
    assert!(result.generations < 50);
    assert!(result.elapsed < Duration::from_secs(20));
}

#[test]
fn test_compound_two_layer_calibration_dimensions() {
    let layers = vec![fixture_layer(), fixture_layer()];
    let waveform =
        render_layers(&layers, 0.06, SR, objective_noise_seed(23)).unwrap();
    let features = analyze(&waveform, SR);
    let targets = TargetRanges::from_references(&features, &features, 0.3).unwrap();

    let spec = CalibrationSpec {
        layers: 2,
        duration_s: 0.06,
        population: 8,
        max_generations: 3,
        initial_guess: Some(warm_start(&layers)),
        ..CalibrationSpec::new(targets, 23)
    };
    let bounds = ParamBounds::for_impact_layers(2, SR).unwrap();

    let outcome = calibrate(&spec, &bounds, SR).unwrap();
    assert_eq!(outcome.layers.len(), 2);
    assert_eq!(outcome.result.best.len(), 2 * LayerParams::SEARCH_DIMS);
    assert_eq!(outcome.result.cost, 0.0);
}
