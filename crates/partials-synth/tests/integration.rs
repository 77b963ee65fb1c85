//! Integration tests for the additive engine.
//!
//! Signal-level checks: output bounds over the configured ranges, spectral
//! placement of partials, block-size independence of the phase, and
//! continuity across block boundaries.

use std::sync::Arc;

use partials_core::{ControlParams, ParamRanges, Wavetable};
use partials_synth::{
    AdditiveEngine, EngineOptions, Headroom, PhaseMode, partial_sum_bound, phase_step,
};
use proptest::prelude::*;

const SAMPLE_RATE: f32 = 44100.0;
const TABLE_SIZE: usize = 4096;
const PARTIALS: usize = 6;
const BLOCK: usize = 64;

fn table() -> Arc<Wavetable> {
    Arc::new(Wavetable::sine(TABLE_SIZE))
}

/// Magnitude of the DFT bin nearest `freq_hz`, normalized by length.
fn dft_magnitude(signal: &[f32], freq_hz: f32) -> f32 {
    let n = signal.len() as f64;
    let w = core::f64::consts::TAU * f64::from(freq_hz) / f64::from(SAMPLE_RATE);
    let (mut re, mut im) = (0.0f64, 0.0f64);
    for (i, &s) in signal.iter().enumerate() {
        let angle = w * i as f64;
        re += f64::from(s) * angle.cos();
        im -= f64::from(s) * angle.sin();
    }
    ((re * re + im * im).sqrt() * 2.0 / n) as f32
}

#[test]
fn harmonic_partials_land_on_multiples() {
    let mut engine = AdditiveEngine::new(table(), SAMPLE_RATE, 3);
    // base 2 puts partials at 441, 882, 1764 Hz; decay 2 halves each one
    let params = ControlParams::new(441.0, 0.8, 2.0, 2.0);

    // Independent phases keep long renders exact across block boundaries
    engine.set_options(EngineOptions {
        phase_mode: PhaseMode::Independent,
        ..EngineOptions::default()
    });

    let mut signal = vec![0.0f32; 44100];
    for chunk in signal.chunks_mut(BLOCK) {
        engine.process_block(&params, chunk);
    }

    let m0 = dft_magnitude(&signal, 441.0);
    let m1 = dft_magnitude(&signal, 882.0);
    let m2 = dft_magnitude(&signal, 1764.0);
    let off = dft_magnitude(&signal, 600.0);

    assert!((m0 - 0.8).abs() < 0.02, "fundamental {m0}");
    assert!((m1 - 0.4).abs() < 0.02, "second partial {m1}");
    assert!((m2 - 0.2).abs() < 0.02, "third partial {m2}");
    assert!(off < 0.01, "energy between partials {off}");
}

#[test]
fn phase_independent_of_block_partition() {
    let params = ControlParams::new(777.0, 0.3, 1.3, 1.7);
    let mut whole = AdditiveEngine::new(table(), SAMPLE_RATE, PARTIALS);
    let mut split = AdditiveEngine::new(table(), SAMPLE_RATE, PARTIALS);

    let mut big = vec![0.0f32; 512];
    whole.process_block(&params, &mut big);

    let mut small = vec![0.0f32; 64];
    for _ in 0..8 {
        split.process_block(&params, &mut small);
    }

    assert!((whole.phase() - split.phase()).abs() < 1e-6);
}

#[test]
fn fundamental_continuous_across_blocks() {
    // A single partial is a plain table oscillator: consecutive blocks must
    // join without a phase jump.
    let mut engine = AdditiveEngine::new(table(), SAMPLE_RATE, 1);
    let params = ControlParams::new(440.0, 1.0, 1.0, 2.0);

    let mut joined = Vec::new();
    let mut block = [0.0f32; BLOCK];
    for _ in 0..20 {
        engine.process_block(&params, &mut block);
        joined.extend_from_slice(&block);
    }

    let max_delta = 2.0 * std::f32::consts::PI * 440.0 / SAMPLE_RATE + 0.01;
    for pair in joined.windows(2) {
        assert!(
            (pair[1] - pair[0]).abs() <= max_delta,
            "jump {} -> {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn replaying_from_saved_phase_is_deterministic() {
    let params = ControlParams::new(1000.0, 0.5, 2.5, 1.5);
    let mut engine = AdditiveEngine::new(table(), SAMPLE_RATE, PARTIALS);
    let mut scratch = [0.0f32; BLOCK];
    for _ in 0..5 {
        engine.process_block(&params, &mut scratch);
    }

    let saved = engine.phase();
    let mut first = [0.0f32; BLOCK];
    engine.process_block(&params, &mut first);
    let after_first = engine.phase();

    engine.set_phase(saved);
    let mut second = [0.0f32; BLOCK];
    engine.process_block(&params, &mut second);

    assert_eq!(first, second);
    assert_eq!(engine.phase(), after_first);

    let step = phase_step(1000.0, TABLE_SIZE, f64::from(SAMPLE_RATE));
    let expected = (saved + step * BLOCK as f64).rem_euclid(TABLE_SIZE as f64);
    assert_eq!(after_first, expected);
}

#[test]
fn headroom_normalize_scales_raw_sum() {
    let params = ControlParams::new(330.0, 0.6, 1.7, 1.4);
    let mut raw = AdditiveEngine::new(table(), SAMPLE_RATE, PARTIALS);
    let mut normalized = AdditiveEngine::with_options(
        table(),
        SAMPLE_RATE,
        PARTIALS,
        EngineOptions {
            headroom: Headroom::Normalize,
            ..EngineOptions::default()
        },
    );

    let mut a = [0.0f32; 256];
    let mut b = [0.0f32; 256];
    raw.process_block(&params, &mut a);
    normalized.process_block(&params, &mut b);

    let scale = partial_sum_bound(1.0, params.decay, PARTIALS);
    for (x, y) in a.iter().zip(&b) {
        assert!((x / scale - y).abs() < 1e-5, "{x} / {scale} != {y}");
    }
}

fn in_range_params() -> impl Strategy<Value = ControlParams> {
    let r = ParamRanges::default();
    (
        r.frequency.min..=r.frequency.max,
        r.amplitude.min..=r.amplitude.max,
        r.base.min..=r.base.max,
        r.decay.min..=r.decay.max,
    )
        .prop_map(|(f, a, b, d)| ControlParams::new(f, a, b, d))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For every in-range parameter set the block is finite and bounded by
    /// the partial-sum bound, in every phase mode.
    #[test]
    fn output_finite_and_bounded(
        params in in_range_params(),
        independent in any::<bool>(),
        start_phase in 0.0f64..4096.0,
        blocks in 1usize..8,
    ) {
        let options = EngineOptions {
            phase_mode: if independent { PhaseMode::Independent } else { PhaseMode::Locked },
            ..EngineOptions::default()
        };
        let mut engine = AdditiveEngine::with_options(table(), SAMPLE_RATE, PARTIALS, options);
        engine.set_phase(start_phase);

        let bound = partial_sum_bound(params.amplitude, params.decay, PARTIALS) + 1e-4;
        let mut block = [0.0f32; BLOCK];
        for _ in 0..blocks {
            engine.process_block(&params, &mut block);
            for &s in &block {
                prop_assert!(s.is_finite(), "non-finite sample for {:?}", params);
                prop_assert!(s.abs() <= bound, "|{}| > {} for {:?}", s, bound, params);
            }
            prop_assert!((0.0..4096.0).contains(&engine.phase()));
        }
    }

    /// Zero amplitude silences every block whatever the other parameters.
    #[test]
    fn zero_amplitude_always_silent(
        params in in_range_params(),
    ) {
        let mut engine = AdditiveEngine::new(table(), SAMPLE_RATE, PARTIALS);
        let mut block = [1.0f32; BLOCK];
        engine.process_block(&ControlParams { amplitude: 0.0, ..params }, &mut block);
        prop_assert!(block.iter().all(|&s| s == 0.0));
    }

    /// Garbage snapshots never produce NaN or infinity.
    #[test]
    fn degenerate_params_stay_finite(
        f in prop_oneof![Just(f32::NAN), Just(0.0f32), -1e6f32..1e6],
        a in prop_oneof![Just(f32::INFINITY), Just(-1.0f32), 0.0f32..1.0],
        b in prop_oneof![Just(0.0f32), Just(-2.0f32), Just(f32::NAN), 0.5f32..4.0],
        d in prop_oneof![Just(0.0f32), Just(-2.0f32), Just(f32::NAN), 1.0f32..4.0],
    ) {
        let mut engine = AdditiveEngine::new(table(), SAMPLE_RATE, PARTIALS);
        let mut block = [0.0f32; BLOCK];
        engine.process_block(&ControlParams::new(f, a, b, d), &mut block);
        prop_assert!(block.iter().all(|s| s.is_finite()));
        prop_assert!(engine.phase().is_finite());
    }
}
