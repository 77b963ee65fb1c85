//! The additive wavetable engine.
//!
//! [`AdditiveEngine`] renders one mono block per call from a single
//! [`ControlParams`] snapshot. Partial `n` (for `n` in `0..P`) sounds at
//! `frequency * base^n` with gain `amplitude / decay^n`; every partial reads
//! the same shared [`Wavetable`] by nearest-sample lookup.
//!
//! # Phase
//!
//! The engine owns a fundamental phase accumulator measured in table
//! indices and kept in `[0, N)`. After a block of `F` frames at frequency
//! `f` it always equals
//!
//! ```text
//! (phase + f * N / S * F) mod N
//! ```
//!
//! In [`PhaseMode::Locked`] every partial starts the block at that same
//! accumulator value and walks the table with its own step. Harmonic
//! partials stay coherent and an inharmonic `base` yields a repeatable
//! shape per block. [`PhaseMode::Independent`] keeps one accumulator per
//! partial instead, so inharmonic partials drift exactly as they would in
//! a bank of free-running oscillators.
//!
//! # Real-time safety
//!
//! [`AdditiveEngine::process_block`] never allocates, locks, or blocks. Its
//! cost is `O(P * F)`.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use libm::{fmod, pow};
use partials_core::{ControlParams, Wavetable};

/// Upper bound on partials per voice. Independent phases live in a fixed
/// array of this size.
pub const MAX_PARTIALS: usize = 16;

/// How partial phases relate to the fundamental accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhaseMode {
    /// All partials start each block at the fundamental's phase.
    #[default]
    Locked,
    /// Each partial keeps and advances its own phase accumulator.
    Independent,
}

/// Output scaling applied to the partial sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Headroom {
    /// Raw sum; the peak can reach `amplitude * Σ 1/decay^n`.
    #[default]
    None,
    /// Divide by `Σ 1/decay^n` so the peak never exceeds `amplitude`.
    Normalize,
}

/// Engine behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Partial phase tracking.
    pub phase_mode: PhaseMode,
    /// Output scaling policy.
    pub headroom: Headroom,
    /// Skip partials at or above Nyquist.
    pub alias_guard: bool,
}

/// Table-index increment per sample for a partial at `frequency` Hz.
#[inline]
pub fn phase_step(frequency: f64, table_len: usize, sample_rate: f64) -> f64 {
    frequency * table_len as f64 / sample_rate
}

/// Advance `phase` by `step * frames` and reduce modulo `table_len`.
///
/// A non-finite result leaves the phase where it was.
#[inline]
pub fn advance_phase(phase: f64, step: f64, frames: usize, table_len: usize) -> f64 {
    let len = table_len as f64;
    let next = phase + step * frames as f64;
    if !next.is_finite() {
        return phase;
    }
    let r = fmod(next, len);
    if r < 0.0 { r + len } else { r }
}

/// Peak magnitude bound of the raw partial sum, `amplitude * Σ_{n<P} 1/decay^n`.
///
/// Non-positive or non-finite `decay` is treated as 1.0, as the engine does.
pub fn partial_sum_bound(amplitude: f32, decay: f32, partials: usize) -> f32 {
    let decay = f64::from(sanitize_ratio(decay));
    let sum: f64 = (0..partials).map(|n| 1.0 / pow(decay, n as f64)).sum();
    (f64::from(amplitude) * sum) as f32
}

/// Replace a ratio that would fault the partial maths with the neutral 1.0.
#[inline]
fn sanitize_ratio(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

/// Additive wavetable voice.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use partials_core::{ControlParams, Wavetable};
/// use partials_synth::AdditiveEngine;
///
/// let table = Arc::new(Wavetable::sine(4096));
/// let mut engine = AdditiveEngine::new(table, 44100.0, 6);
///
/// let mut block = [0.0f32; 64];
/// engine.process_block(&ControlParams::new(440.0, 0.2, 1.0, 2.0), &mut block);
/// assert!(block.iter().all(|s| s.is_finite()));
/// assert!(engine.phase() > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct AdditiveEngine {
    /// Shared, read-only waveform period
    table: Arc<Wavetable>,
    /// Sample rate in Hz
    sample_rate: f32,
    /// Active partial count, at most `MAX_PARTIALS`
    partials: usize,
    /// Behavior switches
    options: EngineOptions,
    /// Fundamental phase in table indices, always in [0, N)
    phase: f64,
    /// Per-partial phases for `PhaseMode::Independent` (index 0 unused)
    partial_phases: [f64; MAX_PARTIALS],
}

impl AdditiveEngine {
    /// Create an engine with default options.
    ///
    /// `partials` is capped at [`MAX_PARTIALS`].
    pub fn new(table: Arc<Wavetable>, sample_rate: f32, partials: usize) -> Self {
        Self::with_options(table, sample_rate, partials, EngineOptions::default())
    }

    /// Create an engine with explicit options.
    pub fn with_options(
        table: Arc<Wavetable>,
        sample_rate: f32,
        partials: usize,
        options: EngineOptions,
    ) -> Self {
        Self {
            table,
            sample_rate,
            partials: partials.min(MAX_PARTIALS),
            options,
            phase: 0.0,
            partial_phases: [0.0; MAX_PARTIALS],
        }
    }

    /// Render one block into `out` from a single parameter snapshot.
    ///
    /// Every sample of `out` is overwritten. A snapshot that is not
    /// [`ControlParams::is_audible`] renders silence; the phase still
    /// advances unless the frequency (or the sample rate) is non-positive
    /// or non-finite. A non-positive `base` or `decay` is treated as 1.0.
    pub fn process_block(&mut self, params: &ControlParams, out: &mut [f32]) {
        out.fill(0.0);

        let sample_rate = f64::from(self.sample_rate);
        let frequency_valid = params.frequency.is_finite() && params.frequency > 0.0;
        if !frequency_valid || !(sample_rate.is_finite() && sample_rate > 0.0) {
            return;
        }
        let sounding = params.is_audible();

        let len = self.table.len();
        let frames = out.len();
        let frequency = f64::from(params.frequency);
        let amplitude = f64::from(params.amplitude);
        let base = f64::from(sanitize_ratio(params.base));
        let decay = f64::from(sanitize_ratio(params.decay));
        let nyquist = sample_rate * 0.5;

        let gain = match self.options.headroom {
            Headroom::None => 1.0,
            Headroom::Normalize => {
                1.0 / f64::from(partial_sum_bound(1.0, params.decay, self.partials))
            }
        };

        let table = &*self.table;
        for n in 0..self.partials {
            let partial_freq = frequency * pow(base, n as f64);
            let partial_amp = (amplitude * gain / pow(decay, n as f64)) as f32;
            let step = phase_step(partial_freq, len, sample_rate);

            let start = match self.options.phase_mode {
                PhaseMode::Independent if n > 0 => self.partial_phases[n],
                _ => self.phase,
            };

            let audible = sounding
                && partial_amp.is_finite()
                && partial_amp != 0.0
                && !(self.options.alias_guard && partial_freq >= nyquist);
            if audible {
                for (i, sample) in out.iter_mut().enumerate() {
                    *sample += table.at(start + step * i as f64) * partial_amp;
                }
            }

            if n > 0 && self.options.phase_mode == PhaseMode::Independent {
                self.partial_phases[n] = advance_phase(start, step, frames, len);
            }
        }

        let step = phase_step(frequency, len, sample_rate);
        self.phase = advance_phase(self.phase, step, frames, len);
    }

    /// Fundamental phase in table indices, in `[0, N)`.
    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Set the fundamental phase (reduced modulo the table length).
    ///
    /// Independent partial phases are left alone.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = advance_phase(0.0, phase, 1, self.table.len());
    }

    /// Phase of partial `n`. In locked mode every partial reports the
    /// fundamental phase. Out-of-range indices return `None`.
    pub fn partial_phase(&self, n: usize) -> Option<f64> {
        if n >= self.partials {
            return None;
        }
        Some(match self.options.phase_mode {
            PhaseMode::Independent if n > 0 => self.partial_phases[n],
            _ => self.phase,
        })
    }

    /// Zero all phase accumulators.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.partial_phases = [0.0; MAX_PARTIALS];
    }

    /// Active partial count.
    pub fn partials(&self) -> usize {
        self.partials
    }

    /// Change the partial count (capped at [`MAX_PARTIALS`]).
    pub fn set_partials(&mut self, partials: usize) {
        self.partials = partials.min(MAX_PARTIALS);
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Current options.
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Replace the options. Switching phase mode restarts every partial
    /// from the fundamental phase.
    pub fn set_options(&mut self, options: EngineOptions) {
        if options.phase_mode != self.options.phase_mode {
            self.partial_phases = [self.phase; MAX_PARTIALS];
        }
        self.options = options;
    }

    /// Shared wavetable.
    pub fn table(&self) -> &Arc<Wavetable> {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;
    const N: usize = 4096;

    fn engine(partials: usize) -> AdditiveEngine {
        AdditiveEngine::new(Arc::new(Wavetable::sine(N)), SR, partials)
    }

    #[test]
    fn single_partial_matches_table_walk() {
        let mut e = engine(1);
        let params = ControlParams::new(440.0, 0.5, 1.0, 2.0);
        let mut out = [0.0f32; 64];
        e.process_block(&params, &mut out);

        let table = Wavetable::sine(N);
        let step = 440.0 * N as f64 / f64::from(SR);
        for (i, &s) in out.iter().enumerate() {
            let expected = table.at(step * i as f64) * 0.5;
            assert_eq!(s, expected, "sample {i}");
        }
    }

    #[test]
    fn amplitude_zero_is_silent() {
        let mut e = engine(6);
        let mut out = [1.0f32; 128];
        e.process_block(&ControlParams::new(440.0, 0.0, 2.0, 1.5), &mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn amplitude_zero_still_advances_phase() {
        for amplitude in [0.0, -0.5] {
            let mut e = engine(6);
            let mut out = [1.0f32; 64];
            e.process_block(&ControlParams::new(440.0, amplitude, 1.0, 2.0), &mut out);
            assert!(out.iter().all(|&s| s == 0.0));

            let expected = (440.0 * N as f64 / f64::from(SR) * 64.0) % N as f64;
            assert!((e.phase() - expected).abs() < 1e-9, "{} vs {expected}", e.phase());
        }

        // Independent partials keep moving too, each at its own rate
        let options = EngineOptions {
            phase_mode: PhaseMode::Independent,
            ..EngineOptions::default()
        };
        let mut e = AdditiveEngine::with_options(Arc::new(Wavetable::sine(N)), SR, 3, options);
        let mut out = [0.0f32; 64];
        e.process_block(&ControlParams::new(440.0, 0.0, 2.0, 2.0), &mut out);
        let step = 880.0 * N as f64 / f64::from(SR);
        let expected = (step * 64.0) % N as f64;
        let partial = e.partial_phase(1).unwrap();
        assert!((partial - expected).abs() < 1e-9, "{partial} vs {expected}");
    }

    #[test]
    fn non_positive_frequency_is_silent_and_keeps_phase() {
        let mut e = engine(6);
        e.set_phase(123.5);
        for freq in [0.0, -440.0, f32::NAN, f32::INFINITY] {
            let mut out = [1.0f32; 64];
            e.process_block(&ControlParams::new(freq, 0.5, 1.0, 2.0), &mut out);
            assert!(out.iter().all(|&s| s == 0.0), "freq {freq}");
            assert_eq!(e.phase(), 123.5, "freq {freq}");
        }
    }

    #[test]
    fn zero_decay_and_base_are_neutral() {
        let mut zeroed = engine(4);
        let mut neutral = engine(4);
        let mut a = [0.0f32; 64];
        let mut b = [0.0f32; 64];
        zeroed.process_block(&ControlParams::new(220.0, 0.2, 0.0, 0.0), &mut a);
        neutral.process_block(&ControlParams::new(220.0, 0.2, 1.0, 1.0), &mut b);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn phase_law_holds_across_blocks() {
        let mut e = engine(6);
        let freq = 1234.5f32;
        let mut out = [0.0f32; 64];
        let mut expected = 0.0f64;
        for _ in 0..1000 {
            e.process_block(&ControlParams::new(freq, 0.3, 1.5, 2.0), &mut out);
            let step = f64::from(freq) * N as f64 / f64::from(SR);
            expected = (expected + step * 64.0).rem_euclid(N as f64);
            assert_eq!(e.phase(), expected);
            assert!((0.0..N as f64).contains(&e.phase()));
        }
    }

    #[test]
    fn normalize_caps_peak_at_amplitude() {
        let options = EngineOptions {
            headroom: Headroom::Normalize,
            ..EngineOptions::default()
        };
        let mut e = AdditiveEngine::with_options(Arc::new(Wavetable::sine(N)), SR, 6, options);
        let mut out = [0.0f32; 4096];
        e.process_block(&ControlParams::new(100.0, 0.8, 1.0, 1.2), &mut out);
        let peak = out.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= 0.8 + 1e-5, "peak {peak}");
        // base 1.0 stacks every partial in phase, so the peak reaches amplitude
        assert!(peak > 0.79, "peak {peak}");
    }

    #[test]
    fn alias_guard_drops_partials_above_nyquist() {
        let guarded = EngineOptions {
            alias_guard: true,
            ..EngineOptions::default()
        };
        let mut e = AdditiveEngine::with_options(Arc::new(Wavetable::sine(N)), SR, 6, guarded);
        let mut reference = engine(1);

        // base 4 puts partial 1 at 60 kHz, well past Nyquist
        let params = ControlParams::new(15000.0, 0.5, 4.0, 2.0);
        let mut a = [0.0f32; 64];
        let mut b = [0.0f32; 64];
        e.process_block(&params, &mut a);
        reference.process_block(&params, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn independent_phases_advance_by_own_step() {
        let options = EngineOptions {
            phase_mode: PhaseMode::Independent,
            ..EngineOptions::default()
        };
        let mut e = AdditiveEngine::with_options(Arc::new(Wavetable::sine(N)), SR, 3, options);
        let params = ControlParams::new(300.0, 0.2, 1.5, 2.0);
        let mut out = [0.0f32; 64];
        e.process_block(&params, &mut out);

        let fundamental = 300.0 * N as f64 / f64::from(SR);
        assert_eq!(e.partial_phase(0), Some(e.phase()));
        let p1 = e.partial_phase(1).unwrap_or_default();
        let expected = (fundamental * 1.5 * 64.0).rem_euclid(N as f64);
        assert!((p1 - expected).abs() < 1e-9, "{p1} vs {expected}");
        assert_eq!(e.partial_phase(3), None);
    }

    #[test]
    fn locked_partials_report_fundamental_phase() {
        let mut e = engine(4);
        e.set_phase(10.0);
        assert_eq!(e.partial_phase(3), Some(10.0));
    }

    #[test]
    fn set_phase_wraps() {
        let mut e = engine(1);
        e.set_phase(N as f64 + 5.0);
        assert_eq!(e.phase(), 5.0);
        e.set_phase(-1.0);
        assert_eq!(e.phase(), N as f64 - 1.0);
    }

    #[test]
    fn partial_count_capped() {
        let mut e = engine(100);
        assert_eq!(e.partials(), MAX_PARTIALS);
        e.set_partials(3);
        assert_eq!(e.partials(), 3);
    }

    #[test]
    fn bound_formula() {
        assert!((partial_sum_bound(1.0, 2.0, 3) - 1.75).abs() < 1e-6);
        assert_eq!(partial_sum_bound(0.5, 0.0, 4), 2.0);
        assert_eq!(partial_sum_bound(1.0, 2.0, 0), 0.0);
    }

    #[test]
    fn empty_block_still_advances_nothing() {
        let mut e = engine(6);
        let mut out: [f32; 0] = [];
        e.process_block(&ControlParams::default(), &mut out);
        assert_eq!(e.phase(), 0.0);
    }
}
