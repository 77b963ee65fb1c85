//! Single-pole exponential smoothing for control-rate parameters.
//!
//! Knob readings arrive at the poll rate (typically 100 Hz) and jump in
//! coarse steps. [`ExpSmoother`] low-passes them with
//!
//! ```text
//! alpha    = 1 - exp(-dt / tau)
//! smoothed = smoothed + alpha * (target - smoothed)
//! ```
//!
//! where `dt` is the poll period and `tau` the time constant, both in
//! seconds. For `alpha` in `(0, 1)` this is a contraction: a held target is
//! approached monotonically and never overshot.
//!
//! This is the control-rate sibling of a per-sample smoothed parameter; the
//! coefficient is derived from the poll period rather than the sample rate.
//!
//! ## Usage
//!
//! ```rust
//! use partials_core::ExpSmoother;
//!
//! // 100 Hz polling, 200 ms time constant
//! let mut freq = ExpSmoother::new(440.0, 0.01, 0.2);
//!
//! for _ in 0..200 { // two seconds of ticks
//!     freq.tick(880.0);
//! }
//! assert!((freq.value() - 880.0).abs() < 0.1);
//! ```

use crate::params::{ControlParams, ParamKind};
use libm::{expf, fabsf};

/// Convergence tolerance used by [`ExpSmoother::is_settled`].
const SETTLE_EPSILON: f32 = 1e-6;

/// Smoothing coefficient for a poll period `dt` and time constant `tau`.
///
/// Follows the limits of `1 - exp(-dt / tau)`:
///
/// - `tau <= 0` (or NaN): 1.0, the output follows the target instantly
/// - `tau = +inf`: 0.0, the output never moves
/// - `dt <= 0` (or NaN): 0.0, the output never moves
/// - `dt = +inf` with a finite `tau`: 1.0
#[inline]
pub fn smoothing_alpha(dt: f32, tau: f32) -> f32 {
    if tau.is_nan() || tau <= 0.0 {
        return 1.0;
    }
    if tau == f32::INFINITY || dt.is_nan() || dt <= 0.0 {
        return 0.0;
    }
    1.0 - expf(-dt / tau)
}

/// A single-pole exponential smoother advanced once per poll tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpSmoother {
    /// Current smoothed value
    current: f32,
    /// Smoothing coefficient in [0, 1]
    alpha: f32,
}

impl ExpSmoother {
    /// Create a smoother starting at `initial`, ticking every `dt` seconds
    /// with time constant `tau` seconds.
    pub fn new(initial: f32, dt: f32, tau: f32) -> Self {
        Self::with_alpha(initial, smoothing_alpha(dt, tau))
    }

    /// Create a smoother with an explicit coefficient (clamped to `[0, 1]`).
    pub fn with_alpha(initial: f32, alpha: f32) -> Self {
        Self {
            current: initial,
            alpha: if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) },
        }
    }

    /// Advance one tick toward `target` and return the new value.
    ///
    /// With `alpha == 1` the target is taken exactly. A non-finite target is
    /// ignored and the previous value is held.
    #[inline]
    pub fn tick(&mut self, target: f32) -> f32 {
        if !target.is_finite() {
            return self.current;
        }
        if self.alpha >= 1.0 {
            self.current = target;
        } else {
            self.current += self.alpha * (target - self.current);
        }
        self.current
    }

    /// Current smoothed value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Smoothing coefficient.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Recompute the coefficient for a new poll period or time constant.
    pub fn set_time_constant(&mut self, dt: f32, tau: f32) {
        self.alpha = smoothing_alpha(dt, tau);
    }

    /// Jump straight to `value`.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
    }

    /// True once the smoothed value is within `1e-6` of `target`.
    #[inline]
    pub fn is_settled(&self, target: f32) -> bool {
        fabsf(self.current - target) < SETTLE_EPSILON
    }
}

/// Per-parameter smoothing time constants, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeConstants {
    /// Frequency time constant.
    pub frequency: f32,
    /// Amplitude time constant.
    pub amplitude: f32,
    /// Base time constant.
    pub base: f32,
    /// Decay time constant.
    pub decay: f32,
}

impl TimeConstants {
    /// Time constant for one parameter.
    #[inline]
    pub fn get(&self, kind: ParamKind) -> f32 {
        match kind {
            ParamKind::Frequency => self.frequency,
            ParamKind::Amplitude => self.amplitude,
            ParamKind::Base => self.base,
            ParamKind::Decay => self.decay,
        }
    }

    /// Same time constant for every parameter.
    pub const fn uniform(tau: f32) -> Self {
        Self {
            frequency: tau,
            amplitude: tau,
            base: tau,
            decay: tau,
        }
    }
}

impl Default for TimeConstants {
    /// Frequency tracks fastest; amplitude at half speed; the partial
    /// shape controls an eighth as fast to keep slow knob noise inaudible.
    fn default() -> Self {
        Self {
            frequency: 0.2,
            amplitude: 0.4,
            base: 1.6,
            decay: 1.6,
        }
    }
}

/// One [`ExpSmoother`] per control parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSmoothers {
    smoothers: [ExpSmoother; 4],
}

impl ParamSmoothers {
    /// Start every smoother at the matching field of `initial`.
    pub fn new(initial: ControlParams, dt: f32, taus: TimeConstants) -> Self {
        let smoothers = ParamKind::ALL
            .map(|kind| ExpSmoother::new(initial.get(kind), dt, taus.get(kind)));
        Self { smoothers }
    }

    /// Advance all four smoothers one tick toward `targets`.
    pub fn tick(&mut self, targets: &ControlParams) -> ControlParams {
        for kind in ParamKind::ALL {
            self.smoothers[kind.index()].tick(targets.get(kind));
        }
        self.current()
    }

    /// Current smoothed record.
    pub fn current(&self) -> ControlParams {
        ControlParams::from_array(self.smoothers.map(|s| s.value()))
    }

    /// Smoother for one parameter.
    pub fn get(&self, kind: ParamKind) -> &ExpSmoother {
        &self.smoothers[kind.index()]
    }

    /// Jump every smoother to `params`.
    pub fn reset(&mut self, params: ControlParams) {
        for kind in ParamKind::ALL {
            self.smoothers[kind.index()].set_immediate(params.get(kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_matches_formula() {
        let alpha = smoothing_alpha(0.01, 0.2);
        let expected = 1.0 - expf(-0.05);
        assert!((alpha - expected).abs() < 1e-7);
        assert!(alpha > 0.0 && alpha < 1.0);
    }

    #[test]
    fn alpha_edge_cases() {
        assert_eq!(smoothing_alpha(0.01, 0.0), 1.0);
        assert_eq!(smoothing_alpha(0.01, -1.0), 1.0);
        assert_eq!(smoothing_alpha(0.01, f32::NEG_INFINITY), 1.0);
        assert_eq!(smoothing_alpha(0.01, f32::NAN), 1.0);
        assert_eq!(smoothing_alpha(0.01, f32::INFINITY), 0.0);
        assert_eq!(smoothing_alpha(f32::INFINITY, f32::INFINITY), 0.0);
        assert_eq!(smoothing_alpha(0.0, 0.2), 0.0);
        assert_eq!(smoothing_alpha(f32::NAN, 0.2), 0.0);
        assert_eq!(smoothing_alpha(f32::INFINITY, 0.2), 1.0);
    }

    #[test]
    fn infinite_tau_holds_value() {
        let mut s = ExpSmoother::new(3.0, 0.01, f32::INFINITY);
        for _ in 0..100 {
            assert_eq!(s.tick(10.0), 3.0);
        }
    }

    #[test]
    fn instant_when_tau_zero() {
        let mut s = ExpSmoother::new(0.0, 0.01, 0.0);
        assert_eq!(s.tick(5.0), 5.0);
        assert!(s.is_settled(5.0));
    }

    #[test]
    fn one_time_constant_reaches_63_percent() {
        // 20 ticks of 10 ms = 200 ms = one tau
        let mut s = ExpSmoother::new(0.0, 0.01, 0.2);
        for _ in 0..20 {
            s.tick(1.0);
        }
        let expected = 1.0 - expf(-1.0);
        assert!(
            (s.value() - expected).abs() < 1e-3,
            "expected ~{expected}, got {}",
            s.value()
        );
    }

    #[test]
    fn monotonic_without_overshoot() {
        let mut s = ExpSmoother::new(100.0, 0.01, 0.05);
        let mut prev = s.value();
        for _ in 0..1000 {
            let v = s.tick(2000.0);
            assert!(v >= prev, "not monotonic: {prev} -> {v}");
            assert!(v <= 2000.0, "overshoot: {v}");
            prev = v;
        }
    }

    #[test]
    fn non_finite_target_holds() {
        let mut s = ExpSmoother::new(1.0, 0.01, 0.2);
        assert_eq!(s.tick(f32::NAN), 1.0);
        assert_eq!(s.tick(f32::INFINITY), 1.0);
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(ExpSmoother::with_alpha(0.0, 2.0).alpha(), 1.0);
        assert_eq!(ExpSmoother::with_alpha(0.0, -1.0).alpha(), 0.0);
        assert_eq!(ExpSmoother::with_alpha(0.0, f32::NAN).alpha(), 1.0);
    }

    #[test]
    fn param_smoothers_use_independent_constants() {
        let initial = ControlParams::splat(0.0);
        let mut smoothers = ParamSmoothers::new(initial, 0.01, TimeConstants::default());
        let targets = ControlParams::splat(1.0);
        let out = smoothers.tick(&targets);

        // Frequency (tau 0.2) moves further per tick than base (tau 1.6)
        assert!(out.frequency > out.amplitude);
        assert!(out.amplitude > out.base);
        assert_eq!(out.base, out.decay);
        assert_eq!(smoothers.current(), out);
    }

    #[test]
    fn param_smoothers_reset() {
        let mut smoothers =
            ParamSmoothers::new(ControlParams::default(), 0.01, TimeConstants::uniform(0.1));
        let target = ControlParams::new(1000.0, 0.5, 2.0, 3.0);
        smoothers.reset(target);
        assert_eq!(smoothers.current(), target);
        assert!(smoothers.get(ParamKind::Decay).is_settled(3.0));
    }
}
