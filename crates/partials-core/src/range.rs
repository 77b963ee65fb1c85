//! Linear mapping from raw control readings to engineering units.
//!
//! Every physical control yields an integer in `[0, raw_max]` (a 10-bit ADC
//! gives `0..=1023`). Each parameter owns a [`ParamRange`] that maps the
//! reading linearly:
//!
//! ```text
//! value = min + (raw / raw_max) * (max - min)
//! ```
//!
//! The implementation evaluates the equivalent form
//! `min * (1 - t) + max * t` so that both endpoints are hit exactly in
//! floating point: `raw = 0` yields `min` and `raw = raw_max` yields `max`.

use crate::params::{ControlParams, ParamKind};
use libm::roundf;

/// Inclusive value range of one control parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Value produced by a raw reading of 0.
    pub min: f32,
    /// Value produced by a raw reading of `raw_max`.
    pub max: f32,
}

impl ParamRange {
    /// Create a range. `min` may exceed `max` for an inverted control.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Distance from `min` to `max`.
    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Interpolate at normalized position `t` (clamped to `[0, 1]`).
    #[inline]
    pub fn denormalize(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.min * (1.0 - t) + self.max * t
    }

    /// Normalized position of `value` within the range. A zero-width range
    /// maps everything to 0.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.span();
        if span == 0.0 {
            0.0
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        }
    }

    /// Map a raw reading to engineering units.
    ///
    /// Readings above `raw_max` are clamped. A `raw_max` of 0 maps every
    /// reading to `min`.
    #[inline]
    pub fn map_raw(&self, raw: u16, raw_max: u16) -> f32 {
        if raw_max == 0 {
            return self.min;
        }
        let t = f32::from(raw.min(raw_max)) / f32::from(raw_max);
        self.denormalize(t)
    }

    /// Clamp `value` into the range, whichever way round it is.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        let (lo, hi) = self.bounds();
        if value.is_nan() { lo } else { value.clamp(lo, hi) }
    }

    /// True if `value` lies within the range (inclusive).
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&value)
    }

    /// `(lower, upper)` regardless of orientation.
    #[inline]
    pub fn bounds(&self) -> (f32, f32) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }
}

/// One [`ParamRange`] per control parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRanges {
    /// Fundamental frequency range in Hz.
    pub frequency: ParamRange,
    /// Amplitude range; the lower bound is normally 0.
    pub amplitude: ParamRange,
    /// Partial frequency ratio range.
    pub base: ParamRange,
    /// Partial amplitude falloff range.
    pub decay: ParamRange,
}

impl ParamRanges {
    /// Range for one parameter.
    #[inline]
    pub fn get(&self, kind: ParamKind) -> ParamRange {
        match kind {
            ParamKind::Frequency => self.frequency,
            ParamKind::Amplitude => self.amplitude,
            ParamKind::Base => self.base,
            ParamKind::Decay => self.decay,
        }
    }

    /// Mutable range for one parameter.
    #[inline]
    pub fn get_mut(&mut self, kind: ParamKind) -> &mut ParamRange {
        match kind {
            ParamKind::Frequency => &mut self.frequency,
            ParamKind::Amplitude => &mut self.amplitude,
            ParamKind::Base => &mut self.base,
            ParamKind::Decay => &mut self.decay,
        }
    }

    /// Map four raw readings (in [`ParamKind::ALL`] order) to a parameter record.
    pub fn map_raw(&self, raw: [u16; 4], raw_max: u16) -> ControlParams {
        let mut params = ControlParams::splat(0.0);
        for kind in ParamKind::ALL {
            params.set(kind, self.get(kind).map_raw(raw[kind.index()], raw_max));
        }
        params
    }

    /// Clamp every field of `params` into its range.
    pub fn clamp(&self, params: &ControlParams) -> ControlParams {
        let mut out = *params;
        for kind in ParamKind::ALL {
            out.set(kind, self.get(kind).clamp(params.get(kind)));
        }
        out
    }

    /// True if every field of `params` is within its range.
    pub fn contains(&self, params: &ControlParams) -> bool {
        ParamKind::ALL
            .iter()
            .all(|&kind| self.get(kind).contains(params.get(kind)))
    }
}

impl Default for ParamRanges {
    fn default() -> Self {
        Self {
            frequency: ParamRange::new(100.0, 2000.0),
            amplitude: ParamRange::new(0.0, 0.8),
            base: ParamRange::new(1.0, 4.0),
            decay: ParamRange::new(1.2, 4.0),
        }
    }
}

/// Round `value` to the nearest multiple of `step`.
///
/// A non-positive or non-finite `step` returns `value` unchanged.
///
/// ```rust
/// use partials_core::quantize;
///
/// assert!((quantize(2.34, 0.1) - 2.3).abs() < 1e-6);
/// assert_eq!(quantize(2.34, 0.0), 2.34);
/// ```
#[inline]
pub fn quantize(value: f32, step: f32) -> f32 {
    if step > 0.0 && step.is_finite() {
        roundf(value / step) * step
    } else {
        value
    }
}
