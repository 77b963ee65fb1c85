//! The control parameter record shared between the control and audio paths.
//!
//! [`ControlParams`] is a plain `Copy` value. The control sampler builds a
//! fresh one every tick and publishes it as a whole; readers always work on a
//! private copy, never on a reference into shared mutable state.

use core::fmt;

/// Identifies one of the four control parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Fundamental frequency in Hz.
    Frequency,
    /// Linear output gain of the fundamental partial.
    Amplitude,
    /// Frequency ratio between successive partials.
    Base,
    /// Amplitude falloff ratio between successive partials.
    Decay,
}

impl ParamKind {
    /// All parameters, in record order.
    pub const ALL: [ParamKind; 4] = [
        ParamKind::Frequency,
        ParamKind::Amplitude,
        ParamKind::Base,
        ParamKind::Decay,
    ];

    /// Position of this parameter in [`ParamKind::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            ParamKind::Frequency => 0,
            ParamKind::Amplitude => 1,
            ParamKind::Base => 2,
            ParamKind::Decay => 3,
        }
    }

    /// Lowercase name, as used in configuration files and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            ParamKind::Frequency => "frequency",
            ParamKind::Amplitude => "amplitude",
            ParamKind::Base => "base",
            ParamKind::Decay => "decay",
        }
    }

    /// Parse a parameter name. Accepts the short aliases `freq` and `amp`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let is = |candidate: &str| name.eq_ignore_ascii_case(candidate);
        if is("frequency") || is("freq") {
            Some(ParamKind::Frequency)
        } else if is("amplitude") || is("amp") {
            Some(ParamKind::Amplitude)
        } else if is("base") {
            Some(ParamKind::Base)
        } else if is("decay") {
            Some(ParamKind::Decay)
        } else {
            None
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of all four control parameters.
///
/// # Example
///
/// ```rust
/// use partials_core::{ControlParams, ParamKind};
///
/// let mut params = ControlParams::default();
/// params.set(ParamKind::Frequency, 880.0);
/// assert_eq!(params.get(ParamKind::Frequency), 880.0);
/// assert_eq!(params.frequency, 880.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    /// Fundamental frequency in Hz.
    pub frequency: f32,
    /// Linear gain of the fundamental partial.
    pub amplitude: f32,
    /// Partial `n` sounds at `frequency * base^n`.
    pub base: f32,
    /// Partial `n` has gain `amplitude / decay^n`.
    pub decay: f32,
}

impl ControlParams {
    /// Create a parameter record.
    pub const fn new(frequency: f32, amplitude: f32, base: f32, decay: f32) -> Self {
        Self {
            frequency,
            amplitude,
            base,
            decay,
        }
    }

    /// A record with every field set to `value`.
    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Read one field.
    #[inline]
    pub fn get(&self, kind: ParamKind) -> f32 {
        match kind {
            ParamKind::Frequency => self.frequency,
            ParamKind::Amplitude => self.amplitude,
            ParamKind::Base => self.base,
            ParamKind::Decay => self.decay,
        }
    }

    /// Write one field.
    #[inline]
    pub fn set(&mut self, kind: ParamKind, value: f32) {
        match kind {
            ParamKind::Frequency => self.frequency = value,
            ParamKind::Amplitude => self.amplitude = value,
            ParamKind::Base => self.base = value,
            ParamKind::Decay => self.decay = value,
        }
    }

    /// Fields in [`ParamKind::ALL`] order.
    #[inline]
    pub fn to_array(&self) -> [f32; 4] {
        [self.frequency, self.amplitude, self.base, self.decay]
    }

    /// Build from fields in [`ParamKind::ALL`] order.
    #[inline]
    pub fn from_array(values: [f32; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// True when the record would produce sound: positive, finite frequency
    /// and amplitude.
    #[inline]
    pub fn is_audible(&self) -> bool {
        self.frequency.is_finite()
            && self.amplitude.is_finite()
            && self.frequency > 0.0
            && self.amplitude > 0.0
    }

    /// True when every field is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl Default for ControlParams {
    /// A4 at moderate level, harmonic-free stacking (base 1.0), decay 2.0.
    fn default() -> Self {
        Self::new(440.0, 0.2, 1.0, 2.0)
    }
}
