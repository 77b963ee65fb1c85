//! Single-cycle wavetables with modular, nearest-sample lookup.
//!
//! A [`Wavetable`] holds `N` samples of one period of a reference waveform.
//! It is built once at startup and never mutated, so any number of readers
//! may share it (typically behind an `Arc`).
//!
//! Lookup is by integer table index reduced modulo `N`. There is no
//! interpolation between entries: with thousands of entries per period the
//! truncation error sits well below audible frequency resolution.
//!
//! When `N` is a power of two, the modulo reduces to a bit mask.
//!
//! # Example
//!
//! ```rust
//! use partials_core::Wavetable;
//!
//! let table = Wavetable::sine(1024);
//! assert_eq!(table.lookup(0), 0.0);
//! // Indices wrap in both directions
//! assert_eq!(table.lookup(1024), table.lookup(0));
//! assert_eq!(table.lookup(-1), table.lookup(1023));
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::TAU;
use libm::{fabsf, floor, sin};

/// One period of a periodic waveform, sampled at `N` evenly spaced points.
///
/// # Invariants
///
/// - `len() > 0` for the lifetime of the table
/// - every sample lies in `[-1.0, 1.0]` for tables built with [`Wavetable::sine`]
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    samples: Vec<f32>,
    /// `len - 1` when `len` is a power of two.
    mask: Option<usize>,
}

impl Wavetable {
    /// Build a sine table of `len` samples: `sin(2π · i / len)`.
    ///
    /// # Panics
    ///
    /// Panics if `len == 0`. Table sizes are validated at configuration time.
    pub fn sine(len: usize) -> Self {
        Self::from_fn(len, sin)
    }

    /// Build a table by sampling `waveform` over one period.
    ///
    /// `waveform` receives the phase in radians, `0 ≤ θ < 2π`. Values are
    /// computed in `f64` and stored as `f32`.
    ///
    /// # Panics
    ///
    /// Panics if `len == 0`.
    pub fn from_fn(len: usize, waveform: impl Fn(f64) -> f64) -> Self {
        assert!(len > 0, "wavetable length must be non-zero");
        let samples = (0..len)
            .map(|i| waveform(TAU * i as f64 / len as f64) as f32)
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(len, "wavetable built");

        Self {
            samples,
            mask: len.is_power_of_two().then(|| len - 1),
        }
    }

    /// Number of samples in one period.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`; a table has at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether lookups use the power-of-two mask fast path.
    #[inline]
    pub fn is_power_of_two(&self) -> bool {
        self.mask.is_some()
    }

    /// Raw sample slice.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at `index mod len`, for any signed index.
    #[inline]
    pub fn lookup(&self, index: i64) -> f32 {
        let wrapped = match self.mask {
            // Two's complement makes the mask a Euclidean remainder for negatives too
            Some(mask) => (index as u64 as usize) & mask,
            None => index.rem_euclid(self.samples.len() as i64) as usize,
        };
        self.samples[wrapped]
    }

    /// Sample at fractional table position `position`, truncated toward
    /// negative infinity and wrapped: `table[floor(position) mod len]`.
    ///
    /// Non-finite positions read index 0.
    #[inline]
    pub fn at(&self, position: f64) -> f32 {
        if position.is_finite() {
            self.lookup(floor(position) as i64)
        } else {
            self.samples[0]
        }
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(fabsf(*s)))
    }
}
