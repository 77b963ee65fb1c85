//! Partials Core - primitives for the additive wavetable synthesizer
//!
//! This crate holds everything the control path and the audio path agree on,
//! with zero allocation after construction.
//!
//! # Core Abstractions
//!
//! ## Wavetable
//!
//! - [`Wavetable`] - One precomputed period of a reference waveform with
//!   nearest-sample, modular lookup
//!
//! ## Control Parameters
//!
//! - [`ControlParams`] - The fixed-shape record shared between threads
//!   (frequency, amplitude, base, decay)
//! - [`ParamKind`] - Names one of the four fields
//!
//! ## Mapping
//!
//! - [`ParamRange`] - Linear mapping from a raw ADC reading to engineering units
//! - [`ParamRanges`] - One range per parameter
//! - [`quantize`] - Coarse step quantization for slow-moving parameters
//!
//! ## Smoothing
//!
//! - [`ExpSmoother`] - Single-pole exponential filter driven at the poll rate
//! - [`ParamSmoothers`] - One smoother per parameter with independent time constants
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! partials-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use partials_core::{ControlParams, ExpSmoother, ParamRange, Wavetable};
//!
//! let table = Wavetable::sine(4096);
//! assert_eq!(table.len(), 4096);
//!
//! let freq = ParamRange::new(100.0, 2000.0);
//! assert_eq!(freq.map_raw(0, 1023), 100.0);
//! assert_eq!(freq.map_raw(1023, 1023), 2000.0);
//!
//! let mut smoother = ExpSmoother::new(440.0, 0.01, 0.2);
//! let next = smoother.tick(1000.0);
//! assert!(next > 440.0 && next < 1000.0);
//!
//! let params = ControlParams::new(440.0, 0.2, 1.0, 2.0);
//! assert!(params.is_audible());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod params;
pub mod range;
pub mod smoothing;
pub mod wavetable;

// Re-export main types at crate root
pub use params::{ControlParams, ParamKind};
pub use range::{ParamRange, ParamRanges, quantize};
pub use smoothing::{ExpSmoother, ParamSmoothers, TimeConstants, smoothing_alpha};
pub use wavetable::Wavetable;
