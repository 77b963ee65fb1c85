//! Partials Synth - the real-time additive engine
//!
//! A single voice built from `P` table-lookup partials whose frequencies
//! stack geometrically by `base` and whose gains fall off geometrically by
//! `decay`.
//!
//! - [`AdditiveEngine`] - Block renderer owning the phase accumulator
//! - [`EngineOptions`] - [`PhaseMode`], [`Headroom`] and the Nyquist guard
//! - [`partial_sum_bound`] - Worst-case output peak for a parameter set
//!
//! ```rust
//! use std::sync::Arc;
//! use partials_core::{ControlParams, Wavetable};
//! use partials_synth::{AdditiveEngine, partial_sum_bound};
//!
//! let mut engine = AdditiveEngine::new(Arc::new(Wavetable::sine(4096)), 44100.0, 6);
//! let params = ControlParams::new(220.0, 0.4, 2.0, 2.0);
//!
//! let mut block = vec![0.0f32; 256];
//! engine.process_block(&params, &mut block);
//!
//! let bound = partial_sum_bound(params.amplitude, params.decay, 6);
//! assert!(block.iter().all(|s| s.abs() <= bound + 1e-5));
//! ```
//!
//! # no_std Support
//!
//! ```toml
//! [dependencies]
//! partials-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod engine;

pub use engine::{
    AdditiveEngine, EngineOptions, Headroom, MAX_PARTIALS, PhaseMode, advance_phase,
    partial_sum_bound, phase_step,
};
