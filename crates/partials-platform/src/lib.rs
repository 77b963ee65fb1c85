//! Partials Platform - the control path around the engine
//!
//! Everything between the knobs and the audio callback, plus the slow
//! display path that watches the same parameters.
//!
//! # Core Abstractions
//!
//! ## Raw Sources
//!
//! - [`RawSource`] - A device yielding integer readings per channel
//! - [`FixedSource`], [`SweepSource`], [`ScriptedSource`] - Simulated knobs
//!
//! ## Parameter Hand-off
//!
//! - [`ParamStore`] - Atomically swapped snapshot of the latest
//!   [`ControlParams`](partials_core::ControlParams)
//! - [`ControlSampler`] - Read, map, smooth and publish at the poll rate
//!
//! ## Display
//!
//! - [`DisplayReporter`] - Periodic renders of the published parameters
//! - [`DisplaySink`] - Render target trait, with [`TerminalDisplay`] and
//!   [`TracingDisplay`]
//!
//! ## Offline
//!
//! - [`OfflineRenderer`] - Sampler and engine on one deterministic clock
//!
//! # Threads
//!
//! In a live setup the sampler runs on its own thread, the audio callback
//! loads one snapshot per block, and the reporter runs on the main thread:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//! use partials_core::ControlParams;
//! use partials_platform::{
//!     ControlSampler, DisplayReporter, FixedSource, ParamStore, SamplerSettings, TracingDisplay,
//! };
//!
//! let store = ParamStore::new(ControlParams::default());
//! let stop = Arc::new(AtomicBool::new(false));
//!
//! let sampler = ControlSampler::new(FixedSource::default(), SamplerSettings::default(), store.clone());
//! let handle = sampler.spawn(Arc::clone(&stop)).unwrap();
//!
//! // audio callback: let params = store.load();
//!
//! let mut reporter =
//!     DisplayReporter::new(TracingDisplay, store, Duration::from_millis(200), 6, 128, 64);
//! reporter.run(&stop);
//! handle.join().unwrap();
//! ```

pub mod display;
pub mod offline;
pub mod sampler;
pub mod source;
pub mod store;

pub use display::{
    DisplayReporter, DisplaySink, HEADER_HEIGHT, RenderRequest, TerminalDisplay, TracingDisplay,
};
pub use offline::OfflineRenderer;
pub use sampler::{ChannelLayout, ControlSampler, SamplerHandle, SamplerSettings, TickOutcome};
pub use source::{
    DEFAULT_CHANNEL_COUNT, DEFAULT_RAW_MAX, FixedSource, RawSource, ReadError, ScriptStep,
    ScriptedSource, SweepSource,
};
pub use store::{ParamStore, Snapshot};
