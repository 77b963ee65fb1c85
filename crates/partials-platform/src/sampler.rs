//! The control sampler.
//!
//! Each tick reads the four assigned channels from a [`RawSource`], maps
//! the raw readings through the configured ranges, optionally quantizes the
//! slow partial-shape targets, smooths every parameter and publishes the
//! result to a [`ParamStore`] in one swap.
//!
//! A transient read failure skips the tick entirely: no smoother moves and
//! nothing is published, so readers keep the previous record.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use partials_core::{
    ControlParams, ParamKind, ParamRanges, ParamSmoothers, TimeConstants, quantize,
};
use tracing::{debug, info};

use crate::source::{DEFAULT_RAW_MAX, RawSource, ReadError};
use crate::store::ParamStore;

/// Which raw channel feeds which parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLayout {
    /// Frequency channel.
    pub frequency: u8,
    /// Amplitude channel.
    pub amplitude: u8,
    /// Base channel.
    pub base: u8,
    /// Decay channel.
    pub decay: u8,
}

impl ChannelLayout {
    /// Channel assigned to `kind`.
    pub fn channel(&self, kind: ParamKind) -> u8 {
        match kind {
            ParamKind::Frequency => self.frequency,
            ParamKind::Amplitude => self.amplitude,
            ParamKind::Base => self.base,
            ParamKind::Decay => self.decay,
        }
    }
}

impl Default for ChannelLayout {
    /// The upper half of an eight-channel converter.
    fn default() -> Self {
        Self {
            frequency: 4,
            amplitude: 5,
            base: 6,
            decay: 7,
        }
    }
}

/// Everything the sampler needs besides its source and store.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerSettings {
    /// Channel assignment.
    pub layout: ChannelLayout,
    /// Full-scale raw reading.
    pub raw_max: u16,
    /// Raw-to-value mapping per parameter.
    pub ranges: ParamRanges,
    /// Smoothing time constant per parameter, in seconds.
    pub time_constants: TimeConstants,
    /// Ticks per second.
    pub poll_hz: f32,
    /// Step applied to the base and decay targets before smoothing.
    pub quantize_step: Option<f32>,
    /// Starting value of every smoother.
    pub initial: ControlParams,
}

impl SamplerSettings {
    /// Time between ticks. A non-positive rate falls back to 100 Hz.
    pub fn poll_period(&self) -> Duration {
        if self.poll_hz.is_finite() && self.poll_hz > 0.0 {
            Duration::from_secs_f64(1.0 / f64::from(self.poll_hz))
        } else {
            Duration::from_millis(10)
        }
    }
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            layout: ChannelLayout::default(),
            raw_max: DEFAULT_RAW_MAX,
            ranges: ParamRanges::default(),
            time_constants: TimeConstants::default(),
            poll_hz: 100.0,
            quantize_step: Some(0.1),
            initial: ControlParams::default(),
        }
    }
}

/// Result of one sampler tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A new record was published.
    Published {
        /// The published record.
        params: ControlParams,
        /// Its store sequence number.
        sequence: u64,
    },
    /// A read failed; nothing changed.
    Skipped(ReadError),
}

/// Reads, maps, smooths and publishes control parameters.
#[derive(Debug)]
pub struct ControlSampler<S> {
    source: S,
    settings: SamplerSettings,
    smoothers: ParamSmoothers,
    store: ParamStore,
    period: Duration,
    ticks: u64,
    skipped: u64,
}

impl<S: RawSource> ControlSampler<S> {
    /// Create a sampler. Smoothers start at `settings.initial`; the store is
    /// not touched until the first tick.
    pub fn new(source: S, settings: SamplerSettings, store: ParamStore) -> Self {
        let period = settings.poll_period();
        let smoothers = ParamSmoothers::new(
            settings.initial,
            period.as_secs_f32(),
            settings.time_constants,
        );
        Self {
            source,
            settings,
            smoothers,
            store,
            period,
            ticks: 0,
            skipped: 0,
        }
    }

    /// Read the four assigned channels.
    ///
    /// Channels the source does not have read as 0.
    pub fn read_raw(&mut self) -> Result<[u16; 4], ReadError> {
        let mut raw = [0u16; 4];
        let count = self.source.channel_count();
        for kind in ParamKind::ALL {
            let channel = self.settings.layout.channel(kind);
            raw[kind.index()] = if channel < count {
                self.source.read_channel(channel)?
            } else {
                0
            };
        }
        Ok(raw)
    }

    /// Map raw readings to smoothing targets.
    pub fn targets(&self, raw: [u16; 4]) -> ControlParams {
        let mut targets = self.settings.ranges.map_raw(raw, self.settings.raw_max);
        if let Some(step) = self.settings.quantize_step {
            targets.base = quantize(targets.base, step);
            targets.decay = quantize(targets.decay, step);
        }
        targets
    }

    /// Run one tick: read, map, smooth, publish. The source clock advances
    /// by one poll period whether or not the read succeeded.
    pub fn tick(&mut self) -> TickOutcome {
        let read = self.read_raw();
        self.source.advance(self.period);
        self.ticks += 1;

        match read {
            Ok(raw) => {
                let targets = self.targets(raw);
                let params = self.smoothers.tick(&targets);
                let sequence = self.store.publish(params);
                TickOutcome::Published { params, sequence }
            }
            Err(err) => {
                self.skipped += 1;
                debug!(error = %err, tick = self.ticks, "control read failed, tick skipped");
                TickOutcome::Skipped(err)
            }
        }
    }

    /// Tick at the poll rate until `stop` is observed at the top of an
    /// iteration.
    pub fn run(&mut self, stop: &AtomicBool) {
        info!(
            poll_hz = self.settings.poll_hz,
            layout = ?self.settings.layout,
            "control sampler started"
        );

        let mut deadline = Instant::now();
        while !stop.load(Ordering::Acquire) {
            self.tick();

            deadline += self.period;
            let now = Instant::now();
            match deadline.checked_duration_since(now) {
                Some(wait) => thread::sleep(wait),
                // Fell behind; restart the cadence from here
                None => deadline = now,
            }
        }

        info!(
            ticks = self.ticks,
            skipped = self.skipped,
            "control sampler stopped"
        );
    }

    /// Move the sampler onto its own thread.
    pub fn spawn(self, stop: Arc<AtomicBool>) -> std::io::Result<SamplerHandle<S>>
    where
        S: 'static,
    {
        let thread_stop = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("partials-sampler".into())
            .spawn(move || {
                let mut sampler = self;
                sampler.run(&thread_stop);
                sampler
            })?;
        Ok(SamplerHandle { thread, stop })
    }

    /// Latest smoothed record (published or not yet).
    pub fn current(&self) -> ControlParams {
        self.smoothers.current()
    }

    /// Store this sampler publishes to.
    pub fn store(&self) -> &ParamStore {
        &self.store
    }

    /// Sampler settings.
    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    /// Poll period derived from the settings.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Ticks run so far, including skipped ones.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks skipped because of read failures.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

/// A sampler running on its own thread.
#[derive(Debug)]
pub struct SamplerHandle<S> {
    thread: JoinHandle<ControlSampler<S>>,
    stop: Arc<AtomicBool>,
}

impl<S> SamplerHandle<S> {
    /// Ask the sampler to stop after its current tick.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Stop and wait for the thread, returning the sampler.
    pub fn join(self) -> thread::Result<ControlSampler<S>> {
        self.stop();
        self.thread.join()
    }
}
