//! Raw control sources.
//!
//! A [`RawSource`] stands in for the analog front end: ask it for a channel,
//! get back an integer reading in `[0, raw_max]`. Hardware drivers implement
//! the trait outside this crate; the sources here cover simulation and
//! testing.
//!
//! - [`FixedSource`] - Constant readings, set per channel
//! - [`SweepSource`] - Deterministic triangle sweeps driven by the poll clock
//! - [`ScriptedSource`] - A per-tick script of readings and failures

use std::time::Duration;

use thiserror::Error;

/// Channels on a typical eight-input SPI ADC.
pub const DEFAULT_CHANNEL_COUNT: u8 = 8;

/// Full-scale reading of a 10-bit converter.
pub const DEFAULT_RAW_MAX: u16 = 1023;

/// Failure reading a raw channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// A recoverable glitch; the next tick may succeed.
    #[error("transient read failure on channel {channel}: {reason}")]
    Transient {
        /// Channel that failed.
        channel: u8,
        /// Driver-specific description.
        reason: String,
    },
}

impl ReadError {
    /// Create a transient error.
    pub fn transient(channel: u8, reason: impl Into<String>) -> Self {
        Self::Transient {
            channel,
            reason: reason.into(),
        }
    }
}

/// A device that yields raw integer readings on request.
///
/// Channels at or beyond [`channel_count`](RawSource::channel_count) are not
/// an error: implementations return a neutral `Ok(0)`.
pub trait RawSource: Send {
    /// Read one channel.
    fn read_channel(&mut self, channel: u8) -> Result<u16, ReadError>;

    /// Number of addressable channels.
    fn channel_count(&self) -> u8 {
        DEFAULT_CHANNEL_COUNT
    }

    /// Called once per sampler tick after all reads, with the poll period.
    ///
    /// Time-driven sources advance their clock here. The default does nothing.
    fn advance(&mut self, _dt: Duration) {}
}

impl<S: RawSource + ?Sized> RawSource for Box<S> {
    fn read_channel(&mut self, channel: u8) -> Result<u16, ReadError> {
        (**self).read_channel(channel)
    }

    fn channel_count(&self) -> u8 {
        (**self).channel_count()
    }

    fn advance(&mut self, dt: Duration) {
        (**self).advance(dt);
    }
}

// ============================================================================
// FixedSource
// ============================================================================

/// Constant readings per channel.
///
/// ```rust
/// use partials_platform::{FixedSource, RawSource};
///
/// let mut source = FixedSource::new(8).with_reading(4, 512);
/// assert_eq!(source.read_channel(4), Ok(512));
/// assert_eq!(source.read_channel(0), Ok(0));
/// assert_eq!(source.read_channel(200), Ok(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSource {
    readings: Vec<u16>,
}

impl FixedSource {
    /// `channel_count` channels, all reading 0.
    pub fn new(channel_count: u8) -> Self {
        Self {
            readings: vec![0; usize::from(channel_count)],
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with_reading(mut self, channel: u8, raw: u16) -> Self {
        self.set(channel, raw);
        self
    }

    /// Set the reading of one channel. Out-of-range channels are ignored.
    pub fn set(&mut self, channel: u8, raw: u16) {
        if let Some(slot) = self.readings.get_mut(usize::from(channel)) {
            *slot = raw;
        }
    }
}

impl Default for FixedSource {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_COUNT)
    }
}

impl RawSource for FixedSource {
    fn read_channel(&mut self, channel: u8) -> Result<u16, ReadError> {
        Ok(self
            .readings
            .get(usize::from(channel))
            .copied()
            .unwrap_or(0))
    }

    fn channel_count(&self) -> u8 {
        self.readings.len() as u8
    }
}

// ============================================================================
// SweepSource
// ============================================================================

/// Every channel traces a triangle from 0 up to `raw_max` and back over one
/// period. Each channel may start at its own offset (a fraction of the
/// period), so a single sweep exercises the controls out of step.
///
/// Time only moves through [`RawSource::advance`], which makes renders that
/// use a sweep reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSource {
    raw_max: u16,
    period: Duration,
    elapsed: Duration,
    offsets: Vec<f64>,
}

impl SweepSource {
    /// A sweep over `period` with every channel in phase.
    pub fn new(period: Duration, raw_max: u16) -> Self {
        Self {
            raw_max,
            period,
            elapsed: Duration::ZERO,
            offsets: vec![0.0; usize::from(DEFAULT_CHANNEL_COUNT)],
        }
    }

    /// Start `channel` at `offset` periods (wrapped into `[0, 1)`).
    #[must_use]
    pub fn with_offset(mut self, channel: u8, offset: f64) -> Self {
        if let Some(slot) = self.offsets.get_mut(usize::from(channel)) {
            *slot = offset.rem_euclid(1.0);
        }
        self
    }

    /// Time advanced so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Triangle position of `channel` in `[0, 1]`.
    fn position(&self, channel: u8) -> f64 {
        let Some(&offset) = self.offsets.get(usize::from(channel)) else {
            return 0.0;
        };
        let period = self.period.as_secs_f64();
        if period <= 0.0 {
            return 0.0;
        }
        let cycle = (self.elapsed.as_secs_f64() / period + offset).rem_euclid(1.0);
        if cycle < 0.5 {
            cycle * 2.0
        } else {
            2.0 - cycle * 2.0
        }
    }
}

impl RawSource for SweepSource {
    fn read_channel(&mut self, channel: u8) -> Result<u16, ReadError> {
        let raw = (self.position(channel) * f64::from(self.raw_max)).round();
        Ok(raw.clamp(0.0, f64::from(self.raw_max)) as u16)
    }

    fn channel_count(&self) -> u8 {
        self.offsets.len() as u8
    }

    fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
    }
}

// ============================================================================
// ScriptedSource
// ============================================================================

/// One tick of a [`ScriptedSource`] script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Readings indexed by channel; missing channels read 0.
    Readings(Vec<u16>),
    /// Every read during this tick fails with a transient error.
    Fail(String),
}

/// Replays a fixed script, one step per sampler tick. After the last step
/// the final step repeats forever; an empty script reads 0 everywhere.
///
/// ```rust
/// use partials_platform::{RawSource, ScriptStep, ScriptedSource};
/// use std::time::Duration;
///
/// let mut source = ScriptedSource::new([
///     ScriptStep::Readings(vec![10, 20]),
///     ScriptStep::Fail("spi timeout".into()),
/// ]);
/// assert_eq!(source.read_channel(1), Ok(20));
/// source.advance(Duration::from_millis(10));
/// assert!(source.read_channel(1).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedSource {
    steps: Vec<ScriptStep>,
    cursor: usize,
}

impl ScriptedSource {
    /// Create a source from a script.
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            cursor: 0,
        }
    }

    /// Index of the step currently being replayed.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl RawSource for ScriptedSource {
    fn read_channel(&mut self, channel: u8) -> Result<u16, ReadError> {
        let last = self.steps.len().saturating_sub(1);
        match self.steps.get(self.cursor.min(last)) {
            None => Ok(0),
            Some(ScriptStep::Readings(values)) => {
                Ok(values.get(usize::from(channel)).copied().unwrap_or(0))
            }
            Some(ScriptStep::Fail(reason)) => Err(ReadError::transient(channel, reason.clone())),
        }
    }

    fn advance(&mut self, _dt: Duration) {
        self.cursor = self.cursor.saturating_add(1);
    }
}
