//! Pluggable audio output.
//!
//! [`AudioBackend`] keeps the platform audio API out of application code.
//! Callbacks are boxed so the trait stays object-safe, and streams come back
//! as a type-erased [`StreamHandle`] that stops playback when dropped.

use crate::{AudioDevice, Result};

/// Configuration for an output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames, or `None` for the device default.
    pub buffer_size: Option<u32>,
    /// Interleaved channel count.
    pub channels: u16,
    /// Device name filter (uses the system default if `None`).
    pub device_name: Option<String>,
}

impl Default for OutputStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: None,
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased audio stream handle.
///
/// The stream plays while this handle exists; dropping it stops playback and
/// with it any further callback invocations.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Audio output callback.
///
/// Runs on the real-time thread and fills a buffer of interleaved f32
/// samples (`frames * channels` long). It must not allocate, lock or log.
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Stream error callback, given a human-readable message.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Platform audio output.
pub trait AudioBackend: Send {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// List output devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Build and start an output stream.
    ///
    /// The returned [`StreamHandle`] keeps the stream alive.
    fn build_output_stream(
        &self,
        config: &OutputStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;
}
