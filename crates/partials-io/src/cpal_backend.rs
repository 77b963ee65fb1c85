//! cpal-based audio backend.
//!
//! [`CpalBackend`] covers ALSA (Linux), CoreAudio (macOS) and WASAPI
//! (Windows) through cpal's default host.
//!
//! ```rust,no_run
//! use partials_io::{AudioBackend, CpalBackend, OutputStreamConfig};
//!
//! let backend = CpalBackend::new();
//! let stream = backend.build_output_stream(
//!     &OutputStreamConfig::default(),
//!     Box::new(|buffer: &mut [f32]| buffer.fill(0.0)),
//!     Box::new(|err: &str| eprintln!("Audio error: {err}")),
//! )?;
//! // Plays until `stream` is dropped.
//! # Ok::<(), partials_io::Error>(())
//! ```

use crate::backend::{AudioBackend, ErrorCallback, OutputCallback, OutputStreamConfig, StreamHandle};
use crate::device::find_output_device;
use crate::{AudioDevice, Error, Result};
use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// cpal audio backend holding the platform's default host.
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Create a backend on the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        crate::device::list_devices()
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        crate::device::default_output_device()
    }

    fn build_output_stream(
        &self,
        config: &OutputStreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = find_output_device(&self.host, config.device_name.as_deref())?;

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: config
                .buffer_size
                .map_or(cpal::BufferSize::Default, cpal::BufferSize::Fixed),
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            buffer_size = ?config.buffer_size,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}
