//! Audio output for the partials synthesizer.
//!
//! - **Live output**: the [`AudioBackend`] trait and its cpal implementation
//!   [`CpalBackend`], plus device enumeration with [`list_devices`]
//! - **Channel fan-out**: [`MonoFanout`] turns the engine's mono blocks into
//!   interleaved device frames without allocating on the audio thread
//! - **WAV files**: [`write_wav`] and [`read_wav`] for offline renders
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use partials_io::{AudioBackend, CpalBackend, MonoFanout, OutputStreamConfig};
//!
//! let backend = CpalBackend::new();
//! let config = OutputStreamConfig::default();
//! let mut fanout = MonoFanout::new(config.channels, 64);
//!
//! let _stream = backend.build_output_stream(
//!     &config,
//!     Box::new(move |data: &mut [f32]| { fanout.fill(data, |block| block.fill(0.0)); }),
//!     Box::new(|err: &str| eprintln!("stream error: {err}")),
//! )?;
//! # Ok::<(), partials_io::Error>(())
//! ```

pub mod backend;
pub mod cpal_backend;
mod device;
mod fanout;
mod wav;

pub use backend::{AudioBackend, ErrorCallback, OutputCallback, OutputStreamConfig, StreamHandle};
pub use cpal_backend::CpalBackend;
pub use device::{AudioDevice, default_output_device, list_devices};
pub use fanout::MonoFanout;
pub use wav::{WavInfo, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No output device available on the system.
    #[error("No audio output device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
