//! Configuration for the partials synthesizer.
//!
//! One TOML file describes everything fixed at startup: the output stream,
//! the engine shape, the parameter ranges and initial values, the control
//! sampler, and the display. Invalid configuration is a startup error; the
//! audio path never sees it.
//!
//! # Example
//!
//! ```rust,no_run
//! use partials_config::{SynthConfig, paths};
//!
//! let config = match paths::find_config() {
//!     Some(path) => SynthConfig::load_validated(path).unwrap(),
//!     None => SynthConfig::default(),
//! };
//!
//! let settings = config.sampler_settings();
//! let options = config.engine_options();
//! ```

mod error;
mod synth_config;

/// Platform-specific configuration paths.
pub mod paths;

/// Configuration validation.
pub mod validation;

pub use error::ConfigError;
pub use paths::{find_config, user_config_dir, user_config_file};
pub use synth_config::{
    AudioSection, ChannelsSetting, ControlsSection, DisplaySection, HeadroomSetting,
    InitialSection, PhaseModeSetting, RangeSetting, RangesSection, SmoothingSetting, SynthConfig,
    VoiceSection,
};
pub use validation::{ValidationError, ValidationResult};
