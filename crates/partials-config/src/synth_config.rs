//! The synthesizer configuration file.

use std::path::Path;
use std::time::Duration;

use partials_core::{ControlParams, ParamKind, ParamRange, ParamRanges, TimeConstants};
use partials_platform::{ChannelLayout, SamplerSettings};
use partials_synth::{EngineOptions, Headroom, PhaseMode};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete startup configuration.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # TOML Format
///
/// ```toml
/// [audio]
/// sample_rate = 44100
/// block_size = 64
///
/// [voice]
/// table_size = 4096
/// partials = 6
/// phase_mode = "locked"
/// headroom = "none"
/// alias_guard = false
///
/// [ranges]
/// frequency = { min = 100.0, max = 2000.0 }
/// amplitude = { min = 0.0, max = 0.8 }
/// base = { min = 1.0, max = 4.0 }
/// decay = { min = 1.2, max = 4.0 }
///
/// [initial]
/// frequency = 440.0
/// amplitude = 0.2
/// base = 1.0
/// decay = 2.0
///
/// [controls]
/// raw_max = 1023
/// poll_hz = 100.0
/// channel_count = 8
/// quantize_step = 0.1
/// channels = { frequency = 4, amplitude = 5, base = 6, decay = 7 }
/// smoothing = { frequency = 0.2, amplitude = 0.4, base = 1.6, decay = 1.6 }
///
/// [display]
/// enabled = true
/// interval_ms = 200
/// width = 128
/// height = 64
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthConfig {
    /// Output stream settings.
    pub audio: AudioSection,
    /// Engine shape.
    pub voice: VoiceSection,
    /// Raw-to-value ranges.
    pub ranges: RangesSection,
    /// Values before the first control tick.
    pub initial: InitialSection,
    /// Control sampling.
    pub controls: ControlsSection,
    /// Display reporting.
    pub display: DisplaySection,
}

/// `[audio]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioSection {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per engine block.
    pub block_size: u32,
    /// Output device name; the system default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 64,
            device: None,
        }
    }
}

/// Partial phase tracking, as written in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseModeSetting {
    /// Every partial starts each block at the fundamental phase.
    #[default]
    Locked,
    /// One phase accumulator per partial.
    Independent,
}

impl From<PhaseModeSetting> for PhaseMode {
    fn from(setting: PhaseModeSetting) -> Self {
        match setting {
            PhaseModeSetting::Locked => PhaseMode::Locked,
            PhaseModeSetting::Independent => PhaseMode::Independent,
        }
    }
}

/// Output scaling policy, as written in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadroomSetting {
    /// Raw partial sum.
    #[default]
    None,
    /// Peak limited to the amplitude.
    Normalize,
}

impl From<HeadroomSetting> for Headroom {
    fn from(setting: HeadroomSetting) -> Self {
        match setting {
            HeadroomSetting::None => Headroom::None,
            HeadroomSetting::Normalize => Headroom::Normalize,
        }
    }
}

/// `[voice]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoiceSection {
    /// Wavetable length N.
    pub table_size: usize,
    /// Partials per voice P.
    pub partials: usize,
    /// Partial phase tracking.
    pub phase_mode: PhaseModeSetting,
    /// Output scaling.
    pub headroom: HeadroomSetting,
    /// Skip partials at or above Nyquist.
    pub alias_guard: bool,
}

impl Default for VoiceSection {
    fn default() -> Self {
        Self {
            table_size: 4096,
            partials: 6,
            phase_mode: PhaseModeSetting::Locked,
            headroom: HeadroomSetting::None,
            alias_guard: false,
        }
    }
}

/// A `{ min, max }` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeSetting {
    /// Value at raw 0.
    pub min: f32,
    /// Value at full scale.
    pub max: f32,
}

impl RangeSetting {
    /// Create a range setting.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

impl From<RangeSetting> for ParamRange {
    fn from(r: RangeSetting) -> Self {
        ParamRange::new(r.min, r.max)
    }
}

/// `[ranges]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RangesSection {
    /// Frequency in Hz.
    pub frequency: RangeSetting,
    /// Linear amplitude.
    pub amplitude: RangeSetting,
    /// Partial frequency ratio.
    pub base: RangeSetting,
    /// Partial amplitude falloff.
    pub decay: RangeSetting,
}

impl RangesSection {
    /// Range for one parameter.
    pub fn get(&self, kind: ParamKind) -> RangeSetting {
        match kind {
            ParamKind::Frequency => self.frequency,
            ParamKind::Amplitude => self.amplitude,
            ParamKind::Base => self.base,
            ParamKind::Decay => self.decay,
        }
    }
}

impl Default for RangesSection {
    fn default() -> Self {
        let d = ParamRanges::default();
        Self {
            frequency: RangeSetting::new(d.frequency.min, d.frequency.max),
            amplitude: RangeSetting::new(d.amplitude.min, d.amplitude.max),
            base: RangeSetting::new(d.base.min, d.base.max),
            decay: RangeSetting::new(d.decay.min, d.decay.max),
        }
    }
}

/// `[initial]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitialSection {
    /// Starting frequency in Hz.
    pub frequency: f32,
    /// Starting amplitude.
    pub amplitude: f32,
    /// Starting base.
    pub base: f32,
    /// Starting decay.
    pub decay: f32,
}

impl Default for InitialSection {
    fn default() -> Self {
        let d = ControlParams::default();
        Self {
            frequency: d.frequency,
            amplitude: d.amplitude,
            base: d.base,
            decay: d.decay,
        }
    }
}

/// Raw channel assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelsSetting {
    /// Frequency channel.
    pub frequency: u8,
    /// Amplitude channel.
    pub amplitude: u8,
    /// Base channel.
    pub base: u8,
    /// Decay channel.
    pub decay: u8,
}

impl Default for ChannelsSetting {
    fn default() -> Self {
        let d = ChannelLayout::default();
        Self {
            frequency: d.frequency,
            amplitude: d.amplitude,
            base: d.base,
            decay: d.decay,
        }
    }
}

/// Smoothing time constants in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmoothingSetting {
    /// Frequency time constant.
    pub frequency: f32,
    /// Amplitude time constant.
    pub amplitude: f32,
    /// Base time constant.
    pub base: f32,
    /// Decay time constant.
    pub decay: f32,
}

impl Default for SmoothingSetting {
    fn default() -> Self {
        let d = TimeConstants::default();
        Self {
            frequency: d.frequency,
            amplitude: d.amplitude,
            base: d.base,
            decay: d.decay,
        }
    }
}

/// `[controls]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsSection {
    /// Full-scale raw reading.
    pub raw_max: u16,
    /// Sampler ticks per second.
    pub poll_hz: f32,
    /// Channels on the converter.
    pub channel_count: u8,
    /// Base/decay quantization step; 0 disables.
    pub quantize_step: f32,
    /// Channel assignment.
    pub channels: ChannelsSetting,
    /// Time constants.
    pub smoothing: SmoothingSetting,
}

impl Default for ControlsSection {
    fn default() -> Self {
        Self {
            raw_max: partials_platform::DEFAULT_RAW_MAX,
            poll_hz: 100.0,
            channel_count: partials_platform::DEFAULT_CHANNEL_COUNT,
            quantize_step: 0.1,
            channels: ChannelsSetting::default(),
            smoothing: SmoothingSetting::default(),
        }
    }
}

/// `[display]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySection {
    /// Run the display reporter.
    pub enabled: bool,
    /// Milliseconds between renders.
    pub interval_ms: u64,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 200,
            width: 128,
            height: 64,
        }
    }
}

impl SynthConfig {
    /// Load a configuration from a TOML file. The result is not validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load and validate in one step.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Per-parameter mapping ranges.
    pub fn ranges(&self) -> ParamRanges {
        ParamRanges {
            frequency: self.ranges.frequency.into(),
            amplitude: self.ranges.amplitude.into(),
            base: self.ranges.base.into(),
            decay: self.ranges.decay.into(),
        }
    }

    /// Starting parameter record.
    pub fn initial_params(&self) -> ControlParams {
        let i = &self.initial;
        ControlParams::new(i.frequency, i.amplitude, i.base, i.decay)
    }

    /// Smoothing time constants.
    pub fn time_constants(&self) -> TimeConstants {
        let s = &self.controls.smoothing;
        TimeConstants {
            frequency: s.frequency,
            amplitude: s.amplitude,
            base: s.base,
            decay: s.decay,
        }
    }

    /// Raw channel assignment.
    pub fn channel_layout(&self) -> ChannelLayout {
        let c = &self.controls.channels;
        ChannelLayout {
            frequency: c.frequency,
            amplitude: c.amplitude,
            base: c.base,
            decay: c.decay,
        }
    }

    /// Everything the control sampler needs.
    pub fn sampler_settings(&self) -> SamplerSettings {
        let step = self.controls.quantize_step;
        SamplerSettings {
            layout: self.channel_layout(),
            raw_max: self.controls.raw_max,
            ranges: self.ranges(),
            time_constants: self.time_constants(),
            poll_hz: self.controls.poll_hz,
            quantize_step: (step > 0.0).then_some(step),
            initial: self.initial_params(),
        }
    }

    /// Engine behavior switches.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            phase_mode: self.voice.phase_mode.into(),
            headroom: self.voice.headroom.into(),
            alias_guard: self.voice.alias_guard,
        }
    }

    /// Time between display renders.
    pub fn display_interval(&self) -> Duration {
        Duration::from_millis(self.display.interval_ms)
    }

    /// Sample rate as the engine's float type.
    pub fn sample_rate(&self) -> f32 {
        self.audio.sample_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_defaults() {
        let config = SynthConfig::from_toml("").expect("parse empty");
        assert_eq!(config, SynthConfig::default());
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.block_size, 64);
        assert_eq!(config.voice.table_size, 4096);
        assert_eq!(config.voice.partials, 6);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config = SynthConfig::from_toml(
            r#"
            [voice]
            partials = 8
            phase_mode = "independent"

            [ranges]
            frequency = { min = 50.0, max = 5000.0 }
            "#,
        )
        .expect("parse");

        assert_eq!(config.voice.partials, 8);
        assert_eq!(config.voice.table_size, 4096);
        assert_eq!(config.engine_options().phase_mode, PhaseMode::Independent);
        assert_eq!(config.ranges().frequency, ParamRange::new(50.0, 5000.0));
        assert_eq!(config.ranges().amplitude, ParamRange::new(0.0, 0.8));
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = SynthConfig::from_toml("[voice]\npartails = 6\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)), "got {err}");
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = SynthConfig::default();
        config.audio.device = Some("USB Audio".into());
        config.voice.headroom = HeadroomSetting::Normalize;
        let text = config.to_toml().expect("serialize");
        assert!(text.contains("headroom = \"normalize\""));
        assert_eq!(SynthConfig::from_toml(&text).expect("parse"), config);
    }

    #[test]
    fn sampler_settings_mirror_config() {
        let mut config = SynthConfig::default();
        config.controls.quantize_step = 0.0;
        config.controls.poll_hz = 250.0;

        let settings = config.sampler_settings();
        assert_eq!(settings.quantize_step, None);
        assert_eq!(settings.poll_hz, 250.0);
        assert_eq!(settings.layout, ChannelLayout::default());
        assert_eq!(settings.initial, ControlParams::default());
        assert_eq!(settings.time_constants, TimeConstants::default());

        assert_eq!(SynthConfig::default().sampler_settings(), SamplerSettings::default());
    }

    #[test]
    fn display_interval_in_millis() {
        assert_eq!(
            SynthConfig::default().display_interval(),
            Duration::from_millis(200)
        );
    }
}
