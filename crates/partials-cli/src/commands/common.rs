//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use clap::Args;
use partials_config::{SynthConfig, find_config, user_config_file};
use partials_core::{ParamKind, Wavetable};
use partials_platform::{ControlSampler, FixedSource, ParamStore, RawSource, SweepSource};
use partials_synth::AdditiveEngine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Knob simulation shared by `play` and `render`.
#[derive(Args, Debug, Clone, Default)]
pub struct ControlArgs {
    /// Hold a knob at a raw reading, e.g. `frequency=512` (repeatable)
    #[arg(long = "knob", value_name = "PARAM=RAW", value_parser = parse_knob)]
    pub knobs: Vec<(ParamKind, u16)>,

    /// Sweep every knob over this many seconds instead of holding them
    #[arg(long, value_name = "SECONDS", conflicts_with = "knobs")]
    pub sweep: Option<f32>,
}

/// Parse a `param=raw` pair for clap's `value_parser`.
pub fn parse_knob(s: &str) -> Result<(ParamKind, u16), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid knob format: '{s}' (expected param=raw)"))?;
    let kind = ParamKind::from_name(name.trim()).ok_or_else(|| {
        format!("Unknown parameter '{name}' (expected frequency, amplitude, base or decay)")
    })?;
    let raw = raw
        .trim()
        .parse::<u16>()
        .map_err(|e| format!("Invalid raw reading '{raw}': {e}"))?;
    Ok((kind, raw))
}

/// Where the configuration comes from, as chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource<'a> {
    /// `--defaults`: the built-in configuration, no file is read
    Defaults,
    /// `--config FILE`
    File(&'a Path),
    /// Neither flag: the user file, then the system file
    Search,
}

impl<'a> ConfigSource<'a> {
    /// Source for the global `--config` and `--defaults` flags.
    pub fn from_flags(path: Option<&'a Path>, defaults: bool) -> Self {
        match (defaults, path) {
            (true, _) => Self::Defaults,
            (false, Some(path)) => Self::File(path),
            (false, None) => Self::Search,
        }
    }

    /// Explicitly named file, if any.
    pub fn path(&self) -> Option<&'a Path> {
        match *self {
            Self::File(path) => Some(path),
            _ => None,
        }
    }
}

/// Load the configuration to run with.
///
/// An explicit path must exist. Otherwise the user and system locations are
/// searched; finding nothing is an error unless defaults were requested.
pub fn load_config(source: ConfigSource<'_>) -> anyhow::Result<SynthConfig> {
    resolve_config(source, find_config)
}

fn resolve_config(
    source: ConfigSource<'_>,
    search: impl FnOnce() -> Option<PathBuf>,
) -> anyhow::Result<SynthConfig> {
    let path = match source {
        ConfigSource::Defaults => {
            tracing::info!("using built-in default configuration");
            return Ok(SynthConfig::default());
        }
        ConfigSource::File(path) => path.to_path_buf(),
        ConfigSource::Search => search().with_context(|| {
            format!(
                "no configuration file found (looked for {}); pass --config FILE, \
                 create one with `partials config init`, or run with --defaults",
                user_config_file().display()
            )
        })?,
    };

    let config = SynthConfig::load_validated(&path)
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    tracing::info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Raw reading that maps to `value` on the control for `kind`.
fn raw_for(config: &SynthConfig, kind: ParamKind, value: f32) -> u16 {
    let raw_max = config.controls.raw_max;
    let t = config.ranges().get(kind).normalize(value);
    (t * f32::from(raw_max)).round().min(f32::from(raw_max)) as u16
}

/// Build the simulated knob source.
///
/// Held knobs not named on the command line sit at the reading for their
/// configured initial value. A sweep staggers the four controls a quarter
/// period apart.
pub fn build_source(controls: &ControlArgs, config: &SynthConfig) -> Box<dyn RawSource> {
    let layout = config.channel_layout();

    if let Some(seconds) = controls.sweep {
        let period = Duration::try_from_secs_f32(seconds.max(0.0)).unwrap_or(Duration::ZERO);
        let mut sweep = SweepSource::new(period, config.controls.raw_max);
        for (i, kind) in ParamKind::ALL.into_iter().enumerate() {
            sweep = sweep.with_offset(layout.channel(kind), i as f64 * 0.25);
        }
        return Box::new(sweep);
    }

    let initial = config.initial_params();
    let mut fixed = FixedSource::new(config.controls.channel_count);
    for kind in ParamKind::ALL {
        fixed.set(layout.channel(kind), raw_for(config, kind, initial.get(kind)));
    }
    for &(kind, raw) in &controls.knobs {
        fixed.set(layout.channel(kind), raw);
    }
    Box::new(fixed)
}

/// Build a sampler publishing into `store`.
pub fn build_sampler(
    controls: &ControlArgs,
    config: &SynthConfig,
    store: ParamStore,
) -> ControlSampler<Box<dyn RawSource>> {
    ControlSampler::new(
        build_source(controls, config),
        config.sampler_settings(),
        store,
    )
}

/// Build the engine described by `config`.
pub fn build_engine(config: &SynthConfig) -> AdditiveEngine {
    let table = Arc::new(Wavetable::sine(config.voice.table_size));
    AdditiveEngine::with_options(
        table,
        config.sample_rate(),
        config.voice.partials,
        config.engine_options(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use partials_platform::{ParamStore, TickOutcome};

    #[test]
    fn parses_knobs() {
        assert_eq!(parse_knob("frequency=512"), Ok((ParamKind::Frequency, 512)));
        assert_eq!(parse_knob("Decay = 0"), Ok((ParamKind::Decay, 0)));
        assert!(parse_knob("frequency").is_err());
        assert!(parse_knob("cutoff=1").is_err());
        assert!(parse_knob("base=70000").is_err());
    }

    #[test]
    fn unset_knobs_hold_initial_values() {
        let mut config = SynthConfig::default();
        config.controls.quantize_step = 0.0;
        config.controls.smoothing.frequency = 0.0;
        config.controls.smoothing.amplitude = 0.0;
        config.controls.smoothing.base = 0.0;
        config.controls.smoothing.decay = 0.0;

        let controls = ControlArgs {
            knobs: vec![(ParamKind::Amplitude, 1023)],
            sweep: None,
        };
        let store = ParamStore::new(config.initial_params());
        let mut sampler = build_sampler(&controls, &config, store);
        let TickOutcome::Published { params, .. } = sampler.tick() else {
            panic!("expected a publish");
        };
        assert_eq!(params.amplitude, 0.8);
        // 440 Hz sits between two readings; one step of a 10-bit knob
        assert!((params.frequency - 440.0).abs() < 2.0, "{}", params.frequency);
        assert!((params.decay - 2.0).abs() < 0.01);
    }

    #[test]
    fn sweep_starts_controls_out_of_step() {
        let config = SynthConfig::default();
        let controls = ControlArgs {
            knobs: Vec::new(),
            sweep: Some(4.0),
        };
        let mut source = build_source(&controls, &config);
        let layout = config.channel_layout();
        let frequency = source.read_channel(layout.channel(ParamKind::Frequency));
        let amplitude = source.read_channel(layout.channel(ParamKind::Amplitude));
        assert_eq!(frequency.clone().ok(), Some(0));
        assert_ne!(frequency.ok(), amplitude.ok());
    }

    #[test]
    fn config_flags_pick_source() {
        let path = Path::new("synth.toml");
        assert_eq!(ConfigSource::from_flags(None, false), ConfigSource::Search);
        assert_eq!(ConfigSource::from_flags(Some(path), false), ConfigSource::File(path));
        assert_eq!(ConfigSource::from_flags(None, true), ConfigSource::Defaults);
        assert_eq!(ConfigSource::from_flags(Some(path), true).path(), None);
    }

    #[test]
    fn missing_config_is_an_error() {
        let err = resolve_config(ConfigSource::Search, || None).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("no configuration file found"), "{message}");
        assert!(message.contains("--defaults"), "{message}");
    }

    #[test]
    fn defaults_only_when_requested() {
        let config = resolve_config(ConfigSource::Defaults, || {
            panic!("defaults must not search for a file")
        })
        .unwrap();
        assert_eq!(config, SynthConfig::default());
    }

    #[test]
    fn searched_config_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("synth.toml");
        std::fs::write(&path, "[voice]\npartials = 3\n").unwrap();

        let config = resolve_config(ConfigSource::Search, || Some(path.clone())).unwrap();
        assert_eq!(config.voice.partials, 3);

        let missing = dir.path().join("missing.toml");
        assert!(resolve_config(ConfigSource::File(&missing), || None).is_err());
    }

    #[test]
    fn engine_follows_voice_section() {
        let mut config = SynthConfig::default();
        config.voice.partials = 9;
        config.audio.sample_rate = 48000;
        let engine = build_engine(&config);
        assert_eq!(engine.partials(), 9);
        assert_eq!(engine.sample_rate(), 48000.0);
        assert_eq!(engine.table().len(), 4096);
    }
}
