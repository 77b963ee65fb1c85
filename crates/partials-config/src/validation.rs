//! Configuration validation.
//!
//! [`SynthConfig::validate`] checks every section and reports all problems
//! at once, so a broken file can be fixed in one pass.
//!
//! # Example
//!
//! ```rust
//! use partials_config::{SynthConfig, ValidationError};
//!
//! let mut config = SynthConfig::default();
//! assert!(config.validate().is_ok());
//!
//! config.voice.table_size = 0;
//! config.audio.sample_rate = 0;
//! match config.validate() {
//!     Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
//!     other => panic!("expected two errors, got {other:?}"),
//! }
//! ```

use partials_core::ParamKind;
use partials_synth::MAX_PARTIALS;
use thiserror::Error;

use crate::synth_config::{RangeSetting, SynthConfig};

/// A single configuration problem, or several.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A value that must be strictly positive is not.
    #[error("'{field}' must be positive, got {value}")]
    NotPositive {
        /// Dotted path of the field.
        field: String,
        /// The offending value.
        value: f64,
    },

    /// A range whose bounds are unusable.
    #[error("range '{field}' is invalid: [{min}, {max}] ({reason})")]
    InvalidRange {
        /// Dotted path of the range.
        field: String,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A value outside the interval it must lie in.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the field.
        field: String,
        /// The offending value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// A control channel the converter does not have.
    #[error("channel for '{param}' is {channel}, but only {count} channels exist")]
    ChannelOutOfRange {
        /// Parameter fed by the channel.
        param: ParamKind,
        /// Configured channel.
        channel: u8,
        /// Channels available.
        count: u8,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl ValidationError {
    /// Flatten into a list of individual problems.
    pub fn into_vec(self) -> Vec<ValidationError> {
        match self {
            ValidationError::Multiple(errors) => errors,
            single => vec![single],
        }
    }
}

/// Fold collected problems into a result.
fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

fn require_positive(errors: &mut Vec<ValidationError>, field: &str, value: f64) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(ValidationError::NotPositive {
            field: field.to_string(),
            value,
        });
    }
}

fn require_non_negative(errors: &mut Vec<ValidationError>, field: &str, value: f32) {
    if !(value.is_finite() && value >= 0.0) {
        errors.push(ValidationError::OutOfRange {
            field: field.to_string(),
            value: f64::from(value),
            min: 0.0,
            max: f64::INFINITY,
        });
    }
}

/// Check one `{ min, max }` range. `floor` is the smallest acceptable
/// minimum and `strict_floor` whether the minimum must exceed it.
fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &str,
    range: RangeSetting,
    floor: f32,
    strict_floor: bool,
) {
    let invalid = |reason| ValidationError::InvalidRange {
        field: field.to_string(),
        min: range.min,
        max: range.max,
        reason,
    };
    if !(range.min.is_finite() && range.max.is_finite()) {
        errors.push(invalid("bounds must be finite"));
    } else if range.min >= range.max {
        errors.push(invalid("min must be below max"));
    } else if range.min < floor || (strict_floor && range.min == floor) {
        errors.push(invalid(if strict_floor {
            "min must be positive"
        } else {
            "min must not be negative"
        }));
    }
}

impl SynthConfig {
    /// Check every section, returning all problems found.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        // [audio]
        require_positive(&mut errors, "audio.sample_rate", f64::from(self.audio.sample_rate));
        require_positive(&mut errors, "audio.block_size", f64::from(self.audio.block_size));

        // [voice]
        require_positive(&mut errors, "voice.table_size", self.voice.table_size as f64);
        if !(1..=MAX_PARTIALS).contains(&self.voice.partials) {
            errors.push(ValidationError::OutOfRange {
                field: "voice.partials".into(),
                value: self.voice.partials as f64,
                min: 1.0,
                max: MAX_PARTIALS as f64,
            });
        }

        // [ranges]
        check_range(&mut errors, "ranges.frequency", self.ranges.frequency, 0.0, true);
        check_range(&mut errors, "ranges.amplitude", self.ranges.amplitude, 0.0, false);
        check_range(&mut errors, "ranges.base", self.ranges.base, 0.0, true);
        check_range(&mut errors, "ranges.decay", self.ranges.decay, 0.0, true);

        // [initial]
        let initial = self.initial_params();
        for kind in ParamKind::ALL {
            let range = self.ranges.get(kind);
            let value = initial.get(kind);
            if !(value.is_finite() && value >= range.min && value <= range.max) {
                errors.push(ValidationError::OutOfRange {
                    field: format!("initial.{kind}"),
                    value: f64::from(value),
                    min: f64::from(range.min),
                    max: f64::from(range.max),
                });
            }
        }

        // [controls]
        let controls = &self.controls;
        require_positive(&mut errors, "controls.raw_max", f64::from(controls.raw_max));
        require_positive(&mut errors, "controls.poll_hz", f64::from(controls.poll_hz));
        require_non_negative(&mut errors, "controls.quantize_step", controls.quantize_step);
        let layout = self.channel_layout();
        let taus = self.time_constants();
        for kind in ParamKind::ALL {
            let channel = layout.channel(kind);
            if channel >= controls.channel_count {
                errors.push(ValidationError::ChannelOutOfRange {
                    param: kind,
                    channel,
                    count: controls.channel_count,
                });
            }
            require_non_negative(&mut errors, &format!("controls.smoothing.{kind}"), taus.get(kind));
        }

        // [display]
        if self.display.enabled {
            require_positive(&mut errors, "display.interval_ms", self.display.interval_ms as f64);
            require_positive(&mut errors, "display.width", f64::from(self.display.width));
            require_positive(&mut errors, "display.height", f64::from(self.display.height));
        }

        collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SynthConfig::default().validate(), Ok(()));
    }

    #[test]
    fn single_error_is_not_wrapped() {
        let mut config = SynthConfig::default();
        config.voice.partials = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "voice.partials"));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = SynthConfig::default();
        config.audio.sample_rate = 0;
        config.voice.table_size = 0;
        config.ranges.decay = RangeSetting::new(0.0, 4.0);
        config.ranges.frequency = RangeSetting::new(2000.0, 100.0);
        config.controls.channels.decay = 8;
        config.controls.smoothing.base = -1.0;

        let errors = config.validate().unwrap_err().into_vec();
        // frequency range invalid also puts initial.frequency outside it
        assert_eq!(errors.len(), 7, "{errors:#?}");
        assert!(errors.contains(&ValidationError::ChannelOutOfRange {
            param: ParamKind::Decay,
            channel: 8,
            count: 8,
        }));
    }

    #[test]
    fn zero_amplitude_floor_allowed_but_not_zero_decay() {
        let mut config = SynthConfig::default();
        config.ranges.amplitude = RangeSetting::new(0.0, 1.0);
        assert!(config.validate().is_ok());

        config.ranges.base = RangeSetting::new(0.0, 2.0);
        config.initial.base = 1.0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "range 'ranges.base' is invalid: [0, 2] (min must be positive)"
        );
    }

    #[test]
    fn initial_outside_range_rejected() {
        let mut config = SynthConfig::default();
        config.initial.frequency = 50.0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "'initial.frequency' value 50 out of range [100, 2000]"
        );
    }

    #[test]
    fn disabled_display_skips_checks() {
        let mut config = SynthConfig::default();
        config.display.enabled = false;
        config.display.width = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn multiple_message_joins() {
        let err = ValidationError::Multiple(vec![
            ValidationError::NotPositive {
                field: "a".into(),
                value: 0.0,
            },
            ValidationError::NotPositive {
                field: "b".into(),
                value: -1.0,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: 'a' must be positive, got 0; 'b' must be positive, got -1"
        );
    }
}
