//! Output device enumeration via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

const FALLBACK_SAMPLE_RATE: u32 = 44100;
const FALLBACK_CHANNELS: u16 = 2;

/// Device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the host's default output.
    pub is_default: bool,
    /// Channel count of the default output configuration.
    pub channels: u16,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

impl AudioDevice {
    fn from_cpal(device: &Device, is_default: bool) -> Option<Self> {
        let name = device_name(device).ok()?;
        let (channels, default_sample_rate) = device
            .default_output_config()
            .map(|c| (c.channels(), c.sample_rate()))
            .unwrap_or((FALLBACK_CHANNELS, FALLBACK_SAMPLE_RATE));
        Some(Self {
            name,
            is_default,
            channels,
            default_sample_rate,
        })
    }
}

/// List all output devices on the default host.
///
/// Devices whose name cannot be read are skipped.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let mut devices = Vec::new();
    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            let is_default = device_name(&device).ok() == default_name;
            if let Some(info) = AudioDevice::from_cpal(&device, is_default) {
                devices.push(info);
            }
        }
    }
    Ok(devices)
}

/// The default output device, if the host has one.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host
        .default_output_device()
        .and_then(|d| AudioDevice::from_cpal(&d, true)))
}

/// Find an output device whose name contains `search` (case-insensitive),
/// or the default device when `search` is `None`.
pub(crate) fn find_output_device(host: &Host, search: Option<&str>) -> Result<Device> {
    let Some(search) = search else {
        return host.default_output_device().ok_or(Error::NoDevice);
    };

    let needle = search.to_lowercase();
    let devices = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;
    for device in devices {
        if let Ok(name) = device_name(&device)
            && name.to_lowercase().contains(needle.as_str())
        {
            return Ok(device);
        }
    }
    Err(Error::DeviceNotFound(format!(
        "no output device matching '{search}'"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_does_not_fail_without_hardware() {
        // Availability depends on the machine; enumeration itself must succeed
        let devices = list_devices().unwrap();
        assert!(devices.iter().filter(|d| d.is_default).count() <= 1);
    }

    #[test]
    fn unknown_device_is_reported() {
        let host = cpal::default_host();
        let result = find_output_device(&host, Some("no such device \u{2603}"));
        assert!(matches!(
            result,
            Err(Error::DeviceNotFound(_) | Error::Stream(_))
        ));
    }
}
