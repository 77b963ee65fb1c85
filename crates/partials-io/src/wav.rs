//! WAV file reading and writing.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV header details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    /// Number of channels in the file.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Samples per channel.
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl WavInfo {
    fn from_reader<R: std::io::Read>(reader: &WavReader<R>) -> Self {
        let spec = reader.spec();
        let num_frames = u64::from(reader.len()) / u64::from(spec.channels.max(1));
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            num_frames,
            duration_secs: num_frames as f64 / f64::from(spec.sample_rate.max(1)),
        }
    }
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    Ok(WavInfo::from_reader(&reader))
}

/// Read a WAV file as mono f32.
///
/// Integer files are scaled to `[-1, 1)`; multi-channel files are mixed
/// down by averaging.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavInfo)> {
    let reader = WavReader::open(path)?;
    let info = WavInfo::from_reader(&reader);
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, info))
}

/// Write mono samples as a 32-bit float WAV file.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
