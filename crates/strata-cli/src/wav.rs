//! WAV file reading and writing through hound.

use anyhow::Context;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Decoded audio, one or two channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Audio {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Left (or only) channel.
    pub left: Vec<f32>,
    /// Right channel, if the file is stereo.
    pub right: Option<Vec<f32>>,
}

impl Audio {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Number of channels.
    pub fn channels(&self) -> u16 {
        if self.right.is_some() { 2 } else { 1 }
    }
}

/// Reads a WAV file as floats.
///
/// Files with more than two channels keep the first two.
pub fn read_wav(path: &Path) -> anyhow::Result<Audio> {
    let reader =
        WavReader::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let left = samples.iter().step_by(channels).copied().collect();
    let right = (channels > 1).then(|| samples.iter().skip(1).step_by(channels).copied().collect());
    Ok(Audio {
        sample_rate: spec.sample_rate,
        left,
        right,
    })
}

/// Writes `audio` with `bits_per_sample` of 16, 24 (integer) or 32 (float).
pub fn write_wav(path: &Path, audio: &Audio, bits_per_sample: u16) -> anyhow::Result<()> {
    anyhow::ensure!(
        matches!(bits_per_sample, 16 | 24 | 32),
        "unsupported bit depth {bits_per_sample} (expected 16, 24 or 32)"
    );
    let spec = hound::WavSpec {
        channels: audio.channels(),
        sample_rate: audio.sample_rate,
        bits_per_sample,
        sample_format: if bits_per_sample == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    let max_val = (1i64 << (bits_per_sample - 1)) as f32;
    let mut put = |sample: f32| -> hound::Result<()> {
        if bits_per_sample == 32 {
            writer.write_sample(sample)
        } else {
            writer.write_sample((sample * max_val).clamp(-max_val, max_val - 1.0) as i32)
        }
    };
    match &audio.right {
        Some(right) => {
            for (&l, &r) in audio.left.iter().zip(right) {
                put(l)?;
                put(r)?;
            }
        }
        None => {
            for &s in &audio.left {
                put(s)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}
