//! Decoded clip data handed to sinks.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use crate::AssetError;

/// Shared handle to a decoded clip. Cloning never copies samples.
pub type ClipHandle = Arc<Clip>;

/// Interleaved PCM samples normalised to `-1.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    /// Frames per second.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Interleaved samples.
    pub samples: Vec<f32>,
}

impl PcmBuffer {
    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Playback length.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Payload of a clip.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipData {
    /// Samples decoded from an external file.
    Pcm(PcmBuffer),
    /// A track owned by the host audio engine, referenced by name.
    Builtin {
        /// Host track name.
        track: String,
    },
}

/// Playable audio bound to a region.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    label: String,
    data: ClipData,
    looping: bool,
}

impl Clip {
    /// Wrap decoded samples. Region music loops until stopped.
    pub fn pcm(label: impl Into<String>, buffer: PcmBuffer) -> Self {
        Self {
            label: label.into(),
            data: ClipData::Pcm(buffer),
            looping: true,
        }
    }

    /// Reference a host-provided track.
    pub fn builtin(track: impl Into<String>) -> Self {
        let track = track.into();
        Self {
            label: format!("builtin:{track}"),
            data: ClipData::Builtin { track },
            looping: true,
        }
    }

    /// Decode an in-memory WAV file.
    ///
    /// Integer formats are scaled by their bit depth; float formats are
    /// passed through.
    pub fn decode_wav(label: impl Into<String>, bytes: &[u8]) -> Result<Self, AssetError> {
        let reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        if spec.channels == 0 {
            return Err(AssetError::Unsupported("WAV file declares zero channels".into()));
        }

        let samples = match spec.sample_format {
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(AssetError::Unsupported(format!(
                        "{}-bit integer WAV",
                        spec.bits_per_sample
                    )));
                }
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / scale))
                    .collect::<Result<Vec<f32>, _>>()?
            }
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<f32>, _>>()?,
        };

        Ok(Self::pcm(
            label,
            PcmBuffer {
                sample_rate: spec.sample_rate,
                channels: spec.channels,
                samples,
            },
        ))
    }

    /// Human-readable name for logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Clip payload.
    pub fn data(&self) -> &ClipData {
        &self.data
    }

    /// Whether the clip repeats until stopped.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Length of the decoded audio, `None` for host tracks.
    pub fn duration(&self) -> Option<Duration> {
        match &self.data {
            ClipData::Pcm(buffer) => Some(buffer.duration()),
            ClipData::Builtin { .. } => None,
        }
    }
}
