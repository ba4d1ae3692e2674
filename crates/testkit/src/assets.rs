//! Asset sources and fixtures for load-timing tests.

use anyhow::Result;
use async_trait::async_trait;
use skyscore_audio::{AssetError, AssetLoader, AssetSource, Clip, PcmBuffer};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

/// Asset source whose fetches all block until [`release`](Self::release).
///
/// Lets tests decide exactly which tick a clip lands on.
pub struct GatedAssetSource {
    gate: watch::Sender<bool>,
    failing: Mutex<HashSet<PathBuf>>,
    fetched: Mutex<Vec<PathBuf>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for GatedAssetSource {
    fn default() -> Self {
        Self::new()
    }
}

impl GatedAssetSource {
    /// Closed gate, no failing paths.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            gate,
            failing: Mutex::new(HashSet::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Source that never holds fetches back.
    pub fn open() -> Self {
        let source = Self::new();
        source.release();
        source
    }

    /// Make fetches of `path` fail with an I/O error.
    pub fn fail(&self, path: impl Into<PathBuf>) {
        lock(&self.failing).insert(path.into());
    }

    /// Let every waiting and future fetch complete.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    /// Paths requested so far, in request order.
    pub fn fetched(&self) -> Vec<PathBuf> {
        lock(&self.fetched).clone()
    }
}

#[async_trait]
impl AssetSource for GatedAssetSource {
    async fn fetch_and_decode(&self, path: &Path) -> Result<Clip, AssetError> {
        lock(&self.fetched).push(path.to_path_buf());
        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map(|_| ())
            .map_err(|err| AssetError::Worker(err.to_string()))?;

        if lock(&self.failing).contains(path) {
            return Err(AssetError::Io(std::io::ErrorKind::NotFound.into()));
        }
        Ok(test_clip(path.display().to_string()))
    }
}

/// Short silent mono clip.
pub fn test_clip(label: impl Into<String>) -> Clip {
    Clip::pcm(
        label,
        PcmBuffer {
            sample_rate: 8_000,
            channels: 1,
            samples: vec![0.0; 80],
        },
    )
}

/// Encode a 16-bit mono sine tone as WAV bytes.
pub fn sine_wav_bytes(sample_rate: u32, frames: u32, hz: f32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut bytes = Vec::new();
    let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec)?;
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        let value = (t * hz * std::f32::consts::TAU).sin() * 0.25;
        writer.write_sample((value * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(bytes)
}

/// Write a sine tone WAV to `path`, creating parent directories.
pub fn write_sine_wav(path: impl AsRef<Path>, sample_rate: u32, frames: u32) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, sine_wav_bytes(sample_rate, frames, 440.0)?)?;
    Ok(())
}

/// Wait (up to about a second) until the loader has nothing in flight.
pub async fn settle(loader: &AssetLoader) {
    for _ in 0..500 {
        if loader.in_flight() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
