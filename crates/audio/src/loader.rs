//! Asynchronous clip resolution.
//!
//! Each file-backed region gets one fetch task on the host's tokio runtime.
//! Tasks never touch a region: they push their result onto a queue that the
//! tick thread drains, so the registry keeps a single writer.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{Clip, Region, RegionId, RegionRegistry};

/// Errors produced while resolving a clip.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Reading the asset failed.
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),
    /// The bytes are not a decodable WAV file.
    #[error("failed to decode WAV: {0}")]
    Decode(#[from] hound::Error),
    /// The asset decoded but cannot be played.
    #[error("unsupported audio: {0}")]
    Unsupported(String),
    /// The fetch did not finish in time.
    #[error("asset load timed out after {0:?}")]
    Timeout(Duration),
    /// The decode worker panicked or was cancelled.
    #[error("decode worker failed: {0}")]
    Worker(String),
}

/// External asset store.
#[async_trait]
pub trait AssetSource: Send + Sync + 'static {
    /// Fetch the asset at `path` and decode it into a clip.
    async fn fetch_and_decode(&self, path: &Path) -> Result<Clip, AssetError>;
}

/// Reads WAV files relative to a root directory (e.g. `GameData`).
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    /// Resolve asset paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Asset root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetSource for FsAssetSource {
    async fn fetch_and_decode(&self, path: &Path) -> Result<Clip, AssetError> {
        let full = self.root.join(path);
        let bytes = tokio::fs::read(&full).await?;
        let label = path.display().to_string();
        tokio::task::spawn_blocking(move || Clip::decode_wav(label, &bytes))
            .await
            .map_err(|err| AssetError::Worker(err.to_string()))?
    }
}

struct Completion {
    region: RegionId,
    path: PathBuf,
    result: Result<Clip, AssetError>,
}

/// Decrements the in-flight counter however the task ends.
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Issues fetches and hands finished clips back to the registry.
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
    runtime: Handle,
    timeout: Duration,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
    failed: usize,
}

impl AssetLoader {
    /// Create a loader spawning onto `runtime`. Every fetch is bounded by `timeout`.
    pub fn new(source: Arc<dyn AssetSource>, runtime: Handle, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            runtime,
            timeout,
            tx,
            rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
            tasks: Vec::new(),
            failed: 0,
        }
    }

    /// Start resolving `region`'s clip without blocking.
    ///
    /// Returns `false` when there is nothing to fetch (builtin track or clip
    /// already present).
    pub fn begin_load(&mut self, region: &Region) -> bool {
        let Some(path) = region.source().asset_path() else {
            return false;
        };
        if region.clip().is_some() {
            return false;
        }

        let id = region.id();
        let path = path.to_path_buf();
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let timeout = self.timeout;
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        debug!(region = %region.key(), path = %path.display(), "Loading music asset");
        let task = self.runtime.spawn(async move {
            let _guard = guard;
            let result = match tokio::time::timeout(timeout, source.fetch_and_decode(&path)).await
            {
                Ok(result) => result,
                Err(_) => Err(AssetError::Timeout(timeout)),
            };
            // The session may already be gone; a closed queue just drops the clip.
            let _ = tx.send(Completion {
                region: id,
                path,
                result,
            });
        });
        self.tasks.push(task);
        true
    }

    /// Fetches that have not reported back yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of fetches that ended in an error or timeout.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Apply every finished fetch to `registry`. Call on the tick thread.
    ///
    /// Returns the number of clips newly assigned. A clip is assigned at most
    /// once; failures leave the region without one for good.
    pub fn drain(&mut self, registry: &mut RegionRegistry) -> usize {
        let mut assigned = 0;
        while let Ok(completion) = self.rx.try_recv() {
            let Some(region) = registry.resolve_mut(completion.region) else {
                warn!(
                    region = %completion.region,
                    path = %completion.path.display(),
                    "Discarding clip for unknown region"
                );
                continue;
            };

            match completion.result {
                Ok(clip) => {
                    if region.clip.is_some() {
                        debug!(region = %region.key, "Clip already resolved; ignoring duplicate");
                        continue;
                    }
                    debug!(region = %region.key, clip = clip.label(), "Music asset ready");
                    region.clip = Some(Arc::new(clip));
                    assigned += 1;
                }
                Err(err) => {
                    self.failed += 1;
                    warn!(
                        region = %region.key,
                        path = %completion.path.display(),
                        "Music asset failed to load, region stays silent: {err}"
                    );
                }
            }
        }
        self.tasks.retain(|task| !task.is_finished());
        assigned
    }

    /// Abort outstanding fetches and stop accepting results.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PcmBuffer;
    use skyscore_core::RegionDescriptor;
    use std::io::Cursor;

    struct InstantSource;

    #[async_trait]
    impl AssetSource for InstantSource {
        async fn fetch_and_decode(&self, path: &Path) -> Result<Clip, AssetError> {
            if path.ends_with("missing.wav") {
                return Err(AssetError::Io(std::io::ErrorKind::NotFound.into()));
            }
            Ok(Clip::pcm(
                path.display().to_string(),
                PcmBuffer {
                    sample_rate: 8000,
                    channels: 1,
                    samples: vec![0.0; 8],
                },
            ))
        }
    }

    struct StalledSource;

    #[async_trait]
    impl AssetSource for StalledSource {
        async fn fetch_and_decode(&self, _path: &Path) -> Result<Clip, AssetError> {
            std::future::pending().await
        }
    }

    async fn settle(loader: &AssetLoader) {
        for _ in 0..500 {
            if loader.in_flight() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    fn registry() -> RegionRegistry {
        RegionRegistry::load(vec![
            RegionDescriptor::wav("Kerbin", "music/kerbin.wav"),
            RegionDescriptor::wav("Mun", "music/missing.wav"),
            RegionDescriptor {
                planet: Some("Minmus".into()),
                kind: Some("BUILTIN/Space".into()),
                ..Default::default()
            },
        ])
    }

    #[tokio::test]
    async fn test_clips_arrive_on_drain() {
        let mut registry = registry();
        let mut loader = AssetLoader::new(
            Arc::new(InstantSource),
            Handle::current(),
            Duration::from_secs(1),
        );

        let started: Vec<bool> = registry
            .regions()
            .iter()
            .map(|r| loader.begin_load(r))
            .collect();
        assert_eq!(started, vec![true, true, false]);

        settle(&loader).await;
        assert!(registry.regions()[0].clip().is_none(), "nothing lands before drain");

        assert_eq!(loader.drain(&mut registry), 1);
        assert!(registry.regions()[0].clip().is_some());
        assert!(registry.regions()[1].clip().is_none());
        assert_eq!(loader.failed(), 1);
        assert_eq!(loader.drain(&mut registry), 0);
    }

    #[tokio::test]
    async fn test_stalled_load_times_out() {
        let mut registry = registry();
        let mut loader = AssetLoader::new(
            Arc::new(StalledSource),
            Handle::current(),
            Duration::from_millis(20),
        );
        loader.begin_load(&registry.regions()[0]);
        assert_eq!(loader.in_flight(), 1);

        settle(&loader).await;
        assert_eq!(loader.drain(&mut registry), 0);
        assert_eq!(loader.failed(), 1);
        assert!(registry.regions()[0].clip().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_discards_pending_loads() {
        let registry = registry();
        let mut loader = AssetLoader::new(
            Arc::new(StalledSource),
            Handle::current(),
            Duration::from_secs(60),
        );
        loader.begin_load(&registry.regions()[0]);
        loader.shutdown();
        settle(&loader).await;
        assert_eq!(loader.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_completion_for_foreign_region_is_skipped() {
        let big = RegionRegistry::load(vec![
            RegionDescriptor::wav("A", "a.wav"),
            RegionDescriptor::wav("B", "b.wav"),
        ]);
        let mut small = RegionRegistry::load(vec![RegionDescriptor::wav("A", "a.wav")]);
        let mut loader = AssetLoader::new(
            Arc::new(InstantSource),
            Handle::current(),
            Duration::from_secs(1),
        );
        loader.begin_load(&big.regions()[1]);
        settle(&loader).await;

        assert_eq!(loader.drain(&mut small), 0);
        assert!(small.regions()[0].clip().is_none());
    }

    #[tokio::test]
    async fn test_fs_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Mod/Music")).unwrap();
        let mut bytes = Vec::new();
        {
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: 22050,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            for _ in 0..2205 {
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        std::fs::write(dir.path().join("Mod/Music/1.wav"), bytes).unwrap();

        let source = FsAssetSource::new(dir.path());
        let clip = source
            .fetch_and_decode(Path::new("Mod/Music/1.wav"))
            .await
            .unwrap();
        assert_eq!(clip.label(), "Mod/Music/1.wav");
        assert_eq!(clip.duration(), Some(Duration::from_millis(100)));

        let missing = source.fetch_and_decode(Path::new("Mod/none.wav")).await;
        assert!(matches!(missing, Err(AssetError::Io(_))));
    }
}
