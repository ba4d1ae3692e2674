//! Call journal for sinks and the world's audio manager.
//!
//! Headless hosts drive the engine against [`RecordingWorld`] and
//! [`RecordingSink`] and replay the [`CallLog`] as an event stream.

use crate::{AudioSink, ClipHandle, NullSink, Region, WorldAudio};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Name of the playlist a fresh [`RecordingWorld`] starts with.
pub const STOCK_PLAYLIST: &str = "stock";

/// Name of the playlist installed while suppressed.
pub const SILENT_PLAYLIST: &str = "silent";

/// A call observed at one of the engine's seams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `play()` on the sink labelled with the region key.
    SinkPlay(String),
    /// `stop()` on a region sink.
    SinkStop(String),
    /// `set_clip()` on a region sink.
    SinkSetClip(String),
    /// The world's current default track was stopped.
    WorldStopTrack,
    /// The world's default track was resumed.
    WorldPlayTrack,
    /// A playlist (by name) was installed in the world.
    WorldSetPlaylist(String),
}

impl Call {
    /// Stable label used in event logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Call::SinkPlay(_) => "sink.play",
            Call::SinkStop(_) => "sink.stop",
            Call::SinkSetClip(_) => "sink.set_clip",
            Call::WorldStopTrack => "world.stop_track",
            Call::WorldPlayTrack => "world.play_track",
            Call::WorldSetPlaylist(_) => "world.set_playlist",
        }
    }

    /// Region key or playlist name the call targeted (empty when none).
    pub fn target(&self) -> &str {
        match self {
            Call::SinkPlay(t) | Call::SinkStop(t) | Call::SinkSetClip(t) => t,
            Call::WorldSetPlaylist(name) => name,
            Call::WorldStopTrack | Call::WorldPlayTrack => "",
        }
    }

    /// Whether this is the silent-playlist swap done by `suppress()`.
    pub fn is_suppress(&self) -> bool {
        matches!(self, Call::WorldSetPlaylist(name) if name == SILENT_PLAYLIST)
    }

    /// Whether this is the playlist reinstall done by `restore()`.
    pub fn is_restore(&self) -> bool {
        matches!(self, Call::WorldSetPlaylist(name) if name != SILENT_PLAYLIST)
    }
}

/// Shared, ordered log of calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a call.
    pub fn push(&self, call: Call) {
        self.lock().push(call);
    }

    /// Snapshot of every call so far.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().clone()
    }

    /// Remove and return every call so far.
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.lock())
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of recorded calls.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().iter().filter(|c| pred(c)).count()
    }

    /// Index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.lock().iter().position(|c| pred(c))
    }
}

/// Sink wrapper that records every call before delegating.
pub struct RecordingSink<S = NullSink> {
    label: String,
    inner: S,
    log: CallLog,
}

impl RecordingSink<NullSink> {
    /// Recording sink over a [`NullSink`].
    pub fn new(label: impl Into<String>, log: CallLog) -> Self {
        Self::wrap(label, NullSink::new(), log)
    }
}

impl<S: AudioSink> RecordingSink<S> {
    /// Record calls made to `inner`.
    pub fn wrap(label: impl Into<String>, inner: S, log: CallLog) -> Self {
        Self {
            label: label.into(),
            inner,
            log,
        }
    }

    /// Label (region key) used in the log.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wrapped sink.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: AudioSink> AudioSink for RecordingSink<S> {
    fn play(&mut self) {
        self.log.push(Call::SinkPlay(self.label.clone()));
        self.inner.play();
    }

    fn stop(&mut self) {
        self.log.push(Call::SinkStop(self.label.clone()));
        self.inner.stop();
    }

    fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    fn has_clip(&self) -> bool {
        self.inner.has_clip()
    }

    fn set_clip(&mut self, clip: ClipHandle) {
        self.log.push(Call::SinkSetClip(self.label.clone()));
        self.inner.set_clip(clip);
    }
}

/// Sink factory labelling each recording sink with its region key.
pub fn recording_sinks(log: &CallLog) -> impl FnMut(&Region) -> RecordingSink {
    let log = log.clone();
    move |region| RecordingSink::new(region.key().to_string(), log.clone())
}

/// A named playlist, shared by handle.
#[derive(Debug, PartialEq, Eq)]
pub struct Playlist {
    /// Playlist name.
    pub name: String,
}

impl Playlist {
    /// New shared playlist handle.
    pub fn shared(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { name: name.into() })
    }
}

/// In-memory world audio manager that logs every call.
pub struct RecordingWorld {
    current: Arc<Playlist>,
    stock: Arc<Playlist>,
    track_playing: bool,
    log: CallLog,
}

impl RecordingWorld {
    /// World playing its stock playlist.
    pub fn new(log: CallLog) -> Self {
        let stock = Playlist::shared(STOCK_PLAYLIST);
        Self {
            current: Arc::clone(&stock),
            stock,
            track_playing: true,
            log,
        }
    }

    /// Playlist currently installed.
    pub fn current(&self) -> &Arc<Playlist> {
        &self.current
    }

    /// The playlist the world started with.
    pub fn stock(&self) -> &Arc<Playlist> {
        &self.stock
    }

    /// Whether the default track is audible.
    pub fn is_track_playing(&self) -> bool {
        self.track_playing
    }
}

impl WorldAudio for RecordingWorld {
    type Playlist = Arc<Playlist>;

    fn current_playlist(&self) -> Arc<Playlist> {
        Arc::clone(&self.current)
    }

    fn set_playlist(&mut self, playlist: Arc<Playlist>) {
        debug!(playlist = %playlist.name, "World playlist installed");
        self.log.push(Call::WorldSetPlaylist(playlist.name.clone()));
        self.current = playlist;
    }

    fn silent_playlist(&self) -> Arc<Playlist> {
        Playlist::shared(SILENT_PLAYLIST)
    }

    fn stop_current_track(&mut self) {
        debug!("World track stopped");
        self.log.push(Call::WorldStopTrack);
        self.track_playing = false;
    }

    fn play_current_track(&mut self) {
        debug!(playlist = %self.current.name, "World track resumed");
        self.log.push(Call::WorldPlayTrack);
        self.track_playing = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Clip;

    #[test]
    fn recording_sink_logs_and_delegates() {
        let log = CallLog::new();
        let mut sink = RecordingSink::new("Kerbin", log.clone());
        sink.play();
        sink.set_clip(Arc::new(Clip::builtin("Space")));
        assert!(sink.is_playing());
        sink.stop();

        assert_eq!(
            log.calls(),
            vec![
                Call::SinkPlay("Kerbin".into()),
                Call::SinkSetClip("Kerbin".into()),
                Call::SinkStop("Kerbin".into()),
            ]
        );
        assert_eq!(log.calls()[0].kind(), "sink.play");
    }

    #[test]
    fn world_classifies_playlist_swaps() {
        let log = CallLog::new();
        let mut world = RecordingWorld::new(log.clone());
        let stock = world.current_playlist();
        world.stop_current_track();
        let silent = world.silent_playlist();
        world.set_playlist(silent);
        world.set_playlist(stock);

        assert_eq!(log.count(Call::is_suppress), 1);
        assert_eq!(log.count(Call::is_restore), 1);
        assert!(Arc::ptr_eq(world.current(), world.stock()));
        assert!(!world.is_track_playing());
    }
}
