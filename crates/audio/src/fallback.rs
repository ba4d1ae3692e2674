//! Suppression and restoration of the world's own music.

use tracing::{debug, info, warn};

/// The world's default-audio manager.
///
/// `Playlist` is a handle compared by identity: whatever
/// [`current_playlist`](WorldAudio::current_playlist) returns is later handed
/// back to [`set_playlist`](WorldAudio::set_playlist) unchanged.
pub trait WorldAudio {
    /// Handle to the world's playlist (typically an `Arc`).
    type Playlist: Clone;

    /// Playlist the world is currently drawing from.
    fn current_playlist(&self) -> Self::Playlist;

    /// Install a playlist.
    fn set_playlist(&mut self, playlist: Self::Playlist);

    /// A playlist that never produces audio, installed while suppressed.
    fn silent_playlist(&self) -> Self::Playlist;

    /// Stop whatever default track is audible right now.
    fn stop_current_track(&mut self);

    /// Resume the default track.
    fn play_current_track(&mut self);
}

/// Outcome of [`FallbackCoordinator::suppress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// The default playlist was captured and silenced by this call.
    Captured,
    /// An earlier call already holds the snapshot; nothing changed.
    AlreadySuppressed,
}

/// Owns the snapshot of the world's default playlist.
///
/// Dropping the coordinator while suppressed restores the captured playlist.
pub struct FallbackCoordinator<W: WorldAudio> {
    world: W,
    snapshot: Option<W::Playlist>,
}

impl<W: WorldAudio> FallbackCoordinator<W> {
    /// Wrap the world's audio manager. Nothing is touched until `suppress`.
    pub fn new(world: W) -> Self {
        Self {
            world,
            snapshot: None,
        }
    }

    /// Whether the default playlist is currently swapped out.
    pub fn is_suppressed(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The wrapped world audio manager.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Mutable access to the wrapped world audio manager.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Silence the world's music, capturing its playlist.
    ///
    /// Stops the audible default track immediately, then swaps in the silent
    /// playlist. Calling again while suppressed is a no-op.
    pub fn suppress(&mut self) -> Suppression {
        if self.snapshot.is_some() {
            return Suppression::AlreadySuppressed;
        }
        let previous = self.world.current_playlist();
        self.world.stop_current_track();
        let silent = self.world.silent_playlist();
        self.world.set_playlist(silent);
        self.snapshot = Some(previous);
        debug!("Default music suppressed");
        Suppression::Captured
    }

    /// Reinstall the captured playlist. No-op unless suppressed.
    pub fn restore(&mut self) -> bool {
        let Some(previous) = self.snapshot.take() else {
            return false;
        };
        self.world.set_playlist(previous);
        self.world.play_current_track();
        debug!("Default music restored");
        true
    }

    /// Teardown path: restore whatever was captured, regardless of the
    /// caller's bookkeeping.
    pub fn force_stop(&mut self) -> bool {
        let restored = self.restore();
        if restored {
            info!("Default music restored at teardown");
        }
        restored
    }
}

impl<W: WorldAudio> Drop for FallbackCoordinator<W> {
    fn drop(&mut self) {
        if self.restore() {
            warn!("Default music restored on drop without teardown");
        }
    }
}
