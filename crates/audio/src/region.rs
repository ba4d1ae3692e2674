//! Region records owned by the registry.

use skyscore_core::{RegionKey, SourceKind};
use std::fmt;

use crate::ClipHandle;

/// Opaque, load-order identifier of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u32);

impl RegionId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position in registry order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a region's track has been requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// Not selected for the current location.
    #[default]
    Inactive,
    /// Selected; `play()` has been issued to its sink.
    Playing,
}

/// A configured binding between an area and an audio source.
#[derive(Debug, Clone)]
pub struct Region {
    pub(crate) id: RegionId,
    pub(crate) key: RegionKey,
    pub(crate) source: SourceKind,
    pub(crate) state: PlaybackState,
    pub(crate) clip: Option<ClipHandle>,
}

impl Region {
    /// Load-order identifier.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Area the region covers.
    pub fn key(&self) -> &RegionKey {
        &self.key
    }

    /// Where the audio comes from.
    pub fn source(&self) -> &SourceKind {
        &self.source
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the region is currently selected.
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Resolved clip, if any.
    pub fn clip(&self) -> Option<&ClipHandle> {
        self.clip.as_ref()
    }
}
