#![warn(missing_docs)]
//! Core primitives shared across the workspace.
//!
//! Everything in here is plain data: celestial body and biome identifiers,
//! the structured region key, the closed set of audio source kinds and the
//! descriptor records produced by config loaders.

pub mod body;
pub mod descriptor;
pub mod source;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use body::{BiomeId, PlanetId, RegionKey};
pub use descriptor::{DescriptorError, RegionBinding, RegionDescriptor};
pub use source::SourceKind;

/// Fixed tick counter for the playback loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick of every session.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

impl std::fmt::Display for SimTick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
