//! Audio source kinds a region can be bound to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix of the `type` tag naming a host-provided track.
pub const BUILTIN_PREFIX: &str = "BUILTIN/";

/// Tag for external WAV files (the default when `type` is absent).
pub const WAV_TAG: &str = "WAV";

/// Where a region's audio comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// A WAV file resolved asynchronously, relative to the asset root.
    ExternalFile {
        /// Relative path of the asset.
        asset_path: PathBuf,
    },
    /// A track the host already ships, attached immediately.
    BuiltinTrack {
        /// Host-side track name (e.g. `VAB`).
        name: String,
    },
}

impl SourceKind {
    /// Relative asset path for file-backed sources.
    pub fn asset_path(&self) -> Option<&Path> {
        match self {
            SourceKind::ExternalFile { asset_path } => Some(asset_path),
            SourceKind::BuiltinTrack { .. } => None,
        }
    }

    /// Whether the clip must be fetched before it can play.
    pub fn needs_loading(&self) -> bool {
        matches!(self, SourceKind::ExternalFile { .. })
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::ExternalFile { asset_path } => {
                write!(f, "{WAV_TAG} {}", asset_path.display())
            }
            SourceKind::BuiltinTrack { name } => write!(f, "{BUILTIN_PREFIX}{name}"),
        }
    }
}
