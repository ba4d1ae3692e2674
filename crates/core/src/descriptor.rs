//! Loosely-typed region descriptors and their validation.
//!
//! Config loaders hand over [`RegionDescriptor`] values exactly as written in
//! the music definition files. [`RegionDescriptor::validate`] turns one into a
//! typed [`RegionBinding`] or reports why that single entry is unusable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::source::{BUILTIN_PREFIX, WAV_TAG};
use crate::{BiomeId, PlanetId, RegionKey, SourceKind};

/// One `BACKGROUND_MUSIC` entry as authored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    /// Body name (required).
    #[serde(default)]
    pub planet: Option<String>,
    /// Biome name; absent means the whole planet.
    #[serde(default)]
    pub biome: Option<String>,
    /// `WAV` or `BUILTIN/<Name>`; absent means `WAV`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Asset path relative to the asset root (required for `WAV`).
    #[serde(default)]
    pub path: Option<String>,
    /// File the descriptor was read from, for diagnostics.
    #[serde(skip)]
    pub origin: Option<PathBuf>,
}

/// Reasons a single descriptor is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// `planet` absent or blank.
    #[error("missing planet")]
    MissingPlanet,
    /// `WAV` source without a `path`.
    #[error("WAV music for {planet} has no path")]
    MissingPath {
        /// Planet of the rejected entry.
        planet: String,
    },
    /// `type` is neither `WAV` nor `BUILTIN/<Name>`.
    #[error("unknown music type {value:?} for {planet}")]
    UnknownSourceType {
        /// Planet of the rejected entry.
        planet: String,
        /// Offending tag.
        value: String,
    },
    /// `BUILTIN/` with nothing after the slash.
    #[error("builtin music for {planet} has no track name")]
    EmptyBuiltinName {
        /// Planet of the rejected entry.
        planet: String,
    },
}

/// A validated descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionBinding {
    /// Where the region applies.
    pub key: RegionKey,
    /// What it plays.
    pub source: SourceKind,
}

impl RegionDescriptor {
    /// Convenience constructor for a whole-planet WAV entry.
    pub fn wav(planet: &str, path: &str) -> Self {
        Self {
            planet: Some(planet.to_string()),
            path: Some(path.to_string()),
            ..Default::default()
        }
    }

    /// Restrict this descriptor to a biome.
    pub fn with_biome(mut self, biome: &str) -> Self {
        self.biome = Some(biome.to_string());
        self
    }

    /// Set the raw `type` tag.
    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    /// Validate into a typed binding.
    pub fn validate(&self) -> Result<RegionBinding, DescriptorError> {
        let planet = self
            .planet
            .as_deref()
            .and_then(PlanetId::new)
            .ok_or(DescriptorError::MissingPlanet)?;
        let biome = self.biome.as_deref().and_then(BiomeId::new);

        let tag = self
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .unwrap_or(WAV_TAG);

        let source = if tag.eq_ignore_ascii_case(WAV_TAG) {
            let path = self
                .path
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| DescriptorError::MissingPath {
                    planet: planet.to_string(),
                })?;
            SourceKind::ExternalFile {
                asset_path: PathBuf::from(path),
            }
        } else if let Some(name) = strip_builtin_prefix(tag) {
            let name = name.trim();
            if name.is_empty() {
                return Err(DescriptorError::EmptyBuiltinName {
                    planet: planet.to_string(),
                });
            }
            SourceKind::BuiltinTrack {
                name: name.to_string(),
            }
        } else {
            return Err(DescriptorError::UnknownSourceType {
                planet: planet.to_string(),
                value: tag.to_string(),
            });
        };

        Ok(RegionBinding {
            key: RegionKey { planet, biome },
            source,
        })
    }
}

fn strip_builtin_prefix(tag: &str) -> Option<&str> {
    let head = tag.get(..BUILTIN_PREFIX.len())?;
    if head.eq_ignore_ascii_case(BUILTIN_PREFIX) {
        tag.get(BUILTIN_PREFIX.len()..)
    } else {
        None
    }
}
