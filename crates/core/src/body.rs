//! Celestial body, biome and region identifiers.
//!
//! A region is addressed by a structured [`RegionKey`] rather than a joined
//! string. Keys print as `planet` or `planet/biome` for logs, but nothing in
//! the workspace ever parses that text back into a key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a celestial body (e.g. `Kerbin`).
///
/// Comparison is exact and case-sensitive, matching how hosts name bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanetId(String);

impl PlanetId {
    /// Build a planet id, rejecting blank names.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Body name as written in config.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a biome on some body (e.g. `Desert`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiomeId(String);

impl BiomeId {
    /// Build a biome id, rejecting blank names.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Biome name as written in config.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BiomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic area a region is bound to.
///
/// `biome == None` is the whole-planet wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionKey {
    /// Body the region belongs to.
    pub planet: PlanetId,
    /// Optional biome restriction.
    pub biome: Option<BiomeId>,
}

impl RegionKey {
    /// Key covering an entire planet.
    pub fn planet(planet: PlanetId) -> Self {
        Self {
            planet,
            biome: None,
        }
    }

    /// Key restricted to one biome of a planet.
    pub fn biome(planet: PlanetId, biome: BiomeId) -> Self {
        Self {
            planet,
            biome: Some(biome),
        }
    }

    /// Whether this key has no biome restriction.
    pub fn is_wildcard(&self) -> bool {
        self.biome.is_none()
    }

    /// Higher is more specific. Wildcards are 0, biome keys are 1.
    pub fn specificity(&self) -> u8 {
        u8::from(self.biome.is_some())
    }

    /// Whether a sampled location falls inside this key.
    ///
    /// An unknown planet (`None`) never matches. An unknown biome only
    /// matches wildcard keys.
    pub fn matches(&self, planet: Option<&PlanetId>, biome: Option<&BiomeId>) -> bool {
        let Some(planet) = planet else {
            return false;
        };
        if &self.planet != planet {
            return false;
        }
        match &self.biome {
            None => true,
            Some(wanted) => biome == Some(wanted),
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.biome {
            Some(biome) => write!(f, "{}/{}", self.planet, biome),
            None => write!(f, "{}", self.planet),
        }
    }
}
