use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skyscore_core::RegionDescriptor;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{load_definitions_file, ConfigError};

/// Definitions file looked for in each mod directory.
pub const DEFINITIONS_FILE: &str = "MusicDefinitions.cfg";

/// How descriptors from several mod directories are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryPolicy {
    /// Concatenate every file's entries in discovery order.
    #[default]
    Aggregate,
    /// Only use the first file that parses.
    FirstFound,
}

impl FromStr for DiscoveryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "aggregate" => Ok(Self::Aggregate),
            "first-found" => Ok(Self::FirstFound),
            other => Err(format!(
                "unknown discovery policy {other:?} (expected aggregate or first-found)"
            )),
        }
    }
}

impl fmt::Display for DiscoveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Aggregate => "aggregate",
            Self::FirstFound => "first-found",
        })
    }
}

/// Result of lenient loading.
#[derive(Debug, Clone, Default)]
pub struct LoadedDefinitions {
    /// Descriptors in registry order.
    pub descriptors: Vec<RegionDescriptor>,
    /// Files whose entries were used.
    pub files: Vec<PathBuf>,
    /// Files that could not be read or parsed.
    pub skipped: Vec<PathBuf>,
}

/// Find `<game_data>/<mod>/MusicDefinitions.cfg` files.
///
/// Discovery is deterministic: files are returned sorted by mod directory.
/// A missing `game_data` directory yields no files.
pub fn discover_definition_files(game_data: &Path) -> Vec<PathBuf> {
    if !game_data.is_dir() {
        warn!("Music definitions root {} is not a directory", game_data.display());
        return Vec::new();
    }

    WalkDir::new(game_data)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Failed to scan {}: {err}", game_data.display());
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == DEFINITIONS_FILE)
        .map(|entry| entry.into_path())
        .collect()
}

/// Load descriptors from every discovered file.
///
/// This function is strict: the first unreadable or broken file is an error.
pub fn load_descriptors_strict(
    game_data: &Path,
    policy: DiscoveryPolicy,
) -> Result<Vec<RegionDescriptor>, ConfigError> {
    let mut descriptors = Vec::new();
    for file in discover_definition_files(game_data) {
        descriptors.extend(load_definitions_file(&file)?);
        if policy == DiscoveryPolicy::FirstFound {
            break;
        }
    }
    Ok(descriptors)
}

/// Load descriptors from every discovered file.
///
/// This function is lenient: unreadable or broken files are skipped with a warning.
pub fn load_descriptors_lenient(game_data: &Path, policy: DiscoveryPolicy) -> LoadedDefinitions {
    let mut loaded = LoadedDefinitions::default();
    for file in discover_definition_files(game_data) {
        match load_definitions_file(&file) {
            Ok(descriptors) => {
                loaded.descriptors.extend(descriptors);
                loaded.files.push(file);
                if policy == DiscoveryPolicy::FirstFound {
                    break;
                }
            }
            Err(err) => {
                warn!("Skipping music definitions {}: {err}", file.display());
                loaded.skipped.push(file);
            }
        }
    }
    info!(
        files = loaded.files.len(),
        skipped = loaded.skipped.len(),
        entries = loaded.descriptors.len(),
        %policy,
        "Music definitions loaded"
    );
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_mod(root: &Path, name: &str, body: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(DEFINITIONS_FILE), body).unwrap();
    }

    fn entry(planet: &str) -> String {
        format!("BACKGROUND_MUSIC\n{{\n planet = {planet}\n path = {planet}.wav\n}}\n")
    }

    fn game_data() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_mod(dir.path(), "ZetaMod", &entry("Eve"));
        write_mod(dir.path(), "AlphaMod", &format!("{}{}", entry("Kerbin"), entry("Mun")));
        write_mod(dir.path(), "Broken", "BACKGROUND_MUSIC\n{\n planet = Duna\n");
        fs::create_dir_all(dir.path().join("NoMusic")).unwrap();
        fs::write(dir.path().join(DEFINITIONS_FILE), entry("Jool")).unwrap();
        let nested = dir.path().join("AlphaMod/Sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join(DEFINITIONS_FILE), entry("Moho")).unwrap();
        dir
    }

    fn planets(descriptors: &[RegionDescriptor]) -> Vec<&str> {
        descriptors
            .iter()
            .filter_map(|d| d.planet.as_deref())
            .collect()
    }

    #[test]
    fn test_discovery_is_sorted_and_one_level_deep() {
        let dir = game_data();
        let files = discover_definition_files(dir.path());
        let mods: Vec<_> = files
            .iter()
            .map(|f| f.parent().unwrap().file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(mods, vec!["AlphaMod", "Broken", "ZetaMod"]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_definition_files(&dir.path().join("GameData")).is_empty());
    }

    #[test]
    fn test_lenient_skips_broken_files() {
        let dir = game_data();
        let loaded = load_descriptors_lenient(dir.path(), DiscoveryPolicy::Aggregate);
        assert_eq!(planets(&loaded.descriptors), vec!["Kerbin", "Mun", "Eve"]);
        assert_eq!(loaded.files.len(), 2);
        assert_eq!(loaded.skipped.len(), 1);
    }

    #[test]
    fn test_first_found_stops_after_first_good_file() {
        let dir = game_data();
        let loaded = load_descriptors_lenient(dir.path(), DiscoveryPolicy::FirstFound);
        assert_eq!(planets(&loaded.descriptors), vec!["Kerbin", "Mun"]);
    }

    #[test]
    fn test_strict_propagates_syntax_errors() {
        let dir = game_data();
        let err = load_descriptors_strict(dir.path(), DiscoveryPolicy::Aggregate).unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { line: 1, .. }));

        let first = load_descriptors_strict(dir.path(), DiscoveryPolicy::FirstFound).unwrap();
        assert_eq!(planets(&first), vec!["Kerbin", "Mun"]);
    }

    #[test]
    fn test_policy_parses_from_cli_text() {
        assert_eq!("first-found".parse::<DiscoveryPolicy>(), Ok(DiscoveryPolicy::FirstFound));
        assert_eq!("Aggregate".parse::<DiscoveryPolicy>(), Ok(DiscoveryPolicy::Aggregate));
        assert_eq!("FIRST_FOUND".parse::<DiscoveryPolicy>(), Ok(DiscoveryPolicy::FirstFound));
        assert!("all".parse::<DiscoveryPolicy>().is_err());
        assert_eq!(DiscoveryPolicy::FirstFound.to_string(), "first-found");
    }
}
