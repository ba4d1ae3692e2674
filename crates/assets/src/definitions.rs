use std::fs;
use std::path::Path;

use skyscore_core::RegionDescriptor;
use tracing::debug;

use crate::{ConfigError, ConfigNode};

/// Node name of one music entry.
pub const MUSIC_NODE: &str = "BACKGROUND_MUSIC";

const KNOWN_KEYS: [&str; 4] = ["planet", "biome", "type", "path"];

/// Collect every top-level `BACKGROUND_MUSIC` node of `text`, in file order.
///
/// Descriptors are returned unvalidated; an entry with a missing planet is
/// rejected later by the registry, not here.
pub fn parse_definitions(text: &str) -> Result<Vec<RegionDescriptor>, ConfigError> {
    let root = ConfigNode::parse(text)?;
    Ok(root.nodes(MUSIC_NODE).map(descriptor_from_node).collect())
}

/// Read and parse one definitions file, tagging each descriptor with its origin.
pub fn load_definitions_file(path: &Path) -> Result<Vec<RegionDescriptor>, ConfigError> {
    let text = fs::read_to_string(path)?;
    let mut descriptors = parse_definitions(&text)?;
    for descriptor in &mut descriptors {
        descriptor.origin = Some(path.to_path_buf());
    }
    Ok(descriptors)
}

fn descriptor_from_node(node: &ConfigNode) -> RegionDescriptor {
    for (key, _) in node.values() {
        if !KNOWN_KEYS.contains(&key) {
            debug!(line = node.line(), key, "Ignoring unknown music definition key");
        }
    }
    for child in node.children() {
        debug!(line = child.line(), node = child.name(), "Ignoring nested node in music definition");
    }

    let owned = |key: &str| node.value(key).map(str::to_string);
    RegionDescriptor {
        planet: owned("planet"),
        biome: owned("biome"),
        kind: owned("type"),
        path: owned("path"),
        origin: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyscore_core::SourceKind;

    const SAMPLE: &str = "\
BACKGROUND_MUSIC
{
    path = Almajara-Core/Music/1.wav
    planet = Kerbin
}
BACKGROUND_MUSIC
{
    planet = Kerbin
    biome = Desert
    type = BUILTIN/Sunset
    volume = 0.5
}
PART
{
    name = notMusic
}
";

    #[test]
    fn test_collects_music_nodes_in_order() {
        let descriptors = parse_definitions(SAMPLE).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(
            descriptors[0],
            RegionDescriptor::wav("Kerbin", "Almajara-Core/Music/1.wav")
        );
        assert_eq!(descriptors[1].biome.as_deref(), Some("Desert"));

        let builtin = descriptors[1].validate().unwrap();
        assert_eq!(
            builtin.source,
            SourceKind::BuiltinTrack {
                name: "Sunset".into()
            }
        );
    }

    #[test]
    fn test_missing_planet_is_kept_for_validation() {
        let descriptors = parse_definitions("BACKGROUND_MUSIC { path = a.wav }").unwrap();
        assert_eq!(descriptors.len(), 1);
        assert!(descriptors[0].validate().is_err());
    }

    #[test]
    fn test_byte_order_mark_keeps_first_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MusicDefinitions.cfg");
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(
            b"BACKGROUND_MUSIC\n{\n planet = Kerbin\n path = a.wav\n}\nBACKGROUND_MUSIC { planet = Mun }\n",
        );
        std::fs::write(&path, bytes).unwrap();

        let descriptors = load_definitions_file(&path).unwrap();
        let planets: Vec<_> = descriptors
            .iter()
            .filter_map(|d| d.planet.as_deref())
            .collect();
        assert_eq!(planets, vec!["Kerbin", "Mun"]);
    }

    #[test]
    fn test_file_origin_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MusicDefinitions.cfg");
        std::fs::write(&path, SAMPLE).unwrap();

        let descriptors = load_definitions_file(&path).unwrap();
        assert!(descriptors
            .iter()
            .all(|d| d.origin.as_deref() == Some(path.as_path())));

        let missing = load_definitions_file(&dir.path().join("nope.cfg"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
