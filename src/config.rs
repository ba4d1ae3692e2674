use serde::{Deserialize, Serialize};
use skyscore_assets::DiscoveryPolicy;
use skyscore_audio::EngineSettings;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/skyscore.toml";
const DEFAULT_GAME_DATA: &str = "GameData";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding one sub-directory per mod.
    pub game_data: PathBuf,
    pub discovery: DiscoveryPolicy,
    /// Play through the default output device when built with `rodio_backend`.
    pub audio_output: bool,
    pub engine: EngineSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game_data: PathBuf::from(DEFAULT_GAME_DATA),
            discovery: DiscoveryPolicy::default(),
            audio_output: true,
            engine: EngineSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    AppConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                AppConfig::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyscore_audio::OverlapPolicy;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skyscore.toml");
        fs::write(
            &path,
            r#"
game_data = "/opt/ksp/GameData"
discovery = "first-found"

[engine]
overlap_policy = "first_declared"
"#,
        )
        .unwrap();

        let cfg = AppConfig::load_from_path(&path);
        assert_eq!(cfg.game_data, PathBuf::from("/opt/ksp/GameData"));
        assert_eq!(cfg.discovery, DiscoveryPolicy::FirstFound);
        assert!(cfg.audio_output);
        assert_eq!(cfg.engine.overlap_policy, OverlapPolicy::FirstDeclared);
        assert_eq!(cfg.engine.tick_hz, 50);
    }

    #[test]
    fn broken_or_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skyscore.toml");
        fs::write(&path, "game_data = [").unwrap();
        assert_eq!(AppConfig::load_from_path(&path), AppConfig::default());
        assert_eq!(
            AppConfig::load_from_path(&dir.path().join("missing.toml")),
            AppConfig::default()
        );
    }
}
