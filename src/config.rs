use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration.
///
/// Loaded once per run and passed into the components that need it; no
/// module-level state. Secrets stay in the environment (see
/// [`crate::auth`]); the playlist id can also be supplied via
/// `TRUESHUFFLE_PLAYLIST_ID` for scheduled runs, which takes precedence
/// over the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub playlist: PlaylistConfig,
    pub shuffle: ShuffleConfig,
    pub cache: CacheConfig,
}

/// The destination playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Known playlist id. Empty on first run; the id printed after
    /// creation should be stored here (or in the environment).
    pub id: Option<String>,
    /// Name used when the playlist has to be created.
    pub name: String,
    /// Base description; a "Last updated" stamp is appended on every run.
    pub description: String,
    /// Whether the playlist is public.
    pub public: bool,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            id: None,
            name: "True Shuffle".to_string(),
            description: "A daily shuffled selection of random songs from your liked songs."
                .to_string(),
            public: false,
        }
    }
}

/// Shuffle parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuffleConfig {
    /// How many songs to put in the playlist each run.
    pub num_songs: usize,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self { num_songs: 150 }
    }
}

/// Liked-songs snapshot location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Override for the snapshot file path (default: the user cache dir).
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("trueshuffle");

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file, or create the default one if not
    /// present.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path).context("Failed to read config file")?;
            let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Effective playlist id: environment beats the config file.
    pub fn playlist_id(&self) -> Option<String> {
        env::var("TRUESHUFFLE_PLAYLIST_ID")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.playlist.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.playlist.id.is_none());
        assert_eq!(config.playlist.name, "True Shuffle");
        assert!(!config.playlist.public);
        assert_eq!(config.shuffle.num_songs, 150);
        assert!(config.cache.file.is_none());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(deserialized.playlist.name, config.playlist.name);
        assert_eq!(deserialized.shuffle.num_songs, config.shuffle.num_songs);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial_toml = r#"
[shuffle]
num_songs = 42
"#;

        let config: Config = toml::from_str(partial_toml).unwrap();

        assert_eq!(config.shuffle.num_songs, 42);
        assert_eq!(config.playlist.name, "True Shuffle");
        assert!(!config.playlist.public);
    }

    #[test]
    fn test_full_config_parsing() {
        let full_toml = r#"
[playlist]
id = "37i9dQZF1DX0XUsuxWHRQd"
name = "Shuffle Everything"
description = "All of it."
public = true

[shuffle]
num_songs = 200

[cache]
file = "/tmp/liked.json"
"#;

        let config: Config = toml::from_str(full_toml).unwrap();

        assert_eq!(config.playlist.id.as_deref(), Some("37i9dQZF1DX0XUsuxWHRQd"));
        assert_eq!(config.playlist.name, "Shuffle Everything");
        assert!(config.playlist.public);
        assert_eq!(config.shuffle.num_songs, 200);
        assert_eq!(
            config.cache.file.as_deref(),
            Some(std::path::Path::new("/tmp/liked.json"))
        );
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid [[ toml";
        let result: std::result::Result<Config, _> = toml::from_str(invalid_toml);
        assert!(result.is_err());
    }
}
