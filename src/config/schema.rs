use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Create a new config with just the API key, using defaults for everything else
    #[cfg(test)]
    pub fn new(tmdb_api_key: String) -> Self {
        Self {
            tmdb: TmdbConfig {
                api_key: tmdb_api_key,
            },
            storage: StorageConfig::default(),
        }
    }

    /// Check if the config has a usable API key
    pub fn has_api_key(&self) -> bool {
        !self.tmdb.api_key.trim().is_empty()
    }
}

/// TMDB configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default)]
    pub api_key: String,
}

/// Where the watchlist database lives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = Config::new("tmdb_key".to_string());
        assert_eq!(config.tmdb.api_key, "tmdb_key");
        assert!(config.has_api_key());
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_config_blank_key() {
        let config = Config::new("   ".to_string());
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::new("my_tmdb_key".to_string());
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("my_tmdb_key"));
        assert!(!toml_str.contains("data_dir"));
    }

    #[test]
    fn test_config_deserialization_minimal() {
        let toml_str = r#"
[tmdb]
api_key = "test_key"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tmdb.api_key, "test_key");
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_config_deserialization_full() {
        let toml_str = r#"
[tmdb]
api_key = "test_key"

[storage]
data_dir = "/tmp/nextup-data"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/tmp/nextup-data"))
        );
    }
}
