use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::config::Config;
use crate::error::ConfigError;

/// Environment variable that relocates all watchlist data (used by tests and portable installs)
pub const DATA_DIR_ENV: &str = "NEXTUP_DATA_DIR";

/// Get the config file path (~/.config/nextup/config.toml)
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nextup")
        .join("config.toml")
}

/// Resolve the directory holding the watchlist database.
///
/// `NEXTUP_DATA_DIR` wins over the config file, which wins over the platform default.
pub fn data_dir(config: &Config) -> PathBuf {
    if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
        if !custom.trim().is_empty() {
            return PathBuf::from(custom);
        }
    }

    if let Some(dir) = &config.storage.data_dir {
        return dir.clone();
    }

    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nextup")
}

/// Load config from the default path
pub fn load_config() -> Result<Config, ConfigError> {
    let config = read_config(&config_path())?;

    if !config.has_api_key() {
        return Err(ConfigError::MissingApiKey);
    }

    Ok(config)
}

/// Load config without requiring an API key (for editing it)
pub fn load_config_or_default() -> Config {
    read_config(&config_path()).unwrap_or_default()
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Save config to the default path with secure permissions
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    write_config(&config_path(), config)
}

fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

    fs::write(path, content)?;

    // The file holds an API key
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path() {
        let path = config_path();
        assert!(path.ends_with("nextup/config.toml"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_config(&path, &Config::new("abc123".to_string())).unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.tmdb.api_key, "abc123");

        #[cfg(unix)]
        {
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_config(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_read_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tmdb\napi_key = ").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::Invalid(_))));
    }
}
