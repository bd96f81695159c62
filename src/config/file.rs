//! Configuration file handling for ~/.tilecache/config.ini.
//!
//! Loads settings with sensible defaults when the file is absent.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::Settings;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl Settings {
    /// Load settings from the default path (~/.tilecache/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load settings from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let mut ini = Ini::new();
        {
            let mut cache = ini.with_section(Some("cache"));
            match &self.cache {
                super::settings::CacheBackend::Disk { path, umask } => {
                    cache
                        .set("type", "disk")
                        .set("disk_path", path.display().to_string())
                        .set("disk_umask", umask.clone());
                }
                super::settings::CacheBackend::Test => {
                    cache.set("type", "test");
                }
            }
        }
        ini.with_section(Some("layers"))
            .set("host", self.layers_host.clone());

        ini.write_to_file(path)
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }
}

/// Get the path to the config directory (~/.tilecache).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tilecache")
}

/// Get the path to the config file (~/.tilecache/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::super::settings::CacheBackend;
    use super::*;

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let settings = Settings::default()
            .with_cache(CacheBackend::Disk {
                path: PathBuf::from("/var/cache/tiles"),
                umask: "0022".to_string(),
            })
            .with_layers_host("https://tiles.example");
        settings.save_to(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_save_test_backend_round_trip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let settings = Settings::default().with_cache(CacheBackend::Test);
        settings.save_to(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.cache, CacheBackend::Test);
    }

    #[test]
    fn test_config_file_path_under_config_directory() {
        assert!(config_file_path().starts_with(config_directory()));
    }
}
