//! Settings structs for the tile-cache configuration.
//!
//! Pure data types with no parsing or serialization logic.

use std::path::{Path, PathBuf};

/// Complete tile-cache settings loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Cache backend selection
    pub cache: CacheBackend,
    /// Base URL prepended to every layer tile-request template
    pub layers_host: String,
}

impl Settings {
    /// Set the cache backend.
    pub fn with_cache(mut self, cache: CacheBackend) -> Self {
        self.cache = cache;
        self
    }

    /// Set the layers host base URL.
    pub fn with_layers_host(mut self, host: impl Into<String>) -> Self {
        self.layers_host = host.into();
        self
    }
}

/// Cache backend specification.
///
/// `Disk` caches rendered tiles under a directory tree; `Test` is a no-op
/// backend used when no disk backend is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// On-disk tile cache.
    Disk {
        /// Cache directory root
        path: PathBuf,
        /// Umask applied to cache files, as an octal string (e.g. "0000")
        umask: String,
    },
    /// No-op backend for environments without a disk cache.
    Test,
}

impl CacheBackend {
    /// Backend name as written in the config file.
    pub fn name(&self) -> &str {
        match self {
            CacheBackend::Disk { .. } => "Disk",
            CacheBackend::Test => "Test",
        }
    }

    /// Cache directory root, if this is a disk backend.
    pub fn cache_path(&self) -> Option<&Path> {
        match self {
            CacheBackend::Disk { path, .. } => Some(path),
            CacheBackend::Test => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name() {
        let disk = CacheBackend::Disk {
            path: PathBuf::from("/tmp/tiles"),
            umask: "0000".to_string(),
        };
        assert_eq!(disk.name(), "Disk");
        assert_eq!(CacheBackend::Test.name(), "Test");
    }

    #[test]
    fn test_backend_cache_path() {
        let disk = CacheBackend::Disk {
            path: PathBuf::from("/tmp/tiles"),
            umask: "0000".to_string(),
        };
        assert_eq!(disk.cache_path(), Some(Path::new("/tmp/tiles")));
        assert_eq!(CacheBackend::Test.cache_path(), None);
    }

    #[test]
    fn test_settings_builder() {
        let settings = Settings::default()
            .with_cache(CacheBackend::Test)
            .with_layers_host("https://tiles.example");

        assert_eq!(settings.cache, CacheBackend::Test);
        assert_eq!(settings.layers_host, "https://tiles.example");
    }
}
