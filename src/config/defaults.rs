//! Default values for all configuration settings.

use std::path::PathBuf;

use super::settings::{CacheBackend, Settings};

/// Default disk cache directory, relative to the process working directory.
pub const DEFAULT_DISK_CACHE_PATH: &str = "tmp/tilestache_g3wsuite";

/// Default umask applied to disk cache files.
pub const DEFAULT_DISK_UMASK: &str = "0000";

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache: CacheBackend::default(),
            layers_host: String::new(),
        }
    }
}

impl Default for CacheBackend {
    fn default() -> Self {
        CacheBackend::Disk {
            path: PathBuf::from(DEFAULT_DISK_CACHE_PATH),
            umask: DEFAULT_DISK_UMASK.to_string(),
        }
    }
}
