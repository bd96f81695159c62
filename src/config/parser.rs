//! INI parsing logic for converting `Ini` → `Settings`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::{DEFAULT_DISK_CACHE_PATH, DEFAULT_DISK_UMASK};
use super::file::ConfigFileError;
use super::settings::{CacheBackend, Settings};

/// Parse an `Ini` object into `Settings`.
///
/// Starts from `Settings::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<Settings, ConfigFileError> {
    let mut settings = Settings::default();

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        let kind = section.get("type").unwrap_or("disk").to_lowercase();
        match kind.as_str() {
            "disk" => {
                let path = section
                    .get("disk_path")
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .unwrap_or(DEFAULT_DISK_CACHE_PATH);
                let umask = section
                    .get("disk_umask")
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .unwrap_or(DEFAULT_DISK_UMASK);
                settings.cache = CacheBackend::Disk {
                    path: PathBuf::from(path),
                    umask: umask.to_string(),
                };
            }
            "test" => settings.cache = CacheBackend::Test,
            other => {
                return Err(ConfigFileError::InvalidValue {
                    section: "cache".to_string(),
                    key: "type".to_string(),
                    value: other.to_string(),
                    reason: "must be 'disk' or 'test'".to_string(),
                });
            }
        }
    }

    // [layers] section
    if let Some(section) = ini.section(Some("layers")) {
        if let Some(v) = section.get("host") {
            let v = v.trim();
            if !v.is_empty() {
                settings.layers_host = v.trim_end_matches('/').to_string();
            }
        }
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn ini_from(content: &str) -> Ini {
        Ini::load_from_str(content).unwrap()
    }

    #[test]
    fn test_parse_empty_returns_defaults() {
        let settings = parse_ini(&ini_from("")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_parse_disk_backend() {
        let content = "
[cache]
type = disk
disk_path = /var/cache/tiles
disk_umask = 0022

[layers]
host = https://tiles.example
";
        let settings = parse_ini(&ini_from(content)).unwrap();
        assert_eq!(
            settings.cache,
            CacheBackend::Disk {
                path: Path::new("/var/cache/tiles").to_path_buf(),
                umask: "0022".to_string(),
            }
        );
        assert_eq!(settings.layers_host, "https://tiles.example");
    }

    #[test]
    fn test_parse_test_backend() {
        let settings = parse_ini(&ini_from("[cache]\ntype = test\n")).unwrap();
        assert_eq!(settings.cache, CacheBackend::Test);
    }

    #[test]
    fn test_parse_invalid_backend_type() {
        let err = parse_ini(&ini_from("[cache]\ntype = redis\n")).unwrap_err();
        match err {
            ConfigFileError::InvalidValue { section, key, value, .. } => {
                assert_eq!(section, "cache");
                assert_eq!(key, "type");
                assert_eq!(value, "redis");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_trailing_slash_stripped_from_host() {
        let settings = parse_ini(&ini_from("[layers]\nhost = https://tiles.example/\n")).unwrap();
        assert_eq!(settings.layers_host, "https://tiles.example");
    }

    #[test]
    fn test_parse_blank_disk_path_falls_back_to_default() {
        let settings = parse_ini(&ini_from("[cache]\ntype = disk\ndisk_path =\n")).unwrap();
        assert_eq!(
            settings.cache.cache_path(),
            Some(Path::new(DEFAULT_DISK_CACHE_PATH))
        );
    }
}
