//! Filesystem hash marker: the last token a process group observed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::token::IdentityToken;

/// Default marker file name, relative to the process working directory.
pub const DEFAULT_HASH_FILE_NAME: &str = "tilestache_hash_file.txt";

/// Marker file holding a single decimal token.
///
/// Created on the first successful build, overwritten only when forced,
/// read on every configuration access. Reading is deliberately lenient:
/// a missing, empty, or unreadable file means "no token known" and lets a
/// rebuild repair the marker, so a corrupt file never wedges the workers.
#[derive(Debug, Clone)]
pub struct HashFile {
    path: PathBuf,
}

impl HashFile {
    /// Create a marker handle for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The marker file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the marker file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the recorded token.
    ///
    /// Returns `None` if the file is missing, empty, unparsable, or
    /// unreadable.
    pub fn read(&self) -> Option<IdentityToken> {
        let content = fs::read_to_string(&self.path).ok()?;
        content.parse().ok()
    }

    /// Write a token to the marker file.
    ///
    /// Writes only if the file does not yet exist, or unconditionally when
    /// `force` is set. Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Write errors propagate; unlike reads, a failed write means the
    /// process could not become the publisher and the caller must know.
    pub fn save(&self, token: IdentityToken, force: bool) -> Result<bool, io::Error> {
        if self.path.exists() && !force {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token.to_string())?;
        tracing::debug!(token = %token, path = %self.path.display(), "wrote hash marker");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn marker_in_temp() -> (HashFile, TempDir) {
        let temp = TempDir::new().unwrap();
        let marker = HashFile::new(temp.path().join(DEFAULT_HASH_FILE_NAME));
        (marker, temp)
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let (marker, _temp) = marker_in_temp();
        assert!(!marker.exists());
        assert_eq!(marker.read(), None);
    }

    #[test]
    fn test_save_then_read_round_trip() {
        let (marker, _temp) = marker_in_temp();
        let token = IdentityToken::from_raw(12345);

        assert!(marker.save(token, true).unwrap());
        assert_eq!(marker.read(), Some(token));
    }

    #[test]
    fn test_save_without_force_does_not_overwrite() {
        let (marker, _temp) = marker_in_temp();
        marker.save(IdentityToken::from_raw(1), false).unwrap();

        let written = marker.save(IdentityToken::from_raw(2), false).unwrap();
        assert!(!written);
        assert_eq!(marker.read(), Some(IdentityToken::from_raw(1)));
    }

    #[test]
    fn test_save_with_force_overwrites() {
        let (marker, _temp) = marker_in_temp();
        marker.save(IdentityToken::from_raw(1), false).unwrap();
        marker.save(IdentityToken::from_raw(2), true).unwrap();

        assert_eq!(marker.read(), Some(IdentityToken::from_raw(2)));
    }

    #[test]
    fn test_read_empty_file_is_none() {
        let (marker, _temp) = marker_in_temp();
        fs::write(marker.path(), "").unwrap();

        assert_eq!(marker.read(), None);
    }

    #[test]
    fn test_read_garbage_file_is_none() {
        let (marker, _temp) = marker_in_temp();
        fs::write(marker.path(), "not-a-token").unwrap();

        assert_eq!(marker.read(), None);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let marker = HashFile::new(temp.path().join("nested/dir/marker.txt"));

        marker.save(IdentityToken::from_raw(7), false).unwrap();
        assert_eq!(marker.read(), Some(IdentityToken::from_raw(7)));
    }
}
