//! Single entry point for configuration access.
//!
//! [`ConfigAccessor`] lazily builds the process-local snapshot, checks its
//! freshness against the shared store on every access, and closes the
//! coherence loop after a rebuild by publishing the new token and rewriting
//! the hash marker. Without that publish step a mismatch would re-fire on
//! every subsequent call.

use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::builder::{BuildError, BuildReport, ConfigurationBuilder, ConfigurationSnapshot};
use crate::coherence::{HashFile, IdentityToken, StoreError, VersionStore};
use crate::config::Settings;
use crate::source::{LayerSource, OwsRouter};

/// Configuration access errors.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The shared version store was unreachable; fatal to this access
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The snapshot could not be rebuilt
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The hash marker could not be written
    #[error("hash marker I/O error: {0}")]
    Marker(#[from] std::io::Error),
}

/// Process-local configuration accessor.
///
/// One accessor per worker process. The snapshot it hands out is shared via
/// `Arc` and replaced wholesale when stale; request handlers hold the `Arc`
/// they received rather than re-fetching mid-request.
pub struct ConfigAccessor {
    snapshot: Mutex<Option<Arc<ConfigurationSnapshot>>>,
    builder: ConfigurationBuilder,
    store: Arc<dyn VersionStore>,
    hash_file: HashFile,
}

impl ConfigAccessor {
    /// Create an accessor over the given settings, collaborators, shared
    /// store, and marker path.
    pub fn new(
        settings: Settings,
        source: Arc<dyn LayerSource>,
        router: Arc<dyn OwsRouter>,
        store: Arc<dyn VersionStore>,
        hash_file_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            snapshot: Mutex::new(None),
            builder: ConfigurationBuilder::new(settings, source, router),
            store,
            hash_file: HashFile::new(hash_file_path.as_ref()),
        }
    }

    /// Get the current configuration snapshot, rebuilding if stale.
    ///
    /// The first call builds the snapshot and seeds the marker and store if
    /// no other process has published yet. Every call then checks the
    /// validity invariant: the local token, the marker token, and the
    /// shared store's token must all agree. Any mismatch rebuilds from the
    /// persistence store, publishes the new token, and rewrites the marker
    /// before returning.
    ///
    /// # Errors
    ///
    /// Store unavailability and marker write failures surface here; layer
    /// resolution failures do not (they are collected per-build, see
    /// [`BuildReport`]).
    pub fn get_config(&self) -> Result<Arc<ConfigurationSnapshot>, AccessError> {
        let mut guard = self.snapshot.lock().unwrap();

        if let Some(current) = guard.clone() {
            if self.hash_file.exists() && self.is_stale(Some(current.token()))? {
                let snapshot = self.rebuild_and_publish()?;
                *guard = Some(Arc::clone(&snapshot));
                return Ok(snapshot);
            }
            return Ok(current);
        }

        // First build in this process. One build serves both seeding (no
        // marker yet) and reconciling against a stale pre-existing
        // generation.
        let (snapshot, report) = self.builder.build()?;
        log_report(&report);
        let snapshot = Arc::new(snapshot);

        if self.hash_file.save(snapshot.token(), false)? {
            self.store.set(snapshot.token())?;
        } else if self.is_stale(Some(snapshot.token()))? {
            self.publish(&snapshot)?;
        }
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Check the validity invariant: local, marker, and shared tokens must
    /// all agree.
    fn is_stale(&self, local: Option<IdentityToken>) -> Result<bool, AccessError> {
        let marker = self.hash_file.read();
        let shared = self.store.get()?;
        let stale = marker != shared || marker != local;
        if stale {
            tracing::debug!(
                local = local.map(|t| t.value()),
                marker = marker.map(|t| t.value()),
                shared = shared.map(|t| t.value()),
                "configuration stale"
            );
        }
        Ok(stale)
    }

    /// Force a rebuild and publish regardless of freshness.
    pub fn reload(&self) -> Result<Arc<ConfigurationSnapshot>, AccessError> {
        let mut guard = self.snapshot.lock().unwrap();
        let snapshot = self.rebuild_and_publish()?;
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Publish the current snapshot's token to the shared store.
    ///
    /// Builds the snapshot first if this process has none yet.
    pub fn set_cache_hash(&self) -> Result<(), AccessError> {
        let token = self.current_token()?;
        self.store.set(token)?;
        Ok(())
    }

    /// Read the shared store's current token.
    pub fn get_cache_hash(&self) -> Result<Option<IdentityToken>, StoreError> {
        self.store.get()
    }

    /// Remove the shared token, forcing every process to rebuild on its
    /// next access.
    pub fn reset_cache_hash(&self) -> Result<(), StoreError> {
        tracing::info!("resetting shared configuration token");
        self.store.delete()
    }

    /// Write the current token to the hash marker.
    ///
    /// Writes only if the marker does not yet exist, or unconditionally if
    /// forced; a successful write also publishes the token to the store.
    /// Returns whether a write happened.
    pub fn save_hash_file(&self, force: bool) -> Result<bool, AccessError> {
        let token = self.current_token()?;
        let written = self.hash_file.save(token, force)?;
        if written {
            self.store.set(token)?;
        }
        Ok(written)
    }

    /// Read the token recorded in the hash marker, if any.
    pub fn read_hash_file(&self) -> Option<IdentityToken> {
        self.hash_file.read()
    }

    fn rebuild_and_publish(&self) -> Result<Arc<ConfigurationSnapshot>, AccessError> {
        let (snapshot, report) = self.builder.build()?;
        log_report(&report);

        let snapshot = Arc::new(snapshot);
        self.publish(&snapshot)?;
        Ok(snapshot)
    }

    fn publish(&self, snapshot: &ConfigurationSnapshot) -> Result<(), AccessError> {
        self.store.set(snapshot.token())?;
        self.hash_file.save(snapshot.token(), true)?;
        tracing::debug!(token = %snapshot.token(), "published configuration generation");
        Ok(())
    }

    fn current_token(&self) -> Result<IdentityToken, AccessError> {
        let mut guard = self.snapshot.lock().unwrap();
        if let Some(snapshot) = guard.as_ref() {
            return Ok(snapshot.token());
        }
        let (snapshot, report) = self.builder.build()?;
        log_report(&report);
        let snapshot = Arc::new(snapshot);
        let token = snapshot.token();
        *guard = Some(snapshot);
        Ok(token)
    }
}

fn log_report(report: &BuildReport) {
    for failure in &report.failures {
        tracing::warn!(key = %failure.key, error = %failure.error, "cache layer not registered");
    }
}
