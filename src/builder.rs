//! Configuration snapshot construction.
//!
//! A [`ConfigurationBuilder`] turns settings plus the persistence store's
//! cache-enabled layer set into a [`ConfigurationSnapshot`]. Snapshots are
//! replaced wholesale on rebuild, never mutated field-by-field across a
//! reload.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::coherence::IdentityToken;
use crate::config::Settings;
use crate::registry::{LayerRegistry, RegistryError};
use crate::source::{LayerSource, OwsRouter, SourceError};

/// Build errors.
///
/// Only failures that prevent the whole build surface here; individual
/// layer failures land in the [`BuildReport`] instead.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The cache-enabled layer set could not be listed
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// A loaded configuration generation.
///
/// Owned by the process that built it; replaced wholesale when stale.
#[derive(Debug, Clone)]
pub struct ConfigurationSnapshot {
    token: IdentityToken,
    registry: LayerRegistry,
}

impl ConfigurationSnapshot {
    /// Token naming this generation.
    pub fn token(&self) -> IdentityToken {
        self.token
    }

    /// The layer registry built for this generation.
    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }
}

/// One layer that failed to register during a build.
#[derive(Debug)]
pub struct LayerBuildFailure {
    /// Layer key as supplied by the descriptor
    pub key: String,
    /// What went wrong for this layer
    pub error: RegistryError,
}

impl fmt::Display for LayerBuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer '{}': {}", self.key, self.error)
    }
}

/// Per-layer outcome of a build.
///
/// A failed layer never aborts the build; it is recorded here so callers
/// can report it instead of serving a silently incomplete configuration.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Layers that failed to register, in descriptor order
    pub failures: Vec<LayerBuildFailure>,
}

impl BuildReport {
    /// Whether every layer registered cleanly.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds configuration snapshots from settings and collaborators.
pub struct ConfigurationBuilder {
    settings: Settings,
    source: Arc<dyn LayerSource>,
    router: Arc<dyn OwsRouter>,
}

impl ConfigurationBuilder {
    /// Create a builder over the given settings and collaborators.
    pub fn new(
        settings: Settings,
        source: Arc<dyn LayerSource>,
        router: Arc<dyn OwsRouter>,
    ) -> Self {
        Self {
            settings,
            source,
            router,
        }
    }

    /// The settings this builder was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Build a fresh snapshot from the current persistence-store state.
    ///
    /// The snapshot's token is a content hash of the descriptor set, so
    /// rebuilds from unchanged state reproduce the same token. Duplicate
    /// descriptor keys follow last-write-wins.
    ///
    /// # Errors
    ///
    /// Fails only if the cache-enabled layer set cannot be listed;
    /// per-layer failures are collected into the report.
    pub fn build(&self) -> Result<(ConfigurationSnapshot, BuildReport), BuildError> {
        let descriptors = self.source.cache_enabled_layers()?;
        let token = IdentityToken::from_descriptors(&descriptors);

        let mut registry = LayerRegistry::new(
            self.settings.cache.clone(),
            self.settings.layers_host.clone(),
        );
        let mut report = BuildReport::default();

        for descriptor in &descriptors {
            if let Err(error) = registry.add_layer(
                &descriptor.key,
                descriptor,
                self.source.as_ref(),
                self.router.as_ref(),
            ) {
                tracing::warn!(key = %descriptor.key, %error, "skipping cache layer");
                report.failures.push(LayerBuildFailure {
                    key: descriptor.key.clone(),
                    error,
                });
            }
        }

        tracing::debug!(
            token = %token,
            layers = registry.len(),
            failed = report.failures.len(),
            backend = registry.cache().name(),
            "built configuration snapshot"
        );

        Ok((ConfigurationSnapshot { token, registry }, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheBackend;
    use crate::source::{LayerDescriptor, MemoryLayerSource, PathRouter, ResolvedLayer};

    fn builder_with(source: Arc<MemoryLayerSource>) -> ConfigurationBuilder {
        let settings = Settings::default()
            .with_cache(CacheBackend::Test)
            .with_layers_host("https://tiles.example");
        ConfigurationBuilder::new(settings, source, Arc::new(PathRouter))
    }

    fn resolved(name: &str, project_id: i64, srid: u32) -> ResolvedLayer {
        ResolvedLayer {
            name: name.to_string(),
            project_id,
            srid,
        }
    }

    #[test]
    fn test_build_registers_all_enabled_layers() {
        let source = Arc::new(MemoryLayerSource::new());
        source.add(LayerDescriptor::new("demo", 7, "roads"), resolved("roads", 3, 4326));
        source.add(LayerDescriptor::new("demo", 8, "rivers"), resolved("rivers", 3, 4326));

        let (snapshot, report) = builder_with(source).build().unwrap();

        assert!(report.is_clean());
        assert_eq!(snapshot.registry().len(), 2);
        assert!(snapshot.registry().contains_key("roads"));
        assert!(snapshot.registry().contains_key("rivers"));
    }

    #[test]
    fn test_build_collects_per_layer_failures() {
        let source = Arc::new(MemoryLayerSource::new());
        source.add(LayerDescriptor::new("demo", 7, "roads"), resolved("roads", 3, 4326));
        source.add_dangling(LayerDescriptor::new("demo", 99, "ghost"));

        let (snapshot, report) = builder_with(source).build().unwrap();

        assert_eq!(snapshot.registry().len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, "ghost");
        assert!(matches!(report.failures[0].error, RegistryError::Source(_)));
    }

    #[test]
    fn test_build_duplicate_keys_last_write_wins() {
        let source = Arc::new(MemoryLayerSource::new());
        source.add(LayerDescriptor::new("demo", 7, "roads"), resolved("roads", 3, 4326));
        source.add(LayerDescriptor::new("demo", 8, "roads"), resolved("roads_v2", 3, 3857));

        let (snapshot, report) = builder_with(source).build().unwrap();

        assert!(report.is_clean());
        assert_eq!(snapshot.registry().len(), 1);
        assert_eq!(
            snapshot.registry().get("roads").unwrap().projection,
            "EPSG:3857"
        );
    }

    #[test]
    fn test_build_with_empty_host_reports_invalid_layers() {
        let source = Arc::new(MemoryLayerSource::new());
        source.add(LayerDescriptor::new("demo", 7, "roads"), resolved("roads", 3, 4326));

        // Settings::default() has no layers host; the composed template is a
        // bare relative path and must land in the report, not the registry.
        let builder =
            ConfigurationBuilder::new(Settings::default(), source, Arc::new(PathRouter));
        let (snapshot, report) = builder.build().unwrap();

        assert!(snapshot.registry().is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            RegistryError::InvalidLayerConfig { .. }
        ));
    }

    #[test]
    fn test_build_empty_source_is_valid() {
        let source = Arc::new(MemoryLayerSource::new());
        let (snapshot, report) = builder_with(source).build().unwrap();

        assert!(report.is_clean());
        assert!(snapshot.registry().is_empty());
    }

    #[test]
    fn test_rebuild_from_same_state_reproduces_token() {
        let source = Arc::new(MemoryLayerSource::new());
        source.add(LayerDescriptor::new("demo", 7, "roads"), resolved("roads", 3, 4326));
        let builder = builder_with(source);

        let (first, _) = builder.build().unwrap();
        let (second, _) = builder.build().unwrap();
        assert_eq!(first.token(), second.token());
    }

    #[test]
    fn test_token_tracks_layer_set_changes() {
        let source = Arc::new(MemoryLayerSource::new());
        source.add(LayerDescriptor::new("demo", 7, "roads"), resolved("roads", 3, 4326));
        let builder = builder_with(Arc::clone(&source));

        let (first, _) = builder.build().unwrap();
        source.add(LayerDescriptor::new("demo", 8, "rivers"), resolved("rivers", 3, 4326));
        let (second, _) = builder.build().unwrap();

        assert_ne!(first.token(), second.token());
    }
}
