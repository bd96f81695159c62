//! Layer registry: the per-layer cache-provider configurations.
//!
//! Maps layer keys to validated [`ProviderLayerConfig`] entries and handles
//! on-disk cache invalidation for removed or changed layers.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::CacheBackend;
use crate::source::{LayerDescriptor, LayerSource, OwsRouter, SourceError, GROUP_PLACEHOLDER};
use crate::template;

/// Provider name for URL-template providers, as the tile engine expects it.
pub const URL_TEMPLATE_PROVIDER: &str = "url template";

/// Registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Remove of a key not present in the registry
    #[error("unknown layer key '{0}'")]
    UnknownLayer(String),

    /// The descriptor could not be resolved against the persistence store
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The composed layer config failed provider validation
    #[error("invalid layer config for '{key}': {reason}")]
    InvalidLayerConfig { key: String, reason: String },

    /// I/O error while erasing a cache directory
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Tile-provider configuration for a single cached layer.
///
/// Derived deterministically from a [`LayerDescriptor`]; immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderLayerConfig {
    /// URL-template provider specification
    pub provider: UrlTemplateProvider,
    /// Custom grid projection, `EPSG:<code>`
    pub projection: String,
}

/// The provider half of a layer config: name plus request template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplateProvider {
    /// Provider name, always [`URL_TEMPLATE_PROVIDER`]
    pub name: String,
    /// Tile-request template with `$`-placeholders
    pub template: String,
}

impl ProviderLayerConfig {
    /// Build a layer config from a resolved layer.
    ///
    /// `ows_route` is the base request path supplied by the routing
    /// collaborator; `host` comes from settings.
    pub fn build(layer_name: &str, srid: u32, host: &str, ows_route: &str) -> Self {
        Self {
            provider: UrlTemplateProvider {
                name: URL_TEMPLATE_PROVIDER.to_string(),
                template: template::tile_template(host, ows_route, layer_name),
            },
            projection: template::projection_spec(srid),
        }
    }

    /// Validate the config the way the tile provider's per-layer parser does.
    ///
    /// The template must start with an absolute http(s) host, carry every
    /// request placeholder, and the projection must name an EPSG code.
    pub fn validate(&self, key: &str) -> Result<(), RegistryError> {
        if !self.provider.template.starts_with("http://")
            && !self.provider.template.starts_with("https://")
        {
            return Err(RegistryError::InvalidLayerConfig {
                key: key.to_string(),
                reason: "template does not start with an absolute http(s) host".to_string(),
            });
        }

        let placeholders = [
            template::BBOX_PLACEHOLDER,
            template::SRS_PLACEHOLDER,
            template::WIDTH_PLACEHOLDER,
            template::HEIGHT_PLACEHOLDER,
        ];
        for placeholder in placeholders {
            if !self.provider.template.contains(placeholder) {
                return Err(RegistryError::InvalidLayerConfig {
                    key: key.to_string(),
                    reason: format!("template missing placeholder '{}'", placeholder),
                });
            }
        }

        let code = self.projection.strip_prefix("EPSG:").unwrap_or("");
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RegistryError::InvalidLayerConfig {
                key: key.to_string(),
                reason: format!("projection '{}' is not an EPSG code", self.projection),
            });
        }

        Ok(())
    }
}

/// In-memory mapping from layer key to provider configuration.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    layers: HashMap<String, ProviderLayerConfig>,
    cache: CacheBackend,
    layers_host: String,
}

impl LayerRegistry {
    /// Create an empty registry for the given cache backend and host.
    pub fn new(cache: CacheBackend, layers_host: impl Into<String>) -> Self {
        Self {
            layers: HashMap::new(),
            cache,
            layers_host: layers_host.into(),
        }
    }

    /// Resolve a descriptor and register its provider configuration.
    ///
    /// Duplicate keys are overwritten (last write wins).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Source`] if the underlying map-layer entity
    /// cannot be resolved, or [`RegistryError::InvalidLayerConfig`] if the
    /// composed config fails provider validation.
    pub fn add_layer(
        &mut self,
        key: &str,
        descriptor: &LayerDescriptor,
        source: &dyn LayerSource,
        router: &dyn OwsRouter,
    ) -> Result<(), RegistryError> {
        let resolved = source.resolve(descriptor)?;
        let route = router.ows_path(GROUP_PLACEHOLDER, &descriptor.app_name, resolved.project_id);
        let config =
            ProviderLayerConfig::build(&resolved.name, resolved.srid, &self.layers_host, &route);
        config.validate(key)?;

        tracing::debug!(key, layer = %resolved.name, "registered cache layer");
        self.layers.insert(key.to_string(), config);
        Ok(())
    }

    /// Remove a layer's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownLayer`] if the key is absent; callers
    /// must guard if removal is optional.
    pub fn remove_layer(&mut self, key: &str) -> Result<ProviderLayerConfig, RegistryError> {
        self.layers
            .remove(key)
            .ok_or_else(|| RegistryError::UnknownLayer(key.to_string()))
    }

    /// Erase the on-disk cache directory for a layer.
    ///
    /// Removes `<cachepath>/<key>` recursively for disk backends, treating a
    /// missing directory as success. A no-op for the `Test` backend.
    pub fn erase_cache_layer(&self, key: &str) -> Result<(), RegistryError> {
        let Some(cache_path) = self.cache.cache_path() else {
            return Ok(());
        };

        let layer_dir: PathBuf = cache_path.join(key);
        match fs::remove_dir_all(&layer_dir) {
            Ok(()) => {
                tracing::info!(key, path = %layer_dir.display(), "erased layer cache directory");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a layer's configuration.
    pub fn get(&self, key: &str) -> Option<&ProviderLayerConfig> {
        self.layers.get(key)
    }

    /// Check whether a layer key is registered.
    pub fn contains_key(&self, key: &str) -> bool {
        self.layers.contains_key(key)
    }

    /// Registered layer keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Number of registered layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the registry has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The cache backend this registry invalidates against.
    pub fn cache(&self) -> &CacheBackend {
        &self.cache
    }
}
