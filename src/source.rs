//! Collaborator seams for the persistence store and URL routing.
//!
//! The tile-cache layer does not own the map-layer metadata; it asks a
//! [`LayerSource`] which layers are cache-enabled and how they resolve, and
//! an [`OwsRouter`] for the OWS request path used in tile templates. Both are
//! traits so the web application can inject its own backends.

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Group placeholder passed to the router instead of the real group slug.
///
/// Tile requests resolve the group from the project server-side; using a
/// placeholder avoids a persistence-store query per layer.
pub const GROUP_PLACEHOLDER: &str = "0";

/// A cache-enabled map layer as recorded in the persistence store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerDescriptor {
    /// Application the layer belongs to (e.g. "qdjango")
    pub app_name: String,
    /// Primary key of the layer entity within the application
    pub layer_id: i64,
    /// Display key used to address the layer in the cache configuration
    pub key: String,
}

impl LayerDescriptor {
    /// Create a new descriptor.
    pub fn new(app_name: impl Into<String>, layer_id: i64, key: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            layer_id,
            key: key.into(),
        }
    }
}

/// A layer descriptor resolved against the persistence store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayer {
    /// Layer name as known to the map server (goes into LAYERS=)
    pub name: String,
    /// Numeric id of the project containing the layer
    pub project_id: i64,
    /// Authoritative spatial-reference-system code of the project group
    pub srid: u32,
}

/// Errors from the persistence-store collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The referenced map-layer entity does not exist
    #[error("layer {layer_id} not found in application '{app_name}'")]
    LayerNotFound { app_name: String, layer_id: i64 },

    /// The persistence store could not be queried
    #[error("layer source unavailable: {0}")]
    Unavailable(String),
}

/// Source of cache-enabled layers and their resolution.
pub trait LayerSource: Send + Sync {
    /// List all layers currently marked cache-enabled.
    fn cache_enabled_layers(&self) -> Result<Vec<LayerDescriptor>, SourceError>;

    /// Resolve a descriptor to the underlying map-layer entity.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::LayerNotFound`] if no entity matches the
    /// descriptor's application and layer id.
    fn resolve(&self, descriptor: &LayerDescriptor) -> Result<ResolvedLayer, SourceError>;
}

/// Builder of the OWS request path used in tile templates.
pub trait OwsRouter: Send + Sync {
    /// Build the OWS path for (group, application name, project id).
    fn ows_path(&self, group_slug: &str, app_name: &str, project_id: i64) -> String;
}

/// Default router producing `/ows/<group>/<app>/<project>/`.
pub struct PathRouter;

impl OwsRouter for PathRouter {
    fn ows_path(&self, group_slug: &str, app_name: &str, project_id: i64) -> String {
        format!("/ows/{}/{}/{}/", group_slug, app_name, project_id)
    }
}

/// In-memory layer source for tests and embedded use.
///
/// Holds descriptors and their resolutions behind a mutex so tests can
/// mutate the "persistence store" through a shared handle.
#[derive(Default)]
pub struct MemoryLayerSource {
    inner: Mutex<MemoryLayerSourceInner>,
}

#[derive(Default)]
struct MemoryLayerSourceInner {
    enabled: Vec<LayerDescriptor>,
    resolutions: HashMap<(String, i64), ResolvedLayer>,
}

impl MemoryLayerSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a layer cache-enabled and record its resolution.
    pub fn add(&self, descriptor: LayerDescriptor, resolved: ResolvedLayer) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .resolutions
            .insert((descriptor.app_name.clone(), descriptor.layer_id), resolved);
        inner.enabled.push(descriptor);
    }

    /// Mark a layer cache-enabled without a resolution.
    ///
    /// Resolving it will fail with [`SourceError::LayerNotFound`], mimicking
    /// a dangling persistence-store reference.
    pub fn add_dangling(&self, descriptor: LayerDescriptor) {
        self.inner.lock().unwrap().enabled.push(descriptor);
    }

    /// Remove a layer from the cache-enabled set by key.
    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.enabled.retain(|d| d.key != key);
    }
}

impl LayerSource for MemoryLayerSource {
    fn cache_enabled_layers(&self) -> Result<Vec<LayerDescriptor>, SourceError> {
        Ok(self.inner.lock().unwrap().enabled.clone())
    }

    fn resolve(&self, descriptor: &LayerDescriptor) -> Result<ResolvedLayer, SourceError> {
        let inner = self.inner.lock().unwrap();
        inner
            .resolutions
            .get(&(descriptor.app_name.clone(), descriptor.layer_id))
            .cloned()
            .ok_or_else(|| SourceError::LayerNotFound {
                app_name: descriptor.app_name.clone(),
                layer_id: descriptor.layer_id,
            })
    }
}
