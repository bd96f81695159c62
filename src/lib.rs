//! TileCache - tile-cache layer configuration for web mapping
//!
//! This library manages the runtime configuration of a tile-caching layer:
//! it registers map layers into a cache provider configuration, builds
//! per-layer tile-request templates, invalidates on-disk cache directories,
//! and keeps that configuration coherent across independent worker processes
//! through a shared version store and a filesystem hash marker.
//!
//! # High-Level API
//!
//! Most callers only need a [`ConfigAccessor`](accessor::ConfigAccessor):
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilecache::accessor::ConfigAccessor;
//! use tilecache::coherence::MemoryStore;
//! use tilecache::config::Settings;
//! use tilecache::source::{MemoryLayerSource, PathRouter};
//!
//! let accessor = ConfigAccessor::new(
//!     Settings::default(),
//!     Arc::new(MemoryLayerSource::new()),
//!     Arc::new(PathRouter),
//!     Arc::new(MemoryStore::new()),
//!     "tilestache_hash_file.txt",
//! );
//!
//! let snapshot = accessor.get_config()?;
//! ```
//!
//! The returned snapshot is process-local; staleness against other workers is
//! detected on every `get_config` call via the shared store.

pub mod accessor;
pub mod builder;
pub mod coherence;
pub mod config;
pub mod logging;
pub mod registry;
pub mod source;
pub mod template;

pub use accessor::{AccessError, ConfigAccessor};
pub use builder::{BuildError, BuildReport, ConfigurationBuilder, ConfigurationSnapshot};
pub use coherence::{HashFile, IdentityToken, MemoryStore, StoreError, VersionStore};
pub use config::{CacheBackend, Settings};
pub use registry::{LayerRegistry, ProviderLayerConfig, RegistryError};
pub use source::{LayerDescriptor, LayerSource, OwsRouter, ResolvedLayer, SourceError};

/// Version of the tilecache library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
