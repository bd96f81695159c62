//! Configuration for the tile-cache layer.
//!
//! Settings structs live in [`settings`], constants in [`defaults`],
//! INI parsing in [`parser`], and file loading in [`file`].

mod defaults;
mod file;
mod parser;
mod settings;

pub use defaults::{DEFAULT_DISK_CACHE_PATH, DEFAULT_DISK_UMASK};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{CacheBackend, Settings};
