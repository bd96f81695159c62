//! Cross-process configuration coherence.
//!
//! Worker processes each hold their own configuration snapshot and converge
//! through two shared resources: a key-value [`VersionStore`] holding the
//! currently-valid [`IdentityToken`], and a filesystem [`HashFile`] recording
//! the last token the process group observed. Readers compare the two on
//! every access; any mismatch marks the local snapshot stale.
//!
//! Per process the protocol moves Fresh → Stale on a mismatched token read,
//! Stale → Rebuilding on rebuild start, and Rebuilding → Fresh once the new
//! token is published. Concurrent rebuilds across processes race benignly:
//! tokens are content hashes, so rebuilds from the same persistence state
//! publish the same token.

mod hash_file;
mod store;
mod token;

pub use hash_file::{HashFile, DEFAULT_HASH_FILE_NAME};
pub use store::{MemoryStore, StoreError, VersionStore, CACHE_KEY};
pub use token::IdentityToken;
