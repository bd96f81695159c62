//! Configuration generation tokens.

use sha2::{Digest, Sha256};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::source::LayerDescriptor;

/// Identity of a configuration generation.
///
/// A content hash of the cache-enabled descriptor set at build time, so the
/// token is reproducible and comparable across process boundaries: two
/// workers that rebuild from the same persistence state derive the same
/// token, while any change to the layer set yields a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityToken(u64);

impl IdentityToken {
    /// Derive a token from the cache-enabled descriptor set.
    ///
    /// Descriptors are hashed in a canonical order so listing order in the
    /// persistence store does not affect the token.
    pub fn from_descriptors(descriptors: &[LayerDescriptor]) -> Self {
        let mut sorted: Vec<&LayerDescriptor> = descriptors.iter().collect();
        sorted.sort_by(|a, b| {
            (&a.key, &a.app_name, a.layer_id).cmp(&(&b.key, &b.app_name, b.layer_id))
        });

        let mut hasher = Sha256::new();
        for d in sorted {
            hasher.update(d.app_name.as_bytes());
            hasher.update([0u8]);
            hasher.update(d.layer_id.to_be_bytes());
            hasher.update(d.key.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(bytes))
    }

    /// Reconstruct a token from its raw value (as read from a store).
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw token value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IdentityToken {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}
