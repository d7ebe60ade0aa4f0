//! Hashing 128-bit keys to digests of arbitrary length.

use crate::Block;

/// A deterministic hash from a 128-bit key to an arbitrary number of bytes.
///
/// Implementations must be cryptographically secure: outputs for distinct
/// keys should be indistinguishable from independent random strings.
pub trait HashToBytes: Send + Sync {
    /// Fill `out` with the digest of `key`.
    fn hash_to_bytes(&self, key: Block, out: &mut [u8]);
}

/// [`HashToBytes`] from the BLAKE3 extendable output function.
///
/// An optional salt keys the hash, so that changing the salt yields an
/// independent digest for every key. Outputs of different lengths for the
/// same key agree on their common prefix.
#[derive(Clone, Default)]
pub struct Blake3Hash {
    salt: Option<Block>,
    key: Option<[u8; 32]>,
}

impl Blake3Hash {
    /// Create an unsalted hash.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hash keyed by `salt`.
    pub fn with_salt(salt: Block) -> Self {
        let mut key = [0u8; 32];
        key[..16].copy_from_slice(&salt.to_bytes());
        Self {
            salt: Some(salt),
            key: Some(key),
        }
    }

    /// Return the salt, if any.
    pub fn salt(&self) -> Option<Block> {
        self.salt
    }
}

impl HashToBytes for Blake3Hash {
    #[inline]
    fn hash_to_bytes(&self, key: Block, out: &mut [u8]) {
        let mut hasher = match &self.key {
            Some(k) => blake3::Hasher::new_keyed(k),
            None => blake3::Hasher::new(),
        };
        hasher.update(&key.to_bytes());
        hasher.finalize_xof().fill(out);
    }
}

impl std::fmt::Debug for Blake3Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.salt {
            Some(salt) => write!(f, "Blake3Hash(salt = {})", salt),
            None => write!(f, "Blake3Hash"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let h = Blake3Hash::new();
        let key = rand::random::<Block>();
        let mut x = [0u8; 64];
        let mut y = [0u8; 64];
        h.hash_to_bytes(key, &mut x);
        h.hash_to_bytes(key, &mut y);
        assert_eq!(x, y);
    }

    #[test]
    fn test_prefix_consistent() {
        let h = Blake3Hash::new();
        let key = rand::random::<Block>();
        let mut short = [0u8; 16];
        let mut long = [0u8; 80];
        h.hash_to_bytes(key, &mut short);
        h.hash_to_bytes(key, &mut long);
        assert_eq!(short[..], long[..16]);
    }

    #[test]
    fn test_salt_changes_digest() {
        let key = rand::random::<Block>();
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        Blake3Hash::new().hash_to_bytes(key, &mut x);
        Blake3Hash::with_salt(Block(7)).hash_to_bytes(key, &mut y);
        assert_ne!(x, y);
        assert_eq!(Blake3Hash::with_salt(Block(7)).salt(), Some(Block(7)));
    }
}
