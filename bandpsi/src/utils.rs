// -*- mode: rust; -*-
//
// This file is part of `bandpsi`.
// See LICENSE for licensing information.

//! Turning application items into set elements.

use bandkit::Block;
use rand::{CryptoRng, Rng};

/// The first sixteen bytes of the BLAKE3 digest of `bytes`, as a block.
#[inline]
fn blake3_128(bytes: &[u8]) -> Block {
    let digest = blake3::hash(bytes);
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest.as_bytes()[..16]);
    Block::from_bytes(out)
}

/// Map arbitrary byte strings to set elements.
///
/// Distinct inputs collide with negligible probability, so the intersection
/// of the hashed sets is the hash of the intersection.
pub fn hash_items(inputs: &[Vec<u8>]) -> Vec<Block> {
    inputs.iter().map(|input| blake3_128(input)).collect()
}

/// The elements for the integers `begin, ..., begin + size - 1`, each hashed
/// from its decimal representation.
///
/// Two parties calling this with overlapping ranges share exactly the
/// elements of the overlap.
pub fn range_items(begin: usize, size: usize) -> Vec<Block> {
    (begin..begin + size)
        .map(|i| blake3_128(i.to_string().as_bytes()))
        .collect()
}

/// Sample `n` uniformly random elements.
pub fn rand_items<RNG: CryptoRng + Rng>(n: usize, rng: &mut RNG) -> Vec<Block> {
    (0..n).map(|_| rng.gen::<Block>()).collect()
}
