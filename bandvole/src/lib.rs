// -*- mode: rust; -*-
//
// This file is part of `bandvole`.
// See LICENSE for licensing information.

#![allow(clippy::many_single_char_names)]
#![deny(missing_docs)]

//! Vector oblivious linear evaluation (VOLE) over $`\textsf{GF}(2^{128})`$.
//!
//! This crate provides traits for the two halves of a VOLE correlation,
//! alongside the following instantiations:
//!
//! * `dummy`: an entirely insecure VOLE over a channel, for testing.
//! * `dealer`: correlations sampled up front by a trusted dealer.
//!
//! After a run of length `n`, the receiver holds vectors `a` and `c`, and the
//! sender holds a vector `b` and a scalar `Δ` such that `c[i] = b[i] + Δ·a[i]`
//! for every `i`.

mod errors;

pub mod dealer;
pub mod dummy;

pub use crate::errors::Error;

use bandkit::{AbstractChannel, Block, Gf128};
use rand::{CryptoRng, Rng};

/// Trait for the VOLE party holding the global key `Δ`.
pub trait VoleSender {
    /// The global key `Δ`.
    fn delta(&self) -> Gf128;
    /// Produce `len` correlations, returning the sender's vector `b`.
    fn send<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        len: usize,
        rng: &mut RNG,
    ) -> Result<Vec<Block>, Error>;
}

/// Trait for the VOLE party holding the values and their MACs.
pub trait VoleReceiver {
    /// Produce `len` correlations, returning the receiver's vectors `(a, c)`.
    fn receive<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        len: usize,
        rng: &mut RNG,
    ) -> Result<(Vec<Block>, Vec<Block>), Error>;
}

/// Check that `(a, c)` and `(b, delta)` form a valid VOLE correlation.
pub fn is_correlated(a: &[Block], c: &[Block], b: &[Block], delta: Gf128) -> bool {
    a.len() == b.len()
        && c.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .zip(c.iter())
            .all(|((a, b), c)| *c == *b ^ (delta * *a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_correlated() {
        let delta = Gf128(rand::random::<u128>());
        let a = vec![Block(3), Block(5)];
        let b = vec![Block(7), Block(11)];
        let c = a
            .iter()
            .zip(b.iter())
            .map(|(a, b)| *b ^ (delta * *a))
            .collect::<Vec<_>>();
        assert!(is_correlated(&a, &c, &b, delta));
        assert!(!is_correlated(&a, &c[..1], &b, delta));
        let mut bad = c.clone();
        bad[1] ^= Block(1);
        assert!(!is_correlated(&a, &bad, &b, delta));
    }
}
