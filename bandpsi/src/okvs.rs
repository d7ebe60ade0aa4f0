// -*- mode: rust; -*-
//
// This file is part of `bandpsi`.
// See LICENSE for licensing information.

//! A banded oblivious key-value store (OKVS) over $`\textsf{GF}(2)`$.
//!
//! Every key is hashed to a *row*: a starting position `pos` in the store and
//! a random band of `w` bits. The store `P` of `m` blocks is the solution of
//! the linear system asking that, for each pair `(k, v)`,
//!
//! ```text
//!     XOR { P[pos(k) + j] : bit j of band(k) is set } = v.
//! ```
//!
//! Because every band only touches the window `[pos, pos + w)`, the system is
//! solved by Gaussian elimination over rows sorted by position, in time
//! roughly `n·w`. This follows "Near-Optimal Oblivious Key-Value Stores for
//! Efficient PSI, PSU and Volume-Hiding Multi-Maps" (Bienstock, Patel, Seo,
//! Yeo), <https://eprint.iacr.org/2023/903>.
//!
//! Positions are floored to a multiple of eight, so that eliminating one row
//! from another is a byte-aligned XOR of their bands.

use crate::errors::Error;
use bandkit::{utils::xor_inplace, Blake3Hash, Block, Gf128, HashToBytes};
use log::{debug, trace, warn};
use rayon::prelude::*;
use std::time::Instant;

/// Sizing of a band OKVS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OkvsParams {
    n: usize,
    w: usize,
    e: f64,
    m: usize,
    r: usize,
}

impl OkvsParams {
    /// Size a store for at most `n` pairs, with band width `w` bits and
    /// expansion factor `e`.
    ///
    /// The store holds `m = ⌈n·e⌉` blocks and rows start in `[0, m - w)`.
    /// Fails with [`Error::ConfigurationError`] unless `n > 0`, `w` is a
    /// positive multiple of eight, `e > 1` is finite, and `m > w`.
    pub fn new(n: usize, w: usize, e: f64) -> Result<Self, Error> {
        if n == 0 {
            return Err(Error::ConfigurationError(
                "the number of pairs must be positive".to_string(),
            ));
        }
        if w == 0 || w % 8 != 0 {
            return Err(Error::ConfigurationError(format!(
                "band width {} is not a positive multiple of 8",
                w
            )));
        }
        if !e.is_finite() || e <= 1.0 {
            return Err(Error::ConfigurationError(format!(
                "expansion factor {} must be finite and greater than 1",
                e
            )));
        }
        let m = (n as f64 * e).ceil() as usize;
        if m <= w {
            return Err(Error::ConfigurationError(format!(
                "band width {} does not fit in a store of {} blocks",
                w, m
            )));
        }
        Ok(Self {
            n,
            w,
            e,
            m,
            r: m - w,
        })
    }

    /// Maximum number of pairs.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of blocks in the store.
    #[inline]
    pub fn m(&self) -> usize {
        self.m
    }

    /// Band width in bits.
    #[inline]
    pub fn w(&self) -> usize {
        self.w
    }

    /// Number of possible starting positions.
    #[inline]
    pub fn r(&self) -> usize {
        self.r
    }

    /// Band width in bytes.
    #[inline]
    pub fn band_bytes(&self) -> usize {
        self.w / 8
    }

    /// Expansion factor.
    #[inline]
    pub fn e(&self) -> f64 {
        self.e
    }
}

/// A band OKVS holding `m` blocks, generic over the hash deriving rows.
#[derive(Debug)]
pub struct BandOkvs<H = Blake3Hash> {
    params: OkvsParams,
    hasher: H,
    p: Vec<Block>,
}

impl BandOkvs<Blake3Hash> {
    /// Create an all-zero store hashing with unsalted BLAKE3.
    pub fn new(params: OkvsParams) -> Self {
        Self::with_hasher(params, Blake3Hash::new())
    }
}

impl<H: HashToBytes> BandOkvs<H> {
    /// Create an all-zero store hashing with `hasher`.
    pub fn with_hasher(params: OkvsParams, hasher: H) -> Self {
        Self {
            params,
            hasher,
            p: vec![Block::ZERO; params.m],
        }
    }

    /// The parameters of this store.
    #[inline]
    pub fn params(&self) -> &OkvsParams {
        &self.params
    }

    /// The encoded vector `P`.
    #[inline]
    pub fn storage(&self) -> &[Block] {
        &self.p
    }

    /// Solve for `P` so that decoding `keys[i]` yields `values[i]`.
    ///
    /// Any previous contents of the store are discarded. Positions left free
    /// by the elimination are set to zero. Fails with
    /// [`Error::EncodeFailure`] if the system is singular, which happens with
    /// negligible probability for distinct keys and sensible parameters, and
    /// always when a key is repeated with different values. The store is
    /// all-zero after a failure.
    pub fn encode(&mut self, keys: &[Block], values: &[Block]) -> Result<(), Error> {
        if keys.len() != values.len() {
            return Err(Error::InvalidInputLength {
                expected: keys.len(),
                actual: values.len(),
            });
        }
        if keys.len() > self.params.n {
            return Err(Error::InvalidInputLength {
                expected: self.params.n,
                actual: keys.len(),
            });
        }
        self.p.par_iter_mut().for_each(|x| *x = Block::ZERO);
        if keys.is_empty() {
            return Ok(());
        }
        debug!(
            "OKVS: encoding {} pairs into {} blocks (w = {})",
            keys.len(),
            self.params.m,
            self.params.w
        );

        let start = Instant::now();
        let mut rows = Rows::new(&self.params, &self.hasher, keys, values);
        trace!("OKVS: hashed and sorted rows in {:?}", start.elapsed());

        let start = Instant::now();
        let pivots = match rows.eliminate() {
            Ok(pivots) => pivots,
            Err(e) => {
                warn!("OKVS: {}", e);
                return Err(e);
            }
        };
        trace!("OKVS: forward elimination in {:?}", start.elapsed());

        let start = Instant::now();
        let w = self.params.w;
        for i in (0..rows.len()).rev() {
            let pos = rows.pos[i];
            let value = rows.values[i] ^ xor_selected(rows.band(i), &self.p[pos..pos + w]);
            self.p[pivots[i]] = value;
        }
        trace!("OKVS: back substitution in {:?}", start.elapsed());
        Ok(())
    }

    /// Decode every key against the store.
    pub fn decode(&self, keys: &[Block]) -> Vec<Block> {
        decode_against(&self.params, &self.hasher, keys, &self.p)
    }

    /// Decode every key against an external vector `p` of `m` blocks, using
    /// the rows of this store.
    ///
    /// Fails with [`Error::InvalidInputLength`] if `p` has the wrong length.
    pub fn decode_with(&self, keys: &[Block], p: &[Block]) -> Result<Vec<Block>, Error> {
        if p.len() != self.params.m {
            return Err(Error::InvalidInputLength {
                expected: self.params.m,
                actual: p.len(),
            });
        }
        Ok(decode_against(&self.params, &self.hasher, keys, p))
    }

    /// Scale every block of the store by `scalar`.
    ///
    /// Decoding is linear, so afterwards every key decodes to `scalar` times
    /// its previous value.
    pub fn mul(&mut self, scalar: Gf128) {
        self.p.par_iter_mut().for_each(|x| *x = scalar * *x);
    }
}

/// Hash `key` into `band` (of `w / 8` bytes) and return its byte-aligned
/// starting position.
///
/// The band is the first `w / 8` bytes of the digest; the position is the
/// first sixteen bytes read as a big-endian integer, reduced mod `r`.
#[inline]
fn place<H: HashToBytes>(params: &OkvsParams, hasher: &H, key: Block, band: &mut [u8]) -> usize {
    let mut head = [0u8; 16];
    if band.len() >= 16 {
        hasher.hash_to_bytes(key, band);
        head.copy_from_slice(&band[..16]);
    } else {
        hasher.hash_to_bytes(key, &mut head);
        band.copy_from_slice(&head[..band.len()]);
    }
    let pos = (u128::from_be_bytes(head) % params.r as u128) as usize;
    pos & !7
}

/// Bit `j` of a band, most significant bit of each byte first.
#[inline]
fn bit(band: &[u8], j: usize) -> bool {
    band[j / 8] & (0x80 >> (j % 8)) != 0
}

/// Index of the first set bit of a band.
#[inline]
fn first_bit(band: &[u8]) -> Option<usize> {
    band.iter()
        .position(|byte| *byte != 0)
        .map(|t| t * 8 + band[t].leading_zeros() as usize)
}

/// XOR of `window[j]` over the set bits `j` of `band`.
#[inline]
fn xor_selected(band: &[u8], window: &[Block]) -> Block {
    let mut acc = Block::ZERO;
    for (byte, chunk) in band.iter().zip(window.chunks_exact(8)) {
        let mut bits = *byte;
        while bits != 0 {
            let j = bits.leading_zeros() as usize;
            acc ^= chunk[j];
            bits &= !(0x80 >> j);
        }
    }
    acc
}

fn decode_against<H: HashToBytes>(
    params: &OkvsParams,
    hasher: &H,
    keys: &[Block],
    p: &[Block],
) -> Vec<Block> {
    let w = params.w;
    keys.par_iter()
        .map_init(
            || vec![0u8; params.band_bytes()],
            |band, key| {
                let pos = place(params, hasher, *key, band);
                xor_selected(band, &p[pos..pos + w])
            },
        )
        .collect()
}

/// Rows of one encoding, sorted by position, with their bands stored
/// contiguously.
struct Rows {
    band_bytes: usize,
    pos: Vec<usize>,
    values: Vec<Block>,
    bands: Vec<u8>,
}

impl Rows {
    fn new<H: HashToBytes>(
        params: &OkvsParams,
        hasher: &H,
        keys: &[Block],
        values: &[Block],
    ) -> Self {
        let b = params.band_bytes();
        let n = keys.len();

        let mut bands = vec![0u8; n * b];
        let pos = bands
            .par_chunks_mut(b)
            .zip(keys.par_iter())
            .map(|(band, key)| place(params, hasher, *key, band))
            .collect::<Vec<_>>();

        // Stable, so that equal positions keep their input order.
        let mut order = (0..n).collect::<Vec<_>>();
        order.par_sort_by_key(|&i| pos[i]);

        let mut sorted = vec![0u8; n * b];
        sorted
            .par_chunks_mut(b)
            .zip(order.par_iter())
            .for_each(|(dst, &i)| dst.copy_from_slice(&bands[i * b..(i + 1) * b]));

        Self {
            band_bytes: b,
            pos: order.iter().map(|&i| pos[i]).collect(),
            values: order.iter().map(|&i| values[i]).collect(),
            bands: sorted,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.pos.len()
    }

    #[inline]
    fn band(&self, i: usize) -> &[u8] {
        &self.bands[i * self.band_bytes..(i + 1) * self.band_bytes]
    }

    /// Reduce the rows to echelon form, returning the pivot column of each.
    fn eliminate(&mut self) -> Result<Vec<usize>, Error> {
        let b = self.band_bytes;
        let n = self.len();
        let mut pivots = Vec::with_capacity(n);
        for i in 0..n {
            let (head, tail) = self.bands.split_at_mut((i + 1) * b);
            let row = &head[i * b..];
            let pivot = match first_bit(row) {
                Some(j) => self.pos[i] + j,
                None => return Err(Error::EncodeFailure(i)),
            };
            pivots.push(pivot);

            let value = self.values[i];
            for (k, other) in (i + 1..n).zip(tail.chunks_exact_mut(b)) {
                if self.pos[k] > pivot {
                    break;
                }
                if bit(other, pivot - self.pos[k]) {
                    let shift = (self.pos[k] - self.pos[i]) / 8;
                    xor_inplace(&mut other[..b - shift], &row[shift..]);
                    self.values[k] ^= value;
                }
            }
        }
        Ok(pivots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    fn rand_blocks(n: usize, rng: &mut ChaCha12Rng) -> Vec<Block> {
        (0..n).map(|_| rng.gen::<Block>()).collect()
    }

    /// Every key hashes to the same row.
    struct ConstantHash;

    impl HashToBytes for ConstantHash {
        fn hash_to_bytes(&self, _: Block, out: &mut [u8]) {
            out.iter_mut().for_each(|x| *x = 0xA5);
        }
    }

    /// Every key hashes to an empty band.
    struct ZeroHash;

    impl HashToBytes for ZeroHash {
        fn hash_to_bytes(&self, _: Block, out: &mut [u8]) {
            out.iter_mut().for_each(|x| *x = 0);
        }
    }

    #[test]
    fn test_params() {
        let params = OkvsParams::new(1000, 128, 1.2).unwrap();
        assert_eq!(params.n(), 1000);
        assert_eq!(params.m(), 1200);
        assert_eq!(params.w(), 128);
        assert_eq!(params.r(), 1072);
        assert_eq!(params.band_bytes(), 16);
        assert_eq!(params.e(), 1.2);
    }

    #[test]
    fn test_params_rejected() {
        let bad = [
            (0, 128, 1.2),
            (1000, 0, 1.2),
            (1000, 100, 1.2),
            (1000, 128, 1.0),
            (1000, 128, 0.5),
            (1000, 128, f64::NAN),
            (1000, 128, f64::INFINITY),
            (100, 512, 1.5),
        ];
        for (n, w, e) in bad {
            match OkvsParams::new(n, w, e) {
                Err(Error::ConfigurationError(_)) => (),
                other => panic!("({}, {}, {}) gave {:?}", n, w, e, other),
            }
        }
    }

    #[test]
    fn test_positions_are_byte_aligned() {
        let params = OkvsParams::new(500, 64, 1.5).unwrap();
        let hasher = Blake3Hash::new();
        let mut band = vec![0u8; params.band_bytes()];
        for i in 0..1000 {
            let pos = place(&params, &hasher, Block(i), &mut band);
            assert_eq!(pos % 8, 0);
            assert!(pos < params.r());
        }
    }

    #[test]
    fn test_bit_order() {
        let band = [0b0100_0000u8, 0b0000_0001];
        assert!(!bit(&band, 0));
        assert!(bit(&band, 1));
        assert!(bit(&band, 15));
        assert_eq!(first_bit(&band), Some(1));
        assert_eq!(first_bit(&[0, 0, 0x10]), Some(19));
        assert_eq!(first_bit(&[0, 0]), None);

        let window = (0..16).map(|i| Block(1 << i)).collect::<Vec<_>>();
        assert_eq!(xor_selected(&band, &window), Block((1 << 1) | (1 << 15)));
    }

    #[test]
    fn test_encode_decode() {
        let mut rng = ChaCha12Rng::from_seed([7; 32]);
        let n = 2000;
        let params = OkvsParams::new(n, 256, 1.1).unwrap();
        let keys = rand_blocks(n, &mut rng);
        let values = rand_blocks(n, &mut rng);
        let mut okvs = BandOkvs::new(params);
        okvs.encode(&keys, &values).unwrap();
        assert_eq!(okvs.storage().len(), params.m());
        assert_eq!(okvs.decode(&keys), values);
    }

    #[test]
    fn test_narrow_band() {
        // Bands shorter than a block take the short-digest path.
        let mut rng = ChaCha12Rng::from_seed([8; 32]);
        let n = 100;
        let params = OkvsParams::new(n, 64, 2.0).unwrap();
        let keys = rand_blocks(n, &mut rng);
        let values = rand_blocks(n, &mut rng);
        let mut okvs = BandOkvs::new(params);
        okvs.encode(&keys, &values).unwrap();
        assert_eq!(okvs.decode(&keys), values);
    }

    #[test]
    fn test_fewer_keys_than_capacity() {
        let mut rng = ChaCha12Rng::from_seed([9; 32]);
        let params = OkvsParams::new(1000, 256, 1.2).unwrap();
        let keys = rand_blocks(400, &mut rng);
        let values = rand_blocks(400, &mut rng);
        let mut okvs = BandOkvs::new(params);
        okvs.encode(&keys, &values).unwrap();
        assert_eq!(okvs.decode(&keys), values);
        okvs.encode(&[], &[]).unwrap();
        assert!(okvs.storage().iter().all(|x| *x == Block::ZERO));
    }

    #[test]
    fn test_decode_with_storage() {
        let mut rng = ChaCha12Rng::from_seed([10; 32]);
        let n = 1000;
        let params = OkvsParams::new(n, 256, 1.2).unwrap();
        let keys = rand_blocks(n, &mut rng);
        let values = rand_blocks(n, &mut rng);
        let mut okvs = BandOkvs::new(params);
        okvs.encode(&keys, &values).unwrap();
        let p = okvs.storage().to_vec();
        assert_eq!(okvs.decode_with(&keys, &p).unwrap(), okvs.decode(&keys));

        // Decoding is linear in the store.
        let other = rand_blocks(params.m(), &mut rng);
        let sum = bandkit::utils::xor_blocks(&p, &other);
        let lhs = okvs.decode_with(&keys, &sum).unwrap();
        let rhs = okvs.decode_with(&keys, &other).unwrap();
        for ((l, r), v) in lhs.iter().zip(rhs.iter()).zip(values.iter()) {
            assert_eq!(*l, *r ^ *v);
        }
    }

    #[test]
    fn test_decode_with_wrong_length() {
        let params = OkvsParams::new(1000, 256, 1.2).unwrap();
        let okvs = BandOkvs::new(params);
        let p = vec![Block::ZERO; params.m() - 1];
        match okvs.decode_with(&[Block(1)], &p) {
            Err(Error::InvalidInputLength { expected, actual }) => {
                assert_eq!(expected, params.m());
                assert_eq!(actual, params.m() - 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_mul() {
        let mut rng = ChaCha12Rng::from_seed([11; 32]);
        let n = 1000;
        let params = OkvsParams::new(n, 256, 1.2).unwrap();
        let keys = rand_blocks(n, &mut rng);
        let values = rand_blocks(n, &mut rng);
        let mut okvs = BandOkvs::new(params);
        okvs.encode(&keys, &values).unwrap();
        let scalar = Gf128(rng.gen());
        okvs.mul(scalar);
        let expected = values.iter().map(|v| scalar * *v).collect::<Vec<_>>();
        assert_eq!(okvs.decode(&keys), expected);
    }

    #[test]
    fn test_salt() {
        let mut rng = ChaCha12Rng::from_seed([12; 32]);
        let n = 1000;
        let params = OkvsParams::new(n, 256, 1.2).unwrap();
        let keys = rand_blocks(n, &mut rng);
        let values = rand_blocks(n, &mut rng);
        let mut x = BandOkvs::new(params);
        let mut y = BandOkvs::with_hasher(params, Blake3Hash::with_salt(Block(42)));
        x.encode(&keys, &values).unwrap();
        y.encode(&keys, &values).unwrap();
        assert_ne!(x.storage(), y.storage());
        assert_eq!(y.decode(&keys), values);
    }

    #[test]
    fn test_input_lengths() {
        let params = OkvsParams::new(300, 256, 1.2).unwrap();
        let mut okvs = BandOkvs::new(params);
        match okvs.encode(&[Block(1), Block(2)], &[Block(1)]) {
            Err(Error::InvalidInputLength {
                expected: 2,
                actual: 1,
            }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        let keys = (0..301).map(Block).collect::<Vec<_>>();
        match okvs.encode(&keys, &keys) {
            Err(Error::InvalidInputLength {
                expected: 300,
                actual: 301,
            }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_singular_systems() {
        let params = OkvsParams::new(300, 256, 1.2).unwrap();

        let mut okvs = BandOkvs::with_hasher(params, ZeroHash);
        match okvs.encode(&[Block(1)], &[Block(2)]) {
            Err(Error::EncodeFailure(0)) => (),
            other => panic!("unexpected result: {:?}", other),
        }

        let mut okvs = BandOkvs::with_hasher(params, ConstantHash);
        okvs.encode(&[Block(1)], &[Block(2)]).unwrap();
        assert_eq!(okvs.decode(&[Block(7)]), vec![Block(2)]);
        match okvs.encode(&[Block(1), Block(3)], &[Block(2), Block(4)]) {
            Err(Error::EncodeFailure(1)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(okvs.storage().iter().all(|x| *x == Block::ZERO));
    }

    #[test]
    fn test_conflicting_duplicate_key() {
        let mut rng = ChaCha12Rng::from_seed([13; 32]);
        let params = OkvsParams::new(500, 256, 1.2).unwrap();
        let mut keys = rand_blocks(500, &mut rng);
        keys[123] = keys[45];
        let values = rand_blocks(500, &mut rng);
        let mut okvs = BandOkvs::new(params);
        assert!(matches!(
            okvs.encode(&keys, &values),
            Err(Error::EncodeFailure(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_encode_decode_random(
            n in 300usize..700,
            e in 1.15f64..1.4,
            seed in any::<[u8; 32]>(),
        ) {
            let mut rng = ChaCha12Rng::from_seed(seed);
            let params = OkvsParams::new(n, 256, e).unwrap();
            let keys = rand_blocks(n, &mut rng);
            let values = rand_blocks(n, &mut rng);
            let mut okvs = BandOkvs::new(params);
            okvs.encode(&keys, &values).unwrap();
            prop_assert_eq!(okvs.decode(&keys), values);
        }
    }
}
