//! Implementation of the Rindal-Schoppmann semi-honest private set
//! intersection protocol from VOLE (cf. <https://eprint.iacr.org/2021/266>),
//! instantiated with the band OKVS of Bienstock-Patel-Seo-Yeo
//! (cf. <https://eprint.iacr.org/2023/903>).
//!
//! The receiver encodes its set `Y` into an OKVS `P` with `Decode(P, y) = y`
//! and sends `A' = P + A`, where `(A, C)` is its half of a VOLE correlation
//! with the sender's `(B, Δ)`. The sender then holds `K = B + Δ·A'`, which is
//! an OKVS encoding `Decode(K, x) = Decode(C, x) + Δ·Decode(P, x)` for every
//! `x`. It sends back `Decode(K, x) + Δ·x` for each of its elements; for
//! `x ∈ Y` this equals the receiver's own `Decode(C, x)`, and otherwise it is
//! pseudorandom.

use crate::{
    errors::Error,
    okvs::{BandOkvs, OkvsParams},
};
use bandkit::{AbstractChannel, Blake3Hash, Block, HashToBytes, SemiHonest};
use bandvole::{VoleReceiver, VoleSender};
use log::{debug, info};
use rand::{seq::SliceRandom, CryptoRng, Rng};
use rayon::prelude::*;
use std::collections::HashSet;

const RECEIVER_SIZE: &str = "receiver set size";
const SENDER_SIZE: &str = "sender set size";
const ENCODED_INPUTS: &str = "A' = P + A";
const SENDER_MASKS: &str = "sender masks";

/// OKVS sizing shared by both parties.
///
/// The store is sized for the receiver's set, so both parties derive the same
/// [`OkvsParams`] once the receiver has announced its set size.
///
/// The receiver's set size `n` must satisfy `⌈n·expansion⌉ > band_width`.
/// With the defaults this means at least 507 elements, and sets close to that
/// bound are likely to hit [`Error::EncodeFailure`]. Smaller sets need a
/// narrower band (e.g. `band_width: 128, expansion: 1.5` for a hundred
/// elements) or a larger expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsiParams {
    /// Band width in bits. Must be a positive multiple of eight.
    pub band_width: usize,
    /// Expansion factor of the store. Must be greater than one.
    pub expansion: f64,
}

impl Default for PsiParams {
    fn default() -> Self {
        Self {
            band_width: 512,
            expansion: 1.01,
        }
    }
}

impl PsiParams {
    /// The OKVS parameters for a receiver set of `n` elements.
    pub fn okvs(&self, n: usize) -> Result<OkvsParams, Error> {
        OkvsParams::new(n, self.band_width, self.expansion)
    }
}

/// Private set intersection sender.
pub struct Sender<V, H = Blake3Hash> {
    vole: V,
    params: PsiParams,
    hasher: H,
}

/// Private set intersection receiver.
pub struct Receiver<V, H = Blake3Hash> {
    vole: V,
    params: PsiParams,
    hasher: H,
}

impl<V: VoleSender> Sender<V> {
    /// Initialize the PSI sender on top of a VOLE sender.
    pub fn new(vole: V, params: PsiParams) -> Self {
        Self::with_hasher(vole, params, Blake3Hash::new())
    }
}

impl<V: VoleSender, H: HashToBytes + Clone> Sender<V, H> {
    /// Initialize the PSI sender, deriving OKVS rows with `hasher`. The
    /// receiver must use an identical hash.
    pub fn with_hasher(vole: V, params: PsiParams, hasher: H) -> Self {
        Self {
            vole,
            params,
            hasher,
        }
    }

    /// Run the PSI protocol over `inputs`.
    pub fn send<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        inputs: &[Block],
        channel: &mut C,
        rng: &mut RNG,
    ) -> Result<(), Error> {
        let ny = recv_size(channel, RECEIVER_SIZE)?;
        send_size(channel, SENDER_SIZE, inputs.len())?;
        let params = self.params.okvs(ny)?;
        let okvs = BandOkvs::with_hasher(params, self.hasher.clone());
        info!(
            "PSI sender: {} inputs against {} (OKVS of {} blocks)",
            inputs.len(),
            ny,
            params.m()
        );

        let b = self.vole.send(channel, params.m(), rng)?;
        let delta = self.vole.delta();
        debug!("PSI sender: VOLE done");

        let a_ = recv_blocks(channel, ENCODED_INPUTS, params.m())?;

        // K = B + Δ·A'
        let k = b
            .par_iter()
            .zip(a_.par_iter())
            .map(|(b, a)| *b ^ (delta * *a))
            .collect::<Vec<_>>();

        let mut masks = okvs.decode_with(inputs, &k)?;
        masks
            .par_iter_mut()
            .zip(inputs.par_iter())
            .for_each(|(mask, x)| *mask ^= delta * *x);
        masks.shuffle(rng);

        send_blocks(channel, SENDER_MASKS, &masks)?;
        debug!("PSI sender: sent {} masks", masks.len());
        Ok(())
    }
}

impl<V: VoleReceiver + Send> Receiver<V> {
    /// Initialize the PSI receiver on top of a VOLE receiver.
    pub fn new(vole: V, params: PsiParams) -> Self {
        Self::with_hasher(vole, params, Blake3Hash::new())
    }
}

impl<V: VoleReceiver + Send, H: HashToBytes + Clone> Receiver<V, H> {
    /// Initialize the PSI receiver, deriving OKVS rows with `hasher`. The
    /// sender must use an identical hash.
    pub fn with_hasher(vole: V, params: PsiParams, hasher: H) -> Self {
        Self {
            vole,
            params,
            hasher,
        }
    }

    /// Run the PSI protocol over `inputs`, returning the elements of `inputs`
    /// that the sender also holds, in input order.
    ///
    /// `inputs` must not contain duplicates.
    pub fn receive<C, RNG>(
        &mut self,
        inputs: &[Block],
        channel: &mut C,
        rng: &mut RNG,
    ) -> Result<Vec<Block>, Error>
    where
        C: AbstractChannel + Send,
        RNG: CryptoRng + Rng + Send,
    {
        let params = self.params.okvs(inputs.len())?;
        send_size(channel, RECEIVER_SIZE, inputs.len())?;
        let nx = recv_size(channel, SENDER_SIZE)?;
        info!(
            "PSI receiver: {} inputs against {} (OKVS of {} blocks)",
            inputs.len(),
            nx,
            params.m()
        );

        // The VOLE only needs the store size, so it runs while the set is
        // being encoded.
        let mut okvs = BandOkvs::with_hasher(params, self.hasher.clone());
        let vole = &mut self.vole;
        let (correlation, encoded) = rayon::join(
            || vole.receive(channel, params.m(), rng),
            || okvs.encode(inputs, inputs),
        );
        let (a, c) = correlation?;
        encoded?;
        debug!("PSI receiver: VOLE and OKVS encoding done");

        // A' = P + A
        let a_ = okvs
            .storage()
            .par_iter()
            .zip(a.par_iter())
            .map(|(p, a)| *p ^ *a)
            .collect::<Vec<_>>();
        send_blocks(channel, ENCODED_INPUTS, &a_)?;

        let masks = okvs.decode_with(inputs, &c)?;
        let theirs = recv_blocks(channel, SENDER_MASKS, nx)?
            .into_iter()
            .collect::<HashSet<_>>();

        let intersection = inputs
            .par_iter()
            .zip(masks.par_iter())
            .filter(|(_, mask)| theirs.contains(*mask))
            .map(|(x, _)| *x)
            .collect::<Vec<_>>();
        info!("PSI receiver: intersection of size {}", intersection.len());
        Ok(intersection)
    }
}

impl<V, H> SemiHonest for Sender<V, H> {}
impl<V, H> SemiHonest for Receiver<V, H> {}

fn send_size<C: AbstractChannel>(channel: &mut C, tag: &str, n: usize) -> Result<(), Error> {
    channel.send_tagged(tag, &(n as u64).to_le_bytes())?;
    Ok(())
}

fn recv_size<C: AbstractChannel>(channel: &mut C, tag: &str) -> Result<usize, Error> {
    let nbytes = channel.recv_tagged_header(tag)?;
    if nbytes != 8 {
        return Err(Error::ProtocolViolation {
            expected: 8,
            actual: nbytes,
        });
    }
    Ok(channel.read_usize()?)
}

fn send_blocks<C: AbstractChannel>(channel: &mut C, tag: &str, bs: &[Block]) -> Result<(), Error> {
    channel.send_tagged(tag, &bandkit::utils::blocks_to_bytes(bs))?;
    Ok(())
}

/// Receive a message of exactly `n` blocks, rejecting any other length
/// before reading the payload.
fn recv_blocks<C: AbstractChannel>(
    channel: &mut C,
    tag: &str,
    n: usize,
) -> Result<Vec<Block>, Error> {
    let nbytes = channel.recv_tagged_header(tag)?;
    let expected = n.checked_mul(16).ok_or(Error::ProtocolViolation {
        expected: usize::MAX,
        actual: nbytes,
    })?;
    if nbytes != expected {
        return Err(Error::ProtocolViolation {
            expected,
            actual: nbytes,
        });
    }
    Ok(channel.read_blocks(n)?)
}
