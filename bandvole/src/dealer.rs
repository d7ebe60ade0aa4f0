//! VOLE correlations sampled up front by a trusted dealer.
//!
//! [`deal`] produces both halves of a correlation of a fixed length. Each
//! half can be handed out exactly once, and no communication takes place.
//! With a seeded RNG the correlation is fully deterministic, which makes the
//! dealer convenient for exercising protocols in isolation.

use crate::{errors::Error, VoleReceiver, VoleSender};
use bandkit::{AbstractChannel, Block, Gf128};
use rand::{CryptoRng, Rng};

/// The sender's pre-dealt share `(b, Δ)`.
pub struct Sender {
    delta: Gf128,
    len: usize,
    b: Option<Vec<Block>>,
}

/// The receiver's pre-dealt share `(a, c)`.
pub struct Receiver {
    len: usize,
    ac: Option<(Vec<Block>, Vec<Block>)>,
}

/// Sample a correlation of length `len`.
pub fn deal<RNG: CryptoRng + Rng>(len: usize, rng: &mut RNG) -> (Sender, Receiver) {
    let delta = Gf128(rng.gen());
    let a = (0..len).map(|_| rng.gen::<Block>()).collect::<Vec<_>>();
    let b = (0..len).map(|_| rng.gen::<Block>()).collect::<Vec<_>>();
    let c = a
        .iter()
        .zip(b.iter())
        .map(|(a, b)| *b ^ (delta * *a))
        .collect::<Vec<_>>();
    (
        Sender {
            delta,
            len,
            b: Some(b),
        },
        Receiver {
            len,
            ac: Some((a, c)),
        },
    )
}

fn check_len(expected: usize, actual: usize) -> Result<(), Error> {
    if expected != actual {
        return Err(Error::InvalidInputLength { expected, actual });
    }
    Ok(())
}

impl VoleSender for Sender {
    fn delta(&self) -> Gf128 {
        self.delta
    }

    fn send<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        _: &mut C,
        len: usize,
        _: &mut RNG,
    ) -> Result<Vec<Block>, Error> {
        check_len(self.len, len)?;
        self.b.take().ok_or(Error::CorrelationExhausted)
    }
}

impl VoleReceiver for Receiver {
    fn receive<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        _: &mut C,
        len: usize,
        _: &mut RNG,
    ) -> Result<(Vec<Block>, Vec<Block>), Error> {
        check_len(self.len, len)?;
        self.ac.take().ok_or(Error::CorrelationExhausted)
    }
}
