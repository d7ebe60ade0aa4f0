//! Implementation of an **entirely insecure** VOLE protocol for testing
//! purposes.
//!
//! The receiver samples its vectors and sends them to the sender in the
//! clear; the sender then derives its share from `Δ`.

use crate::{errors::Error, VoleReceiver, VoleSender};
use bandkit::{utils, AbstractChannel, Block, Gf128};
use log::debug;
use rand::{CryptoRng, Rng};

const TAG: &str = "dummy VOLE (a, c)";

/// VOLE sender.
pub struct Sender {
    delta: Gf128,
}
/// VOLE receiver.
pub struct Receiver {}

impl Sender {
    /// Initialize the sender with a fresh random `Δ`.
    pub fn init<C: AbstractChannel, RNG: CryptoRng + Rng>(
        _: &mut C,
        rng: &mut RNG,
    ) -> Result<Self, Error> {
        Ok(Self {
            delta: Gf128(rng.gen()),
        })
    }
}

impl VoleSender for Sender {
    fn delta(&self) -> Gf128 {
        self.delta
    }

    fn send<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        len: usize,
        _: &mut RNG,
    ) -> Result<Vec<Block>, Error> {
        let nbytes = channel.recv_tagged_header(TAG)?;
        if nbytes != 32 * len {
            return Err(Error::InvalidInputLength {
                expected: 32 * len,
                actual: nbytes,
            });
        }
        let a = channel.read_blocks(len)?;
        let c = channel.read_blocks(len)?;
        debug!("dummy VOLE sender: received {} correlations", len);
        Ok(a
            .iter()
            .zip(c.iter())
            .map(|(a, c)| *c ^ (self.delta * *a))
            .collect())
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Dummy Sender")
    }
}

impl Receiver {
    /// Initialize the receiver.
    pub fn init<C: AbstractChannel, RNG: CryptoRng + Rng>(
        _: &mut C,
        _: &mut RNG,
    ) -> Result<Self, Error> {
        Ok(Self {})
    }
}

impl VoleReceiver for Receiver {
    fn receive<C: AbstractChannel, RNG: CryptoRng + Rng>(
        &mut self,
        channel: &mut C,
        len: usize,
        rng: &mut RNG,
    ) -> Result<(Vec<Block>, Vec<Block>), Error> {
        let a = (0..len).map(|_| rng.gen::<Block>()).collect::<Vec<_>>();
        let c = (0..len).map(|_| rng.gen::<Block>()).collect::<Vec<_>>();
        let mut payload = utils::blocks_to_bytes(&a);
        payload.extend(utils::blocks_to_bytes(&c));
        channel.send_tagged(TAG, &payload)?;
        debug!("dummy VOLE receiver: sent {} correlations", len);
        Ok((a, c))
    }
}

impl std::fmt::Display for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Dummy Receiver")
    }
}
