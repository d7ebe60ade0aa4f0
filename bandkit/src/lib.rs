// -*- mode: rust; -*-
//
// This file is part of `bandkit`.
// See LICENSE for licensing information.

#![allow(clippy::many_single_char_names)]
#![deny(missing_docs)]

//! Shared building blocks for the `bandpsi` protocols: 128-bit blocks,
//! arithmetic in $`\textsf{GF}(2^{128})`$, hashing keys to arbitrary-length
//! digests, and byte channels between two parties.

mod block;
/// Module for encapsulating communication channels.
pub mod channel;
mod field;
mod hash;
pub mod utils;

pub use crate::{
    block::Block,
    channel::{AbstractChannel, Channel, SyncChannel, TcpChannel, TrackChannel},
    field::Gf128,
    hash::{Blake3Hash, HashToBytes},
};

#[cfg(unix)]
pub use crate::channel::{
    track_unix_channel_pair, unix_channel_pair, TrackUnixChannel, UnixChannel,
};

/// A marker trait denoting that the given scheme is semi-honest secure.
pub trait SemiHonest {}
