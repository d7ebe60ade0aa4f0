// -*- mode: rust; -*-
//
// This file is part of `bandpsi`.
// See LICENSE for licensing information.
#![allow(clippy::many_single_char_names)]
#![deny(missing_docs)]

//! Two-party private set intersection from vector oblivious linear
//! evaluation and a banded oblivious key-value store.
//!
//! The receiver learns which of its elements the sender also holds; the
//! sender learns nothing beyond the receiver's set size. Security is against
//! semi-honest adversaries.
//!
//! * [`okvs`]: the band OKVS, usable on its own.
//! * [`Sender`] and [`Receiver`]: the protocol, generic over the VOLE
//!   instantiation (see `bandvole`).
//! * [`utils`]: mapping application items to set elements.

mod errors;
pub mod okvs;
mod psi;
pub mod utils;

pub use crate::{
    errors::Error,
    okvs::{BandOkvs, OkvsParams},
    psi::*,
};
