//! Arithmetic in $`\textsf{GF}(2^{128})`$.

use crate::Block;
use std::ops::{Add, Mul};

/// An element of the finite field $`\textsf{GF}(2^{128})`$ reduced over
/// $`x^{128} + x^7 + x^2 + x + 1`$.
///
/// Bit `i` of the inner `u128` is the coefficient of $`x^i`$.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Gf128(pub u128);

impl From<Block> for Gf128 {
    #[inline]
    fn from(block: Block) -> Self {
        Gf128(block.0)
    }
}

impl From<Gf128> for Block {
    #[inline]
    fn from(f: Gf128) -> Self {
        Block(f.0)
    }
}

impl Add for Gf128 {
    type Output = Self;

    #[inline]
    fn add(self, other: Gf128) -> Gf128 {
        Gf128(self.0 ^ other.0)
    }
}

impl Mul for Gf128 {
    type Output = Self;

    #[inline]
    fn mul(self, other: Gf128) -> Gf128 {
        let (lo, hi) = clmul128(self.0, other.0);
        Gf128(reduce(lo, hi))
    }
}

impl Mul<Block> for Gf128 {
    type Output = Block;

    /// Scale a block, viewed as a field element, by `self`.
    #[inline]
    fn mul(self, other: Block) -> Block {
        (self * Gf128::from(other)).into()
    }
}

/// Fold the high half of a 256-bit carryless product back into 128 bits,
/// using $`x^{128} = x^7 + x^2 + x + 1`$.
#[inline]
fn reduce(lo: u128, hi: u128) -> u128 {
    // Bits of `hi * (x^7 + x^2 + x + 1)` that spill past x^127.
    let overflow = (hi >> 127) ^ (hi >> 126) ^ (hi >> 121);
    let folded = hi ^ (hi << 1) ^ (hi << 2) ^ (hi << 7);
    lo ^ folded ^ overflow ^ (overflow << 1) ^ (overflow << 2) ^ (overflow << 7)
}

/// Carryless multiplication, returning the `(low, high)` halves of the product.
#[inline]
fn clmul128(a: u128, b: u128) -> (u128, u128) {
    #[cfg(target_arch = "x86_64")]
    {
        if std::is_x86_feature_detected!("pclmulqdq") {
            // Safety: the CPU supports the instructions `clmul128_x86` is compiled for.
            return unsafe { clmul128_x86(a, b) };
        }
    }
    clmul128_soft(a, b)
}

/// PCLMULQDQ carryless multiplication.
///
/// This code is adapted from the EMP toolkit's implementation.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "pclmulqdq,sse2")]
unsafe fn clmul128_x86(a: u128, b: u128) -> (u128, u128) {
    use std::arch::x86_64::*;

    unsafe fn to_u128(x: __m128i) -> u128 {
        let mut out = 0u128;
        _mm_storeu_si128(&mut out as *mut u128 as *mut __m128i, x);
        out
    }

    let x = _mm_set_epi64x((a >> 64) as i64, a as i64);
    let y = _mm_set_epi64x((b >> 64) as i64, b as i64);
    let zero = _mm_clmulepi64_si128(x, y, 0x00);
    let one = _mm_clmulepi64_si128(x, y, 0x10);
    let two = _mm_clmulepi64_si128(x, y, 0x01);
    let three = _mm_clmulepi64_si128(x, y, 0x11);
    let tmp = _mm_xor_si128(one, two);
    let ll = _mm_slli_si128(tmp, 8);
    let rl = _mm_srli_si128(tmp, 8);
    (
        to_u128(_mm_xor_si128(zero, ll)),
        to_u128(_mm_xor_si128(three, rl)),
    )
}

/// Portable carryless multiplication of two 64-bit words, without
/// data-dependent branches.
#[inline]
fn clmul64(a: u64, b: u64) -> u128 {
    let a = a as u128;
    let mut acc = 0u128;
    for i in 0..64 {
        let mask = 0u128.wrapping_sub(((b >> i) & 1) as u128);
        acc ^= (a << i) & mask;
    }
    acc
}

fn clmul128_soft(a: u128, b: u128) -> (u128, u128) {
    let (a0, a1) = (a as u64, (a >> 64) as u64);
    let (b0, b1) = (b as u64, (b >> 64) as u64);
    let lo = clmul64(a0, b0);
    let hi = clmul64(a1, b1);
    let mid = clmul64(a0, b1) ^ clmul64(a1, b0);
    (lo ^ (mid << 64), hi ^ (mid >> 64))
}
