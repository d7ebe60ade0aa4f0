//! Useful utility functions.

use crate::Block;

/// XOR two byte arrays in place.
pub fn xor_inplace(a: &mut [u8], b: &[u8]) {
    for (a, b) in a.iter_mut().zip(b.iter()) {
        *a ^= *b;
    }
}

/// XOR two block slices elementwise, outputting the result.
pub fn xor_blocks(a: &[Block], b: &[Block]) -> Vec<Block> {
    a.iter().zip(b.iter()).map(|(a, b)| *a ^ *b).collect()
}

/// Serialize blocks into their contiguous little-endian byte representation.
pub fn blocks_to_bytes(bs: &[Block]) -> Vec<u8> {
    bs.iter().flat_map(|b| b.to_bytes()).collect()
}

/// Deserialize blocks from a little-endian byte buffer. Any trailing bytes
/// that do not fill a whole block are ignored.
pub fn bytes_to_blocks(bytes: &[u8]) -> Vec<Block> {
    bytes
        .chunks_exact(16)
        .map(|chunk| {
            let mut b = [0u8; 16];
            b.copy_from_slice(chunk);
            Block::from_bytes(b)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_inplace() {
        let mut v = (0..128).map(|_| rand::random::<u8>()).collect::<Vec<u8>>();
        let goal = v.clone();
        let v_ = (0..128).map(|_| rand::random::<u8>()).collect::<Vec<u8>>();
        xor_inplace(&mut v, &v_);
        xor_inplace(&mut v, &v_);
        assert_eq!(v, goal);
    }

    #[test]
    fn test_xor_inplace_shorter_rhs() {
        let mut v = vec![0xFFu8; 4];
        xor_inplace(&mut v, &[0x0F, 0xF0]);
        assert_eq!(v, vec![0xF0, 0x0F, 0xFF, 0xFF]);
    }

    #[test]
    fn test_block_bytes() {
        let bs = vec![Block(1), Block(u128::MAX), Block(0xDEAD_BEEF)];
        let bytes = blocks_to_bytes(&bs);
        assert_eq!(bytes.len(), 48);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes_to_blocks(&bytes), bs);
        assert_eq!(bytes_to_blocks(&bytes[..40]), bs[..2].to_vec());
    }

    #[test]
    fn test_xor_blocks() {
        let a = vec![Block(0b1100), Block(1)];
        let b = vec![Block(0b1010), Block(1)];
        assert_eq!(xor_blocks(&a, &b), vec![Block(0b0110), Block(0)]);
    }
}
