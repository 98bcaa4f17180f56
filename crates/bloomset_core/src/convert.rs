//! Digest bytes -> bit indices.
//!
//! A digest is read as a run of 4-byte big-endian words. Every word is taken
//! as its unsigned bit pattern; a remainder shorter than one word is dropped.
//! Range reduction (`raw % num_bits`) is done in one place, [`reduce`], and
//! only the filter calls it.
use crate::consts::INDEX_WIDTH;
use byteorder::{BigEndian as BE, ByteOrder};

/// Number of indices a digest of `len` bytes yields.
#[inline]
pub fn index_count(len: usize) -> usize { len / INDEX_WIDTH }

/// Iterates the raw indices of `bytes`, one per full word.
#[inline]
pub fn indices(bytes: &[u8]) -> impl Iterator<Item = u32> + '_ {
    bytes.chunks_exact(INDEX_WIDTH).map(BE::read_u32)
}

pub fn to_indices(bytes: &[u8]) -> Vec<u32> {
    let mut out = Vec::with_capacity(index_count(bytes.len()));
    out.extend(indices(bytes));
    out
}

/// Low-order 32 bits of `bytes` read as one big-endian integer.
/// Shorter inputs are zero-extended on the left.
pub fn low_word(bytes: &[u8]) -> u32 {
    if bytes.len() >= INDEX_WIDTH {
        return BE::read_u32(&bytes[bytes.len() - INDEX_WIDTH..]);
    }
    let mut buf = [0u8; INDEX_WIDTH];
    buf[INDEX_WIDTH - bytes.len()..].copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}

/// Maps a raw index into `[0, num_bits)`. `num_bits` must be non-zero.
#[inline]
pub fn reduce(raw: u32, num_bits: u32) -> usize { (raw % num_bits) as usize }
