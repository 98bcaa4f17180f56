//! Concrete digest-backed strategies.
//!
//! The digest algorithms themselves come from crates; this module only adapts
//! their output to [`HashFunction`] / [`MultiHashFunction`]. Multi-output
//! digests are exposed big-endian so that [`crate::convert`] slices them
//! word by word.
use crate::consts::{BLAKE3_KEY_LEN, POLY_MULTIPLIER};
use crate::convert;
use crate::errors::{BloomError, Result};
use crate::hash::{HashFunction, MultiHashFunction};
use sha2::{Digest, Sha256};
use siphasher::sip::SipHasher24;
use std::hash::Hasher;
use std::io::{self, Cursor};
use std::marker::PhantomData;

/// `s[0]*31^(n-1) + ... + s[n-1]` over UTF-16 code units, wrapping.
///
/// Bit-compatible with `java.lang.String#hashCode`. Cheap and weak; useful as
/// a base for [`crate::hash::DoubleHash`] or for tests, not as a sole strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Polynomial;

impl HashFunction for Polynomial {
    fn name(&self) -> &'static str { "polynomial" }

    fn hash(&self, value: &str) -> u32 {
        value
            .encode_utf16()
            .fold(0u32, |h, unit| h.wrapping_mul(POLY_MULTIPLIER).wrapping_add(unit as u32))
    }
}

/// A cryptographic digest cut down to one value: the low-order 32 bits of
/// the digest read as a big-endian integer.
pub struct DigestHash<D> {
    name: &'static str,
    _digest: PhantomData<fn() -> D>,
}

impl<D: Digest> DigestHash<D> {
    pub fn new(name: &'static str) -> Self { Self { name, _digest: PhantomData } }
}

impl<D> Clone for DigestHash<D> {
    fn clone(&self) -> Self { Self { name: self.name, _digest: PhantomData } }
}

pub fn sha256() -> DigestHash<Sha256> { DigestHash::new("sha256") }

impl<D: Digest> HashFunction for DigestHash<D> {
    fn name(&self) -> &'static str { self.name }

    fn hash(&self, value: &str) -> u32 {
        convert::low_word(&D::digest(value.as_bytes()))
    }
}

/// Seeded Murmur3 (x86, 32-bit). One index per call.
#[derive(Clone, Copy, Debug)]
pub struct Murmur32 {
    pub seed: u32,
}

impl Murmur32 {
    pub fn new(seed: u32) -> Self { Self { seed } }

    fn murmur(&self, value: &str) -> io::Result<u32> {
        murmur3::murmur3_32(&mut Cursor::new(value.as_bytes()), self.seed)
    }

    /// # Panics
    ///
    /// Panics if the murmur3 backend fails after passing its probe.
    fn murmur_or_abort(&self, value: &str) -> u32 {
        match self.murmur(value) {
            Ok(h) => h,
            Err(e) => panic!("murmur3 backend failed: {e}"),
        }
    }

    fn check(&self) -> Result<()> {
        self.murmur("")
            .map(|_| ())
            .map_err(|e| BloomError::Backend { name: "murmur32", reason: e.to_string() })
    }
}

impl HashFunction for Murmur32 {
    fn name(&self) -> &'static str { "murmur32" }
    fn hash(&self, value: &str) -> u32 { self.murmur_or_abort(value) }
    fn probe(&self) -> Result<()> { self.check() }
}

impl MultiHashFunction for Murmur32 {
    fn name(&self) -> &'static str { "murmur32" }
    fn digest_len(&self) -> usize { 4 }
    fn digest(&self, value: &str) -> Vec<u8> { self.murmur_or_abort(value).to_be_bytes().to_vec() }
    fn probe(&self) -> Result<()> { self.check() }
}

/// Keyed SipHash-2-4. Two indices per call as a multi-output strategy, the
/// low 32 bits as a single-output one.
#[derive(Clone, Copy, Debug)]
pub struct SipHash24 {
    pub k0: u64,
    pub k1: u64,
}

impl SipHash24 {
    pub fn new(k0: u64, k1: u64) -> Self { Self { k0, k1 } }

    pub fn hash64(&self, value: &str) -> u64 {
        let mut h = SipHasher24::new_with_keys(self.k0, self.k1);
        h.write(value.as_bytes());
        h.finish()
    }
}

impl HashFunction for SipHash24 {
    fn name(&self) -> &'static str { "sip_hash24" }
    fn hash(&self, value: &str) -> u32 { self.hash64(value) as u32 }
}

impl MultiHashFunction for SipHash24 {
    fn name(&self) -> &'static str { "sip_hash24" }
    fn digest_len(&self) -> usize { 8 }
    fn digest(&self, value: &str) -> Vec<u8> { self.hash64(value).to_be_bytes().to_vec() }
}

/// Seeded XXH3-64. Two indices per call.
#[derive(Clone, Copy, Debug)]
pub struct Xxh3 {
    pub seed: u64,
}

impl Xxh3 {
    pub fn new(seed: u64) -> Self { Self { seed } }
}

impl MultiHashFunction for Xxh3 {
    fn name(&self) -> &'static str { "xxh3" }
    fn digest_len(&self) -> usize { 8 }
    fn digest(&self, value: &str) -> Vec<u8> {
        xxhash_rust::xxh3::xxh3_64_with_seed(value.as_bytes(), self.seed).to_be_bytes().to_vec()
    }
}

/// Keyed BLAKE3. Eight indices per call.
#[derive(Clone)]
pub struct Blake3Keyed {
    key: [u8; BLAKE3_KEY_LEN],
}

impl Blake3Keyed {
    pub fn new(key: [u8; BLAKE3_KEY_LEN]) -> Self { Self { key } }

    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let bytes = hex::decode(key_hex).map_err(|e| BloomError::InvalidKey(e.to_string()))?;
        let key: [u8; BLAKE3_KEY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            BloomError::InvalidKey(format!("blake3 key must be {BLAKE3_KEY_LEN} bytes, got {}", b.len()))
        })?;
        Ok(Self { key })
    }
}

impl MultiHashFunction for Blake3Keyed {
    fn name(&self) -> &'static str { "blake3" }
    fn digest_len(&self) -> usize { BLAKE3_KEY_LEN }
    fn digest(&self, value: &str) -> Vec<u8> {
        blake3::keyed_hash(&self.key, value.as_bytes()).as_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashStrategy;

    #[test]
    fn polynomial_matches_java_string_hash() {
        assert_eq!(Polynomial.hash(""), 0);
        assert_eq!(Polynomial.hash("a"), 97);
        assert_eq!(Polynomial.hash("ab"), 97 * 31 + 98);
        // "hello".hashCode() == 99162322
        assert_eq!(Polynomial.hash("hello"), 99_162_322);
        // non-BMP characters count as two UTF-16 units
        assert_ne!(Polynomial.hash("\u{1F600}"), Polynomial.hash("\u{FFFF}"));
    }

    #[test]
    fn murmur_known_vectors() {
        let m = Murmur32::new(0);
        assert_eq!(HashFunction::hash(&m, ""), 0);
        assert_eq!(HashFunction::hash(&m, "hello"), 0x248b_fa47);
        assert_eq!(MultiHashFunction::digest(&m, "hello"), 0x248b_fa47u32.to_be_bytes().to_vec());
        assert!(HashFunction::probe(&m).is_ok());
    }

    #[test]
    fn seeds_and_keys_change_output() {
        assert_ne!(HashFunction::hash(&Murmur32::new(1), "x"), HashFunction::hash(&Murmur32::new(2), "x"));
        assert_ne!(SipHash24::new(1, 2).hash64("x"), SipHash24::new(2, 1).hash64("x"));
        assert_ne!(Xxh3::new(1).digest("x"), Xxh3::new(2).digest("x"));
        assert_ne!(Blake3Keyed::new([1; 32]).digest("x"), Blake3Keyed::new([2; 32]).digest("x"));
    }

    #[test]
    fn sip_single_is_low_half_of_multi() {
        let s = SipHash24::new(29, 47);
        let words = HashStrategy::multi(s).hash("google.com");
        assert_eq!(words.len(), 2);
        assert_eq!(words[1], HashFunction::hash(&s, "google.com"));
        assert_eq!(((words[0] as u64) << 32) | words[1] as u64, s.hash64("google.com"));
    }

    #[test]
    fn output_counts() {
        assert_eq!(HashStrategy::multi(Murmur32::new(100)).count(), 1);
        assert_eq!(HashStrategy::multi(SipHash24::new(29, 47)).count(), 2);
        assert_eq!(HashStrategy::multi(Xxh3::new(0)).count(), 2);
        assert_eq!(HashStrategy::multi(Blake3Keyed::new([0; 32])).count(), 8);
        assert_eq!(HashStrategy::single(sha256()).count(), 1);
    }

    #[test]
    fn sha256_uses_last_digest_word() {
        let full = Sha256::digest(b"abc");
        assert_eq!(sha256().hash("abc"), u32::from_be_bytes([full[28], full[29], full[30], full[31]]));
        // SHA-256("abc") ends in ...f20015ad
        assert_eq!(sha256().hash("abc"), 0xf200_15ad);
    }

    #[test]
    fn blake3_key_from_hex() {
        let key = "00".repeat(31) + "ff";
        assert!(Blake3Keyed::from_hex(&key).is_ok());
        assert!(matches!(Blake3Keyed::from_hex("abcd"), Err(BloomError::InvalidKey(_))));
        assert!(matches!(Blake3Keyed::from_hex("zz"), Err(BloomError::InvalidKey(_))));
    }

    #[test]
    fn unicode_and_empty_inputs_hash() {
        for v in ["", "ç", "日本語", "\u{0}", "🦀🦀"] {
            assert_eq!(HashStrategy::multi(Blake3Keyed::new([7; 32])).hash(v).len(), 8);
            let _ = sha256().hash(v);
            let _ = HashFunction::hash(&Murmur32::new(3), v);
        }
    }
}
