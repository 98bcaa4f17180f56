//! Bloom filter over string keys with pluggable hash strategies.
//!
//! `num_hashes` and `error_rate` are fixed when the filter is built and are
//! never refreshed from the bit array. There is no removal: bits only go
//! from 0 to 1.
//!
//! `add` needs `&mut self`, so a filter shared between threads has to sit
//! behind a lock.
use crate::consts::ERROR_RATE_WARN;
use crate::convert::reduce;
use crate::errors::{BloomError, Result};
use crate::hash::HashStrategy;
use crate::rate::false_positive_rate;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct BloomFilter {
    expected_elements: u64,
    num_bits: u32,
    num_hashes: usize,
    error_rate: f64,
    strategies: Vec<HashStrategy>,
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Builds an empty filter.
    ///
    /// Fails on a zero-sized bit array, an empty strategy list, or a
    /// strategy whose digest backend does not answer its probe.
    pub fn new(expected_elements: u64, num_bits: u32, strategies: Vec<HashStrategy>) -> Result<Self> {
        if num_bits == 0 { return Err(BloomError::ZeroBits); }
        if strategies.is_empty() { return Err(BloomError::NoStrategies); }
        for s in &strategies { s.probe()?; }

        let num_hashes: usize = strategies.iter().map(HashStrategy::count).sum();
        let error_rate = false_positive_rate(num_hashes, expected_elements, num_bits);
        let bytes = (num_bits as usize).div_ceil(8);
        debug!(num_bits, num_hashes, expected_elements, error_rate, "bloom filter built");
        if error_rate > ERROR_RATE_WARN {
            warn!(error_rate, "bloom filter is undersized for the expected element count");
        }
        Ok(Self { expected_elements, num_bits, num_hashes, error_rate, strategies, bits: vec![0u8; bytes] })
    }

    pub fn add(&mut self, value: &str) {
        let m = self.num_bits;
        let bits = &mut self.bits;
        for s in &self.strategies {
            s.each_index(value, |raw| {
                let bit = reduce(raw, m);
                bits[bit / 8] |= 1u8 << (bit & 7);
                true
            });
        }
    }

    /// `false` means `value` was never added; `true` means it probably was.
    pub fn exists(&self, value: &str) -> bool {
        self.strategies
            .iter()
            .all(|s| s.each_index(value, |raw| self.test_bit(reduce(raw, self.num_bits))))
    }

    #[inline]
    fn test_bit(&self, bit: usize) -> bool { (self.bits[bit / 8] & (1u8 << (bit & 7))) != 0 }

    pub fn expected_elements(&self) -> u64 { self.expected_elements }
    pub fn num_bits(&self) -> u32 { self.num_bits }
    pub fn num_hashes(&self) -> usize { self.num_hashes }
    pub fn error_rate(&self) -> f64 { self.error_rate }
    pub fn strategies(&self) -> &[HashStrategy] { &self.strategies }

    /// Raw bit array; bit `i` lives in byte `i / 8` at position `i % 8`.
    pub fn bits(&self) -> &[u8] { &self.bits }

    pub fn bits_set(&self) -> u64 { self.bits.iter().map(|b| b.count_ones() as u64).sum() }

    /// Observed share of set bits. Diagnostic only.
    pub fn fill_ratio(&self) -> f64 { self.bits_set() as f64 / self.num_bits as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digests::{Murmur32, Polynomial, SipHash24};
    use crate::hash::{HashFunction, MultiHashFunction};

    struct Fixed(u32);
    impl HashFunction for Fixed {
        fn name(&self) -> &'static str { "fixed" }
        fn hash(&self, _value: &str) -> u32 { self.0 }
    }

    struct Broken;
    impl MultiHashFunction for Broken {
        fn name(&self) -> &'static str { "broken" }
        fn digest_len(&self) -> usize { 8 }
        fn digest(&self, _value: &str) -> Vec<u8> { vec![0; 8] }
        fn probe(&self) -> Result<()> {
            Err(BloomError::Backend { name: "broken", reason: "unavailable".into() })
        }
    }

    // declares 8 bytes, returns 16
    struct Oversized;
    impl MultiHashFunction for Oversized {
        fn name(&self) -> &'static str { "oversized" }
        fn digest_len(&self) -> usize { 8 }
        fn digest(&self, _value: &str) -> Vec<u8> { vec![1; 16] }
    }

    fn murmur_sip() -> Vec<HashStrategy> {
        vec![HashStrategy::multi(Murmur32::new(100)), HashStrategy::multi(SipHash24::new(29, 47))]
    }

    #[test]
    fn construction_precomputes() {
        let f = BloomFilter::new(10, 128, murmur_sip()).unwrap();
        assert_eq!(f.expected_elements(), 10);
        assert_eq!(f.num_bits(), 128);
        assert_eq!(f.bits().len(), 16);
        assert_eq!(f.num_hashes(), 3);
        let expected = (15f64 / 64.0).exp_m1().powi(3) / (45f64 / 64.0).exp();
        assert!((f.error_rate() - expected).abs() < 1e-6);
        assert_eq!(f.bits_set(), 0);
    }

    #[test]
    fn odd_bit_counts_round_up_to_bytes() {
        let f = BloomFilter::new(1, 9, vec![HashStrategy::single(Polynomial)]).unwrap();
        assert_eq!(f.bits().len(), 2);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(BloomFilter::new(1, 0, murmur_sip()), Err(BloomError::ZeroBits)));
        assert!(matches!(BloomFilter::new(1, 64, vec![]), Err(BloomError::NoStrategies)));
        let bad = vec![HashStrategy::single(Polynomial), HashStrategy::multi(Broken)];
        assert!(matches!(BloomFilter::new(1, 64, bad), Err(BloomError::Backend { name: "broken", .. })));
    }

    #[test]
    fn digest_width_must_match_declared_count() {
        let s = vec![HashStrategy::multi(Oversized)];
        assert!(matches!(BloomFilter::new(10, 128, s), Err(BloomError::Backend { name: "oversized", .. })));
        // every real backend reports its width truthfully
        let f = BloomFilter::new(10, 128, murmur_sip()).unwrap();
        let produced: usize = f.strategies().iter().map(|s| s.hash("").len()).sum();
        assert_eq!(produced, f.num_hashes());
    }

    #[test]
    fn add_then_exists() {
        let mut f = BloomFilter::new(10, 128, murmur_sip()).unwrap();
        assert!(!f.exists("google.com"));
        f.add("google.com");
        assert!(f.exists("google.com"));
        assert!(f.bits_set() >= 1 && f.bits_set() <= 3);
    }

    #[test]
    fn indices_are_reduced_modulo_bits() {
        let mut f = BloomFilter::new(1, 10, vec![HashStrategy::single(Fixed(u32::MAX))]).unwrap();
        f.add("x");
        // u32::MAX % 10 == 5
        assert_eq!(f.bits(), &[0b0010_0000, 0]);
        assert!(f.exists("anything"));
    }

    #[test]
    fn single_bit_saturates() {
        let mut f = BloomFilter::new(100, 1, murmur_sip()).unwrap();
        assert!(!f.exists("a"));
        f.add("a");
        for v in ["a", "b", "", "ünïcödé", "whatever else"] {
            assert!(f.exists(v));
        }
        assert_eq!(f.fill_ratio(), 1.0);
    }

    #[test]
    fn add_is_idempotent() {
        let mut f = BloomFilter::new(10, 256, murmur_sip()).unwrap();
        f.add("reddit.com");
        let once = f.bits().to_vec();
        f.add("reddit.com");
        f.add("reddit.com");
        assert_eq!(f.bits(), once.as_slice());
    }

    #[test]
    fn error_rate_is_not_refreshed_by_inserts() {
        let mut f = BloomFilter::new(2, 64, murmur_sip()).unwrap();
        let before = f.error_rate();
        for i in 0..500 { f.add(&format!("v{i}")); }
        assert_eq!(f.error_rate(), before);
        assert!(f.fill_ratio() > 0.9);
    }
}
