use crate::consts::{
    DEFAULT_DOUBLE_HASHES, DEFAULT_EXPECTED_ELEMENTS, DEFAULT_MURMUR_SEED, DEFAULT_NUM_BITS, DEFAULT_SIP_KEYS,
};
use crate::digests::{sha256, Blake3Keyed, Murmur32, Polynomial, SipHash24, Xxh3};
use crate::errors::Result;
use crate::filter::BloomFilter;
use crate::hash::{DoubleHash, HashFunction, HashStrategy};
use crate::rate::{optimal_num_bits, optimal_num_hashes};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// Single-output functions usable on their own or as double-hash bases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseHashConfig {
    Polynomial,
    Sha256,
    Murmur32 { seed: u32 },
    SipHash24 { k0: u64, k1: u64 },
}

impl BaseHashConfig {
    pub fn build(&self) -> Arc<dyn HashFunction> {
        match *self {
            Self::Polynomial => Arc::new(Polynomial),
            Self::Sha256 => Arc::new(sha256()),
            Self::Murmur32 { seed } => Arc::new(Murmur32::new(seed)),
            Self::SipHash24 { k0, k1 } => Arc::new(SipHash24::new(k0, k1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    Murmur32 { seed: u32 },
    SipHash24 { k0: u64, k1: u64 },
    Xxh3 { seed: u64 },
    /// 64 hex characters.
    Blake3 { key: String },
    Single { hash: BaseHashConfig },
    /// Expands into `count` combinators; `modulus` defaults to the bit count.
    DoubleHash {
        first: BaseHashConfig,
        second: BaseHashConfig,
        count: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        modulus: Option<u32>,
    },
}

impl StrategyConfig {
    /// Index functions this entry contributes.
    pub fn count(&self) -> usize {
        match self {
            Self::Murmur32 { .. } | Self::Single { .. } => 1,
            Self::SipHash24 { .. } | Self::Xxh3 { .. } => 2,
            Self::Blake3 { .. } => 8,
            Self::DoubleHash { count, .. } => *count as usize,
        }
    }

    fn build_into(&self, num_bits: u32, out: &mut Vec<HashStrategy>) -> Result<()> {
        trace!(strategy = ?self, "building strategy");
        match self {
            Self::Murmur32 { seed } => out.push(HashStrategy::multi(Murmur32::new(*seed))),
            Self::SipHash24 { k0, k1 } => out.push(HashStrategy::multi(SipHash24::new(*k0, *k1))),
            Self::Xxh3 { seed } => out.push(HashStrategy::multi(Xxh3::new(*seed))),
            Self::Blake3 { key } => out.push(HashStrategy::multi(Blake3Keyed::from_hex(key)?)),
            Self::Single { hash } => out.push(HashStrategy::Single(hash.build())),
            Self::DoubleHash { first, second, count, modulus } => {
                let (h1, h2) = (first.build(), second.build());
                out.extend(DoubleHash::family(*count, modulus.unwrap_or(num_bits), &h1, &h2)?);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub expected_elements: u64,
    pub num_bits: u32,
    pub strategies: Vec<StrategyConfig>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let (k0, k1) = DEFAULT_SIP_KEYS;
        Self {
            expected_elements: DEFAULT_EXPECTED_ELEMENTS,
            num_bits: DEFAULT_NUM_BITS,
            strategies: vec![
                StrategyConfig::Single { hash: BaseHashConfig::Murmur32 { seed: DEFAULT_MURMUR_SEED } },
                StrategyConfig::DoubleHash {
                    first: BaseHashConfig::Murmur32 { seed: DEFAULT_MURMUR_SEED },
                    second: BaseHashConfig::SipHash24 { k0, k1 },
                    count: DEFAULT_DOUBLE_HASHES,
                    modulus: None,
                },
            ],
        }
    }
}

impl FilterConfig {
    /// Sized for `target` false positives at `expected_elements`: one Murmur3
    /// index plus `k - 1` double-hash combinators over Murmur3 / SipHash.
    pub fn for_error_rate(expected_elements: u64, target: f64) -> Self {
        let num_bits = optimal_num_bits(expected_elements, target);
        let k = optimal_num_hashes(expected_elements, num_bits);
        let mut cfg = Self { expected_elements, num_bits, ..Self::default() };
        if let Some(StrategyConfig::DoubleHash { count, .. }) = cfg.strategies.get_mut(1) {
            *count = (k - 1) as u32;
        }
        if k == 1 { cfg.strategies.truncate(1); }
        cfg
    }

    pub fn from_json(s: &str) -> Result<Self> { Ok(serde_json::from_str(s)?) }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_json(&s)
    }

    pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string_pretty(self)?) }

    pub fn num_hashes(&self) -> usize { self.strategies.iter().map(StrategyConfig::count).sum() }

    pub fn build(&self) -> Result<BloomFilter> {
        let mut strategies = Vec::with_capacity(self.num_hashes());
        for s in &self.strategies {
            s.build_into(self.num_bits, &mut strategies)?;
        }
        BloomFilter::new(self.expected_elements, self.num_bits, strategies)
    }
}
