//! Hash strategies: the pluggable units that turn a string into raw bit indices.
//!
//! Two shapes exist. A [`HashFunction`] yields exactly one 32-bit value; a
//! [`MultiHashFunction`] computes one wide digest and yields one value per
//! 4-byte word of it. [`HashStrategy`] puts both behind one call contract
//! (`count` + `hash`), and [`DoubleHash`] is simply another `HashFunction`.
//!
//! Values coming out of a strategy are unbounded; the filter reduces them.
use crate::convert;
use crate::errors::{BloomError, Result};
use std::fmt;
use std::sync::Arc;

/// A deterministic string hash producing one unsigned 32-bit value.
pub trait HashFunction: Send + Sync {
    fn name(&self) -> &'static str;
    fn hash(&self, value: &str) -> u32;
    /// Checks that the backing digest works. Called once when a filter is built.
    fn probe(&self) -> Result<()> { Ok(()) }
}

/// A deterministic string hash producing a fixed-width digest that is
/// sliced into several indices.
pub trait MultiHashFunction: Send + Sync {
    fn name(&self) -> &'static str;
    /// Digest width in bytes, fixed per instance.
    fn digest_len(&self) -> usize;
    fn digest(&self, value: &str) -> Vec<u8>;
    /// Indices yielded per call.
    fn count(&self) -> usize { convert::index_count(self.digest_len()) }
    fn probe(&self) -> Result<()> { Ok(()) }
}

#[derive(Clone)]
pub enum HashStrategy {
    Single(Arc<dyn HashFunction>),
    Multi(Arc<dyn MultiHashFunction>),
}

impl HashStrategy {
    pub fn single(h: impl HashFunction + 'static) -> Self { Self::Single(Arc::new(h)) }
    pub fn multi(h: impl MultiHashFunction + 'static) -> Self { Self::Multi(Arc::new(h)) }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Single(h) => h.name(),
            Self::Multi(h) => h.name(),
        }
    }

    /// Indices produced per call; `1` for every single-output strategy.
    pub fn count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi(h) => h.count(),
        }
    }

    /// Raw (unreduced) indices for `value`, exactly `count()` of them.
    pub fn hash(&self, value: &str) -> Vec<u32> {
        match self {
            Self::Single(h) => vec![h.hash(value)],
            Self::Multi(h) => convert::to_indices(&h.digest(value)),
        }
    }

    /// Feeds each raw index to `f` until it returns `false`.
    /// Returns `false` if iteration was cut short.
    pub(crate) fn each_index(&self, value: &str, mut f: impl FnMut(u32) -> bool) -> bool {
        match self {
            Self::Single(h) => f(h.hash(value)),
            Self::Multi(h) => convert::indices(&h.digest(value)).all(f),
        }
    }

    /// Runs the backend check, then hashes `""` once. A multi-output digest
    /// must be exactly `digest_len()` bytes so that `count()` holds.
    pub(crate) fn probe(&self) -> Result<()> {
        match self {
            Self::Single(h) => {
                h.probe()?;
                h.hash("");
                Ok(())
            }
            Self::Multi(h) => {
                if h.count() == 0 {
                    return Err(BloomError::Backend {
                        name: h.name(),
                        reason: format!("{}-byte digest yields no index", h.digest_len()),
                    });
                }
                h.probe()?;
                let got = h.digest("").len();
                if got != h.digest_len() {
                    return Err(BloomError::Backend {
                        name: h.name(),
                        reason: format!("digest is {got} bytes, declared {}", h.digest_len()),
                    });
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for HashStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Single(_) => "Single",
            Self::Multi(_) => "Multi",
        };
        f.debug_struct(kind)
            .field("name", &self.name())
            .field("count", &self.count())
            .finish()
    }
}

/// `(hash1(v) + i * hash2(v)) mod m`, in wrapping `u32` arithmetic.
///
/// Many combinators share one pair of bases, so k index functions cost two
/// digest evaluations. The indices are correlated; that is the price.
#[derive(Clone)]
pub struct DoubleHash {
    i: u32,
    m: u32,
    hash1: Arc<dyn HashFunction>,
    hash2: Arc<dyn HashFunction>,
}

impl DoubleHash {
    pub fn new(i: u32, m: u32, hash1: Arc<dyn HashFunction>, hash2: Arc<dyn HashFunction>) -> Result<Self> {
        if m == 0 { return Err(BloomError::ZeroModulus); }
        Ok(Self { i, m, hash1, hash2 })
    }

    /// `count` combinators over the same bases with multipliers `1..=count`.
    pub fn family(
        count: u32,
        m: u32,
        hash1: &Arc<dyn HashFunction>,
        hash2: &Arc<dyn HashFunction>,
    ) -> Result<Vec<HashStrategy>> {
        (1..=count)
            .map(|i| {
                DoubleHash::new(i, m, Arc::clone(hash1), Arc::clone(hash2)).map(HashStrategy::single)
            })
            .collect()
    }

    pub fn multiplier(&self) -> u32 { self.i }
    pub fn modulus(&self) -> u32 { self.m }
}

impl HashFunction for DoubleHash {
    fn name(&self) -> &'static str { "double_hash" }

    fn hash(&self, value: &str) -> u32 {
        let h1 = self.hash1.hash(value);
        let h2 = self.hash2.hash(value);
        h1.wrapping_add(self.i.wrapping_mul(h2)) % self.m
    }

    fn probe(&self) -> Result<()> {
        self.hash1.probe()?;
        self.hash2.probe()
    }
}
