pub mod consts;
pub mod errors;
pub mod convert;
pub mod hash;
pub mod digests;
pub mod rate;
pub mod filter;
pub mod config;

pub use config::{BaseHashConfig, FilterConfig, StrategyConfig};
pub use errors::{BloomError, Result};
pub use filter::BloomFilter;
pub use hash::{DoubleHash, HashFunction, HashStrategy, MultiHashFunction};
