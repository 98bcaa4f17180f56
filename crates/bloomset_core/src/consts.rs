// crates/bloomset_core/src/consts.rs

/// Width in bytes of one index sliced out of a digest.
pub const INDEX_WIDTH: usize = 4;

/// Multiplier of the polynomial string hash (`s[0]*31^(n-1) + ... + s[n-1]`).
pub const POLY_MULTIPLIER: u32 = 31;

/// Above this a filter is undersized enough to be worth a warning.
pub const ERROR_RATE_WARN: f64 = 0.5;

// Reference configuration: ten domains in 128 bits, nine index functions.
pub const DEFAULT_EXPECTED_ELEMENTS: u64 = 10;
pub const DEFAULT_NUM_BITS: u32 = 128;
pub const DEFAULT_DOUBLE_HASHES: u32 = 8;
pub const DEFAULT_MURMUR_SEED: u32 = 100;
pub const DEFAULT_SIP_KEYS: (u64, u64) = (29, 47);

// BLAKE3 keyed mode takes exactly 32 key bytes.
pub const BLAKE3_KEY_LEN: usize = 32;

const _: () = { assert!(BLAKE3_KEY_LEN % INDEX_WIDTH == 0); };
