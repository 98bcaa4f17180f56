//! False-positive model: `(1 - e^(-k*n/m))^k`.
//!
//! These are a-priori estimates that assume independent, uniform indices.

/// Expected false-positive probability for `num_hashes` (k) index functions,
/// `expected_elements` (n) insertions and `num_bits` (m) bits.
pub fn false_positive_rate(num_hashes: usize, expected_elements: u64, num_bits: u32) -> f64 {
    if num_bits == 0 { return 1.0; }
    let k = num_hashes as f64;
    let fill = 1.0 - (-k * expected_elements as f64 / num_bits as f64).exp();
    fill.powf(k).clamp(0.0, 1.0)
}

/// Smallest bit count reaching `target` for `expected_elements`:
/// `ceil(-n ln p / (ln 2)^2)`, at least 1 and saturating at `u32::MAX`.
pub fn optimal_num_bits(expected_elements: u64, target: f64) -> u32 {
    if expected_elements == 0 || !(target > 0.0 && target < 1.0) { return 1; }
    let ln2 = std::f64::consts::LN_2;
    let m = (-(expected_elements as f64) * target.ln() / (ln2 * ln2)).ceil();
    if m >= u32::MAX as f64 { u32::MAX } else { (m as u32).max(1) }
}

/// `round(m/n * ln 2)`, at least 1.
pub fn optimal_num_hashes(expected_elements: u64, num_bits: u32) -> usize {
    if expected_elements == 0 { return 1; }
    let k = (num_bits as f64 / expected_elements as f64 * std::f64::consts::LN_2).round();
    (k as usize).max(1)
}
