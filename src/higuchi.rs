//! Higuchi curve length.
//!
//! For interval `k` and offset `m` (0-based, `m < k`) the sub-series
//! `x[m], x[m+k], x[m+2k], ...` has curve length
//!
//! ```text
//! L_m(k) = (Σ |x[m+ik] - x[m+(i-1)k]|) * (N - 1) / (M * k) / k,   M = ⌊(N - 1 - m) / k⌋
//! ```
//!
//! and `L(k)` is the mean of `L_m(k)` over all offsets. For a curve of
//! dimension `D`, `L(k) ∝ k^-D`.

/// Mean Higuchi curve length of `data` at interval `k`.
///
/// Returns `None` when `k` is zero or some offset has no increment
/// (the interval is too large for the series).
pub fn curve_length(data: &[f64], k: usize) -> Option<f64> {
    let n = data.len();
    if k == 0 || n < 2 {
        return None;
    }

    let norm_numerator = (n - 1) as f64;
    let mut total = 0.0;

    for m in 0..k {
        let increments = (n - 1).checked_sub(m)? / k;
        if increments == 0 {
            return None;
        }

        let variation: f64 = (1..=increments)
            .map(|i| (data[m + i * k] - data[m + (i - 1) * k]).abs())
            .sum();

        let normalization = norm_numerator / (increments * k) as f64;
        total += variation * normalization / k as f64;
    }

    Some(total / k as f64)
}

/// Round log-spaced scales to distinct integer intervals, preserving order.
pub fn integer_intervals(scales: &[f64]) -> Vec<usize> {
    let mut intervals: Vec<usize> = Vec::with_capacity(scales.len());
    for &s in scales {
        let k = s.round().max(1.0) as usize;
        if intervals.last() != Some(&k) {
            intervals.push(k);
        }
    }
    intervals
}
