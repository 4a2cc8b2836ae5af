//! Numeric routines for scoring noisy quarterly series.
//!
//! Everything here operates on plain `&[f64]`: the scoring pipeline needs
//! exact, testable semantics for clipping, z-scoring and differencing on
//! short, sparse series, including the degenerate cases (constant series,
//! single observations) that must fall back to a defined value instead of
//! dividing by zero.

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Compute sample standard deviation.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

/// Clamp every value into `[low, high]`. Idempotent.
pub fn clip(data: &[f64], low: f64, high: f64) -> Vec<f64> {
    data.iter().map(|x| x.clamp(low, high)).collect()
}

/// Standardize a series against its own mean and sample standard deviation.
/// A constant series (zero variance) standardizes to 0.0 at every point.
pub fn z_scores(data: &[f64]) -> Vec<f64> {
    let sd = std_dev(data);
    if sd < f64::EPSILON {
        return vec![0.0; data.len()];
    }
    let m = mean(data);
    data.iter().map(|x| (x - m) / sd).collect()
}

/// First discrete difference. The first element is undefined, so the output
/// has the same length as the input with `None` leading.
pub fn diff(data: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(data.len());
    for (i, x) in data.iter().enumerate() {
        if i == 0 {
            out.push(None);
        } else {
            out.push(Some(x - data[i - 1]));
        }
    }
    out
}

/// Trailing rolling mean with a minimum of one observation per window.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    let w = window.max(1);
    (0..data.len())
        .map(|i| mean(&data[i.saturating_sub(w - 1)..=i]))
        .collect()
}

/// Trailing rolling sample standard deviation with a minimum of one
/// observation per window (0.0 until a second observation arrives).
pub fn rolling_std(data: &[f64], window: usize) -> Vec<f64> {
    let w = window.max(1);
    (0..data.len())
        .map(|i| std_dev(&data[i.saturating_sub(w - 1)..=i]))
        .collect()
}
