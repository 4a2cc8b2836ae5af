//! Savitzky–Golay smoothing for quarterly score series.
//!
//! Each output point is the value of a least-squares polynomial fitted over a
//! window of neighbouring observations, which suppresses quarter-to-quarter
//! noise while preserving trend turning points. Near the edges the window is
//! shifted (not shrunk) so the fit always covers `window` real observations.

/// Smooth `values` with a degree-`degree` local polynomial over an odd-length
/// `window`. Inputs the filter cannot handle (even or oversized window, or a
/// window too short for the degree) are returned unchanged.
pub fn savitzky_golay(values: &[f64], window: usize, degree: usize) -> Vec<f64> {
    let n = values.len();
    if window == 0 || window % 2 == 0 || window > n || window <= degree {
        return values.to_vec();
    }
    let half = window / 2;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let start = i.saturating_sub(half).min(n - window);
        let coeffs = polyfit(&values[start..start + window], degree);
        out.push(polyval(&coeffs, (i - start) as f64));
    }
    out
}

/// Least-squares polynomial fit of `ys` against x = 0, 1, ..., len-1.
/// Returns coefficients in ascending-power order.
fn polyfit(ys: &[f64], degree: usize) -> Vec<f64> {
    let k = degree + 1;

    // Power sums for the normal-equation matrix
    let mut sums = vec![0.0; 2 * k - 1];
    for x in 0..ys.len() {
        let mut p = 1.0;
        for s in sums.iter_mut() {
            *s += p;
            p *= x as f64;
        }
    }

    // Augmented system [A^T A | A^T y]
    let mut system = vec![vec![0.0; k + 1]; k];
    for (r, row) in system.iter_mut().enumerate() {
        row[..k].copy_from_slice(&sums[r..r + k]);
        row[k] = ys
            .iter()
            .enumerate()
            .map(|(x, y)| y * (x as f64).powi(r as i32))
            .sum();
    }

    solve(&mut system).unwrap_or_else(|| {
        // Singular system: fall back to the constant fit
        let mut c = vec![0.0; k];
        c[0] = crate::stats::mean(ys);
        c
    })
}

/// Gaussian elimination with partial pivoting on an augmented k x (k+1)
/// system. Returns `None` when the matrix is singular.
fn solve(system: &mut [Vec<f64>]) -> Option<Vec<f64>> {
    let k = system.len();
    for col in 0..k {
        let pivot_row = (col..k)
            .max_by(|&a, &b| {
                system[a][col]
                    .abs()
                    .partial_cmp(&system[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if system[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        system.swap(col, pivot_row);
        for row in (col + 1)..k {
            let factor = system[row][col] / system[col][col];
            for c in col..=k {
                system[row][c] -= factor * system[col][c];
            }
        }
    }

    let mut solution = vec![0.0; k];
    for row in (0..k).rev() {
        let mut acc = system[row][k];
        for c in (row + 1)..k {
            acc -= system[row][c] * solution[c];
        }
        solution[row] = acc / system[row][row];
    }
    Some(solution)
}

fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_series_passes_through_unchanged() {
        // A degree-3 filter reproduces any cubic exactly, edges included
        let cubic = |x: f64| 0.5 * x * x * x - 2.0 * x * x + 3.0 * x - 1.0;
        let values: Vec<f64> = (0..12).map(|x| cubic(x as f64)).collect();
        let smoothed = savitzky_golay(&values, 5, 3);
        for (a, b) in values.iter().zip(&smoothed) {
            assert!((a - b).abs() < 1e-8, "{} vs {}", a, b);
        }
    }

    #[test]
    fn constant_series_unchanged() {
        let values = vec![4.0; 9];
        assert_eq!(savitzky_golay(&values, 5, 3), values);
    }

    #[test]
    fn short_or_malformed_window_returns_input() {
        let values = vec![1.0, 2.0, 1.5];
        assert_eq!(savitzky_golay(&values, 5, 3), values);
        let values = vec![1.0, 2.0, 1.5, 3.0, 2.5, 4.0];
        assert_eq!(savitzky_golay(&values, 4, 3), values);
        assert_eq!(savitzky_golay(&values, 3, 3), values);
    }

    #[test]
    fn central_impulse_response_matches_known_coefficients() {
        // Window 5 / degree 3 center weight is 17/35
        let values = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        let smoothed = savitzky_golay(&values, 5, 3);
        assert!((smoothed[3] - 17.0 / 35.0).abs() < 1e-9);
        assert!((smoothed[2] - 12.0 / 35.0).abs() < 1e-9);
        assert!((smoothed[4] - 12.0 / 35.0).abs() < 1e-9);
    }

    #[test]
    fn noisy_linear_trend_keeps_direction() {
        let noise = [0.3, -0.2, 0.25, -0.3, 0.2, -0.25, 0.3, -0.2, 0.1, -0.1];
        let values: Vec<f64> = noise
            .iter()
            .enumerate()
            .map(|(i, n)| i as f64 + n)
            .collect();
        let smoothed = savitzky_golay(&values, 5, 3);
        assert!(smoothed.last().unwrap() > smoothed.first().unwrap());
    }
}
