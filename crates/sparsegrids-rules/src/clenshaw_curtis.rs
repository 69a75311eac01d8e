//! Nested Chebyshev-type rules: Clenshaw-Curtis and Fejér type 2.

use std::f64::consts::PI;

/// Clenshaw-Curtis nodes and weights with `n` points, nodes ascending.
///
/// The nodes are the Chebyshev extrema `-cos(pi j / (n - 1))`. Only the left
/// half is computed, the right half is mirrored so the rule is exactly
/// symmetric and the centre node is exactly zero.
pub(crate) fn clenshaw_curtis(n: usize) -> (Vec<f64>, Vec<f64>) {
    if n == 1 {
        return (vec![0.0], vec![2.0]);
    }
    let m = n - 1;
    let mut x = vec![0.0; n];
    let mut w = vec![0.0; n];
    for j in 0..=m / 2 {
        let theta = PI * (j as f64) / (m as f64);
        let c = if j == 0 { 1.0 } else { 2.0 };
        let mut s = 0.0;
        for k in 1..=m / 2 {
            let b = if 2 * k == m { 1.0 } else { 2.0 };
            let kf = k as f64;
            s += b / (4.0 * kf * kf - 1.0) * (2.0 * kf * theta).cos();
        }
        let weight = c / (m as f64) * (1.0 - s);
        x[j] = -theta.cos();
        w[j] = weight;
        x[m - j] = theta.cos();
        w[m - j] = weight;
    }
    if m % 2 == 0 {
        x[m / 2] = 0.0;
    }
    (x, w)
}

/// Fejér type 2 nodes and weights with `n` points (n odd), nodes ascending.
pub(crate) fn fejer2(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut x = vec![0.0; n];
    let mut w = vec![0.0; n];
    let np1 = (n + 1) as f64;
    for j in 1..=(n + 1) / 2 {
        let theta = PI * (j as f64) / np1;
        let mut s = 0.0;
        for k in 1..=(n + 1) / 2 {
            let odd = (2 * k - 1) as f64;
            s += (odd * theta).sin() / odd;
        }
        let weight = 4.0 / np1 * theta.sin() * s;
        x[j - 1] = -theta.cos();
        w[j - 1] = weight;
        x[n - j] = theta.cos();
        w[n - j] = weight;
    }
    if n % 2 == 1 {
        x[n / 2] = 0.0;
    }
    (x, w)
}
