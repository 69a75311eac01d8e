//! Gauss-type rules: Legendre via Newton iteration, Chebyshev in closed form,
//! Jacobi (and Gegenbauer) via the Golub-Welsch eigenvalue method.

use std::f64::consts::PI;

use crate::error::{Result, RuleError};

const MAX_NEWTON_ITERATIONS: usize = 100;
const MAX_QL_ITERATIONS: usize = 60;

/// Evaluate the Legendre polynomial `P_n` and its derivative at `x`.
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p = 1.0;
    let mut p_prev = 0.0;
    for k in 1..=n {
        let kf = k as f64;
        let next = ((2.0 * kf - 1.0) * x * p - (kf - 1.0) * p_prev) / kf;
        p_prev = p;
        p = next;
    }
    let dp = (n as f64) * (x * p - p_prev) / (x * x - 1.0);
    (p, dp)
}

/// Gauss-Legendre nodes (ascending) and weights with `n` points.
pub(crate) fn gauss_legendre(n: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut x = vec![0.0; n];
    let mut w = vec![0.0; n];
    let nf = n as f64;
    for i in 0..(n + 1) / 2 {
        let mut xi = -(PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
        let mut converged = false;
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let (p, dp) = legendre_with_derivative(n, xi);
            let dx = p / dp;
            xi -= dx;
            if dx.abs() < 1e-15 {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(RuleError::NumericalFailure {
                message: format!("Gauss-Legendre node {} of {} did not converge", i, n),
            });
        }
        let (_, dp) = legendre_with_derivative(n, xi);
        let wi = 2.0 / ((1.0 - xi * xi) * dp * dp);
        x[i] = xi;
        w[i] = wi;
        x[n - 1 - i] = -xi;
        w[n - 1 - i] = wi;
    }
    if n % 2 == 1 {
        x[n / 2] = 0.0;
    }
    Ok((x, w))
}

/// Gauss-Chebyshev nodes and weights for the weight `1 / sqrt(1 - x^2)`.
pub(crate) fn gauss_chebyshev1(n: usize) -> (Vec<f64>, Vec<f64>) {
    let nf = n as f64;
    let mut x: Vec<f64> = (0..n)
        .map(|i| -(PI * (2.0 * i as f64 + 1.0) / (2.0 * nf)).cos())
        .collect();
    if n % 2 == 1 {
        x[n / 2] = 0.0;
    }
    (x, vec![PI / nf; n])
}

/// Gauss-Chebyshev nodes and weights for the weight `sqrt(1 - x^2)`.
pub(crate) fn gauss_chebyshev2(n: usize) -> (Vec<f64>, Vec<f64>) {
    let np1 = (n + 1) as f64;
    let mut x = Vec::with_capacity(n);
    let mut w = Vec::with_capacity(n);
    for i in 0..n {
        let theta = PI * (i as f64 + 1.0) / np1;
        x.push(-theta.cos());
        w.push(PI / np1 * theta.sin() * theta.sin());
    }
    if n % 2 == 1 {
        x[n / 2] = 0.0;
    }
    (x, w)
}

/// Gauss-Jacobi nodes (ascending) and weights for `(1 - x)^alpha (1 + x)^beta`.
///
/// Builds the symmetric tridiagonal Jacobi matrix of the monic Jacobi
/// polynomials; the nodes are its eigenvalues and the weights are the zeroth
/// moment times the squared first components of the normalized eigenvectors.
pub(crate) fn gauss_jacobi(n: usize, alpha: f64, beta: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let ab = alpha + beta;
    let mut diag = vec![0.0; n];
    let mut offdiag = vec![0.0; n];

    diag[0] = (beta - alpha) / (ab + 2.0);
    for (i, d) in diag.iter_mut().enumerate().skip(1) {
        let t = 2.0 * i as f64 + ab;
        *d = (beta * beta - alpha * alpha) / (t * (t + 2.0));
    }
    if n > 1 {
        offdiag[0] = (4.0 * (1.0 + alpha) * (1.0 + beta) / ((2.0 + ab) * (2.0 + ab) * (3.0 + ab)))
            .sqrt();
    }
    for i in 2..n {
        let fi = i as f64;
        let t = 2.0 * fi + ab;
        offdiag[i - 1] = (4.0 * fi * (fi + alpha) * (fi + beta) * (fi + ab)
            / (t * t * (t + 1.0) * (t - 1.0)))
            .sqrt();
    }

    let moment = 2f64.powf(ab + 1.0) * libm::tgamma(alpha + 1.0) * libm::tgamma(beta + 1.0)
        / libm::tgamma(ab + 2.0);

    let mut first = vec![0.0; n];
    first[0] = 1.0;
    tridiagonal_eigen(&mut diag, &mut offdiag, &mut first)?;

    let mut pairs: Vec<(f64, f64)> = diag
        .into_iter()
        .zip(first)
        .map(|(x, v)| (x, moment * v * v))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(pairs.into_iter().unzip())
}

/// Gauss-Gegenbauer rule: Jacobi with `alpha = beta`, symmetrized.
pub(crate) fn gauss_gegenbauer(n: usize, alpha: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let (mut x, mut w) = gauss_jacobi(n, alpha, alpha)?;
    for i in 0..n / 2 {
        let xs = 0.5 * (x[n - 1 - i] - x[i]);
        let ws = 0.5 * (w[n - 1 - i] + w[i]);
        x[i] = -xs;
        x[n - 1 - i] = xs;
        w[i] = ws;
        w[n - 1 - i] = ws;
    }
    if n % 2 == 1 {
        x[n / 2] = 0.0;
    }
    Ok((x, w))
}

/// Eigenvalues of a symmetric tridiagonal matrix together with the first
/// component of each normalized eigenvector, by implicit QL iteration with
/// Wilkinson shifts.
///
/// `offdiag[i]` couples rows `i` and `i + 1`; the last entry is scratch space.
/// On input `first` is the first row of the identity, on output the first row
/// of the eigenvector matrix.
fn tridiagonal_eigen(diag: &mut [f64], offdiag: &mut [f64], first: &mut [f64]) -> Result<()> {
    let n = diag.len();
    for l in 0..n {
        let mut iterations = 0;
        loop {
            let mut m = l;
            while m + 1 < n {
                let dd = diag[m].abs() + diag[m + 1].abs();
                if offdiag[m].abs() <= f64::EPSILON * dd {
                    break;
                }
                m += 1;
            }
            if m == l {
                break;
            }
            iterations += 1;
            if iterations > MAX_QL_ITERATIONS {
                return Err(RuleError::NumericalFailure {
                    message: format!(
                        "tridiagonal eigenvalue {} of {} did not converge in {} iterations",
                        l, n, MAX_QL_ITERATIONS
                    ),
                });
            }

            let mut g = (diag[l + 1] - diag[l]) / (2.0 * offdiag[l]);
            let mut r = g.hypot(1.0);
            g = diag[m] - diag[l] + offdiag[l] / (g + r.copysign(g));
            let (mut s, mut c, mut p) = (1.0, 1.0, 0.0);
            let mut deflated = false;
            for i in (l..m).rev() {
                let f = s * offdiag[i];
                let b = c * offdiag[i];
                r = f.hypot(g);
                offdiag[i + 1] = r;
                if r == 0.0 {
                    diag[i + 1] -= p;
                    offdiag[m] = 0.0;
                    deflated = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = diag[i + 1] - p;
                r = (diag[i] - g) * s + 2.0 * c * b;
                p = s * r;
                diag[i + 1] = g + p;
                g = c * r - b;

                let z = first[i + 1];
                first[i + 1] = s * first[i] + c * z;
                first[i] = c * first[i] - s * z;
            }
            if deflated {
                continue;
            }
            diag[l] -= p;
            offdiag[l] = g;
            offdiag[m] = 0.0;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gauss_legendre_known_values() {
        let (x, w) = gauss_legendre(2).unwrap();
        let r = 1.0 / 3f64.sqrt();
        assert_abs_diff_eq!(x[0], -r, epsilon = 1e-15);
        assert_abs_diff_eq!(x[1], r, epsilon = 1e-15);
        assert_abs_diff_eq!(w[0], 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w[1], 1.0, epsilon = 1e-15);

        let (x, w) = gauss_legendre(3).unwrap();
        assert_eq!(x[1], 0.0);
        assert_abs_diff_eq!(w[1], 8.0 / 9.0, epsilon = 1e-15);
        assert_abs_diff_eq!(x[2], 0.6f64.sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_gauss_legendre_exactness() {
        for n in 1..12usize {
            let (x, w) = gauss_legendre(n).unwrap();
            for k in 0..(2 * n) as i32 {
                let q: f64 = x.iter().zip(&w).map(|(xi, wi)| wi * xi.powi(k)).sum();
                let exact = if k % 2 == 1 { 0.0 } else { 2.0 / (k as f64 + 1.0) };
                assert_abs_diff_eq!(q, exact, epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn test_jacobi_reduces_to_legendre() {
        for n in 1..10usize {
            let (xl, wl) = gauss_legendre(n).unwrap();
            let (xj, wj) = gauss_jacobi(n, 0.0, 0.0).unwrap();
            for i in 0..n {
                assert_abs_diff_eq!(xl[i], xj[i], epsilon = 1e-13);
                assert_abs_diff_eq!(wl[i], wj[i], epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn test_jacobi_reduces_to_chebyshev() {
        let (xc, wc) = gauss_chebyshev1(6);
        let (xj, wj) = gauss_jacobi(6, -0.5, -0.5).unwrap();
        for i in 0..6 {
            assert_abs_diff_eq!(xc[i], xj[i], epsilon = 1e-13);
            assert_abs_diff_eq!(wc[i], wj[i], epsilon = 1e-13);
        }
        let (xc, wc) = gauss_chebyshev2(5);
        let (xj, wj) = gauss_jacobi(5, 0.5, 0.5).unwrap();
        for i in 0..5 {
            assert_abs_diff_eq!(xc[i], xj[i], epsilon = 1e-13);
            assert_abs_diff_eq!(wc[i], wj[i], epsilon = 1e-13);
        }
    }

    #[test]
    fn test_jacobi_weight_moment() {
        // sum of weights equals the integral of (1 - x)^a (1 + x)^b
        let (_, w) = gauss_jacobi(7, 1.0, 2.0).unwrap();
        let total: f64 = w.iter().sum();
        // 2^(a+b+1) B(a+1, b+1) = 16 * 1!2!/4! = 4/3
        assert_abs_diff_eq!(total, 4.0 / 3.0, epsilon = 1e-13);
    }

    #[test]
    fn test_jacobi_asymmetric_exactness() {
        // integral of x (1 - x) (1 + x)^2 over [-1, 1]
        let (x, w) = gauss_jacobi(4, 1.0, 2.0).unwrap();
        let q: f64 = x.iter().zip(&w).map(|(xi, wi)| wi * xi).sum();
        assert_abs_diff_eq!(q, 4.0 / 15.0, epsilon = 1e-13);
    }

    #[test]
    fn test_gegenbauer_symmetric() {
        let (x, w) = gauss_gegenbauer(5, 0.4).unwrap();
        assert_eq!(x[2], 0.0);
        assert_eq!(x[0], -x[4]);
        assert_eq!(w[1], w[3]);
        assert!(x.windows(2).all(|p| p[0] < p[1]));
    }
}
