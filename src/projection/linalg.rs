//! Small dense linear algebra helpers for the projectors.

use rand::Rng;
use rand_distr::StandardNormal;

const POWER_MAX_ITERATIONS: usize = 1000;
const POWER_TOLERANCE: f64 = 1e-9;

/// Dot product.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
#[inline]
pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Squared Euclidean distance.
#[inline]
pub fn distance_squared(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Removes the components of `v` along each of the unit vectors in `basis`.
fn orthogonalize(v: &mut [f64], basis: &[Vec<f64>]) {
    for b in basis {
        let proj = dot(v, b);
        for (x, y) in v.iter_mut().zip(b) {
            *x -= proj * y;
        }
    }
}

/// Flips `v` so that its largest-magnitude entry is positive.
///
/// Eigenvectors are only defined up to sign; fixing it keeps projections
/// stable across runs and seeds.
pub fn fix_sign(v: &mut [f64]) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v.iter_mut().for_each(|x| *x = -*x);
    }
}

/// Leading `k` eigenpairs of a symmetric positive semi-definite operator.
///
/// `apply(v, out)` must write `A v` into `out`. Uses power iteration with
/// deflation by orthogonalization against the vectors already found.
/// Eigenvalues are returned in decreasing order; an operator with rank
/// below `k` yields zero eigenvalues for the remainder.
pub fn top_eigenpairs<F, R>(dim: usize, k: usize, apply: F, rng: &mut R) -> Vec<(f64, Vec<f64>)>
where
    F: Fn(&[f64], &mut [f64]),
    R: Rng,
{
    let mut found: Vec<Vec<f64>> = Vec::with_capacity(k);
    let mut pairs = Vec::with_capacity(k);
    if dim == 0 {
        return (0..k).map(|_| (0.0, Vec::new())).collect();
    }

    let mut w = vec![0.0; dim];
    for _ in 0..k {
        let mut v: Vec<f64> = (0..dim).map(|_| rng.sample(StandardNormal)).collect();
        orthogonalize(&mut v, &found);
        let n = norm(&v);
        if n > 0.0 {
            v.iter_mut().for_each(|x| *x /= n);
        }

        let mut lambda = 0.0;
        for _ in 0..POWER_MAX_ITERATIONS {
            apply(&v, &mut w);
            orthogonalize(&mut w, &found);
            let next_lambda = dot(&v, &w);
            let n = norm(&w);
            if n <= f64::EPSILON {
                lambda = 0.0;
                break;
            }

            let mut delta = 0.0;
            for (x, y) in v.iter_mut().zip(&w) {
                let y = y / n;
                delta += (*x - y).powi(2);
                *x = y;
            }
            lambda = next_lambda;
            if delta.sqrt() <= POWER_TOLERANCE {
                break;
            }
        }

        fix_sign(&mut v);
        found.push(v.clone());
        pairs.push((lambda.max(0.0), v));
    }

    pairs
}
