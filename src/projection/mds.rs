//! Metric multidimensional scaling.
//!
//! Starts from classical (Torgerson) scaling and refines the layout with
//! SMACOF stress majorization:
//!
//! - Borg & Groenen (2005): "Modern Multidimensional Scaling", ch. 8

use crate::config::ProjectionConfig;
use crate::dataset::FeatureView;
use crate::error::{Result, TesseraError};
use crate::projection::distance::Dissimilarity;
use crate::projection::linalg::{dot, top_eigenpairs};
use crate::projection::pca::RANK_TOLERANCE;
use crate::projection::{seeded_rng, Projector};
use log::debug;
use rayon::prelude::*;

/// Distance-preserving projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mds {
    /// Dissimilarity between feature vectors.
    pub dissimilarity: Dissimilarity,
    /// Maximum SMACOF iterations.
    pub max_iterations: usize,
    /// Stop when the relative stress decrease falls below this value.
    pub tolerance: f64,
    /// Seed for the classical scaling eigen solve.
    pub seed: Option<u64>,
}

impl Mds {
    /// Creates an MDS projector from configuration.
    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self {
            dissimilarity: if config.use_cosine {
                Dissimilarity::Cosine
            } else {
                Dissimilarity::Euclidean
            },
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            seed: config.seed,
        }
    }

    /// Classical scaling of an `n x n` dissimilarity matrix.
    pub fn classical(&self, delta: &[f64], n: usize) -> Vec<[f64; 2]> {
        if n == 0 {
            return Vec::new();
        }

        // B = -1/2 J D^2 J
        let sq: Vec<f64> = delta.iter().map(|d| d * d).collect();
        let row_means: Vec<f64> = sq.chunks(n).map(|r| r.iter().sum::<f64>() / n as f64).collect();
        let grand_mean = row_means.iter().sum::<f64>() / n as f64;
        let mut b = vec![0.0; n * n];
        b.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            for (j, v) in row.iter_mut().enumerate() {
                *v = -0.5 * (sq[i * n + j] - row_means[i] - row_means[j] + grand_mean);
            }
        });

        // Non-Euclidean dissimilarities make B indefinite. Shifting by a
        // Gershgorin bound keeps the spectrum non-negative for power iteration.
        let shift = b
            .chunks(n)
            .map(|r| r.iter().map(|v| v.abs()).sum::<f64>())
            .fold(0.0, f64::max);
        let apply = |v: &[f64], out: &mut [f64]| {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(i, o)| *o = dot(&b[i * n..(i + 1) * n], v) + shift * v[i]);
        };
        let mut rng = seeded_rng(self.seed);
        let pairs: Vec<(f64, Vec<f64>)> = top_eigenpairs(n, 2, apply, &mut rng)
            .into_iter()
            .map(|(lambda, v)| ((lambda - shift).max(0.0), v))
            .collect();
        let leading = pairs.first().map(|p| p.0).unwrap_or(0.0);

        (0..n)
            .map(|i| {
                let mut out = [0.0; 2];
                for (axis, (lambda, v)) in pairs.iter().enumerate() {
                    if *lambda > RANK_TOLERANCE * leading {
                        out[axis] = v[i] * lambda.sqrt();
                    }
                }
                out
            })
            .collect()
    }

    /// Raw stress: sum over pairs of `(delta_ij - d_ij)^2`.
    pub fn stress(delta: &[f64], layout: &[[f64; 2]]) -> f64 {
        let n = layout.len();
        let per_row: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|i| {
                (i + 1..n)
                    .map(|j| (delta[i * n + j] - planar_distance(layout[i], layout[j])).powi(2))
                    .sum::<f64>()
            })
            .collect();
        per_row.iter().sum()
    }

    /// Runs SMACOF from `layout` until convergence or the iteration limit.
    pub fn smacof(&self, delta: &[f64], mut layout: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
        let n = layout.len();
        if n < 2 {
            return layout;
        }

        let mut stress = Self::stress(delta, &layout);
        for iteration in 0..self.max_iterations {
            // Guttman transform: X <- (1/n) B(X) X
            let next: Vec<[f64; 2]> = (0..n)
                .into_par_iter()
                .map(|i| {
                    let xi = layout[i];
                    let mut acc = [0.0; 2];
                    for j in 0..n {
                        if i == j {
                            continue;
                        }
                        let d = planar_distance(xi, layout[j]);
                        if d > 0.0 {
                            let w = delta[i * n + j] / d;
                            acc[0] += w * (xi[0] - layout[j][0]);
                            acc[1] += w * (xi[1] - layout[j][1]);
                        }
                    }
                    [acc[0] / n as f64, acc[1] / n as f64]
                })
                .collect();

            let next_stress = Self::stress(delta, &next);
            layout = next;
            let improvement = stress - next_stress;
            stress = next_stress;

            if stress <= f64::EPSILON || improvement <= self.tolerance * stress {
                debug!("SMACOF converged after {} iterations, stress {:.6}", iteration + 1, stress);
                break;
            }
        }
        layout
    }
}

#[inline]
fn planar_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

impl Projector for Mds {
    fn name(&self) -> &'static str {
        "mds"
    }

    fn project(&self, data: FeatureView<'_>) -> Result<Vec<[f64; 2]>> {
        let n = data.rows();
        let delta = self.dissimilarity.pairwise(data);
        let init = self.classical(&delta, n);
        let layout = self.smacof(&delta, init);

        if layout.iter().flatten().any(|v| !v.is_finite()) {
            return Err(TesseraError::Projection(
                "MDS produced non-finite coordinates".to_string(),
            ));
        }
        Ok(layout)
    }
}
