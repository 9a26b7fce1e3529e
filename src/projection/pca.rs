//! Principal component analysis.

use crate::config::ProjectionConfig;
use crate::dataset::FeatureView;
use crate::error::Result;
use crate::projection::linalg::{dot, top_eigenpairs};
use crate::projection::{seeded_rng, Projector};
use rayon::prelude::*;

/// Eigenvalues below this fraction of the leading one are treated as zero.
pub(crate) const RANK_TOLERANCE: f64 = 1e-12;

/// Projects onto the two directions of largest variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pca {
    /// Seed for the power iteration start vectors.
    pub seed: Option<u64>,
}

impl Pca {
    /// Creates a PCA projector from configuration.
    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self { seed: config.seed }
    }

    /// Principal component scores, `n x 2`.
    ///
    /// Shared with t-SNE, which starts from the PCA layout.
    pub(crate) fn scores(&self, data: FeatureView<'_>) -> Vec<[f64; 2]> {
        let n = data.rows();
        let dim = data.dim();
        if n == 0 {
            return Vec::new();
        }

        let mut mean = vec![0.0; dim];
        for i in 0..n {
            for (m, x) in mean.iter_mut().zip(data.row(i)) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n as f64);

        let centered: Vec<f64> = (0..n)
            .flat_map(|i| data.row(i).iter().zip(&mean).map(|(x, m)| x - m))
            .collect();
        let row = |i: usize| &centered[i * dim..(i + 1) * dim];

        // Covariance times v, without forming the covariance matrix.
        let apply = |v: &[f64], out: &mut [f64]| {
            let proj: Vec<f64> = (0..n).into_par_iter().map(|i| dot(row(i), v)).collect();
            out.iter_mut().for_each(|o| *o = 0.0);
            for (i, p) in proj.iter().enumerate() {
                for (o, x) in out.iter_mut().zip(row(i)) {
                    *o += p * x;
                }
            }
            out.iter_mut().for_each(|o| *o /= n as f64);
        };

        let mut rng = seeded_rng(self.seed);
        let pairs = top_eigenpairs(dim, 2, apply, &mut rng);
        let leading = pairs.first().map(|p| p.0).unwrap_or(0.0);

        (0..n)
            .map(|i| {
                let mut out = [0.0; 2];
                for (axis, (lambda, v)) in pairs.iter().enumerate() {
                    if *lambda > RANK_TOLERANCE * leading {
                        out[axis] = dot(row(i), v);
                    }
                }
                out
            })
            .collect()
    }
}

impl Projector for Pca {
    fn name(&self) -> &'static str {
        "pca"
    }

    fn project(&self, data: FeatureView<'_>) -> Result<Vec<[f64; 2]>> {
        Ok(self.scores(data))
    }
}
