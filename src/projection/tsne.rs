//! Exact t-distributed stochastic neighbor embedding.
//!
//! - van der Maaten & Hinton (2008): "Visualizing Data using t-SNE"
//!
//! Input affinities are calibrated per point to the configured perplexity,
//! the layout starts from PCA scaled down to a tiny spread, and gradient
//! descent runs with early exaggeration, momentum and per-coordinate gains.
//! Cost is O(n^2) per iteration.

use crate::config::ProjectionConfig;
use crate::dataset::FeatureView;
use crate::error::{Result, TesseraError};
use crate::projection::distance::pairwise_squared_euclidean;
use crate::projection::pca::Pca;
use crate::projection::Projector;
use log::{debug, warn};
use rayon::prelude::*;

const EARLY_EXAGGERATION: f64 = 12.0;
const EXAGGERATION_ITERATIONS: usize = 100;
const MIN_LEARNING_RATE: f64 = 50.0;
const INITIAL_MOMENTUM: f64 = 0.5;
const FINAL_MOMENTUM: f64 = 0.8;
const MIN_GAIN: f64 = 0.01;
const MIN_PROBABILITY: f64 = 1e-12;
const INIT_SPREAD: f64 = 1e-4;
const PERPLEXITY_TOLERANCE: f64 = 1e-5;
const PERPLEXITY_STEPS: usize = 100;

/// Neighbor-preserving projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tsne {
    /// Target perplexity.
    pub perplexity: f64,
    /// Gradient descent step size. `None` scales it with the number of points.
    pub learning_rate: Option<f64>,
    /// Number of gradient steps.
    pub max_iterations: usize,
    /// Seed for the PCA initialization.
    pub seed: Option<u64>,
}

impl Tsne {
    /// Creates a t-SNE projector from configuration.
    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self {
            perplexity: config.perplexity,
            learning_rate: config.learning_rate,
            max_iterations: config.max_iterations,
            seed: config.seed,
        }
    }

    /// Perplexity actually used for `n` points.
    ///
    /// A point has only `n - 1` neighbors, so large perplexities are capped.
    pub fn effective_perplexity(&self, n: usize) -> f64 {
        let cap = ((n.saturating_sub(1)) as f64 / 3.0).max(1.0);
        self.perplexity.min(cap)
    }

    /// Step size used for `n` points: the configured rate, or
    /// `max(n / 48, 50)`.
    pub fn effective_learning_rate(&self, n: usize) -> f64 {
        self.learning_rate
            .unwrap_or_else(|| (n as f64 / EARLY_EXAGGERATION / 4.0).max(MIN_LEARNING_RATE))
    }

    /// Symmetric joint probabilities `P`, row-major `n x n`.
    pub fn joint_probabilities(&self, sq_dist: &[f64], n: usize) -> Vec<f64> {
        if n == 0 {
            return Vec::new();
        }
        let target_entropy = self.effective_perplexity(n).ln();

        let mut conditional = vec![0.0; n * n];
        conditional
            .par_chunks_mut(n)
            .enumerate()
            .for_each(|(i, row)| calibrate_row(&sq_dist[i * n..(i + 1) * n], i, target_entropy, row));

        let mut p = vec![0.0; n * n];
        let denom = 2.0 * n as f64;
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    p[i * n + j] =
                        ((conditional[i * n + j] + conditional[j * n + i]) / denom).max(MIN_PROBABILITY);
                }
            }
        }
        p
    }

    /// Kullback-Leibler divergence of the layout's `Q` from `P`.
    pub fn kl_divergence(p: &[f64], layout: &[[f64; 2]]) -> f64 {
        let n = layout.len();
        let (num, sum) = student_kernel(layout);
        let mut kl = 0.0;
        for i in 0..n {
            for j in 0..n {
                let pij = p[i * n + j];
                if i != j && pij > 0.0 {
                    let q = (num[i * n + j] / sum).max(MIN_PROBABILITY);
                    kl += pij * (pij / q).ln();
                }
            }
        }
        kl
    }

    /// Optimizes a layout for the joint probabilities `p`.
    pub fn optimize(&self, p: &[f64], mut layout: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
        let n = layout.len();
        if n < 2 {
            return layout;
        }

        let exaggeration_steps = EXAGGERATION_ITERATIONS.min(self.max_iterations);
        let learning_rate = self.effective_learning_rate(n);
        let mut update = vec![[0.0f64; 2]; n];
        let mut gains = vec![[1.0f64; 2]; n];

        for iteration in 0..self.max_iterations {
            let (exaggeration, momentum) = if iteration < exaggeration_steps {
                (EARLY_EXAGGERATION, INITIAL_MOMENTUM)
            } else {
                (1.0, FINAL_MOMENTUM)
            };

            let (num, sum) = student_kernel(&layout);
            let grad: Vec<[f64; 2]> = (0..n)
                .into_par_iter()
                .map(|i| {
                    let mut g = [0.0; 2];
                    for j in 0..n {
                        if i == j {
                            continue;
                        }
                        let w = num[i * n + j];
                        let mult = (exaggeration * p[i * n + j] - w / sum) * w;
                        g[0] += mult * (layout[i][0] - layout[j][0]);
                        g[1] += mult * (layout[i][1] - layout[j][1]);
                    }
                    [4.0 * g[0], 4.0 * g[1]]
                })
                .collect();

            for i in 0..n {
                for axis in 0..2 {
                    let same_direction = (grad[i][axis] > 0.0) == (update[i][axis] > 0.0);
                    gains[i][axis] = if same_direction {
                        (gains[i][axis] * 0.8).max(MIN_GAIN)
                    } else {
                        gains[i][axis] + 0.2
                    };
                    update[i][axis] =
                        momentum * update[i][axis] - learning_rate * gains[i][axis] * grad[i][axis];
                    layout[i][axis] += update[i][axis];
                }
            }

            // Keep the layout centered.
            for axis in 0..2 {
                let mean = layout.iter().map(|p| p[axis]).sum::<f64>() / n as f64;
                layout.iter_mut().for_each(|p| p[axis] -= mean);
            }

            if iteration == exaggeration_steps || iteration + 1 == self.max_iterations {
                debug!(
                    "t-SNE iteration {}/{}: KL={:.5}",
                    iteration + 1,
                    self.max_iterations,
                    Self::kl_divergence(p, &layout)
                );
            }
        }
        layout
    }
}

/// Finds the Gaussian precision for point `i` whose conditional distribution
/// has entropy `target` (natural log), writing the distribution into `out`.
fn calibrate_row(sq_dist: &[f64], i: usize, target: f64, out: &mut [f64]) {
    let mut beta = 1.0;
    let mut beta_min = f64::NEG_INFINITY;
    let mut beta_max = f64::INFINITY;

    for _ in 0..PERPLEXITY_STEPS {
        let entropy = conditional_row(sq_dist, i, beta, out);
        let diff = entropy - target;
        if diff.abs() < PERPLEXITY_TOLERANCE {
            return;
        }
        if diff > 0.0 {
            beta_min = beta;
            beta = if beta_max.is_finite() {
                (beta + beta_max) / 2.0
            } else {
                beta * 2.0
            };
        } else {
            beta_max = beta;
            beta = if beta_min.is_finite() {
                (beta + beta_min) / 2.0
            } else {
                beta / 2.0
            };
        }
    }
}

/// Writes `p_{j|i}` for precision `beta` into `out` and returns its entropy.
fn conditional_row(sq_dist: &[f64], i: usize, beta: f64, out: &mut [f64]) -> f64 {
    // Subtracting the nearest neighbor distance avoids underflow for large beta.
    let nearest = sq_dist
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .map(|(_, d)| *d)
        .fold(f64::INFINITY, f64::min);

    let mut sum = 0.0;
    for (j, (o, d)) in out.iter_mut().zip(sq_dist).enumerate() {
        *o = if j == i { 0.0 } else { (-(d - nearest) * beta).exp() };
        sum += *o;
    }
    if sum <= 0.0 {
        return 0.0;
    }

    let mut entropy = 0.0;
    for (j, (o, d)) in out.iter_mut().zip(sq_dist).enumerate() {
        *o /= sum;
        if j != i && *o > 0.0 {
            entropy += beta * (d - nearest) * *o;
        }
    }
    entropy + sum.ln()
}

/// Student-t kernel `1 / (1 + |y_i - y_j|^2)` with zero diagonal, and its sum.
fn student_kernel(layout: &[[f64; 2]]) -> (Vec<f64>, f64) {
    let n = layout.len();
    let mut num = vec![0.0; n * n];
    let row_sums: Vec<f64> = num
        .par_chunks_mut(n.max(1))
        .enumerate()
        .map(|(i, row)| {
            let mut s = 0.0;
            for (j, v) in row.iter_mut().enumerate() {
                if i != j {
                    let dx = layout[i][0] - layout[j][0];
                    let dy = layout[i][1] - layout[j][1];
                    *v = 1.0 / (1.0 + dx * dx + dy * dy);
                    s += *v;
                }
            }
            s
        })
        .collect();
    let sum = row_sums.iter().sum::<f64>().max(MIN_PROBABILITY);
    (num, sum)
}

impl Projector for Tsne {
    fn name(&self) -> &'static str {
        "tsne"
    }

    fn project(&self, data: FeatureView<'_>) -> Result<Vec<[f64; 2]>> {
        let n = data.rows();
        if n < 2 {
            return Ok(vec![[0.0, 0.0]; n]);
        }
        if self.perplexity > self.effective_perplexity(n) {
            warn!(
                "Perplexity {} too large for {} points, using {:.2}",
                self.perplexity,
                n,
                self.effective_perplexity(n)
            );
        }

        let sq_dist = pairwise_squared_euclidean(data);
        let p = self.joint_probabilities(&sq_dist, n);

        let mut init = Pca { seed: self.seed }.scores(data);
        let std = {
            let mean = init.iter().map(|p| p[0]).sum::<f64>() / n as f64;
            (init.iter().map(|p| (p[0] - mean).powi(2)).sum::<f64>() / n as f64).sqrt()
        };
        if std > 0.0 {
            let scale = INIT_SPREAD / std;
            init.iter_mut().for_each(|p| {
                p[0] *= scale;
                p[1] *= scale;
            });
        }

        let layout = self.optimize(&p, init);
        if layout.iter().flatten().any(|v| !v.is_finite()) {
            return Err(TesseraError::Projection(
                "t-SNE diverged to non-finite coordinates".to_string(),
            ));
        }
        Ok(layout)
    }
}
