//! Pairwise dissimilarities between feature vectors.

use crate::dataset::FeatureView;
use crate::projection::linalg::{distance_squared, dot, norm};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How dissimilarity between two feature vectors is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dissimilarity {
    /// Euclidean distance.
    #[default]
    Euclidean,
    /// One minus cosine similarity. A zero vector is at distance 1 from
    /// everything but itself.
    Cosine,
}

impl Dissimilarity {
    /// Full symmetric `n x n` matrix, row-major, zero diagonal.
    pub fn pairwise(&self, data: FeatureView<'_>) -> Vec<f64> {
        let n = data.rows();
        let mut out = vec![0.0; n * n];
        if n == 0 {
            return out;
        }

        let norms: Vec<f64> = match self {
            Dissimilarity::Cosine => (0..n).map(|i| norm(data.row(i))).collect(),
            Dissimilarity::Euclidean => Vec::new(),
        };

        out.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            let a = data.row(i);
            for (j, d) in row.iter_mut().enumerate() {
                if i == j {
                    continue;
                }
                let b = data.row(j);
                *d = match self {
                    Dissimilarity::Euclidean => distance_squared(a, b).sqrt(),
                    Dissimilarity::Cosine => {
                        let denom = norms[i] * norms[j];
                        if denom > 0.0 {
                            (1.0 - dot(a, b) / denom).max(0.0)
                        } else {
                            1.0
                        }
                    }
                };
            }
        });
        out
    }
}

/// Squared Euclidean distances between all rows, row-major.
pub fn pairwise_squared_euclidean(data: FeatureView<'_>) -> Vec<f64> {
    let n = data.rows();
    let mut out = vec![0.0; n * n];
    if n == 0 {
        return out;
    }
    out.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
        let a = data.row(i);
        for (j, d) in row.iter_mut().enumerate() {
            if i != j {
                *d = distance_squared(a, data.row(j));
            }
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean() {
        let buf = [0.0, 0.0, 3.0, 4.0, 6.0, 8.0];
        let view = FeatureView::new(&buf, 2).unwrap();
        let d = Dissimilarity::Euclidean.pairwise(view);
        assert_eq!(d.len(), 9);
        assert_eq!(d[1], 5.0);
        assert_eq!(d[2], 10.0);
        assert_eq!(d[3], 5.0);
        assert_eq!(d[4], 0.0);
    }

    #[test]
    fn test_cosine() {
        let buf = [1.0, 0.0, 0.0, 2.0, 3.0, 0.0, 0.0, 0.0];
        let view = FeatureView::new(&buf, 2).unwrap();
        let d = Dissimilarity::Cosine.pairwise(view);
        // Orthogonal vectors.
        assert!((d[1] - 1.0).abs() < 1e-12);
        // Parallel vectors.
        assert!(d[2].abs() < 1e-12);
        // Zero vector.
        assert_eq!(d[3], 1.0);
        assert_eq!(d[15], 0.0);
    }

    #[test]
    fn test_squared() {
        let buf = [0.0, 0.0, 3.0, 4.0];
        let view = FeatureView::new(&buf, 2).unwrap();
        assert_eq!(pairwise_squared_euclidean(view), vec![0.0, 25.0, 25.0, 0.0]);
    }
}
