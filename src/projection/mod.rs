//! Dimensionality reduction from feature vectors to the plane.
//!
//! Every method implements [`Projector`]; the pipeline only relies on the
//! output being one finite 2D point per input row, in input order.

pub mod distance;
mod linalg;
mod mds;
mod pca;
mod tsne;

pub use distance::Dissimilarity;
pub use mds::Mds;
pub use pca::Pca;
pub use tsne::Tsne;

use crate::config::ProjectionConfig;
use crate::dataset::FeatureView;
use crate::error::{Result, TesseraError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait for reducing feature vectors to 2D coordinates.
pub trait Projector: Send + Sync {
    /// Short name of the method, used in logs.
    fn name(&self) -> &'static str;

    /// Projects every row of `data` to the plane.
    ///
    /// Must return exactly `data.rows()` points, index-aligned with the rows.
    fn project(&self, data: FeatureView<'_>) -> Result<Vec<[f64; 2]>>;
}

/// Enum for the built-in reduction methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionMethod {
    /// Metric multidimensional scaling (distance-based).
    #[default]
    Mds,
    /// Principal component analysis (variance-based).
    Pca,
    /// t-distributed stochastic neighbor embedding (neighbor-based).
    Tsne,
}

impl ReductionMethod {
    /// All built-in methods.
    pub const ALL: [ReductionMethod; 3] = [Self::Mds, Self::Pca, Self::Tsne];

    /// Lowercase name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReductionMethod::Mds => "mds",
            ReductionMethod::Pca => "pca",
            ReductionMethod::Tsne => "tsne",
        }
    }

    /// Creates the projector for this method.
    pub fn projector(&self, config: &ProjectionConfig) -> Box<dyn Projector> {
        match self {
            ReductionMethod::Mds => Box::new(Mds::from_config(config)),
            ReductionMethod::Pca => Box::new(Pca::from_config(config)),
            ReductionMethod::Tsne => Box::new(Tsne::from_config(config)),
        }
    }
}

impl fmt::Display for ReductionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReductionMethod {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                TesseraError::Config(format!(
                    "unknown reduction method '{}', expected one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Validates `config` and creates the projector it selects.
pub fn projector(config: &ProjectionConfig) -> Result<Box<dyn Projector>> {
    config.validate()?;
    Ok(config.method.projector(config))
}

/// Random number generator for a projector, reproducible when seeded.
pub(crate) fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method() {
        assert_eq!("mds".parse::<ReductionMethod>().unwrap(), ReductionMethod::Mds);
        assert_eq!(" PCA ".parse::<ReductionMethod>().unwrap(), ReductionMethod::Pca);
        assert_eq!("tsne".parse::<ReductionMethod>().unwrap(), ReductionMethod::Tsne);

        let err = "umap".parse::<ReductionMethod>().unwrap_err();
        assert!(matches!(err, TesseraError::Config(_)));
        assert!(err.to_string().contains("mds, pca, tsne"));
    }

    #[test]
    fn test_display_round_trips() {
        for method in ReductionMethod::ALL {
            assert_eq!(method.to_string().parse::<ReductionMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_projector_names() {
        for method in ReductionMethod::ALL {
            let config = ProjectionConfig::for_method(method);
            assert_eq!(projector(&config).unwrap().name(), method.as_str());
        }
    }

    #[test]
    fn test_projector_rejects_bad_config() {
        let config = ProjectionConfig {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(projector(&config).is_err());
    }

    #[test]
    fn test_every_method_is_index_aligned() {
        let buf: Vec<f64> = (0..30).map(|i| ((i * 37) % 11) as f64).collect();
        let view = FeatureView::new(&buf, 3).unwrap();
        for method in ReductionMethod::ALL {
            let config = ProjectionConfig {
                perplexity: 3.0,
                ..ProjectionConfig::for_method(method)
            };
            let points = projector(&config).unwrap().project(view).unwrap();
            assert_eq!(points.len(), 10, "{}", method);
            assert!(points.iter().flatten().all(|v| v.is_finite()), "{}", method);
        }
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        use rand::Rng;
        let a: u64 = seeded_rng(Some(7)).gen();
        let b: u64 = seeded_rng(Some(7)).gen();
        assert_eq!(a, b);
    }
}
