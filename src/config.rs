//! Configuration for the Tessera grid layout engine.

use crate::error::{Result, TesseraError};
use crate::grid::KurtosisBias;
use crate::projection::ReductionMethod;
use serde::{Deserialize, Serialize};

/// Main configuration for the Tessera engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grid shape configuration.
    pub grid: GridConfig,

    /// Dimensionality reduction configuration.
    pub projection: ProjectionConfig,
}

impl Config {
    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.projection.validate()
    }
}

/// Grid shape configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns.
    /// Default: None (computed from the data). Zero also means "computed".
    pub size_x: Option<usize>,

    /// Number of rows.
    /// Default: None (computed from the data). Zero also means "computed".
    pub size_y: Option<usize>,

    /// Skip the kurtosis shape bias and use the minimal square.
    /// Default: false.
    pub use_default_square: bool,

    /// Shape bias applied when the grid size is computed.
    /// Default: scale 2.0, ceiling of the absolute value.
    pub kurtosis: KurtosisBias,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size_x: None,
            size_y: None,
            use_default_square: false,
            kurtosis: KurtosisBias::default(),
        }
    }
}

impl GridConfig {
    /// Creates a configuration with an explicit grid size.
    pub fn with_size(size_x: usize, size_y: usize) -> Self {
        Self {
            size_x: Some(size_x),
            size_y: Some(size_y),
            ..Default::default()
        }
    }

    /// Creates a configuration that computes the minimal square grid.
    pub fn square() -> Self {
        Self {
            use_default_square: true,
            ..Default::default()
        }
    }

    /// Requested width, with zero treated as absent.
    #[inline]
    pub fn width(&self) -> Option<usize> {
        self.size_x.filter(|&x| x > 0)
    }

    /// Requested height, with zero treated as absent.
    #[inline]
    pub fn height(&self) -> Option<usize> {
        self.size_y.filter(|&y| y > 0)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.kurtosis.scale.is_finite() || self.kurtosis.scale < 0.0 {
            return Err(TesseraError::Config(format!(
                "kurtosis scale must be a non-negative finite number, got {}",
                self.kurtosis.scale
            )));
        }
        Ok(())
    }
}

/// Dimensionality reduction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Reduction method.
    /// Default: MDS.
    pub method: ReductionMethod,

    /// Use cosine dissimilarities instead of Euclidean distances (MDS only).
    /// Default: false.
    pub use_cosine: bool,

    /// Random seed for reproducibility.
    /// Default: Some(42). None draws from entropy.
    pub seed: Option<u64>,

    /// Maximum number of optimization iterations (MDS stress majorization,
    /// t-SNE gradient steps).
    /// Default: 300.
    pub max_iterations: usize,

    /// Relative convergence tolerance for iterative methods.
    /// Default: 1e-4.
    pub tolerance: f64,

    /// t-SNE perplexity (effective number of neighbors).
    /// Default: 30.0.
    pub perplexity: f64,

    /// t-SNE gradient descent learning rate.
    /// Default: None (scaled with the number of points, at least 50).
    pub learning_rate: Option<f64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            method: ReductionMethod::default(),
            use_cosine: false,
            seed: Some(42),
            max_iterations: 300,
            tolerance: 1e-4,
            perplexity: 30.0,
            learning_rate: None,
        }
    }
}

impl ProjectionConfig {
    /// Creates a configuration for the given method with default parameters.
    pub fn for_method(method: ReductionMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(TesseraError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(TesseraError::Config(format!(
                "tolerance must be a non-negative finite number, got {}",
                self.tolerance
            )));
        }
        if !(self.perplexity.is_finite() && self.perplexity > 0.0) {
            return Err(TesseraError::Config(format!(
                "perplexity must be positive, got {}",
                self.perplexity
            )));
        }
        if let Some(rate) = self.learning_rate {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(TesseraError::Config(format!(
                    "learning_rate must be positive, got {}",
                    rate
                )));
            }
        }
        Ok(())
    }
}
