//! Error types for the Tessera grid layout engine.

use thiserror::Error;

/// The main error type for Tessera operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TesseraError {
    /// The requested grid cannot hold every data point.
    #[error("Grid too small: {cells} cells for {points} points")]
    PreconditionViolation {
        /// Number of cells in the requested grid.
        cells: usize,
        /// Number of data points to place.
        points: usize,
    },

    /// The assignment solver could not find a feasible matching.
    #[error("Assignment infeasible: {0}")]
    SolverInfeasible(String),

    /// A feature vector does not match the dataset dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension every row must have.
        expected: usize,
        /// Dimension of the offending row.
        actual: usize,
    },

    /// A projection returned a different number of points than the dataset holds.
    #[error("Projection returned {actual} points for {expected} data points")]
    ProjectionMismatch {
        /// Number of points in the dataset.
        expected: usize,
        /// Number of points produced by the projection.
        actual: usize,
    },

    /// Input contains values the pipeline cannot use (NaN, infinities).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dimensionality reduction failed.
    #[error("Projection error: {0}")]
    Projection(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Tessera operations.
pub type Result<T> = std::result::Result<T, TesseraError>;
