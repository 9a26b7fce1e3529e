//! # Tessera - Embedding Grid Layout
//!
//! Tessera places a collection of high-dimensional embeddings (typically one
//! per image) on a regular 2D grid so that each cell holds at most one item,
//! similar items end up next to each other, and the total displacement from
//! each item's projected position to its cell is minimal.
//!
//! ## Overview
//!
//! The pipeline runs in five stages:
//!
//! 1. **Projection** reduces each feature vector to a 2D point (MDS, PCA or
//!    t-SNE, or any custom [`Projector`]).
//! 2. **Normalization** rescales each axis to [0, 1].
//! 3. **Sizing** picks a grid shape with enough cells, optionally stretched
//!    along axes whose distribution is heavy-tailed.
//! 4. **Assignment** solves the rectangular linear assignment problem between
//!    grid cells and points exactly.
//! 5. **Materialization** lays the payloads out row-major and reports every
//!    item's integer grid position.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tessera::{Dataset, GridConfig, ImageGrid, ProjectionConfig};
//!
//! let dataset = Dataset::from_rows(embeddings.into_iter().zip(paths))?;
//! let grid = ImageGrid::new(dataset, &ProjectionConfig::default())?;
//!
//! // Shape computed from the data.
//! let layout = grid.process(&GridConfig::default())?;
//! for row in layout.rows() {
//!     // Each slot is `Some(path)` or `None` for an empty cell.
//! }
//!
//! // Same projection, explicit 10 x 8 grid.
//! let layout = grid.process(&GridConfig::with_size(10, 8))?;
//! ```
//!
//! ## Architecture
//!
//! - [`dataset`] - Input embeddings and payloads
//! - [`projection`] - Dimensionality reduction to the plane
//! - [`grid`] - Normalization, shape selection, lattice and output layout
//! - [`assign`] - Cost matrix and exact assignment solver
//! - [`pipeline`] - The [`ImageGrid`] orchestrator

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assign;
pub mod config;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod projection;

// Re-export commonly used types
pub use assign::{Assignment, AssignmentSolver, EMPTY_CELL};
pub use config::{Config, GridConfig, ProjectionConfig};
pub use dataset::{DataPoint, Dataset, FeatureView};
pub use error::{Result, TesseraError};
pub use grid::{
    BiasRounding, GridPosition, GridResult, GridShape, GridSizer, KurtosisBias, Lattice, ShapeBias,
    SquareBias,
};
pub use pipeline::ImageGrid;
pub use projection::{Dissimilarity, Mds, Pca, Projector, ReductionMethod, Tsne};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_empty_cell_sentinel() {
        assert_eq!(EMPTY_CELL, -1);
    }
}
