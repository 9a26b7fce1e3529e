//! End-to-end layout: project, normalize, size, assign, materialize.

use crate::assign::AssignmentSolver;
use crate::config::{GridConfig, ProjectionConfig};
use crate::dataset::Dataset;
use crate::error::{Result, TesseraError};
use crate::grid::{materialize, normalize_by_span, GridResult, GridShape, GridSizer, Lattice};
use crate::projection::{self, Projector};
use log::{debug, info, warn};

/// A dataset together with its normalized 2D layout, ready to be placed on
/// grids of any shape.
///
/// Projection runs once at construction; [`ImageGrid::process`] can then be
/// called with different grid configurations.
#[derive(Debug, Clone)]
pub struct ImageGrid<P> {
    dataset: Dataset<P>,
    normalized: Vec<[f64; 2]>,
}

impl<P> ImageGrid<P> {
    /// Projects the dataset with the configured reduction method.
    pub fn new(dataset: Dataset<P>, config: &ProjectionConfig) -> Result<Self> {
        let projector = projection::projector(config)?;
        Self::with_projector(dataset, projector.as_ref())
    }

    /// Projects the dataset with a caller-supplied projector.
    pub fn with_projector(dataset: Dataset<P>, projector: &dyn Projector) -> Result<Self> {
        debug!(
            "Projecting {} points of dimension {} with {}",
            dataset.len(),
            dataset.dim(),
            projector.name()
        );
        let points = if dataset.is_empty() {
            Vec::new()
        } else {
            projector.project(dataset.view())?
        };
        Self::from_projection(dataset, points)
    }

    /// Uses precomputed 2D coordinates, one per dataset row in order.
    pub fn from_projection(dataset: Dataset<P>, points: Vec<[f64; 2]>) -> Result<Self> {
        if points.len() != dataset.len() {
            return Err(TesseraError::ProjectionMismatch {
                expected: dataset.len(),
                actual: points.len(),
            });
        }
        if let Some(i) = points.iter().position(|p| !(p[0].is_finite() && p[1].is_finite())) {
            return Err(TesseraError::InvalidInput(format!(
                "projected point {} has a non-finite coordinate",
                i
            )));
        }

        Ok(Self {
            normalized: normalize_by_span(&points),
            dataset,
        })
    }

    /// The input dataset.
    pub fn dataset(&self) -> &Dataset<P> {
        &self.dataset
    }

    /// Number of points to place.
    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    /// Whether there is nothing to place.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Projected coordinates scaled to [0, 1] per axis.
    pub fn normalized_points(&self) -> &[[f64; 2]] {
        &self.normalized
    }

    /// Consumes the grid and returns the dataset.
    pub fn into_dataset(self) -> Dataset<P> {
        self.dataset
    }

    /// Decides the grid shape for `config` using its kurtosis settings.
    pub fn resolve_shape(&self, config: &GridConfig) -> Result<GridShape> {
        self.resolve_shape_with(config, &GridSizer::new(config.kurtosis))
    }

    fn resolve_shape_with(&self, config: &GridConfig, sizer: &GridSizer) -> Result<GridShape> {
        config.validate()?;
        let n = self.len();

        let shape = match (config.width(), config.height()) {
            (Some(x), Some(y)) => GridShape::new(x, y),
            (Some(x), None) => GridShape::new(x, n.div_ceil(x).max(1)),
            (None, Some(y)) => GridShape::new(n.div_ceil(y).max(1), y),
            (None, None) => sizer.size(&self.normalized, config.use_default_square),
        };

        if shape.checked_cells().is_none() {
            return Err(TesseraError::Config(format!(
                "grid {}x{} has more cells than can be addressed",
                shape.size_x, shape.size_y
            )));
        }
        if !shape.fits(n) {
            return Err(TesseraError::PreconditionViolation {
                cells: shape.cells(),
                points: n,
            });
        }
        Ok(shape)
    }

    /// Places every point on a grid shaped by `config`.
    pub fn process(&self, config: &GridConfig) -> Result<GridResult<P>>
    where
        P: Clone,
    {
        self.process_with_sizer(config, &GridSizer::new(config.kurtosis))
    }

    /// Like [`ImageGrid::process`], but computed shapes come from `sizer`.
    pub fn process_with_sizer(&self, config: &GridConfig, sizer: &GridSizer) -> Result<GridResult<P>>
    where
        P: Clone,
    {
        let shape = self.resolve_shape_with(config, sizer)?;
        if self.is_empty() {
            warn!(
                "No points to place, returning an empty {}x{} grid",
                shape.size_x, shape.size_y
            );
        } else if self.len() < 2 && config.width().is_none() && config.height().is_none() {
            warn!("Fewer than two points, using the minimal square grid");
        }

        let assignment = AssignmentSolver::new().solve(Lattice::new(shape), &self.normalized)?;
        let result = materialize(&assignment, self.dataset.payloads());

        info!(
            "Placed {} points on a {}x{} grid ({} empty cells), cost {:.6}",
            result.filled(),
            shape.size_x,
            shape.size_y,
            result.empty(),
            result.cost()
        );
        Ok(result)
    }
}
