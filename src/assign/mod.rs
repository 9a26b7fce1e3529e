//! Optimal assignment of data points to grid cells.
//!
//! Every point is matched to exactly one distinct cell so that the sum of
//! squared Euclidean distances between each point and its cell's lattice
//! coordinate is as small as possible. Cells left over are empty.

mod cost;
pub mod lapjv;

pub use cost::CostMatrix;
pub use lapjv::LapSolution;

use crate::error::{Result, TesseraError};
use crate::grid::{GridPosition, Lattice};
use log::{debug, info};
use serde::Serialize;

/// Signed index reported for a cell that holds no point.
pub const EMPTY_CELL: isize = -1;

/// A solved cell ↔ point matching.
///
/// Holds both directions of the bijection between the grid's linear cell
/// order and the original data order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    lattice: Lattice,
    /// Point held by each cell, row-major.
    cell_to_point: Vec<Option<usize>>,
    /// Cell holding each point, in original order.
    point_to_cell: Vec<usize>,
    /// Sum of squared distances of matched pairs.
    cost: f64,
}

impl Assignment {
    /// An assignment with every cell empty.
    pub fn empty(lattice: Lattice) -> Self {
        Self {
            lattice,
            cell_to_point: vec![None; lattice.len()],
            point_to_cell: Vec::new(),
            cost: 0.0,
        }
    }

    /// Lattice the points were assigned to.
    #[inline]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Total cost of the matching.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Number of points.
    #[inline]
    pub fn points(&self) -> usize {
        self.point_to_cell.len()
    }

    /// Number of cells.
    #[inline]
    pub fn cells(&self) -> usize {
        self.cell_to_point.len()
    }

    /// Point held by cell `cell`, if any.
    #[inline]
    pub fn point_at(&self, cell: usize) -> Option<usize> {
        self.cell_to_point.get(cell).copied().flatten()
    }

    /// Cell holding point `point`.
    #[inline]
    pub fn cell_of(&self, point: usize) -> Option<usize> {
        self.point_to_cell.get(point).copied()
    }

    /// Grid position of point `point`.
    pub fn position_of(&self, point: usize) -> Option<GridPosition> {
        self.cell_of(point).and_then(|cell| self.lattice.position(cell))
    }

    /// Point per cell, row-major.
    #[inline]
    pub fn cell_to_point(&self) -> &[Option<usize>] {
        &self.cell_to_point
    }

    /// Cell per point, in original order.
    #[inline]
    pub fn point_to_cell(&self) -> &[usize] {
        &self.point_to_cell
    }

    /// Number of cells without a point.
    pub fn empty_cells(&self) -> usize {
        self.cells().saturating_sub(self.points())
    }

    /// Per-cell point indices with [`EMPTY_CELL`] for empty cells.
    pub fn grid_indices(&self) -> Vec<isize> {
        self.cell_to_point
            .iter()
            .map(|p| p.map_or(EMPTY_CELL, |p| p as isize))
            .collect()
    }

    /// Normalized lattice coordinate of each point's cell, in original order.
    pub fn cell_coordinates(&self) -> Vec<[f64; 2]> {
        self.point_to_cell
            .iter()
            .filter_map(|&cell| self.lattice.coordinate(cell))
            .collect()
    }
}

/// Builds the cell × point cost matrix and solves it exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentSolver;

impl AssignmentSolver {
    /// Creates a solver.
    pub fn new() -> Self {
        Self
    }

    /// Assigns normalized `points` to the cells of `lattice`.
    ///
    /// Fails with [`TesseraError::PreconditionViolation`] if the lattice has
    /// fewer cells than there are points.
    pub fn solve(&self, lattice: Lattice, points: &[[f64; 2]]) -> Result<Assignment> {
        let shape = lattice.shape();
        let entries = shape
            .checked_cells()
            .and_then(|cells| cells.checked_mul(points.len()));
        if entries.is_none() {
            return Err(TesseraError::Config(format!(
                "{}x{} grid with {} points is too large to solve",
                shape.size_x,
                shape.size_y,
                points.len()
            )));
        }
        if lattice.len() < points.len() {
            return Err(TesseraError::PreconditionViolation {
                cells: lattice.len(),
                points: points.len(),
            });
        }
        if points.is_empty() {
            debug!("No points to assign, {} empty cells", lattice.len());
            return Ok(Assignment::empty(lattice));
        }
        if let Some(i) = points.iter().position(|p| !(p[0].is_finite() && p[1].is_finite())) {
            return Err(TesseraError::InvalidInput(format!(
                "point {} has a non-finite coordinate",
                i
            )));
        }

        let cells = lattice.coordinates();
        let matrix = CostMatrix::squared_euclidean(&cells, points);
        debug!(
            "Solving assignment: {} cells x {} points",
            matrix.rows(),
            matrix.cols()
        );

        let solution = lapjv::solve(&matrix)?;

        let point_to_cell = solution
            .col_to_row
            .iter()
            .enumerate()
            .map(|(point, cell)| {
                cell.ok_or_else(|| {
                    TesseraError::SolverInfeasible(format!("point {} was left unassigned", point))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        info!(
            "Assigned {} points to {} cells, cost {:.6}",
            points.len(),
            lattice.len(),
            solution.cost
        );

        Ok(Assignment {
            lattice,
            cell_to_point: solution.row_to_col,
            point_to_cell,
            cost: solution.cost,
        })
    }
}
