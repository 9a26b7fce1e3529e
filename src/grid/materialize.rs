//! Turning a solved assignment into an ordered image grid.

use crate::assign::{Assignment, EMPTY_CELL};
use crate::grid::{GridPosition, GridShape};
use serde::Serialize;

/// The final layout: payloads in row-major cell order plus the integer
/// position of every original data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridResult<P> {
    shape: GridShape,
    /// Payload per cell, row-major. `None` marks an empty cell.
    slots: Vec<Option<P>>,
    /// Point index per cell, row-major.
    cell_indices: Vec<Option<usize>>,
    /// Integer (column, row) of every point, in original order.
    positions: Vec<GridPosition>,
    /// Total assignment cost.
    cost: f64,
}

impl<P> GridResult<P> {
    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Total assignment cost.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Row-major payload slots.
    #[inline]
    pub fn slots(&self) -> &[Option<P>] {
        &self.slots
    }

    /// Consumes the result, returning the row-major slots.
    pub fn into_slots(self) -> Vec<Option<P>> {
        self.slots
    }

    /// Payload in the cell at `(col, row)`, if the cell exists and is filled.
    pub fn slot(&self, col: usize, row: usize) -> Option<&P> {
        if col >= self.shape.size_x || row >= self.shape.size_y {
            return None;
        }
        self.slots[row * self.shape.size_x + col].as_ref()
    }

    /// Integer position of the point with original index `index`.
    #[inline]
    pub fn position_of(&self, index: usize) -> Option<GridPosition> {
        self.positions.get(index).copied()
    }

    /// Positions of all points, in original order.
    #[inline]
    pub fn positions(&self) -> &[GridPosition] {
        &self.positions
    }

    /// Point index per cell, row-major.
    #[inline]
    pub fn cell_indices(&self) -> &[Option<usize>] {
        &self.cell_indices
    }

    /// Point index per cell with [`EMPTY_CELL`] for empty cells.
    pub fn grid_indices(&self) -> Vec<isize> {
        self.cell_indices
            .iter()
            .map(|p| p.map_or(EMPTY_CELL, |p| p as isize))
            .collect()
    }

    /// Iterates over the grid one row at a time.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<P>]> {
        // `max(1)` keeps `chunks` valid for a zero-width grid, which has no slots.
        self.slots.chunks(self.shape.size_x.max(1))
    }

    /// Number of cells holding a payload.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Number of empty cells.
    pub fn empty(&self) -> usize {
        self.slots.len() - self.filled()
    }
}

/// Builds a [`GridResult`] from an assignment and the payloads in original
/// order.
///
/// Point positions come from rescaling each matched cell's normalized
/// coordinate by the grid dimensions.
pub fn materialize<P: Clone>(assignment: &Assignment, payloads: &[P]) -> GridResult<P> {
    let lattice = assignment.lattice();

    let slots = assignment
        .cell_to_point()
        .iter()
        .map(|p| p.and_then(|p| payloads.get(p).cloned()))
        .collect();

    let positions = assignment
        .cell_coordinates()
        .into_iter()
        .map(|coord| lattice.rescale(coord))
        .collect();

    GridResult {
        shape: lattice.shape(),
        slots,
        cell_indices: assignment.cell_to_point().to_vec(),
        positions,
        cost: assignment.cost(),
    }
}
