//! Regular lattice of grid cells and the cell index bijection.
//!
//! Cells are enumerated row-major: all columns of row 0, then row 1, and so
//! on, so the linear index of `(col, row)` is `row * size_x + col`. Each cell
//! sits at the normalized coordinate `(col / size_x, row / size_y)`, i.e. the
//! lower-left corner of its square on the unit square.

use serde::{Deserialize, Serialize};

/// Width and height of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    /// Number of columns.
    pub size_x: usize,
    /// Number of rows.
    pub size_y: usize,
}

impl GridShape {
    /// Creates a new shape.
    pub fn new(size_x: usize, size_y: usize) -> Self {
        Self { size_x, size_y }
    }

    /// Square shape of the given side.
    pub fn square(side: usize) -> Self {
        Self::new(side, side)
    }

    /// Total number of cells, saturating at `usize::MAX`.
    #[inline]
    pub fn cells(&self) -> usize {
        self.size_x.saturating_mul(self.size_y)
    }

    /// Total number of cells, or `None` if it overflows `usize`.
    #[inline]
    pub fn checked_cells(&self) -> Option<usize> {
        self.size_x.checked_mul(self.size_y)
    }

    /// Returns true if the grid can hold `points` items.
    #[inline]
    pub fn fits(&self, points: usize) -> bool {
        self.cells() >= points
    }
}

/// Integer position of a cell on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    /// Column (0 to size_x - 1).
    pub col: usize,
    /// Row (0 to size_y - 1).
    pub row: usize,
}

impl GridPosition {
    /// Create a new grid position.
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Convert from linear index to 2D position.
    #[inline]
    pub fn from_linear(index: usize, size_x: usize) -> Self {
        Self {
            col: index % size_x,
            row: index / size_x,
        }
    }

    /// Convert to linear index.
    #[inline]
    pub fn to_linear(&self, size_x: usize) -> usize {
        self.row * size_x + self.col
    }
}

/// The cells of a grid of a given shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lattice {
    shape: GridShape,
}

impl Lattice {
    /// Creates the lattice for `shape`.
    pub fn new(shape: GridShape) -> Self {
        Self { shape }
    }

    /// Grid shape.
    #[inline]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.shape.cells()
    }

    /// Returns true if the lattice has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the cell with linear index `index`.
    #[inline]
    pub fn position(&self, index: usize) -> Option<GridPosition> {
        if index < self.len() {
            Some(GridPosition::from_linear(index, self.shape.size_x))
        } else {
            None
        }
    }

    /// Linear index of the cell at `pos`.
    #[inline]
    pub fn index_of(&self, pos: GridPosition) -> Option<usize> {
        if pos.col < self.shape.size_x && pos.row < self.shape.size_y {
            Some(pos.to_linear(self.shape.size_x))
        } else {
            None
        }
    }

    /// Normalized coordinate of a cell position.
    #[inline]
    pub fn coordinate_of(&self, pos: GridPosition) -> [f64; 2] {
        [
            pos.col as f64 / self.shape.size_x as f64,
            pos.row as f64 / self.shape.size_y as f64,
        ]
    }

    /// Normalized coordinate of the cell with linear index `index`.
    #[inline]
    pub fn coordinate(&self, index: usize) -> Option<[f64; 2]> {
        self.position(index).map(|pos| self.coordinate_of(pos))
    }

    /// Normalized coordinates of every cell, row-major.
    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        self.positions().map(|pos| self.coordinate_of(pos)).collect()
    }

    /// Positions of every cell, row-major.
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> + '_ {
        let size_x = self.shape.size_x;
        (0..self.len()).map(move |i| GridPosition::from_linear(i, size_x))
    }

    /// Maps a normalized coordinate back to an integer position by scaling
    /// with the grid dimensions and rounding to the nearest cell.
    #[inline]
    pub fn rescale(&self, coordinate: [f64; 2]) -> GridPosition {
        GridPosition {
            col: (coordinate[0] * self.shape.size_x as f64).round() as usize,
            row: (coordinate[1] * self.shape.size_y as f64).round() as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_enumeration() {
        let lattice = Lattice::new(GridShape::new(3, 2));
        let positions: Vec<(usize, usize)> =
            lattice.positions().map(|p| (p.col, p.row)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn test_bijection() {
        let lattice = Lattice::new(GridShape::new(7, 4));
        for i in 0..lattice.len() {
            let pos = lattice.position(i).unwrap();
            assert_eq!(lattice.index_of(pos), Some(i));
        }
        assert_eq!(lattice.position(28), None);
        assert_eq!(lattice.index_of(GridPosition::new(7, 0)), None);
        assert_eq!(lattice.index_of(GridPosition::new(0, 4)), None);
    }

    #[test]
    fn test_coordinates_are_lower_left_corners() {
        let lattice = Lattice::new(GridShape::new(4, 2));
        let coords = lattice.coordinates();
        assert_eq!(coords.len(), 8);
        assert_eq!(coords[0], [0.0, 0.0]);
        assert_eq!(coords[1], [0.25, 0.0]);
        assert_eq!(coords[3], [0.75, 0.0]);
        assert_eq!(coords[4], [0.0, 0.5]);
        assert_eq!(coords[7], [0.75, 0.5]);
    }

    #[test]
    fn test_rescale_recovers_position() {
        let lattice = Lattice::new(GridShape::new(13, 9));
        for (i, pos) in lattice.positions().enumerate() {
            let coord = lattice.coordinate(i).unwrap();
            assert_eq!(lattice.rescale(coord), pos);
        }
    }

    #[test]
    fn test_shape() {
        let shape = GridShape::new(3, 4);
        assert_eq!(shape.cells(), 12);
        assert!(shape.fits(12));
        assert!(!shape.fits(13));
        assert_eq!(GridShape::square(5).cells(), 25);
    }

    #[test]
    fn test_cell_count_overflow() {
        let huge = GridShape::new(usize::MAX / 2, 3);
        assert_eq!(huge.checked_cells(), None);
        assert_eq!(huge.cells(), usize::MAX);
        assert!(huge.fits(usize::MAX));
        assert_eq!(GridShape::new(4, 5).checked_cells(), Some(20));
    }

    #[test]
    fn test_grid_position_linear() {
        let pos = GridPosition::from_linear(10, 4);
        assert_eq!(pos, GridPosition::new(2, 2));
        assert_eq!(pos.to_linear(4), 10);
    }
}
