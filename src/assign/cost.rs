//! Dense cost matrices.

use crate::error::{Result, TesseraError};
use rayon::prelude::*;

/// A dense row-major matrix of assignment costs.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Wraps a row-major buffer of `rows * cols` costs.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(TesseraError::DimensionMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Squared Euclidean distance between every row point and every column point.
    ///
    /// Rows are filled in parallel; each entry depends only on its own pair,
    /// so the result does not depend on scheduling.
    pub fn squared_euclidean(row_points: &[[f64; 2]], col_points: &[[f64; 2]]) -> Self {
        let rows = row_points.len();
        let cols = col_points.len();
        let mut data = vec![0.0; rows * cols];

        if cols > 0 {
            data.par_chunks_mut(cols)
                .zip(row_points.par_iter())
                .for_each(|(out, a)| {
                    for (c, b) in out.iter_mut().zip(col_points) {
                        let dx = a[0] - b[0];
                        let dy = a[1] - b[1];
                        *c = dx * dx + dy * dy;
                    }
                });
        }

        Self { rows, cols, data }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cost at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Position of the first entry that is NaN or infinite.
    pub fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.data
            .iter()
            .position(|c| !c.is_finite())
            .map(|i| (i / self.cols, i % self.cols))
    }
}
