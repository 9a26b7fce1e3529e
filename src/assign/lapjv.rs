//! Exact rectangular linear assignment.
//!
//! Shortest augmenting path method of Jonker and Volgenant in the
//! rectangular form described by Crouse (2016): each row of the smaller side
//! is added in turn and matched along a Dijkstra shortest path over reduced
//! costs, with dual potentials keeping all reduced costs non-negative. After
//! every row is placed the matching is optimal.
//!
//! When the matrix has more rows than columns the problem is solved on the
//! transposed view. Unmatched rows of the larger side are the "empty"
//! entries; no padding costs enter the arithmetic.
//!
//! References:
//! - Jonker & Volgenant (1987): "A shortest augmenting path algorithm for
//!   dense and sparse linear assignment problems"
//! - Crouse (2016): "On implementing 2D rectangular assignment algorithms"

use crate::assign::CostMatrix;
use crate::error::{Result, TesseraError};

const UNASSIGNED: usize = usize::MAX;

/// A solved assignment over a cost matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LapSolution {
    /// Column matched to each row, if any.
    pub row_to_col: Vec<Option<usize>>,
    /// Row matched to each column, if any.
    pub col_to_row: Vec<Option<usize>>,
    /// Sum of the costs of matched pairs.
    pub cost: f64,
}

/// Finds a minimum cost matching that covers every row or every column,
/// whichever side is smaller.
pub fn solve(matrix: &CostMatrix) -> Result<LapSolution> {
    if let Some((r, c)) = matrix.first_non_finite() {
        return Err(TesseraError::SolverInfeasible(format!(
            "cost at ({}, {}) is not finite",
            r, c
        )));
    }

    let (rows, cols) = (matrix.rows(), matrix.cols());
    let (row_to_col, col_to_row) = if rows <= cols {
        augment_all(rows, cols, |i, j| matrix.get(i, j))?
    } else {
        let (col_to_row, row_to_col) = augment_all(cols, rows, |i, j| matrix.get(j, i))?;
        (row_to_col, col_to_row)
    };

    let cost = row_to_col
        .iter()
        .enumerate()
        .filter_map(|(r, c)| c.map(|c| matrix.get(r, c)))
        .sum::<f64>();

    Ok(LapSolution {
        row_to_col,
        col_to_row,
        cost,
    })
}

/// Matches every one of `nr` rows to a distinct one of `nc >= nr` columns.
fn augment_all<F>(nr: usize, nc: usize, cost: F) -> Result<(Vec<Option<usize>>, Vec<Option<usize>>)>
where
    F: Fn(usize, usize) -> f64,
{
    debug_assert!(nr <= nc);

    let mut u = vec![0.0; nr];
    let mut v = vec![0.0; nc];
    let mut shortest = vec![f64::INFINITY; nc];
    let mut path = vec![UNASSIGNED; nc];
    let mut col4row = vec![UNASSIGNED; nr];
    let mut row4col = vec![UNASSIGNED; nc];
    let mut seen_rows = vec![false; nr];
    let mut seen_cols = vec![false; nc];
    let mut remaining = vec![0usize; nc];

    for cur_row in 0..nr {
        // Dijkstra over reduced costs from `cur_row` to the nearest free column.
        let mut min_val = 0.0;
        let mut num_remaining = nc;
        for (it, slot) in remaining.iter_mut().enumerate() {
            *slot = nc - it - 1;
        }
        seen_rows.fill(false);
        seen_cols.fill(false);
        shortest.fill(f64::INFINITY);

        let mut i = cur_row;
        let sink = loop {
            seen_rows[i] = true;
            let mut lowest = f64::INFINITY;
            let mut index = None;

            for (it, &j) in remaining[..num_remaining].iter().enumerate() {
                let reduced = min_val + cost(i, j) - u[i] - v[j];
                if reduced < shortest[j] {
                    path[j] = i;
                    shortest[j] = reduced;
                }
                if shortest[j] < lowest || (shortest[j] == lowest && row4col[j] == UNASSIGNED) {
                    lowest = shortest[j];
                    index = Some(it);
                }
            }

            min_val = lowest;
            let it = match index {
                Some(it) if min_val.is_finite() => it,
                _ => {
                    return Err(TesseraError::SolverInfeasible(format!(
                        "no augmenting path for row {}",
                        cur_row
                    )))
                }
            };

            let j = remaining[it];
            seen_cols[j] = true;
            num_remaining -= 1;
            remaining[it] = remaining[num_remaining];

            if row4col[j] == UNASSIGNED {
                break j;
            }
            i = row4col[j];
        };

        // Update dual potentials.
        u[cur_row] += min_val;
        for r in 0..nr {
            if seen_rows[r] && r != cur_row {
                u[r] += min_val - shortest[col4row[r]];
            }
        }
        for j in 0..nc {
            if seen_cols[j] {
                v[j] -= min_val - shortest[j];
            }
        }

        // Flip the matching along the path back to `cur_row`.
        let mut j = sink;
        loop {
            let r = path[j];
            row4col[j] = r;
            std::mem::swap(&mut col4row[r], &mut j);
            if r == cur_row {
                break;
            }
        }
    }

    let wrap = |v: Vec<usize>| {
        v.into_iter()
            .map(|x| if x == UNASSIGNED { None } else { Some(x) })
            .collect::<Vec<_>>()
    };
    Ok((wrap(col4row), wrap(row4col)))
}
