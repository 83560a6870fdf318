//! Nearest valid values around a gap.
//!
//! Rows are treated as consecutive stretches of one continuous time axis, so
//! a scan that runs off the start of a row continues at the end of the
//! previous row, and vice versa. This relies on every row having the same
//! width, which `DataMatrix` guarantees.

use serde::Serialize;

use crate::analysis_error::{AnalysisError, BoundarySide};
use crate::matrix::DataMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRef {
    pub row: usize,
    pub column: usize,
}

/// The valid values bracketing a gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NeighborResult {
    pub before: f64,
    pub after: f64,
    /// Cells from the before-neighbor slot to the after-neighbor slot across
    /// the missing stretch; 2 when a single cell is missing.
    pub run_length: usize,
    /// 1-based distance of the gap from the before-neighbor.
    pub position: usize,
    pub before_cell: CellRef,
    pub after_cell: CellRef,
}

impl NeighborResult {
    /// Straight-line estimate at the gap between its two neighbors.
    pub fn linear_estimate(&self) -> f64 {
        let slope = (self.after - self.before) / self.run_length as f64;
        slope * self.position as f64 + self.before
    }
}

/// Find the nearest valid values strictly before and after `(row, column)`.
///
/// The backward scan runs first. A scan that would cross the start (or end)
/// of the whole series fails with `BoundaryGap`.
pub fn find_neighbors(
    matrix: &DataMatrix,
    row: usize,
    column: usize,
) -> Result<NeighborResult, AnalysisError> {
    if !matrix.contains(row, column) {
        return Err(AnalysisError::invalid(format!(
            "cell ({row}, {column}) is outside a {}x{} matrix",
            matrix.len(),
            matrix.width()
        )));
    }

    let width = matrix.width();
    let last_row = matrix.len() - 1;
    let mut run_length = 2;
    let mut position = 1;

    let (mut r, mut c) = (row, column);
    let (before, before_cell) = loop {
        if c == 0 {
            if r == 0 {
                return Err(AnalysisError::BoundaryGap {
                    side: BoundarySide::Lower,
                    row,
                    column,
                });
            }
            r -= 1;
            c = width - 1;
        } else {
            c -= 1;
        }
        if let Some(v) = matrix.value(r, c) {
            break (v, CellRef { row: r, column: c });
        }
        run_length += 1;
        position += 1;
    };

    let (mut r, mut c) = (row, column);
    let (after, after_cell) = loop {
        if c + 1 == width {
            if r == last_row {
                return Err(AnalysisError::BoundaryGap {
                    side: BoundarySide::Upper,
                    row,
                    column,
                });
            }
            r += 1;
            c = 0;
        } else {
            c += 1;
        }
        if let Some(v) = matrix.value(r, c) {
            break (v, CellRef { row: r, column: c });
        }
        run_length += 1;
    };

    Ok(NeighborResult {
        before,
        after,
        run_length,
        position,
        before_cell,
        after_cell,
    })
}

/// Linear-interpolation estimate for one cell from its neighbors.
pub fn neighbor_estimate(
    matrix: &DataMatrix,
    row: usize,
    column: usize,
) -> Result<f64, AnalysisError> {
    find_neighbors(matrix, row, column).map(|n| n.linear_estimate())
}
