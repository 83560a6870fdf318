//! Missing-cell detection.

use serde::Serialize;

use crate::analysis_error::AnalysisError;
use crate::matrix::DataMatrix;

/// Coordinates of a missing cell. Both the row index and its year are kept so
/// callers can report either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GapCoord {
    pub row: usize,
    pub year: i32,
    pub column: usize,
}

/// Every missing cell, scanned row by row and left to right within a row.
pub fn locate_gaps(matrix: &DataMatrix) -> Vec<GapCoord> {
    scan(matrix, false)
}

/// The first missing cell of each row that has any.
pub fn locate_gap_rows(matrix: &DataMatrix) -> Vec<GapCoord> {
    scan(matrix, true)
}

/// Years with at least one missing cell.
pub fn years_with_gaps(matrix: &DataMatrix) -> Vec<i32> {
    locate_gap_rows(matrix).into_iter().map(|g| g.year).collect()
}

/// Years with missing data for each named station.
///
/// `names` and `matrices` are paired by position and must have the same
/// length.
pub fn gap_years_by_station<S: AsRef<str>>(
    names: &[S],
    matrices: &[DataMatrix],
) -> Result<Vec<(String, Vec<i32>)>, AnalysisError> {
    if names.len() != matrices.len() {
        return Err(AnalysisError::invalid(format!(
            "{} station names for {} data matrices",
            names.len(),
            matrices.len()
        )));
    }

    Ok(names
        .iter()
        .zip(matrices)
        .map(|(name, matrix)| (name.as_ref().to_string(), years_with_gaps(matrix)))
        .collect())
}

fn scan(matrix: &DataMatrix, first_per_row: bool) -> Vec<GapCoord> {
    let mut gaps = Vec::new();
    for (row, cells) in matrix.rows().iter().enumerate() {
        for (column, cell) in cells.iter().enumerate() {
            if cell.is_some() {
                continue;
            }
            gaps.push(GapCoord {
                row,
                year: matrix.years()[row],
                column,
            });
            if first_per_row {
                break;
            }
        }
    }
    gaps
}
