//! Concurrent years between two stations.
//!
//! A year is concurrent when both matrices list it and both rows are free of
//! missing cells.

use crate::analysis_error::AnalysisError;
use crate::matrix::DataMatrix;

/// Every concurrent year, in increasing order.
pub fn concurrent_years(a: &DataMatrix, b: &DataMatrix) -> Vec<i32> {
    concurrent_runs(a, b).into_iter().flatten().collect()
}

/// Maximal runs of consecutive concurrent years.
///
/// Candidates are scanned from the later of the two first years to the
/// earlier of the two last years. A candidate that is absent from either
/// matrix, or incomplete in either, closes the current run.
pub fn concurrent_runs(a: &DataMatrix, b: &DataMatrix) -> Vec<Vec<i32>> {
    let (Some(&first_a), Some(&first_b), Some(&last_a), Some(&last_b)) = (
        a.years().first(),
        b.years().first(),
        a.years().last(),
        b.years().last(),
    ) else {
        return Vec::new();
    };

    let start = first_a.max(first_b);
    let end = last_a.min(last_b);

    let mut runs = Vec::new();
    let mut current: Vec<i32> = Vec::new();

    for year in start..=end {
        if qualifies(a, b, year) {
            current.push(year);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Rows of `a` for the years it shares, complete, with `b`.
///
/// With no `b`, `a` is compared with itself, which keeps only its complete
/// years.
pub fn concurrent_subset(
    a: &DataMatrix,
    b: Option<&DataMatrix>,
) -> Result<DataMatrix, AnalysisError> {
    let years = concurrent_years(a, b.unwrap_or(a));
    a.select_years(&years)
}

fn qualifies(a: &DataMatrix, b: &DataMatrix, year: i32) -> bool {
    match (a.find_year(year), b.find_year(year)) {
        (Some(i), Some(j)) => a.row_is_complete(i) && b.row_is_complete(j),
        _ => false,
    }
}
