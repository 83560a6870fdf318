use serde::Serialize;

use crate::analysis::columns::extract_column;
use crate::analysis_error::AnalysisError;
use crate::matrix::DataMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub max: f64,
    pub mean: f64,
    pub min: f64,
}

/// Max, mean and min of the present values of one column (or of the whole
/// matrix when `column` is `None`).
pub fn summary(matrix: &DataMatrix, column: Option<usize>) -> Result<SeriesSummary, AnalysisError> {
    let values = extract_column(matrix, column, false)?.present_values();
    if values.is_empty() {
        return Err(AnalysisError::invalid("no values to summarize"));
    }

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    Ok(SeriesSummary { max, mean, min })
}

/// Score at percentile `p` (0-100), interpolating linearly between the two
/// nearest order statistics.
pub fn percentile(values: &[f64], p: f64) -> Result<f64, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::invalid("percentile of an empty series"));
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(AnalysisError::invalid(format!(
            "percentile must be within 0-100, got {p}"
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// First and third quartiles (25th and 75th percentiles).
pub fn quartiles(matrix: &DataMatrix, column: Option<usize>) -> Result<(f64, f64), AnalysisError> {
    let values = extract_column(matrix, column, false)?.present_values();
    Ok((percentile(&values, 25.0)?, percentile(&values, 75.0)?))
}
