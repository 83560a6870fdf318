use serde::Serialize;

use crate::analysis_error::AnalysisError;
use crate::matrix::DataMatrix;

/// A matrix flattened into a single series
///
/// `labels` keeps the year axis label followed by the label of every column
/// that contributed values; `value_labels` names the source column of each
/// individual value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedColumn {
    pub years: Vec<i32>,
    pub values: Vec<Option<f64>>,
    pub labels: Vec<String>,
    pub value_labels: Vec<String>,
}

impl ExtractedColumn {
    /// Values that are present, in series order.
    pub fn present_values(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Flatten `matrix` into one series.
///
/// With `column == None` every cell is visited row by row, then column by
/// column; otherwise only the requested column is read. Missing cells are
/// dropped unless `lost_ok` is set, in which case they are kept as `None`.
pub fn extract_column(
    matrix: &DataMatrix,
    column: Option<usize>,
    lost_ok: bool,
) -> Result<ExtractedColumn, AnalysisError> {
    let columns: Vec<usize> = match column {
        None => (0..matrix.width()).collect(),
        Some(c) if c < matrix.width() => vec![c],
        Some(c) => {
            return Err(AnalysisError::invalid(format!(
                "column {} out of range (matrix has {} columns)",
                c,
                matrix.width()
            )))
        }
    };

    let column_labels = matrix.column_labels();
    let mut labels = Vec::with_capacity(columns.len() + 1);
    labels.push(matrix.year_label().to_string());
    labels.extend(columns.iter().map(|&c| column_labels[c].clone()));

    let mut years = Vec::new();
    let mut values = Vec::new();
    let mut value_labels = Vec::new();

    for (row_idx, row) in matrix.rows().iter().enumerate() {
        for &c in &columns {
            let value = row[c];
            if value.is_none() && !lost_ok {
                continue;
            }
            years.push(matrix.years()[row_idx]);
            values.push(value);
            value_labels.push(column_labels[c].clone());
        }
    }

    Ok(ExtractedColumn {
        years,
        values,
        labels,
        value_labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly() -> DataMatrix {
        DataMatrix::new(
            vec![1950, 1951],
            vec![
                vec![Some(1.1), Some(2.1), Some(3.1)],
                vec![Some(2.1), None, Some(4.1)],
            ],
            vec!["YEAR".into(), "JAN".into(), "FEB".into(), "MAR".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_extract_single_column() {
        let col = extract_column(&monthly(), Some(0), false).unwrap();
        assert_eq!(col.years, vec![1950, 1951]);
        assert_eq!(col.values, vec![Some(1.1), Some(2.1)]);
        assert_eq!(col.labels, vec!["YEAR", "JAN"]);
        assert_eq!(col.value_labels, vec!["JAN", "JAN"]);
    }

    #[test]
    fn test_extract_drops_missing_by_default() {
        let col = extract_column(&monthly(), Some(1), false).unwrap();
        assert_eq!(col.years, vec![1950]);
        assert_eq!(col.values, vec![Some(2.1)]);
    }

    #[test]
    fn test_extract_keeps_missing_when_requested() {
        let col = extract_column(&monthly(), Some(1), true).unwrap();
        assert_eq!(col.years, vec![1950, 1951]);
        assert_eq!(col.values, vec![Some(2.1), None]);
    }

    #[test]
    fn test_extract_all_columns_row_major() {
        let col = extract_column(&monthly(), None, false).unwrap();
        assert_eq!(col.years, vec![1950, 1950, 1950, 1951, 1951]);
        assert_eq!(col.present_values(), vec![1.1, 2.1, 3.1, 2.1, 4.1]);
        assert_eq!(col.value_labels, vec!["JAN", "FEB", "MAR", "JAN", "MAR"]);
        assert_eq!(col.labels, vec!["YEAR", "JAN", "FEB", "MAR"]);
    }

    #[test]
    fn test_extract_annual_passes_through() {
        let m = DataMatrix::annual(vec![1950, 1951], vec![Some(1.1), None], "YEAR", "Q")
            .unwrap();
        let col = extract_column(&m, None, false).unwrap();
        assert_eq!(col.values, vec![Some(1.1)]);
        assert_eq!(col.labels, vec!["YEAR", "Q"]);
    }

    #[test]
    fn test_extract_out_of_range() {
        let result = extract_column(&monthly(), Some(3), false);
        assert!(matches!(result, Err(AnalysisError::InvalidArgument(_))));
    }
}
