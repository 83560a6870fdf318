//! Year-indexed observation table shared by every analysis in the crate
//!
//! A `DataMatrix` holds one row per year. Monthly data has twelve cells per
//! row, annual data has one. A missing observation is `None` and never takes
//! part in arithmetic.
use serde::Serialize;

use crate::analysis_error::AnalysisError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataMatrix {
    years: Vec<i32>,
    rows: Vec<Vec<Option<f64>>>,
    labels: Vec<String>,
    width: usize,
}

impl DataMatrix {
    /// Build a matrix, validating its shape.
    ///
    /// # Arguments
    /// * `years` - Strictly increasing year identifiers
    /// * `rows` - One row per year, all of the same width (at least 1)
    /// * `labels` - Year axis label followed by one label per column
    pub fn new(
        years: Vec<i32>,
        rows: Vec<Vec<Option<f64>>>,
        labels: Vec<String>,
    ) -> Result<Self, AnalysisError> {
        if years.len() != rows.len() {
            return Err(AnalysisError::invalid(format!(
                "{} years but {} rows",
                years.len(),
                rows.len()
            )));
        }

        if labels.len() < 2 {
            return Err(AnalysisError::invalid(
                "labels must name the year axis and at least one column",
            ));
        }
        let width = labels.len() - 1;

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(AnalysisError::invalid(format!(
                "row {} has {} cells, expected {}",
                idx,
                row.len(),
                width
            )));
        }

        if let Some(pair) = years.windows(2).find(|w| w[0] >= w[1]) {
            return Err(AnalysisError::invalid(format!(
                "years must be strictly increasing ({} followed by {})",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            years,
            rows,
            labels,
            width,
        })
    }

    /// Build a single-column (annual) matrix.
    pub fn annual(
        years: Vec<i32>,
        values: Vec<Option<f64>>,
        year_label: impl Into<String>,
        value_label: impl Into<String>,
    ) -> Result<Self, AnalysisError> {
        let rows = values.into_iter().map(|v| vec![v]).collect();
        Self::new(years, rows, vec![year_label.into(), value_label.into()])
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label of the year axis (`labels[0]`).
    pub fn year_label(&self) -> &str {
        &self.labels[0]
    }

    /// Labels of the value columns (`labels[1..]`).
    pub fn column_labels(&self) -> &[String] {
        &self.labels[1..]
    }

    /// Number of cells per row.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// True for single-column (annual) matrices.
    pub fn is_annual(&self) -> bool {
        self.width == 1
    }

    pub fn row(&self, row: usize) -> Option<&[Option<f64>]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// Value at a cell, `None` when missing or out of range.
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(column)).copied().flatten()
    }

    pub fn contains(&self, row: usize, column: usize) -> bool {
        row < self.rows.len() && column < self.width
    }

    /// True when the cell exists and holds no value.
    pub fn is_missing(&self, row: usize, column: usize) -> bool {
        self.contains(row, column) && self.rows[row][column].is_none()
    }

    /// True when every cell of the row holds a value.
    pub fn row_is_complete(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_some_and(|r| r.iter().all(Option::is_some))
    }

    /// Position of `year` in the year axis, if present.
    pub fn find_year(&self, year: i32) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }

    /// Position of `year`, failing with `YearNotFound` if absent.
    pub fn row_index(&self, year: i32) -> Result<usize, AnalysisError> {
        self.find_year(year).ok_or(AnalysisError::YearNotFound(year))
    }

    pub fn year_at(&self, row: usize) -> Option<i32> {
        self.years.get(row).copied()
    }

    /// Values recorded for one year.
    ///
    /// Missing cells are replaced by `fill` when one is given, otherwise they
    /// stay `None`.
    pub fn year_values(
        &self,
        year: i32,
        fill: Option<f64>,
    ) -> Result<Vec<Option<f64>>, AnalysisError> {
        let row = self.row_index(year)?;
        Ok(self.rows[row].iter().map(|v| v.or(fill)).collect())
    }

    /// Sub-matrix holding the requested years.
    ///
    /// The request may be in any order and may repeat years; rows keep the
    /// matrix's increasing year order. Fails with `YearNotFound` on the first
    /// absent year.
    pub fn select_years(&self, years: &[i32]) -> Result<DataMatrix, AnalysisError> {
        let mut wanted = years.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let mut rows = Vec::with_capacity(wanted.len());
        for &year in &wanted {
            let row = self.row_index(year)?;
            rows.push(self.rows[row].clone());
        }
        DataMatrix::new(wanted, rows, self.labels.clone())
    }

    /// Overwrite one cell. Only reachable on owned copies inside the crate.
    pub(crate) fn set_value(&mut self, row: usize, column: usize, value: f64) {
        self.rows[row][column] = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        let mut labels = vec!["YEAR".to_string()];
        labels.extend((0..n).map(|i| format!("C{i}")));
        labels
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let result = DataMatrix::new(
            vec![1950, 1951],
            vec![vec![Some(1.0), Some(2.0)], vec![Some(1.0)]],
            labels(2),
        );
        assert!(matches!(result, Err(AnalysisError::InvalidArgument(_))));
    }

    #[test]
    fn test_new_rejects_unsorted_years() {
        let result = DataMatrix::new(
            vec![1951, 1950],
            vec![vec![Some(1.0)], vec![Some(2.0)]],
            labels(1),
        );
        assert!(matches!(result, Err(AnalysisError::InvalidArgument(_))));
    }

    #[test]
    fn test_new_rejects_label_mismatch() {
        let result = DataMatrix::new(vec![1950], vec![vec![Some(1.0), Some(2.0)]], labels(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_annual_matrix_has_width_one() {
        let m = DataMatrix::annual(vec![1950, 1951], vec![Some(1.1), None], "YEAR", "VOL")
            .unwrap();
        assert!(m.is_annual());
        assert_eq!(m.labels().len(), 2);
        assert!(m.is_missing(1, 0));
        assert!(!m.row_is_complete(1));
    }

    #[test]
    fn test_year_values_with_fill() {
        let m = DataMatrix::new(
            vec![1950],
            vec![vec![None, Some(2.1), None]],
            labels(3),
        )
        .unwrap();
        assert_eq!(
            m.year_values(1950, Some(-9999.0)).unwrap(),
            vec![Some(-9999.0), Some(2.1), Some(-9999.0)]
        );
        assert_eq!(
            m.year_values(1950, None).unwrap(),
            vec![None, Some(2.1), None]
        );
    }

    #[test]
    fn test_year_values_unknown_year() {
        let m = DataMatrix::annual(vec![1950], vec![Some(1.0)], "YEAR", "Q").unwrap();
        assert_eq!(
            m.year_values(1953, None),
            Err(AnalysisError::YearNotFound(1953))
        );
    }

    #[test]
    fn test_select_years() {
        let m = DataMatrix::annual(
            vec![1950, 1951, 1952],
            vec![Some(1.0), Some(2.0), Some(3.0)],
            "YEAR",
            "Q",
        )
        .unwrap();
        let sub = m.select_years(&[1950, 1952]).unwrap();
        assert_eq!(sub.years(), &[1950, 1952]);
        assert_eq!(sub.value(1, 0), Some(3.0));
        assert_eq!(sub.labels(), m.labels());
        assert!(matches!(
            m.select_years(&[1960]),
            Err(AnalysisError::YearNotFound(1960))
        ));
    }

    #[test]
    fn test_select_years_unordered_request() {
        let m = DataMatrix::annual(
            vec![1950, 1951, 1952],
            vec![Some(1.0), Some(2.0), Some(3.0)],
            "YEAR",
            "Q",
        )
        .unwrap();
        let sub = m.select_years(&[1952, 1950, 1952]).unwrap();
        assert_eq!(sub.years(), &[1950, 1952]);
        assert_eq!(sub.value(0, 0), Some(1.0));
        assert_eq!(sub.value(1, 0), Some(3.0));
    }
}
