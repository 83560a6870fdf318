use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use tracing::{debug, info};

use super::WorkbookError;
use crate::analysis::ExtractedColumn;
use crate::matrix::DataMatrix;

/// Parse a sheet index given as text (e.g. from the command line).
pub fn parse_sheet_index(value: &str) -> Result<usize, WorkbookError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| WorkbookError::InvalidSheetIndex(value.to_string()))
}

/// Reads station sheets from `.xlsx` / `.xls` workbooks.
///
/// # Expected Sheet Structure:
/// ```text
/// Row 1:  YEAR | JAN | FEB | ...     (labels)
/// Row 2+: 1950 | 1.1 |     | ...     (blank cell = missing value)
/// ```
/// Reading stops at the first row whose year cell is empty.
pub struct WorkbookReader {
    workbook_path: PathBuf,
}

impl WorkbookReader {
    pub fn new(workbook_path: impl Into<PathBuf>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.workbook_path
    }

    /// Load the sheet at `sheet_index` as a DataMatrix.
    pub fn load_matrix(&self, sheet_index: usize) -> Result<DataMatrix, WorkbookError> {
        let range = self.sheet_range(sheet_index)?;
        let labels = parse_labels(&range)?;
        let width = labels.len().saturating_sub(1);

        let mut years = Vec::new();
        let mut rows = Vec::new();
        for row_idx in 1..range.height() {
            let Some(year) = parse_year(&range, row_idx)? else {
                debug!("No more years at row {}, stopping", row_idx);
                break;
            };
            let row = (1..=width)
                .map(|col| parse_value(&range, row_idx, col))
                .collect::<Result<Vec<_>, _>>()?;
            years.push(year);
            rows.push(row);
        }

        info!(
            "Loaded {} years x {} columns from sheet {} of {}",
            years.len(),
            width,
            sheet_index,
            self.workbook_path.display()
        );
        Ok(DataMatrix::new(years, rows, labels)?)
    }

    /// Load a sheet written in the extracted-column layout: labels in the
    /// first row, then one `year | value | value label` row per value.
    pub fn load_column(&self, sheet_index: usize) -> Result<ExtractedColumn, WorkbookError> {
        let range = self.sheet_range(sheet_index)?;
        let labels = parse_labels(&range)?;

        let mut years = Vec::new();
        let mut values = Vec::new();
        let mut value_labels = Vec::new();
        for row_idx in 1..range.height() {
            let Some(year) = parse_year(&range, row_idx)? else {
                break;
            };
            years.push(year);
            values.push(parse_value(&range, row_idx, 1)?);
            value_labels.push(match range.get((row_idx, 2)) {
                Some(Data::String(s)) => s.trim().to_string(),
                Some(Data::Empty) | None => String::new(),
                Some(other) => other.to_string(),
            });
        }

        info!(
            "Loaded {} values from column sheet {} of {}",
            values.len(),
            sheet_index,
            self.workbook_path.display()
        );
        Ok(ExtractedColumn {
            years,
            values,
            labels,
            value_labels,
        })
    }

    fn sheet_range(&self, sheet_index: usize) -> Result<Range<Data>, WorkbookError> {
        let mut workbook: Sheets<BufReader<File>> = match open_workbook_auto(&self.workbook_path)
        {
            Ok(wb) => wb,
            Err(e) => return Err(WorkbookError::WorkbookOpen(e.to_string())),
        };

        let sheets = workbook.sheet_names().len();
        match workbook.worksheet_range_at(sheet_index) {
            Some(Ok(range)) => Ok(range),
            Some(Err(e)) => Err(WorkbookError::WorkbookOpen(e.to_string())),
            None => Err(WorkbookError::SheetIndexOutOfRange {
                index: sheet_index,
                sheets,
            }),
        }
    }
}

/// Labels from the first row, up to the first empty cell.
fn parse_labels(range: &Range<Data>) -> Result<Vec<String>, WorkbookError> {
    let mut labels = Vec::new();
    for col in 0..range.width() {
        match range.get((0, col)) {
            Some(Data::String(s)) if !s.trim().is_empty() => labels.push(s.trim().to_string()),
            Some(Data::Empty) | None => break,
            Some(Data::String(_)) => break,
            Some(other) => labels.push(other.to_string()),
        }
    }

    if labels.len() < 2 {
        return Err(WorkbookError::InvalidData {
            row: 0,
            col: labels.len(),
            msg: "expected a year label and at least one value label".to_string(),
        });
    }
    Ok(labels)
}

fn parse_year(range: &Range<Data>, row: usize) -> Result<Option<i32>, WorkbookError> {
    let invalid = |msg: String| WorkbookError::InvalidData { row, col: 0, msg };
    match range.get((row, 0)) {
        Some(Data::Int(i)) => i32::try_from(*i)
            .map(Some)
            .map_err(|_| invalid(format!("Year out of range: {i}"))),
        Some(Data::Float(f)) => {
            if f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64 {
                Ok(Some(*f as i32))
            } else {
                Err(invalid(format!("Expected whole year, got: {f}")))
            }
        }
        Some(Data::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse::<i32>()
                    .map(Some)
                    .map_err(|_| invalid(format!("Cannot parse year: {s}")))
            }
        }
        Some(Data::Empty) | None => Ok(None),
        Some(other) => Err(invalid(format!("Expected year, got: {other:?}"))),
    }
}

fn parse_value(range: &Range<Data>, row: usize, col: usize) -> Result<Option<f64>, WorkbookError> {
    match range.get((row, col)) {
        Some(Data::Float(f)) => Ok(Some(*f)),
        Some(Data::Int(i)) => Ok(Some(*i as f64)),
        Some(Data::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| WorkbookError::InvalidData {
                        row,
                        col,
                        msg: format!("Cannot parse value: {s}"),
                    })
            }
        }
        Some(Data::Empty) | None => Ok(None),
        Some(other) => Err(WorkbookError::InvalidData {
            row,
            col,
            msg: format!("Expected number, got: {other:?}"),
        }),
    }
}
