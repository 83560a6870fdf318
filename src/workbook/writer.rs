use std::path::PathBuf;

use simple_excel_writer::{Row, Workbook};
use tracing::info;

use super::WorkbookError;
use crate::analysis::ExtractedColumn;
use crate::matrix::DataMatrix;

/// What to write into the sheet.
#[derive(Debug, Clone, Copy)]
pub enum SheetLayout<'a> {
    /// Labels, then one row per year (annual or monthly).
    Matrix(&'a DataMatrix),
    /// Labels, then one `year | value | value label` row per value.
    Column(&'a ExtractedColumn),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookDestination {
    pub path: PathBuf,
    pub sheet_name: String,
}

impl WorkbookDestination {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet_name: "Sheet1".to_string(),
        }
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }
}

/// Write a single-sheet `.xlsx` workbook, replacing any existing file.
/// Missing values are written as blank cells.
pub fn save_workbook(
    layout: SheetLayout<'_>,
    destination: &WorkbookDestination,
) -> Result<(), WorkbookError> {
    let path = destination.path.to_str().ok_or_else(|| {
        WorkbookError::Write(format!(
            "path is not valid UTF-8: {}",
            destination.path.display()
        ))
    })?;

    let (labels, row_count) = match layout {
        SheetLayout::Matrix(matrix) => (matrix.labels(), matrix.len()),
        SheetLayout::Column(column) => (column.labels.as_slice(), column.len()),
    };

    let mut workbook = Workbook::create(path);
    let mut sheet = workbook.create_sheet(&destination.sheet_name);
    workbook
        .write_sheet(&mut sheet, |sheet_writer| {
            let mut header = Row::new();
            for label in labels {
                header.add_cell(label.as_str());
            }
            sheet_writer.append_row(header)?;

            let rows = match layout {
                SheetLayout::Matrix(matrix) => matrix_rows(matrix),
                SheetLayout::Column(column) => column_rows(column),
            };
            for row in rows {
                sheet_writer.append_row(row)?;
            }
            Ok(())
        })
        .map_err(|e| WorkbookError::Write(e.to_string()))?;

    workbook
        .close()
        .map_err(|e| WorkbookError::Write(e.to_string()))?;

    info!(
        "Wrote {} data rows to sheet {} of {}",
        row_count,
        destination.sheet_name,
        destination.path.display()
    );
    Ok(())
}

fn matrix_rows(matrix: &DataMatrix) -> Vec<Row> {
    matrix
        .years()
        .iter()
        .zip(matrix.rows())
        .map(|(&year, values)| {
            let mut row = Row::new();
            row.add_cell(year as f64);
            for value in values {
                add_value(&mut row, *value);
            }
            row
        })
        .collect()
}

fn column_rows(column: &ExtractedColumn) -> Vec<Row> {
    column
        .years
        .iter()
        .zip(&column.values)
        .zip(&column.value_labels)
        .map(|((&year, value), label)| {
            let mut row = Row::new();
            row.add_cell(year as f64);
            add_value(&mut row, *value);
            row.add_cell(label.as_str());
            row
        })
        .collect()
}

fn add_value(row: &mut Row, value: Option<f64>) {
    match value {
        Some(v) => row.add_cell(v),
        None => row.add_empty_cells(1),
    }
}
