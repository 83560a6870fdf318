// ! Spreadsheet adapters for station data

pub mod reader;
pub mod writer;

use thiserror::Error;

use crate::analysis_error::AnalysisError;

// Re-export commonly used items
pub use reader::{parse_sheet_index, WorkbookReader};
pub use writer::{save_workbook, SheetLayout, WorkbookDestination};

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet {index} not found (workbook has {sheets} sheets)")]
    SheetIndexOutOfRange { index: usize, sheets: usize },

    #[error("Invalid sheet index: {0}")]
    InvalidSheetIndex(String),

    #[error("Invalid data at row {row}, col {col}: {msg}")]
    InvalidData { row: usize, col: usize, msg: String },

    #[error(transparent)]
    Matrix(#[from] AnalysisError),

    #[error("Failed to write workbook: {0}")]
    Write(String),
}
