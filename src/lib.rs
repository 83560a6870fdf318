pub mod analysis;
pub mod analysis_error;
pub mod config;
pub mod matrix;
pub mod utils;
pub mod workbook;

pub use analysis_error::{AnalysisError, BoundarySide};
pub use matrix::DataMatrix;
