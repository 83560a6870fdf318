use std::fmt;

/// Which end of the time axis a boundary gap ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BoundarySide {
    /// No valid value before the gap (start of the series).
    Lower,
    /// No valid value after the gap (end of the series).
    Upper,
}

impl fmt::Display for BoundarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundarySide::Lower => write!(f, "before"),
            BoundarySide::Upper => write!(f, "after"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Year not found: {0}")]
    YearNotFound(i32),

    #[error("Gap at row {row}, column {column} has no valid value {side} it")]
    BoundaryGap {
        side: BoundarySide,
        row: usize,
        column: usize,
    },

    #[error("Regression undefined: {0}")]
    RegressionDegenerate(String),
}

impl AnalysisError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidArgument(msg.into())
    }
}
