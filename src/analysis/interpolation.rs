//! Gap filling by linear interpolation, with optional correction from a
//! companion station's regression.
//!
//! The input matrix is never modified: filling works on a clone and returns
//! it together with a list of diagnostics describing every gap that was
//! skipped or flagged.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::analysis::gaps::{locate_gaps, GapCoord};
use crate::analysis::neighbors::{find_neighbors, NeighborResult};
use crate::analysis::regression::{linear_regression, predict_from_companion, RegressionParams};
use crate::analysis_error::{AnalysisError, BoundarySide};
use crate::matrix::DataMatrix;

/// Run length above which an uncorrected interpolation is flagged.
pub const DEFAULT_LONG_GAP_RUN: usize = 5;

/// Something noteworthy that happened to a single gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FillDiagnostic {
    /// No valid value on one side of the gap; the cell stays missing.
    BoundarySkipped { gap: GapCoord, side: BoundarySide },
    /// Filled from a long missing stretch without a companion station.
    LongInterpolation { gap: GapCoord, run_length: usize },
    /// Left missing by the single-gap filler because the run is longer than
    /// one cell.
    SkippedLongRun { gap: GapCoord, run_length: usize },
    /// Companion correction could not be evaluated; the plain estimate was
    /// kept.
    CorrectionDropped { gap: GapCoord, reason: String },
    /// Companion correction produced a negative value; the plain estimate
    /// was kept.
    NegativeCorrection { gap: GapCoord, corrected: f64 },
}

impl FillDiagnostic {
    pub fn gap(&self) -> GapCoord {
        match self {
            FillDiagnostic::BoundarySkipped { gap, .. }
            | FillDiagnostic::LongInterpolation { gap, .. }
            | FillDiagnostic::SkippedLongRun { gap, .. }
            | FillDiagnostic::CorrectionDropped { gap, .. }
            | FillDiagnostic::NegativeCorrection { gap, .. } => *gap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillOutcome {
    pub matrix: DataMatrix,
    /// Gaps that received a value, in processing order.
    pub filled: Vec<GapCoord>,
    pub diagnostics: Vec<FillDiagnostic>,
}

/// Fills the gaps of one station.
///
/// # Example
///
/// ```
/// use hydro_series::analysis::GapFiller;
/// use hydro_series::DataMatrix;
///
/// let flows = DataMatrix::annual(
///     vec![1950, 1951, 1952],
///     vec![Some(4.1), None, Some(6.1)],
///     "YEAR",
///     "Q",
/// )
/// .unwrap();
///
/// let outcome = GapFiller::new(&flows).fill().unwrap();
/// assert!((outcome.matrix.value(1, 0).unwrap() - 5.1).abs() < 1e-9);
/// assert_eq!(flows.value(1, 0), None);
/// ```
pub struct GapFiller<'a> {
    matrix: &'a DataMatrix,
    gaps: Option<&'a [GapCoord]>,
    companion: Option<&'a DataMatrix>,
    regression: Option<RegressionParams>,
    long_gap_run: usize,
}

impl<'a> GapFiller<'a> {
    pub fn new(matrix: &'a DataMatrix) -> Self {
        Self {
            matrix,
            gaps: None,
            companion: None,
            regression: None,
            long_gap_run: DEFAULT_LONG_GAP_RUN,
        }
    }

    /// Restrict filling to these gaps (default: every missing cell).
    pub fn gaps(mut self, gaps: &'a [GapCoord]) -> Self {
        self.gaps = Some(gaps);
        self
    }

    /// Correct interpolations with a companion station.
    pub fn companion(mut self, companion: &'a DataMatrix) -> Self {
        self.companion = Some(companion);
        self
    }

    /// Use precomputed regression parameters mapping companion values onto
    /// this station. Without them the regression is fitted from the
    /// concurrent years of both stations.
    pub fn regression(mut self, params: RegressionParams) -> Self {
        self.regression = Some(params);
        self
    }

    pub fn long_gap_run(mut self, run_length: usize) -> Self {
        self.long_gap_run = run_length;
        self
    }

    #[instrument(skip(self), fields(years = self.matrix.len(), width = self.matrix.width()))]
    pub fn fill(&self) -> Result<FillOutcome, AnalysisError> {
        let gaps = resolve_gaps(self.matrix, self.gaps)?;

        let params = self.companion.map(|companion| match self.regression {
            Some(params) => Ok(params),
            None => linear_regression(companion, self.matrix, None),
        });
        if let Some(Err(e)) = &params {
            warn!("Companion regression unavailable, corrections disabled: {}", e);
        }

        let mut matrix = self.matrix.clone();
        let mut filled = Vec::new();
        let mut diagnostics = Vec::new();

        for gap in gaps {
            if !self.matrix.is_missing(gap.row, gap.column) {
                debug!("Cell {}/{} already has a value, skipping", gap.year, gap.column);
                continue;
            }

            let neighbors = match locate_neighbors(self.matrix, gap, &mut diagnostics)? {
                Some(n) => n,
                None => continue,
            };

            let estimate = neighbors.linear_estimate();
            if neighbors.run_length > self.long_gap_run && self.companion.is_none() {
                warn!(
                    "Interpolating {}/{} across a run of {} cells without a companion station",
                    gap.year, gap.column, neighbors.run_length
                );
                diagnostics.push(FillDiagnostic::LongInterpolation {
                    gap,
                    run_length: neighbors.run_length,
                });
            }

            let mut value = estimate;
            if let (Some(companion), Some(params)) = (self.companion, &params) {
                if neighbors.run_length > 2 {
                    let corrected = params.as_ref().map_err(Clone::clone).and_then(|p| {
                        self.corrected_estimate(companion, p, &neighbors, gap, estimate)
                    });
                    match corrected {
                        Ok(c) if c < 0.0 => {
                            debug!("Negative correction {} at {}/{} discarded", c, gap.year, gap.column);
                            diagnostics.push(FillDiagnostic::NegativeCorrection { gap, corrected: c });
                        }
                        Ok(c) => value = c,
                        Err(e) => {
                            debug!("Correction at {}/{} dropped: {}", gap.year, gap.column, e);
                            diagnostics.push(FillDiagnostic::CorrectionDropped {
                                gap,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }

            matrix.set_value(gap.row, gap.column, value);
            filled.push(gap);
        }

        info!(
            "Filled {} gaps ({} diagnostics)",
            filled.len(),
            diagnostics.len()
        );

        Ok(FillOutcome {
            matrix,
            filled,
            diagnostics,
        })
    }

    /// Blend the plain estimate with the companion-regression estimate.
    ///
    /// The regression's relative error at both neighbors is averaged and used
    /// to scale the estimate before adding the regression prediction at the
    /// gap; the result is averaged with the plain estimate.
    fn corrected_estimate(
        &self,
        companion: &DataMatrix,
        params: &RegressionParams,
        neighbors: &NeighborResult,
        gap: GapCoord,
        estimate: f64,
    ) -> Result<f64, AnalysisError> {
        let years = self.matrix.years();
        let before_cell = neighbors.before_cell;
        let after_cell = neighbors.after_cell;

        let predicted_before =
            predict_from_companion(companion, years[before_cell.row], before_cell.column, params)?;
        let predicted_after =
            predict_from_companion(companion, years[after_cell.row], after_cell.column, params)?;
        let predicted_gap = predict_from_companion(companion, gap.year, gap.column, params)?;

        let error_before = (neighbors.before - predicted_before) / neighbors.before;
        let error_after = (neighbors.after - predicted_after) / neighbors.after;
        let mean_error = (error_before + error_after) / 2.0;
        if !mean_error.is_finite() {
            return Err(AnalysisError::RegressionDegenerate(
                "relative error undefined for a zero neighbor value".to_string(),
            ));
        }

        let corrected = mean_error * estimate + predicted_gap;
        Ok((corrected + estimate) / 2.0)
    }
}

/// Fill only isolated gaps (a single missing cell between two values) with
/// the mean of their neighbors. Longer runs stay missing.
pub fn fill_single_gaps(
    matrix: &DataMatrix,
    gaps: Option<&[GapCoord]>,
) -> Result<FillOutcome, AnalysisError> {
    let gaps = resolve_gaps(matrix, gaps)?;

    let mut filled_matrix = matrix.clone();
    let mut filled = Vec::new();
    let mut diagnostics = Vec::new();

    for gap in gaps {
        if !matrix.is_missing(gap.row, gap.column) {
            continue;
        }
        let neighbors = match locate_neighbors(matrix, gap, &mut diagnostics)? {
            Some(n) => n,
            None => continue,
        };
        if neighbors.run_length != 2 {
            diagnostics.push(FillDiagnostic::SkippedLongRun {
                gap,
                run_length: neighbors.run_length,
            });
            continue;
        }
        filled_matrix.set_value(gap.row, gap.column, (neighbors.before + neighbors.after) / 2.0);
        filled.push(gap);
    }

    debug!("Filled {} isolated gaps", filled.len());

    Ok(FillOutcome {
        matrix: filled_matrix,
        filled,
        diagnostics,
    })
}

/// Explicit gaps are checked against the matrix and re-labelled with its
/// years; without them every missing cell is used.
fn resolve_gaps(
    matrix: &DataMatrix,
    gaps: Option<&[GapCoord]>,
) -> Result<Vec<GapCoord>, AnalysisError> {
    let Some(gaps) = gaps else {
        return Ok(locate_gaps(matrix));
    };

    gaps.iter()
        .map(|g| {
            if !matrix.contains(g.row, g.column) {
                return Err(AnalysisError::invalid(format!(
                    "gap ({}, {}) is outside a {}x{} matrix",
                    g.row,
                    g.column,
                    matrix.len(),
                    matrix.width()
                )));
            }
            Ok(GapCoord {
                row: g.row,
                year: matrix.years()[g.row],
                column: g.column,
            })
        })
        .collect()
}

/// Neighbors of a gap; boundary gaps are recorded and yield `None`.
fn locate_neighbors(
    matrix: &DataMatrix,
    gap: GapCoord,
    diagnostics: &mut Vec<FillDiagnostic>,
) -> Result<Option<NeighborResult>, AnalysisError> {
    match find_neighbors(matrix, gap.row, gap.column) {
        Ok(n) => Ok(Some(n)),
        Err(AnalysisError::BoundaryGap { side, .. }) => {
            debug!(
                "Gap {}/{} has no valid value {} it, leaving it missing",
                gap.year, gap.column, side
            );
            diagnostics.push(FillDiagnostic::BoundarySkipped { gap, side });
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_matrix(values: &[Option<f64>]) -> DataMatrix {
        let mut labels = vec!["YEAR".to_string()];
        labels.extend((0..values.len()).map(|i| format!("C{i}")));
        DataMatrix::new(vec![1950], vec![values.to_vec()], labels).unwrap()
    }

    #[test]
    fn test_single_gap_midpoint() {
        let m = row_matrix(&[Some(1.0), Some(4.1), None, Some(6.1), Some(7.0)]);
        let outcome = GapFiller::new(&m).fill().unwrap();
        assert!((outcome.matrix.value(0, 2).unwrap() - 5.1).abs() < 1e-9);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(m.value(0, 2), None);
    }

    #[test]
    fn test_boundary_gaps_stay_missing() {
        let m = row_matrix(&[None, Some(2.0), None, Some(4.0), None]);
        let outcome = GapFiller::new(&m).fill().unwrap();
        assert_eq!(outcome.matrix.value(0, 0), None);
        assert_eq!(outcome.matrix.value(0, 4), None);
        assert!((outcome.matrix.value(0, 2).unwrap() - 3.0).abs() < 1e-12);
        assert_eq!(outcome.filled.len(), 1);

        let sides: Vec<BoundarySide> = outcome
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                FillDiagnostic::BoundarySkipped { side, .. } => Some(*side),
                _ => None,
            })
            .collect();
        assert_eq!(sides, vec![BoundarySide::Lower, BoundarySide::Upper]);
    }

    #[test]
    fn test_long_run_is_flagged_without_companion() {
        let mut values = vec![Some(0.0)];
        values.extend(std::iter::repeat(None).take(5));
        values.push(Some(6.0));
        let m = row_matrix(&values);
        let outcome = GapFiller::new(&m).fill().unwrap();

        for c in 1..6 {
            assert!((outcome.matrix.value(0, c).unwrap() - c as f64).abs() < 1e-12);
        }
        assert_eq!(outcome.diagnostics.len(), 5);
        assert!(outcome
            .diagnostics
            .iter()
            .all(|d| matches!(d, FillDiagnostic::LongInterpolation { run_length: 6, .. })));
    }

    #[test]
    fn test_long_gap_threshold_is_configurable() {
        let m = row_matrix(&[Some(0.0), None, None, Some(3.0)]);
        let outcome = GapFiller::new(&m).long_gap_run(2).fill().unwrap();
        assert_eq!(outcome.diagnostics.len(), 2);
    }

    #[test]
    fn test_explicit_gap_list() {
        let m = row_matrix(&[Some(1.0), None, Some(3.0), None, Some(5.0)]);
        let only = [GapCoord {
            row: 0,
            year: 0,
            column: 3,
        }];
        let outcome = GapFiller::new(&m).gaps(&only).fill().unwrap();
        assert_eq!(outcome.matrix.value(0, 1), None);
        assert!((outcome.matrix.value(0, 3).unwrap() - 4.0).abs() < 1e-12);
        assert_eq!(outcome.filled[0].year, 1950);
    }

    #[test]
    fn test_explicit_gap_out_of_range() {
        let m = row_matrix(&[Some(1.0), None, Some(3.0)]);
        let bad = [GapCoord {
            row: 2,
            year: 1952,
            column: 0,
        }];
        assert!(matches!(
            GapFiller::new(&m).gaps(&bad).fill(),
            Err(AnalysisError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_single_gap_filler_skips_runs() {
        let m = row_matrix(&[Some(1.0), None, Some(3.0), None, None, Some(6.0)]);
        let outcome = fill_single_gaps(&m, None).unwrap();
        assert_eq!(outcome.matrix.value(0, 1), Some(2.0));
        assert_eq!(outcome.matrix.value(0, 3), None);
        assert_eq!(outcome.matrix.value(0, 4), None);
        assert!(matches!(
            outcome.diagnostics[0],
            FillDiagnostic::SkippedLongRun { run_length: 3, .. }
        ));
    }
}
