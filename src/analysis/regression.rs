//! Ordinary least-squares regression between stations.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use crate::analysis::concurrency::concurrent_years;
use crate::analysis_error::AnalysisError;
use crate::matrix::DataMatrix;

/// Fitted line `y = slope * x + intercept` with its goodness-of-fit figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionParams {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient
    pub correlation: f64,
    /// Two-sided p-value for a zero slope
    pub p_value: f64,
    /// Standard error of the slope
    pub std_error: f64,
}

impl RegressionParams {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn r_squared(&self) -> f64 {
        self.correlation * self.correlation
    }
}

/// Regress the values of `b` on the values of `a`.
///
/// Rows are paired by year and flattened in row order, so monthly matrices
/// contribute one pair per month. When `years` is `None` the full set of
/// concurrent years is used. Pairs where either side is missing are skipped.
pub fn linear_regression(
    a: &DataMatrix,
    b: &DataMatrix,
    years: Option<&[i32]>,
) -> Result<RegressionParams, AnalysisError> {
    if a.width() != b.width() {
        return Err(AnalysisError::invalid(format!(
            "cannot pair a {}-column matrix with a {}-column matrix",
            a.width(),
            b.width()
        )));
    }

    let owned;
    let years = match years {
        Some(years) => years,
        None => {
            owned = concurrent_years(a, b);
            &owned
        }
    };

    let mut x = Vec::new();
    let mut y = Vec::new();
    for &year in years {
        let row_a = a.row_index(year)?;
        let row_b = b.row_index(year)?;
        for column in 0..a.width() {
            match (a.value(row_a, column), b.value(row_b, column)) {
                (Some(va), Some(vb)) => {
                    x.push(va);
                    y.push(vb);
                }
                _ => debug!("Skipping incomplete pair at year {}, column {}", year, column),
            }
        }
    }

    fit_pairs(&x, &y)
}

/// Least-squares fit of `y` on `x`.
pub fn fit_pairs(x: &[f64], y: &[f64]) -> Result<RegressionParams, AnalysisError> {
    if x.len() != y.len() {
        return Err(AnalysisError::invalid(format!(
            "{} predictor values for {} responses",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(AnalysisError::RegressionDegenerate(format!(
            "need at least 2 paired values, got {}",
            x.len()
        )));
    }

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut ssxm = 0.0;
    let mut ssym = 0.0;
    let mut ssxym = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }

    if ssxm == 0.0 {
        return Err(AnalysisError::RegressionDegenerate(
            "predictor series has zero variance".to_string(),
        ));
    }

    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;
    let correlation = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    if x.len() == 2 {
        return Ok(RegressionParams {
            slope,
            intercept,
            correlation,
            p_value: if ssym == 0.0 { 1.0 } else { 0.0 },
            std_error: 0.0,
        });
    }

    let df = n - 2.0;
    let p_value = if correlation.abs() >= 1.0 {
        0.0
    } else {
        let t = correlation * (df / ((1.0 - correlation) * (1.0 + correlation))).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| AnalysisError::RegressionDegenerate(e.to_string()))?;
        2.0 * dist.sf(t.abs())
    };
    let std_error = ((1.0 - correlation * correlation) * ssym / ssxm / df).sqrt();

    Ok(RegressionParams {
        slope,
        intercept,
        correlation,
        p_value,
        std_error,
    })
}

/// Value predicted for the target station from the companion's observation
/// at `(year, column)`.
pub fn predict_from_companion(
    companion: &DataMatrix,
    year: i32,
    column: usize,
    params: &RegressionParams,
) -> Result<f64, AnalysisError> {
    let row = companion.row_index(year)?;
    if column >= companion.width() {
        return Err(AnalysisError::invalid(format!(
            "column {} out of range for companion with {} columns",
            column,
            companion.width()
        )));
    }
    companion
        .value(row, column)
        .map(|v| params.predict(v))
        .ok_or_else(|| {
            AnalysisError::RegressionDegenerate(format!(
                "companion station has no data for {year}, column {column}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_exact_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let p = fit_pairs(&x, &y).unwrap();
        assert!((p.slope - 2.0).abs() < 1e-12);
        assert!((p.intercept - 1.0).abs() < 1e-12);
        assert!((p.correlation - 1.0).abs() < 1e-12);
        assert!(p.p_value < 1e-12);
        assert!(p.std_error.abs() < 1e-6);
    }

    #[test]
    fn test_fit_noisy_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.9, 5.1, 7.2, 8.8, 11.1, 13.0];
        let p = fit_pairs(&x, &y).unwrap();
        assert!(p.slope > 1.9 && p.slope < 2.1);
        assert!(p.correlation > 0.99);
        assert!(p.p_value > 0.0 && p.p_value < 1e-4);
        assert!(p.std_error > 0.0);
    }

    #[test]
    fn test_fit_uncorrelated_has_large_p_value() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, -1.0, -1.0, 1.0];
        let p = fit_pairs(&x, &y).unwrap();
        assert!(p.correlation.abs() < 1e-12);
        assert!((p.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_two_points() {
        let p = fit_pairs(&[1.0, 3.0], &[2.0, 6.0]).unwrap();
        assert!((p.slope - 2.0).abs() < 1e-12);
        assert_eq!(p.p_value, 0.0);
        assert_eq!(p.std_error, 0.0);
    }

    #[test]
    fn test_fit_degenerate_inputs() {
        assert!(matches!(
            fit_pairs(&[1.0], &[2.0]),
            Err(AnalysisError::RegressionDegenerate(_))
        ));
        assert!(matches!(
            fit_pairs(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]),
            Err(AnalysisError::RegressionDegenerate(_))
        ));
        assert!(matches!(
            fit_pairs(&[1.0, 2.0], &[1.0]),
            Err(AnalysisError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_predict_from_companion_missing_cell() {
        let companion =
            DataMatrix::annual(vec![1950, 1951], vec![Some(2.0), None], "YEAR", "Q").unwrap();
        let params = RegressionParams {
            slope: 1.0,
            intercept: 0.5,
            correlation: 1.0,
            p_value: 0.0,
            std_error: 0.0,
        };
        assert_eq!(
            predict_from_companion(&companion, 1950, 0, &params).unwrap(),
            2.5
        );
        assert!(matches!(
            predict_from_companion(&companion, 1951, 0, &params),
            Err(AnalysisError::RegressionDegenerate(_))
        ));
        assert!(matches!(
            predict_from_companion(&companion, 1953, 0, &params),
            Err(AnalysisError::YearNotFound(1953))
        ));
    }
}
