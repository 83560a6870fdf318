//! Dry / normal / wet year classification from annual volumes.

use serde::Serialize;
use tracing::debug;

use crate::analysis::columns::extract_column;
use crate::analysis::stats::percentile;
use crate::analysis::volume::annual_volume;
use crate::analysis_error::AnalysisError;
use crate::matrix::DataMatrix;

/// Volume bounds separating dry, normal and wet years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeThresholds {
    /// Largest volume of a dry year
    pub low: f64,
    /// Smallest volume of a wet year
    pub high: f64,
}

impl VolumeThresholds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Thresholds at the 25th and 75th percentiles of the present volumes.
    pub fn quartiles(volumes: &DataMatrix) -> Result<Self, AnalysisError> {
        Self::from_percentiles(volumes, 25.0, 75.0)
    }

    /// Thresholds at arbitrary percentiles of the present volumes.
    pub fn from_percentiles(
        volumes: &DataMatrix,
        dry_percentile: f64,
        wet_percentile: f64,
    ) -> Result<Self, AnalysisError> {
        let values = extract_column(volumes, None, false)?.present_values();
        Ok(Self {
            low: percentile(&values, dry_percentile)?,
            high: percentile(&values, wet_percentile)?,
        })
    }
}

/// Years grouped by wetness, each group in year order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearBuckets {
    pub dry: Vec<i32>,
    pub normal: Vec<i32>,
    pub wet: Vec<i32>,
}

/// Classify the years of an annual volume matrix.
///
/// Without explicit thresholds the quartiles of the volumes are used. A year
/// is dry at or below `low`, wet at or above `high`, normal in between.
/// Years with a missing volume are not classified.
pub fn classify_years(
    volumes: &DataMatrix,
    thresholds: Option<VolumeThresholds>,
) -> Result<YearBuckets, AnalysisError> {
    if !volumes.is_annual() {
        return Err(AnalysisError::invalid(format!(
            "year classification needs one volume per year, got {} columns",
            volumes.width()
        )));
    }

    let thresholds = match thresholds {
        Some(t) => t,
        None => VolumeThresholds::quartiles(volumes)?,
    };
    debug!(
        "Classifying {} years with dry <= {:.3}, wet >= {:.3}",
        volumes.len(),
        thresholds.low,
        thresholds.high
    );

    let mut buckets = YearBuckets::default();
    for (&year, row) in volumes.years().iter().zip(volumes.rows()) {
        let Some(volume) = row[0] else {
            continue;
        };
        if volume <= thresholds.low {
            buckets.dry.push(year);
        } else if volume < thresholds.high {
            buckets.normal.push(year);
        } else {
            buckets.wet.push(year);
        }
    }

    Ok(buckets)
}

/// Classify the years of a monthly flow matrix, converting it to annual
/// volumes first.
pub fn classify_flow_years(
    flows: &DataMatrix,
    thresholds: Option<VolumeThresholds>,
) -> Result<YearBuckets, AnalysisError> {
    let volumes = annual_volume(flows, None)?;
    classify_years(&volumes, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volumes(values: &[Option<f64>]) -> DataMatrix {
        let years = (0..values.len() as i32).map(|i| 1950 + i).collect();
        DataMatrix::annual(years, values.to_vec(), "YEAR", "Vol[MMm3]").unwrap()
    }

    #[test]
    fn test_quartile_classification() {
        let m = volumes(&[Some(100.0), Some(150.0), Some(200.0), Some(250.0)]);
        let t = VolumeThresholds::quartiles(&m).unwrap();
        assert_eq!(t, VolumeThresholds::new(137.5, 212.5));

        let buckets = classify_years(&m, None).unwrap();
        assert_eq!(buckets.dry, vec![1950]);
        assert_eq!(buckets.normal, vec![1951, 1952]);
        assert_eq!(buckets.wet, vec![1953]);
    }

    #[test]
    fn test_explicit_thresholds_are_inclusive() {
        let m = volumes(&[Some(10.0), Some(20.0), Some(30.0)]);
        let buckets = classify_years(&m, Some(VolumeThresholds::new(10.0, 30.0))).unwrap();
        assert_eq!(buckets.dry, vec![1950]);
        assert_eq!(buckets.normal, vec![1951]);
        assert_eq!(buckets.wet, vec![1952]);
    }

    #[test]
    fn test_missing_volumes_are_not_classified() {
        let m = volumes(&[Some(10.0), None, Some(30.0)]);
        let buckets = classify_years(&m, Some(VolumeThresholds::new(15.0, 25.0))).unwrap();
        assert_eq!(buckets.dry, vec![1950]);
        assert!(buckets.normal.is_empty());
        assert_eq!(buckets.wet, vec![1952]);
    }

    #[test]
    fn test_monthly_matrix_is_rejected() {
        let m = DataMatrix::new(
            vec![1950],
            vec![vec![Some(1.0), Some(2.0)]],
            vec!["YEAR".into(), "JAN".into(), "FEB".into()],
        )
        .unwrap();
        assert!(classify_years(&m, None).is_err());
    }
}
